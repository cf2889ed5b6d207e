//! Boundary geometry: TopoJSON decoding into polygon rings.
//!
//! Boundary datasets arrive as TopoJSON topologies. Each dataset holds one or
//! more named objects; the world layer is normally keyed `countries` and the
//! subdivision layer `subdivisions` or `admin1`, but any topology whose first
//! object holds polygons is accepted.
//!
//! Failure policy is per layer. A world dataset that cannot be decoded leaves
//! the set in [`LoadState::Failed`] (interactive but empty); a broken
//! subdivision dataset only drops that layer. Individual features with an
//! unexpected shape are skipped and counted.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::Deserialize;
use serde_json::Value;

use crate::geo::GeoPoint;

/// Object keys tried, in order, for the world (admin-0) layer.
pub const WORLD_KEYS: &[&str] = &["countries"];

/// Object keys tried, in order, for the subdivision (admin-1) layer.
pub const SUBDIVISION_KEYS: &[&str] = &["subdivisions", "admin1"];

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid topology json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("topology has no objects")]
    NoObjects,
    #[error("arc index {index} out of range ({len} arcs)")]
    ArcOutOfRange { index: i64, len: usize },
    #[error("object `{object}` has unexpected shape: {detail}")]
    UnexpectedShape { object: String, detail: String },
}

/// One polygon: an exterior ring followed by any holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<GeoPoint>>,
}

/// A decoded boundary layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryLayer {
    /// Object key the layer was read from.
    pub name: String,
    pub polygons: Vec<Polygon>,
    /// Features dropped because their geometry could not be decoded.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

/// A parsed topology with its arcs already decoded to geographic points.
#[derive(Debug, Clone)]
pub struct Topology {
    arcs: Vec<Vec<GeoPoint>>,
    objects: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct RawTopology {
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    #[serde(other)]
    Unsupported,
}

impl Topology {
    /// Parse topology JSON and decode (and dequantize) its arcs.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Json`] when the document is not a topology.
    pub fn parse(json: &str) -> Result<Self, GeometryError> {
        let raw: RawTopology = serde_json::from_str(json)?;
        let arcs = raw
            .arcs
            .iter()
            .map(|arc| decode_arc(arc, raw.transform))
            .collect();
        Ok(Self { arcs, objects: raw.objects })
    }

    /// Object keys in document order.
    #[must_use]
    pub fn object_names(&self) -> Vec<&str> {
        self.objects.keys().map(String::as_str).collect()
    }

    /// Decode the first object matching `preferred`, falling back to the first
    /// object in the document.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoObjects`] for an empty topology and
    /// [`GeometryError::UnexpectedShape`] when the chosen object is not a geometry.
    pub fn layer(&self, preferred: &[&str]) -> Result<BoundaryLayer, GeometryError> {
        let (name, object) = match preferred.iter().find_map(|key| self.objects.get_key_value(*key)) {
            Some(found) => found,
            None => {
                let found = self.objects.iter().next().ok_or(GeometryError::NoObjects)?;
                log::debug!("none of {preferred:?} in {:?}; using `{}`", self.object_names(), found.0);
                found
            }
        };

        let geometries = match object.get("type").and_then(Value::as_str) {
            Some("GeometryCollection") => object
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| GeometryError::UnexpectedShape {
                    object: name.clone(),
                    detail: "GeometryCollection without geometries".into(),
                })?
                .iter()
                .collect::<Vec<_>>(),
            Some(_) => vec![object],
            None => {
                return Err(GeometryError::UnexpectedShape {
                    object: name.clone(),
                    detail: "missing geometry type".into(),
                });
            }
        };

        let mut layer = BoundaryLayer { name: name.clone(), ..BoundaryLayer::default() };
        for geometry in geometries {
            match self.decode_geometry(geometry) {
                Ok(polygons) => layer.polygons.extend(polygons),
                Err(e) => {
                    log::debug!("skipping feature in `{name}`: {e}");
                    layer.skipped += 1;
                }
            }
        }
        if layer.skipped > 0 {
            log::warn!("layer `{name}`: skipped {} malformed feature(s)", layer.skipped);
        }
        Ok(layer)
    }

    fn decode_geometry(&self, value: &Value) -> Result<Vec<Polygon>, GeometryError> {
        // Null geometries are legal TopoJSON and simply draw nothing.
        if value.get("type").is_some_and(Value::is_null) {
            return Ok(Vec::new());
        }
        match TopoGeometry::deserialize(value)? {
            TopoGeometry::Polygon { arcs } => Ok(vec![self.polygon(&arcs)?]),
            TopoGeometry::MultiPolygon { arcs } => arcs.iter().map(|p| self.polygon(p)).collect(),
            TopoGeometry::Unsupported => Ok(Vec::new()),
        }
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon, GeometryError> {
        let rings = rings
            .iter()
            .map(|ring| self.stitch(ring))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon { rings })
    }

    /// Join arcs into one ring. Negative indices (`!i`) reference arc `i` reversed;
    /// each arc after the first shares its first point with the previous arc's last.
    fn stitch(&self, indices: &[i64]) -> Result<Vec<GeoPoint>, GeometryError> {
        let mut ring: Vec<GeoPoint> = Vec::new();
        for &index in indices {
            let (arc_index, reversed) = if index < 0 { (!index, true) } else { (index, false) };
            let out_of_range = GeometryError::ArcOutOfRange { index, len: self.arcs.len() };
            let arc = match usize::try_from(arc_index) {
                Ok(i) => self.arcs.get(i).ok_or(out_of_range)?,
                Err(_) => return Err(out_of_range),
            };
            let skip = usize::from(!ring.is_empty());
            if reversed {
                ring.extend(arc.iter().rev().skip(skip));
            } else {
                ring.extend(arc.iter().skip(skip));
            }
        }
        Ok(ring)
    }
}

fn decode_arc(arc: &[Vec<f64>], transform: Option<Transform>) -> Vec<GeoPoint> {
    let positions = arc.iter().filter_map(|p| match p.as_slice() {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    });
    match transform {
        Some(t) => {
            let (mut x, mut y) = (0.0, 0.0);
            positions
                .map(|(dx, dy)| {
                    x += dx;
                    y += dy;
                    GeoPoint::new(x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                })
                .collect()
        }
        None => positions.map(|(x, y)| GeoPoint::new(x, y)).collect(),
    }
}

/// Load progress of the boundary datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Fetch still in flight; nothing geometry-dependent is drawn.
    #[default]
    Loading,
    Ready,
    /// Load or decode failed; the map stays interactive without boundaries.
    Failed,
}

/// The boundary layers available to the renderer.
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    pub state: LoadState,
    pub countries: Option<BoundaryLayer>,
    pub subdivisions: Option<BoundaryLayer>,
}

impl BoundarySet {
    /// Decode the world dataset and, if present, the subdivision dataset.
    ///
    /// Never fails: errors downgrade to [`LoadState::Failed`] (world) or a missing
    /// subdivision layer.
    #[must_use]
    pub fn decode(world_json: &str, subdivision_json: Option<&str>) -> Self {
        let countries = match Topology::parse(world_json).and_then(|t| t.layer(WORLD_KEYS)) {
            Ok(layer) => layer,
            Err(e) => {
                log::error!("world boundaries unavailable: {e}");
                return Self::failed();
            }
        };

        let subdivisions = subdivision_json.and_then(|json| {
            match Topology::parse(json).and_then(|t| t.layer(SUBDIVISION_KEYS)) {
                Ok(layer) => Some(layer),
                Err(e) => {
                    log::warn!("subdivision layer skipped: {e}");
                    None
                }
            }
        });

        Self { state: LoadState::Ready, countries: Some(countries), subdivisions }
    }

    /// A usable-but-empty set after a failed fetch.
    #[must_use]
    pub fn failed() -> Self {
        Self { state: LoadState::Failed, countries: None, subdivisions: None }
    }
}
