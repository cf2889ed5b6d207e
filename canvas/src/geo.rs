//! Geographic data model: points, trails, anchors, and great-circle distance.
//!
//! Everything here is immutable once loaded. Trails and anchors arrive from the
//! atlas endpoint as JSON with `[lon, lat]` coordinate pairs.

#[cfg(test)]
#[path = "geo_test.rs"]
mod geo_test;

use serde::{Deserialize, Serialize};

use crate::consts::EARTH_RADIUS_KM;

/// A geographic coordinate in degrees. Longitude is unrestricted until wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

/// Normalize a longitude into `[-180, 180)`.
#[must_use]
pub fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Activity category of a trail. Determines its render color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailKind {
    Run,
    Ride,
    Hike,
}

/// A recorded route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trail {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TrailKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    /// Recorded distance, when the source provides it.
    #[serde(default, rename = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(rename = "coordinates")]
    pub points: Vec<GeoPoint>,
}

/// A user-placed point of interest with narrative metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub id: String,
    #[serde(rename = "coordinate")]
    pub location: GeoPoint,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// =============================================================
// Great-circle distance
// =============================================================

/// Central angle between two points, in radians.
fn central_angle(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Initial bearing from `a` toward `b`, in radians.
fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlon = (b.lon - a.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x)
}

/// Haversine distance in kilometres.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    central_angle(a, b) * EARTH_RADIUS_KM
}

/// Shortest great-circle distance from `p` to the segment `a`–`b`, in kilometres.
///
/// Uses the cross-track distance when the foot of the perpendicular falls inside
/// the segment and the nearer endpoint otherwise.
#[must_use]
pub fn distance_to_segment_km(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let d12 = central_angle(a, b);
    if d12 < f64::EPSILON {
        return haversine_km(p, a);
    }
    let d13 = central_angle(a, p);
    let delta = bearing(a, p) - bearing(a, b);

    // Pointer lies behind `a` relative to the segment direction.
    if delta.cos() < 0.0 {
        return d13 * EARTH_RADIUS_KM;
    }

    let cross = (d13.sin() * delta.sin()).clamp(-1.0, 1.0).asin();
    let along = (d13.cos() / cross.cos()).clamp(-1.0, 1.0).acos();
    if along > d12 {
        return haversine_km(p, b);
    }
    cross.abs() * EARTH_RADIUS_KM
}

/// Distance from `p` to the nearest point of a polyline, in kilometres.
///
/// Returns `None` for an empty polyline. A single-point polyline degenerates to a
/// point distance.
#[must_use]
pub fn distance_to_polyline_km(p: GeoPoint, points: &[GeoPoint]) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(haversine_km(p, *only)),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment_km(p, w[0], w[1]))
            .reduce(f64::min),
    }
}
