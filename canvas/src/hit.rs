#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, ViewState, Viewport};
use crate::consts::ANCHOR_HIT_RADIUS_PX;
use crate::geo::{Anchor, GeoPoint, Trail, distance_to_polyline_km};
use crate::projection::{WorldFrame, derive_projection};

/// How to pick among several anchors inside the hit radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitPolicy {
    /// Closest anchor to the pointer; ties go to the earlier anchor.
    #[default]
    Nearest,
    /// First anchor in input order.
    FirstMatch,
}

/// Trails under a clicked location.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailHits<'a> {
    /// Geographic location of the click.
    pub at: GeoPoint,
    /// Matching trails in input order.
    pub trails: Vec<&'a Trail>,
}

/// Find the anchor under a screen point.
///
/// Anchors outside the projection domain are never hit. Distances are strict:
/// an anchor exactly [`ANCHOR_HIT_RADIUS_PX`] away is a miss. Each anchor is
/// measured at its copy nearest the pointer, matching the seam copies painted.
#[must_use]
pub fn hit_test<'a>(
    screen: Point,
    view: &ViewState,
    frame: &WorldFrame,
    viewport: Viewport,
    anchors: &'a [Anchor],
    policy: HitPolicy,
) -> Option<&'a Anchor> {
    let projection = derive_projection(view, frame, viewport);
    let span = projection.world_span_px();
    let mut candidates = anchors.iter().filter_map(|anchor| {
        let p = projection.project(anchor.location)?;
        let d = nearest_copy(p, screen, span).distance(screen);
        (d < ANCHOR_HIT_RADIUS_PX).then_some((d, anchor))
    });

    match policy {
        HitPolicy::FirstMatch => candidates.next().map(|(_, a)| a),
        HitPolicy::Nearest => candidates
            .fold(None, |best: Option<(f64, &Anchor)>, (d, a)| match best {
                Some((bd, _)) if bd <= d => best,
                _ => Some((d, a)),
            })
            .map(|(_, a)| a),
    }
}

/// The copy of `p`, shifted by whole world spans, closest to `screen` in x.
fn nearest_copy(p: Point, screen: Point, span: f64) -> Point {
    if !(span.is_finite() && span > 0.0) {
        return p;
    }
    let periods = ((p.x - screen.x) / span).round();
    Point::new(p.x - periods * span, p.y)
}

/// Trails passing within `tolerance_km` of the geographic point under `screen`.
///
/// Returns `None` when the pointer is outside the projection domain or no trail
/// is close enough.
#[must_use]
pub fn hit_test_trails<'a>(
    screen: Point,
    view: &ViewState,
    frame: &WorldFrame,
    viewport: Viewport,
    trails: &'a [Trail],
    tolerance_km: f64,
) -> Option<TrailHits<'a>> {
    let at = derive_projection(view, frame, viewport).unproject(screen)?;
    let trails = trails_near(at, trails, tolerance_km);
    if trails.is_empty() {
        return None;
    }
    Some(TrailHits { at, trails })
}

/// All trails whose nearest segment lies strictly within `tolerance_km` of `point`.
#[must_use]
pub fn trails_near(point: GeoPoint, trails: &[Trail], tolerance_km: f64) -> Vec<&Trail> {
    trails
        .iter()
        .filter(|t| distance_to_polyline_km(point, &t.points).is_some_and(|d| d < tolerance_km))
        .collect()
}
