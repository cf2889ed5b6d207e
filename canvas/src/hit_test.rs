use super::*;
use crate::consts::{EARTH_RADIUS_KM, TRAIL_HIT_TOLERANCE_KM};
use crate::geo::TrailKind;

fn frame() -> WorldFrame {
    WorldFrame::from_width(1000.0)
}

fn viewport() -> Viewport {
    Viewport::new(1000.0, 800.0)
}

fn anchor(id: &str, lon: f64, lat: f64) -> Anchor {
    Anchor {
        id: id.into(),
        location: GeoPoint::new(lon, lat),
        title: id.to_uppercase(),
        location_name: None,
        date: String::new(),
        note: String::new(),
        image_url: None,
    }
}

fn trail(id: &str, points: &[(f64, f64)]) -> Trail {
    Trail {
        id: id.into(),
        kind: TrailKind::Run,
        name: id.into(),
        date: String::new(),
        distance_km: None,
        points: points.iter().map(|&(lon, lat)| GeoPoint::new(lon, lat)).collect(),
    }
}

/// Longitude offset (degrees) spanning `km` along the equator.
fn lon_deg_for_km(km: f64) -> f64 {
    (km / EARTH_RADIUS_KM).to_degrees()
}

fn screen_of(a: &Anchor, view: &ViewState) -> Point {
    derive_projection(view, &frame(), viewport()).project(a.location).unwrap()
}

// =============================================================
// Anchors
// =============================================================

#[test]
fn anchor_within_radius_is_hit() {
    let anchors = vec![anchor("sf", -122.4194, 37.7749)];
    let view = ViewState::default();
    let p = screen_of(&anchors[0], &view);
    let click = Point::new(p.x + 19.5, p.y);
    let hit = hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest);
    assert_eq!(hit.map(|a| a.id.as_str()), Some("sf"));
}

#[test]
fn anchor_21px_away_is_missed() {
    let anchors = vec![anchor("sf", -122.4194, 37.7749)];
    let view = ViewState::default();
    let p = screen_of(&anchors[0], &view);
    let click = Point::new(p.x + 21.0, p.y);
    assert!(hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest).is_none());
}

#[test]
fn anchor_exactly_at_radius_is_missed() {
    let anchors = vec![anchor("sf", -122.4194, 37.7749)];
    let view = ViewState::default();
    let p = screen_of(&anchors[0], &view);
    let click = Point::new(p.x, p.y - ANCHOR_HIT_RADIUS_PX);
    assert!(hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest).is_none());
}

#[test]
fn projected_anchor_is_always_hit_at_its_own_position() {
    let anchors = vec![anchor("a", 12.0, 41.9), anchor("b", -70.0, -33.0), anchor("c", 179.9, 64.0)];
    let views = [
        ViewState::default(),
        ViewState { k: 3.0, pan_x: 812.0, pan_y: -150.0 },
        ViewState { k: 17.0, pan_x: -98_765.4, pan_y: 3_000.0 },
        ViewState { k: 1.0, pan_x: 999.999, pan_y: 0.0 },
    ];
    for view in views {
        for a in &anchors {
            let Some(p) = derive_projection(&view, &frame(), viewport()).project(a.location) else {
                continue;
            };
            let hit = hit_test(p, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest);
            assert_eq!(hit.map(|h| h.id.as_str()), Some(a.id.as_str()), "{view:?}");
        }
    }
}

#[test]
fn nearest_policy_prefers_closest_anchor() {
    // Two anchors a few pixels apart; the click is closer to the second.
    let anchors = vec![anchor("first", 10.0, 0.0), anchor("second", 10.5, 0.0)];
    let view = ViewState::default();
    let p2 = screen_of(&anchors[1], &view);
    let click = Point::new(p2.x + 1.0, p2.y);
    let nearest = hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest);
    let first = hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::FirstMatch);
    assert_eq!(nearest.map(|a| a.id.as_str()), Some("second"));
    assert_eq!(first.map(|a| a.id.as_str()), Some("first"));
}

#[test]
fn nearest_policy_ties_go_to_earlier_anchor() {
    let anchors = vec![anchor("one", 5.0, 5.0), anchor("two", 5.0, 5.0)];
    let view = ViewState::default();
    let p = screen_of(&anchors[0], &view);
    let hit = hit_test(p, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest);
    assert_eq!(hit.map(|a| a.id.as_str()), Some("one"));
}

#[test]
fn anchor_outside_mercator_domain_is_never_hit() {
    let anchors = vec![anchor("pole", 0.0, 89.0)];
    let view = ViewState::default();
    let click = Point::new(500.0, 0.0);
    assert!(hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest).is_none());
}

#[test]
fn anchor_hit_follows_wrap_rotation() {
    let anchors = vec![anchor("date-line", 179.0, 0.0)];
    // Rotate the map half a turn so the date line sits at the viewport centre.
    let view = ViewState { k: 1.0, pan_x: 500.0, pan_y: 0.0 };
    let p = screen_of(&anchors[0], &view);
    assert!((p.x - 500.0).abs() < 5.0);
    let hit = hit_test(p, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest);
    assert!(hit.is_some());
}

#[test]
fn anchor_near_left_seam_is_hit_at_right_edge_copy() {
    let anchors = vec![anchor("edge", -179.7, 0.0)];
    let view = ViewState::default();
    let p = screen_of(&anchors[0], &view);
    assert!(p.x < 1.0);
    // The copy painted one world span to the right sits at ~1000.83.
    let click = Point::new(998.0, p.y);
    let hit = hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest);
    assert_eq!(hit.map(|a| a.id.as_str()), Some("edge"));
}

#[test]
fn seam_copy_still_respects_radius() {
    let anchors = vec![anchor("edge", -179.7, 0.0)];
    let view = ViewState::default();
    let p = screen_of(&anchors[0], &view);
    let click = Point::new(p.x + 1000.0 - 21.0, p.y);
    assert!(hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest).is_none());
}

#[test]
fn nearest_policy_compares_copies() {
    // "right" is ~9px left of the pointer; the copy of "left" is 5px to its right.
    let anchors = vec![anchor("right", 176.0, 0.0), anchor("left", -179.0, 0.0)];
    let view = ViewState::default();
    let right = screen_of(&anchors[0], &view);
    let left = screen_of(&anchors[1], &view);
    let click = Point::new(left.x + 1000.0 - 5.0, right.y);
    assert!(right.distance(click) < ANCHOR_HIT_RADIUS_PX);
    let hit = hit_test(click, &view, &frame(), viewport(), &anchors, HitPolicy::Nearest);
    assert_eq!(hit.map(|a| a.id.as_str()), Some("left"));
}

#[test]
fn default_policy_is_nearest() {
    assert_eq!(HitPolicy::default(), HitPolicy::Nearest);
}

// =============================================================
// Trails
// =============================================================

#[test]
fn trails_near_uses_real_world_tolerance() {
    let at = GeoPoint::new(0.0, 0.0);
    let near = trail("near", &[(lon_deg_for_km(0.1), -1.0), (lon_deg_for_km(0.1), 1.0)]);
    let far = trail("far", &[(lon_deg_for_km(0.2), -1.0), (lon_deg_for_km(0.2), 1.0)]);
    let trails = vec![near, far];
    let hits = trails_near(at, &trails, TRAIL_HIT_TOLERANCE_KM);
    assert_eq!(hits.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["near"]);
}

#[test]
fn trails_near_returns_every_match_in_input_order() {
    let at = GeoPoint::new(0.0, 0.0);
    let trails = vec![
        trail("b", &[(-0.0005, 0.0), (0.0005, 0.0)]),
        trail("skip", &[(5.0, 5.0), (6.0, 6.0)]),
        trail("a", &[(0.0, -0.0005), (0.0, 0.0005)]),
    ];
    let ids: Vec<_> = trails_near(at, &trails, TRAIL_HIT_TOLERANCE_KM).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn trails_near_ignores_empty_trails() {
    let trails = vec![trail("empty", &[])];
    assert!(trails_near(GeoPoint::new(0.0, 0.0), &trails, 10.0).is_empty());
}

#[test]
fn hit_test_trails_unprojects_the_pointer() {
    let view = ViewState { k: 8.0, pan_x: 3_210.0, pan_y: -40.0 };
    let projection = derive_projection(&view, &frame(), viewport());
    let click = Point::new(420.0, 380.0);
    let at = projection.unproject(click).unwrap();
    let trails = vec![
        trail("under", &[(at.lon, at.lat - 0.01), (at.lon, at.lat + 0.01)]),
        trail("elsewhere", &[(at.lon + 3.0, at.lat), (at.lon + 4.0, at.lat)]),
    ];
    let hits = hit_test_trails(click, &view, &frame(), viewport(), &trails, TRAIL_HIT_TOLERANCE_KM).unwrap();
    assert_eq!(hits.trails.len(), 1);
    assert_eq!(hits.trails[0].id, "under");
    assert!((hits.at.lat - at.lat).abs() < 1e-12);
}

#[test]
fn hit_test_trails_none_when_nothing_close() {
    let trails = vec![trail("far", &[(100.0, 10.0), (101.0, 10.0)])];
    let view = ViewState::default();
    assert!(hit_test_trails(Point::new(500.0, 400.0), &view, &frame(), viewport(), &trails, 0.15).is_none());
}

#[test]
fn hit_test_trails_none_outside_projection_domain() {
    let trails = vec![trail("t", &[(0.0, 0.0), (1.0, 1.0)])];
    let view = ViewState::default();
    // Far above the top of the Mercator square.
    let click = Point::new(500.0, -5_000.0);
    assert!(hit_test_trails(click, &view, &frame(), viewport(), &trails, 1e6).is_none());
}
