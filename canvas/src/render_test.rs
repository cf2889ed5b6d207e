#![allow(clippy::float_cmp)]

use super::*;
use crate::camera::ViewState;
use crate::geo::TrailKind;
use crate::geometry::Polygon;
use crate::projection::{WorldFrame, derive_projection};

struct Fixture {
    boundaries: BoundarySet,
    trails: Vec<Trail>,
    anchors: Vec<Anchor>,
}

fn square(lon: f64, lat: f64, size: f64) -> Polygon {
    Polygon {
        rings: vec![vec![
            GeoPoint::new(lon, lat),
            GeoPoint::new(lon + size, lat),
            GeoPoint::new(lon + size, lat + size),
            GeoPoint::new(lon, lat + size),
            GeoPoint::new(lon, lat),
        ]],
    }
}

fn layer(name: &str, polygons: Vec<Polygon>) -> BoundaryLayer {
    BoundaryLayer { name: name.into(), polygons, skipped: 0 }
}

fn trail(id: &str, kind: TrailKind, points: &[(f64, f64)]) -> Trail {
    Trail {
        id: id.into(),
        kind,
        name: id.into(),
        date: String::new(),
        distance_km: None,
        points: points.iter().map(|&(lon, lat)| GeoPoint::new(lon, lat)).collect(),
    }
}

fn anchor(id: &str, lon: f64, lat: f64) -> Anchor {
    Anchor {
        id: id.into(),
        location: GeoPoint::new(lon, lat),
        title: id.into(),
        location_name: None,
        date: String::new(),
        note: String::new(),
        image_url: None,
    }
}

fn fixture(state: LoadState, with_subdivisions: bool) -> Fixture {
    let ready = state == LoadState::Ready;
    Fixture {
        boundaries: BoundarySet {
            state,
            countries: ready.then(|| layer("countries", vec![square(0.0, 0.0, 10.0)])),
            subdivisions: (ready && with_subdivisions).then(|| layer("subdivisions", vec![square(2.0, 2.0, 2.0)])),
        },
        trails: vec![trail("t1", TrailKind::Run, &[(-10.0, 5.0), (-9.0, 6.0), (-8.0, 5.5)])],
        anchors: vec![anchor("a1", 12.0, 41.9), anchor("a2", -70.0, -33.0)],
    }
}

fn scene_with(f: &Fixture, view: ViewState, theme: Theme, hovered: Option<&str>, pulse: f64) -> Scene {
    let viewport = Viewport::new(1000.0, 800.0);
    let projection = derive_projection(&view, &WorldFrame::from_width(1000.0), viewport);
    compose(&SceneInput {
        projection: &projection,
        viewport,
        k: view.k,
        theme,
        boundaries: &f.boundaries,
        trails: &f.trails,
        anchors: &f.anchors,
        hovered,
        selected: None,
        pulse,
    })
}

fn at_zoom(k: f64) -> ViewState {
    ViewState { k, ..ViewState::default() }
}

fn scene(f: &Fixture, k: f64) -> Scene {
    scene_with(f, at_zoom(k), Theme::Light, None, 0.0)
}

fn circles(layer: &Layer) -> Vec<(Point, f64)> {
    layer
        .items
        .iter()
        .filter_map(|i| match i.shape {
            Shape::Circle { center, radius } => Some((center, radius)),
            _ => None,
        })
        .collect()
}

// =============================================================
// Layer order and load state
// =============================================================

#[test]
fn loading_draws_background_only() {
    let f = fixture(LoadState::Loading, true);
    assert_eq!(scene(&f, 5.0).kinds(), vec![LayerKind::Background]);
}

#[test]
fn failed_load_keeps_trails_and_anchors() {
    let f = fixture(LoadState::Failed, true);
    assert_eq!(
        scene(&f, 5.0).kinds(),
        vec![LayerKind::Background, LayerKind::Trails, LayerKind::Anchors]
    );
}

#[test]
fn ready_layers_are_ordered_bottom_to_top() {
    let f = fixture(LoadState::Ready, true);
    assert_eq!(
        scene(&f, 5.0).kinds(),
        vec![
            LayerKind::Background,
            LayerKind::Countries,
            LayerKind::Subdivisions,
            LayerKind::Trails,
            LayerKind::Anchors
        ]
    );
}

#[test]
fn missing_subdivision_dataset_renders_base_only() {
    let f = fixture(LoadState::Ready, false);
    assert!(scene(&f, 10.0).layer(LayerKind::Subdivisions).is_none());
    assert!(scene(&f, 10.0).layer(LayerKind::Countries).is_some());
}

#[test]
fn background_uses_theme_color() {
    let f = fixture(LoadState::Loading, false);
    let s = scene_with(&f, ViewState::default(), Theme::Dark, None, 0.0);
    let bg = &s.layer(LayerKind::Background).unwrap().items[0];
    assert_eq!(bg.style.fill, Some(Theme::Dark.palette().background));
    assert_eq!(bg.shape, Shape::Rect { x: 0.0, y: 0.0, width: 1000.0, height: 800.0 });
}

// =============================================================
// Level of detail
// =============================================================

#[test]
fn subdivisions_hidden_below_threshold() {
    let f = fixture(LoadState::Ready, true);
    assert!(scene(&f, 1.0).layer(LayerKind::Subdivisions).is_none());
    assert!(scene(&f, 1.999).layer(LayerKind::Subdivisions).is_none());
}

#[test]
fn subdivisions_visible_at_exactly_threshold() {
    let f = fixture(LoadState::Ready, true);
    let s = scene(&f, SUBDIVISION_MIN_ZOOM);
    let sub = s.layer(LayerKind::Subdivisions).unwrap();
    assert!((sub.alpha - SUBDIVISION_FADE_FLOOR).abs() < 1e-12);
}

#[test]
fn subdivision_opacity_ramps_to_full() {
    assert_eq!(subdivision_alpha(1.0), None);
    let mid = subdivision_alpha(3.0).unwrap();
    assert!(mid > SUBDIVISION_FADE_FLOOR && mid < 1.0);
    assert_eq!(subdivision_alpha(4.0), Some(1.0));
    assert_eq!(subdivision_alpha(50.0), Some(1.0));
}

// =============================================================
// Widths and styling
// =============================================================

#[test]
fn boundary_stroke_is_capped_world_width() {
    assert!((boundary_stroke_px(1.0) - 0.5).abs() < 1e-12);
    assert!((boundary_stroke_px(2.0) - 1.0).abs() < 1e-12);
    assert!((boundary_stroke_px(40.0) - 1.0).abs() < 1e-12);
}

#[test]
fn trail_width_shrinks_with_sqrt_zoom() {
    assert!((trail_stroke_px(1.0) - 1.5).abs() < 1e-12);
    assert!((trail_stroke_px(4.0) - 0.75).abs() < 1e-12);
    assert!((trail_stroke_px(9.0) - 0.5).abs() < 1e-12);
    assert!((trail_stroke_px(400.0) - 0.5).abs() < 1e-12);
}

#[test]
fn trails_use_category_color_and_opacity() {
    let f = fixture(LoadState::Ready, false);
    let s = scene(&f, 4.0);
    let item = &s.layer(LayerKind::Trails).unwrap().items[0];
    assert_eq!(item.style.stroke, Some("#3b82f6"));
    assert!((item.style.alpha - TRAIL_OPACITY).abs() < 1e-12);
    assert!((item.style.line_width - 0.75).abs() < 1e-12);
    assert!(item.style.round);
}

#[test]
fn trail_blend_follows_theme() {
    let f = fixture(LoadState::Ready, false);
    let light = scene_with(&f, ViewState::default(), Theme::Light, None, 0.0);
    let dark = scene_with(&f, ViewState::default(), Theme::Dark, None, 0.0);
    assert_eq!(light.layer(LayerKind::Trails).unwrap().blend, Blend::Multiply);
    assert_eq!(dark.layer(LayerKind::Trails).unwrap().blend, Blend::Screen);
    assert_eq!(Blend::Screen.css(), "screen");
}

#[test]
fn countries_fill_and_stroke() {
    let f = fixture(LoadState::Ready, false);
    let s = scene(&f, 1.0);
    let item = &s.layer(LayerKind::Countries).unwrap().items[0];
    let palette = Theme::Light.palette();
    assert_eq!(item.style.fill, Some(palette.land_fill));
    assert_eq!(item.style.stroke, Some(palette.land_stroke));
}

// =============================================================
// Anchors
// =============================================================

#[test]
fn anchors_draw_halo_then_dot() {
    let f = fixture(LoadState::Ready, false);
    let s = scene(&f, 1.0);
    let c = circles(s.layer(LayerKind::Anchors).unwrap());
    assert_eq!(c.len(), 4);
    assert_eq!(c[0].1, ANCHOR_RADIUS_PX + ANCHOR_HALO_GAP_PX);
    assert_eq!(c[1].1, ANCHOR_RADIUS_PX);
}

#[test]
fn hovered_anchor_grows() {
    let f = fixture(LoadState::Ready, false);
    let s = scene_with(&f, ViewState::default(), Theme::Light, Some("a2"), 0.0);
    let c = circles(s.layer(LayerKind::Anchors).unwrap());
    assert_eq!(c[1].1, ANCHOR_RADIUS_PX);
    assert_eq!(c[3].1, ANCHOR_HOVER_RADIUS_PX);
}

#[test]
fn pulse_expands_halo_and_is_clamped() {
    let f = fixture(LoadState::Ready, false);
    let half = scene_with(&f, ViewState::default(), Theme::Light, None, 0.5);
    let over = scene_with(&f, ViewState::default(), Theme::Light, None, 7.0);
    let halo = |s: &Scene| circles(s.layer(LayerKind::Anchors).unwrap())[0].1;
    assert!((halo(&half) - (ANCHOR_RADIUS_PX + ANCHOR_HALO_GAP_PX + 1.5)).abs() < 1e-12);
    assert!((halo(&over) - (ANCHOR_RADIUS_PX + ANCHOR_HALO_GAP_PX + ANCHOR_HALO_PULSE_PX)).abs() < 1e-12);
}

#[test]
fn anchors_sit_at_projected_positions() {
    let f = fixture(LoadState::Ready, false);
    let view = ViewState { k: 3.0, pan_x: 420.0, pan_y: -60.0 };
    let s = scene_with(&f, view, Theme::Light, None, 0.0);
    let projection = derive_projection(&view, &WorldFrame::from_width(1000.0), Viewport::new(1000.0, 800.0));
    let expected = projection.project(f.anchors[0].location).unwrap();
    let c = circles(s.layer(LayerKind::Anchors).unwrap());
    assert!(c.iter().any(|(p, _)| p.distance(expected) < 1e-9));
}

#[test]
fn anchor_outside_domain_is_skipped() {
    let mut f = fixture(LoadState::Ready, false);
    f.anchors = vec![anchor("pole", 0.0, 89.9)];
    let s = scene(&f, 1.0);
    assert!(s.layer(LayerKind::Anchors).unwrap().items.is_empty());
}

// =============================================================
// Seam handling
// =============================================================

#[test]
fn trail_crossing_seam_is_drawn_on_both_sides() {
    let mut f = fixture(LoadState::Ready, false);
    f.trails = vec![trail("dateline", TrailKind::Ride, &[(179.0, 0.0), (-179.0, 0.0)])];
    let s = scene(&f, 1.0);
    let items = &s.layer(LayerKind::Trails).unwrap().items;
    assert_eq!(items.len(), 2);
    for item in items {
        let Shape::Polyline { points } = &item.shape else { panic!("expected polyline") };
        // Continuous: the segment spans ~2 degrees, not a whole world.
        assert!((points[1].x - points[0].x).abs() < 10.0);
    }
}

#[test]
fn trail_away_from_seam_is_drawn_once() {
    let f = fixture(LoadState::Ready, false);
    let s = scene(&f, 1.0);
    assert_eq!(s.layer(LayerKind::Trails).unwrap().items.len(), 1);
}

#[test]
fn trail_follows_rotation_across_seam() {
    // Rotating by 180 degrees puts the date line in the centre, so a trail
    // crossing it is drawn once, unbroken, near x = 500.
    let mut f = fixture(LoadState::Ready, false);
    f.trails = vec![trail("dateline", TrailKind::Hike, &[(179.0, 0.0), (-179.0, 0.0)])];
    let s = scene_with(&f, ViewState { k: 1.0, pan_x: 500.0, pan_y: 0.0 }, Theme::Light, None, 0.0);
    let items = &s.layer(LayerKind::Trails).unwrap().items;
    assert_eq!(items.len(), 1);
    let Shape::Polyline { points } = &items[0].shape else { panic!("expected polyline") };
    assert!(points.iter().all(|p| (p.x - 500.0).abs() < 10.0));
}

#[test]
fn single_point_trail_is_skipped() {
    let mut f = fixture(LoadState::Ready, false);
    f.trails = vec![trail("dot", TrailKind::Run, &[(3.0, 3.0)]), trail("empty", TrailKind::Run, &[])];
    let s = scene(&f, 1.0);
    assert!(s.layer(LayerKind::Trails).unwrap().items.is_empty());
}

#[test]
fn offscreen_trail_is_culled() {
    let mut f = fixture(LoadState::Ready, false);
    f.trails = vec![trail("far", TrailKind::Run, &[(0.0, 60.0), (1.0, 61.0)])];
    // Pan the map far down so northern latitudes leave the top edge.
    let s = scene_with(&f, ViewState { k: 4.0, pan_x: 0.0, pan_y: -4_000.0 }, Theme::Light, None, 0.0);
    assert!(s.layer(LayerKind::Trails).unwrap().items.is_empty());
}

#[test]
fn seam_offsets_cover_viewport() {
    let vp = Viewport::new(1000.0, 800.0);
    let inside = [Point::new(100.0, 10.0), Point::new(200.0, 20.0)];
    assert_eq!(seam_offsets(&inside, 1000.0, vp), vec![0.0]);

    let crossing = [Point::new(990.0, 10.0), Point::new(1010.0, 10.0)];
    assert_eq!(seam_offsets(&crossing, 1000.0, vp), vec![-1000.0, 0.0]);

    let below = [Point::new(100.0, 900.0), Point::new(200.0, 950.0)];
    assert!(seam_offsets(&below, 1000.0, vp).is_empty());
}

#[test]
fn polygon_crossing_seam_is_duplicated() {
    let mut f = fixture(LoadState::Ready, false);
    f.boundaries.countries = Some(layer("countries", vec![square(175.0, -5.0, 10.0)]));
    let s = scene(&f, 1.0);
    assert_eq!(s.layer(LayerKind::Countries).unwrap().items.len(), 2);
}

#[test]
fn hole_across_seam_stays_inside_exterior() {
    let mut f = fixture(LoadState::Ready, false);
    // Exterior spans 175..185 (crossing the seam); the hole starts past it at -178.
    let exterior = square(175.0, -5.0, 10.0).rings.remove(0);
    let hole = square(-178.0, -2.0, 2.0).rings.remove(0);
    f.boundaries.countries = Some(layer("countries", vec![Polygon { rings: vec![exterior, hole] }]));
    let s = scene(&f, 1.0);
    let items = &s.layer(LayerKind::Countries).unwrap().items;
    assert_eq!(items.len(), 2);
    for item in items {
        let Shape::Polygon { rings } = &item.shape else { panic!("expected polygon") };
        let (ex0, ex1, _, _) = bounds(&rings[0]).unwrap();
        let (h0, h1, _, _) = bounds(&rings[1]).unwrap();
        assert!(ex0 < h0 && h1 < ex1, "hole {h0}..{h1} outside exterior {ex0}..{ex1}");
    }
}

#[test]
fn polar_ring_is_clamped_not_dropped() {
    let mut f = fixture(LoadState::Ready, false);
    let ring = vec![
        GeoPoint::new(-10.0, -60.0),
        GeoPoint::new(10.0, -60.0),
        GeoPoint::new(10.0, -90.0),
        GeoPoint::new(-10.0, -90.0),
        GeoPoint::new(-10.0, -60.0),
    ];
    f.boundaries.countries = Some(layer("countries", vec![Polygon { rings: vec![ring] }]));
    let s = scene(&f, 1.0);
    let item = &s.layer(LayerKind::Countries).unwrap().items[0];
    let Shape::Polygon { rings } = &item.shape else { panic!("expected polygon") };
    assert_eq!(rings[0].len(), 5);
    assert!(rings[0].iter().all(|p| p.y.is_finite()));
}
