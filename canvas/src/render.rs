//! Scene composition: turns map data and the current projection into an ordered
//! list of screen-space layers.
//!
//! Composition is pure. It never touches the canvas; [`crate::paint`] replays the
//! resulting [`Scene`]. Keeping the two apart lets the layer rules (order, level
//! of detail, widths, seam duplication) be tested without a browser.
//!
//! Layers, bottom first:
//!
//! 1. background
//! 2. country polygons (fill + stroke)
//! 3. subdivision outlines, only at `k >= SUBDIVISION_MIN_ZOOM`, fading in
//! 4. trails, blended so overlaps read as density
//! 5. anchors with halo
//!
//! Geometry that crosses the wrap seam is unwrapped into one continuous path and
//! emitted once per world-span offset that intersects the viewport.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Point, Viewport};
use crate::consts::{
    ANCHOR_HALO_GAP_PX, ANCHOR_HALO_PULSE_PX, ANCHOR_HALO_WIDTH_PX, ANCHOR_HOVER_RADIUS_PX, ANCHOR_OUTLINE_PX,
    ANCHOR_RADIUS_PX, BOUNDARY_STROKE_MAX, SUBDIVISION_FADE_FLOOR, SUBDIVISION_MIN_ZOOM, TRAIL_OPACITY,
    TRAIL_STROKE_BASE, TRAIL_STROKE_MIN,
};
use crate::geo::{Anchor, GeoPoint, Trail};
use crate::geometry::{BoundaryLayer, BoundarySet, LoadState};
use crate::projection::Projection;
use crate::theme::{Palette, Theme, trail_color};

/// Upper bound on seam copies per path. At `k >= 1` a world span is never
/// narrower than the viewport, so three copies always cover it.
const MAX_SEAM_COPIES: usize = 3;

/// Identity of a scene layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Background,
    Countries,
    Subdivisions,
    Trails,
    Anchors,
}

/// Canvas compositing mode for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    SourceOver,
    Multiply,
    Screen,
}

impl Blend {
    /// Value for `globalCompositeOperation`.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
        }
    }
}

/// Fill/stroke for one item. Widths are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Option<&'static str>,
    pub stroke: Option<&'static str>,
    pub line_width: f64,
    pub alpha: f64,
    /// Round caps and joins.
    pub round: bool,
}

impl Style {
    fn fill(color: &'static str) -> Self {
        Self { fill: Some(color), stroke: None, line_width: 0.0, alpha: 1.0, round: false }
    }

    fn stroke(color: &'static str, line_width: f64) -> Self {
        Self { fill: None, stroke: Some(color), line_width, alpha: 1.0, round: false }
    }
}

/// Screen-space geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { x: f64, y: f64, width: f64, height: f64 },
    /// Closed rings filled with the even-odd rule so holes stay open.
    Polygon { rings: Vec<Vec<Point>> },
    Polyline { points: Vec<Point> },
    Circle { center: Point, radius: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub shape: Shape,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub alpha: f64,
    pub blend: Blend,
    pub items: Vec<Item>,
}

impl Layer {
    fn new(kind: LayerKind) -> Self {
        Self { kind, alpha: 1.0, blend: Blend::SourceOver, items: Vec::new() }
    }
}

/// One composed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: Viewport,
    pub layers: Vec<Layer>,
}

impl Scene {
    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|l| l.kind).collect()
    }
}

/// Everything composition reads. All borrowed; nothing is mutated.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub projection: &'a Projection,
    pub viewport: Viewport,
    pub k: f64,
    pub theme: Theme,
    pub boundaries: &'a BoundarySet,
    pub trails: &'a [Trail],
    pub anchors: &'a [Anchor],
    pub hovered: Option<&'a str>,
    pub selected: Option<&'a str>,
    /// Halo breathing phase in `[0, 1]`.
    pub pulse: f64,
}

/// Compose the scene for one frame.
#[must_use]
pub fn compose(input: &SceneInput<'_>) -> Scene {
    let palette = input.theme.palette();
    let mut layers = vec![background(input.viewport, &palette)];

    match input.boundaries.state {
        LoadState::Loading => {}
        LoadState::Failed => {
            layers.push(trails_layer(input));
            layers.push(anchors_layer(input, &palette));
        }
        LoadState::Ready => {
            if let Some(countries) = &input.boundaries.countries {
                layers.push(countries_layer(input, countries, &palette));
            }
            if let Some(subdivisions) = &input.boundaries.subdivisions
                && let Some(alpha) = subdivision_alpha(input.k)
            {
                layers.push(subdivisions_layer(input, subdivisions, &palette, alpha));
            }
            layers.push(trails_layer(input));
            layers.push(anchors_layer(input, &palette));
        }
    }

    Scene { viewport: input.viewport, layers }
}

// =============================================================
// Styling rules
// =============================================================

/// Screen width of a boundary stroke: a world-space stroke of
/// `min(BOUNDARY_STROKE_MAX, 1/k)` units scaled by `k`.
#[must_use]
pub fn boundary_stroke_px(k: f64) -> f64 {
    BOUNDARY_STROKE_MAX.min(1.0 / k) * k
}

/// Trail stroke width in screen pixels.
#[must_use]
pub fn trail_stroke_px(k: f64) -> f64 {
    (TRAIL_STROKE_BASE / k.sqrt()).max(TRAIL_STROKE_MIN)
}

/// Subdivision layer opacity, or `None` below the LOD threshold.
#[must_use]
pub fn subdivision_alpha(k: f64) -> Option<f64> {
    if k < SUBDIVISION_MIN_ZOOM {
        return None;
    }
    let t = ((k - SUBDIVISION_MIN_ZOOM) / SUBDIVISION_MIN_ZOOM).clamp(0.0, 1.0);
    Some(SUBDIVISION_FADE_FLOOR + (1.0 - SUBDIVISION_FADE_FLOOR) * t)
}

fn trail_blend(theme: Theme) -> Blend {
    if theme.is_dark() { Blend::Screen } else { Blend::Multiply }
}

// =============================================================
// Layers
// =============================================================

fn background(viewport: Viewport, palette: &Palette) -> Layer {
    let mut layer = Layer::new(LayerKind::Background);
    layer.items.push(Item {
        shape: Shape::Rect { x: 0.0, y: 0.0, width: viewport.width, height: viewport.height },
        style: Style::fill(palette.background),
    });
    layer
}

fn countries_layer(input: &SceneInput<'_>, countries: &BoundaryLayer, palette: &Palette) -> Layer {
    let style = Style {
        fill: Some(palette.land_fill),
        ..Style::stroke(palette.land_stroke, boundary_stroke_px(input.k))
    };
    let mut layer = Layer::new(LayerKind::Countries);
    push_polygons(&mut layer, input, countries, style);
    layer
}

fn subdivisions_layer(input: &SceneInput<'_>, subdivisions: &BoundaryLayer, palette: &Palette, alpha: f64) -> Layer {
    let style = Style::stroke(palette.subdivision_stroke, boundary_stroke_px(input.k));
    let mut layer = Layer { alpha, ..Layer::new(LayerKind::Subdivisions) };
    push_polygons(&mut layer, input, subdivisions, style);
    layer
}

fn push_polygons(layer: &mut Layer, input: &SceneInput<'_>, boundary: &BoundaryLayer, style: Style) {
    let span = input.projection.world_span_px();
    for polygon in &boundary.polygons {
        let rings: Vec<Vec<Point>> = polygon
            .rings
            .iter()
            .filter_map(|ring| unwrapped_path(ring, span, |g| input.projection.project_clamped(g)))
            .collect();
        // The exterior ring decides placement. Holes are first brought within half
        // a span of it, then travel with it.
        let Some(exterior_x) = rings.first().and_then(|r| mid_x(r)) else { continue };
        let rings: Vec<Vec<Point>> = rings
            .iter()
            .map(|ring| {
                let dx = mid_x(ring).map_or(0.0, |x| span * ((exterior_x - x) / span).round());
                shift(ring, dx)
            })
            .collect();
        for offset in seam_offsets(&rings[0], span, input.viewport) {
            let shifted = rings.iter().map(|r| shift(r, offset)).collect();
            layer.items.push(Item { shape: Shape::Polygon { rings: shifted }, style });
        }
    }
}

fn trails_layer(input: &SceneInput<'_>) -> Layer {
    let span = input.projection.world_span_px();
    let width = trail_stroke_px(input.k);
    let mut layer = Layer { blend: trail_blend(input.theme), ..Layer::new(LayerKind::Trails) };
    for trail in input.trails {
        let Some(path) = unwrapped_path(&trail.points, span, |g| input.projection.project(g)) else {
            continue;
        };
        let style = Style { alpha: TRAIL_OPACITY, round: true, ..Style::stroke(trail_color(trail.kind), width) };
        for offset in seam_offsets(&path, span, input.viewport) {
            layer.items.push(Item { shape: Shape::Polyline { points: shift(&path, offset) }, style });
        }
    }
    layer
}

fn anchors_layer(input: &SceneInput<'_>, palette: &Palette) -> Layer {
    let span = input.projection.world_span_px();
    let pulse = if input.pulse.is_finite() { input.pulse.clamp(0.0, 1.0) } else { 0.0 };
    let mut layer = Layer::new(LayerKind::Anchors);

    for anchor in input.anchors {
        let Some(center) = input.projection.project(anchor.location) else {
            continue;
        };
        let emphasized = [input.hovered, input.selected].contains(&Some(anchor.id.as_str()));
        let radius = if emphasized { ANCHOR_HOVER_RADIUS_PX } else { ANCHOR_RADIUS_PX };
        let halo = radius + ANCHOR_HALO_GAP_PX + ANCHOR_HALO_PULSE_PX * pulse;
        let reach = halo + ANCHOR_HALO_WIDTH_PX;
        let bounds = [Point::new(center.x - reach, center.y - reach), Point::new(center.x + reach, center.y + reach)];

        for offset in seam_offsets(&bounds, span, input.viewport) {
            let c = Point::new(center.x + offset, center.y);
            layer.items.push(Item {
                shape: Shape::Circle { center: c, radius: halo },
                style: Style::stroke(palette.anchor_halo, ANCHOR_HALO_WIDTH_PX),
            });
            layer.items.push(Item {
                shape: Shape::Circle { center: c, radius },
                style: Style { fill: Some(palette.anchor_fill), ..Style::stroke(palette.anchor_outline, ANCHOR_OUTLINE_PX) },
            });
        }
    }
    layer
}

// =============================================================
// Seam handling
// =============================================================

/// Project a path and undo wrap jumps so it is continuous in x.
///
/// A step wider than half a world span is a seam crossing; the rest of the path is
/// shifted by one span to follow it. Returns `None` with fewer than two points.
fn unwrapped_path(points: &[GeoPoint], span: f64, project: impl Fn(GeoPoint) -> Option<Point>) -> Option<Vec<Point>> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    let mut offset = 0.0;
    let mut prev_raw: Option<f64> = None;

    for p in points.iter().filter_map(|&g| project(g)) {
        if let Some(prev) = prev_raw {
            let dx = p.x - prev;
            if dx > span * 0.5 {
                offset -= span;
            } else if dx < -span * 0.5 {
                offset += span;
            }
        }
        prev_raw = Some(p.x);
        out.push(Point::new(p.x + offset, p.y));
    }

    (out.len() >= 2).then_some(out)
}

/// Horizontal offsets (multiples of `span`) at which a path with these points
/// intersects the viewport. Empty when the path is vertically off screen.
pub(crate) fn seam_offsets(points: &[Point], span: f64, viewport: Viewport) -> Vec<f64> {
    let Some((min_x, max_x, min_y, max_y)) = bounds(points) else {
        return Vec::new();
    };
    if max_y < 0.0 || min_y > viewport.height || !(span.is_finite() && span > 0.0) {
        return Vec::new();
    }
    let first = ((0.0 - max_x) / span).ceil();
    let last = ((viewport.width - min_x) / span).floor();
    if !(first.is_finite() && last.is_finite()) || last < first {
        return Vec::new();
    }
    let mut offsets = Vec::with_capacity(MAX_SEAM_COPIES);
    let mut n = first;
    while n <= last && offsets.len() < MAX_SEAM_COPIES {
        offsets.push(n * span);
        n += 1.0;
    }
    offsets
}

fn bounds(points: &[Point]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    Some(points.iter().fold((first.x, first.x, first.y, first.y), |(x0, x1, y0, y1), p| {
        (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y))
    }))
}

fn mid_x(points: &[Point]) -> Option<f64> {
    bounds(points).map(|(min_x, max_x, _, _)| (min_x + max_x) * 0.5)
}

fn shift(points: &[Point], dx: f64) -> Vec<Point> {
    points.iter().map(|p| Point::new(p.x + dx, p.y)).collect()
}
