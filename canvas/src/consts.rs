//! Shared numeric constants for the canvas crate.

// ── Projection ──────────────────────────────────────────────────

/// Latitude bound of the spherical Mercator domain, in degrees.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Default zoom range for the immediate-mode canvas.
pub const DEFAULT_MIN_ZOOM: f64 = 1.0;
pub const DEFAULT_MAX_ZOOM: f64 = 20.0;

/// Upper zoom bound for deep-zoom datasets.
pub const DEEP_MAX_ZOOM: f64 = 1000.0;

// ── Input ───────────────────────────────────────────────────────

/// Pointer travel (screen pixels) below which a press counts as a click.
pub const DRAG_SLOP_PX: f64 = 3.0;

/// Wheel-to-zoom exponents per `deltaMode`, matching d3-zoom.
pub const WHEEL_PIXEL_RATE: f64 = 0.002;
pub const WHEEL_LINE_RATE: f64 = 0.05;
pub const WHEEL_PAGE_RATE: f64 = 1.0;

/// Multiplier applied to wheel deltas while Ctrl is held (trackpad pinch).
pub const WHEEL_PINCH_BOOST: f64 = 10.0;

// ── Level of detail ─────────────────────────────────────────────

/// Zoom at and above which subdivision boundaries are drawn.
pub const SUBDIVISION_MIN_ZOOM: f64 = 2.0;

/// Subdivision opacity at the threshold; ramps to 1.0 at twice the threshold.
pub const SUBDIVISION_FADE_FLOOR: f64 = 0.35;

// ── Styling ─────────────────────────────────────────────────────

/// Cap on boundary stroke width in world units.
pub const BOUNDARY_STROKE_MAX: f64 = 0.5;

/// Trail stroke width at `k = 1`, shrinking with `sqrt(k)`.
pub const TRAIL_STROKE_BASE: f64 = 1.5;
pub const TRAIL_STROKE_MIN: f64 = 0.5;
pub const TRAIL_OPACITY: f64 = 0.3;

pub const ANCHOR_RADIUS_PX: f64 = 5.0;
pub const ANCHOR_HOVER_RADIUS_PX: f64 = 8.0;
pub const ANCHOR_OUTLINE_PX: f64 = 2.0;
pub const ANCHOR_HALO_GAP_PX: f64 = 6.0;
pub const ANCHOR_HALO_PULSE_PX: f64 = 3.0;
pub const ANCHOR_HALO_WIDTH_PX: f64 = 2.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space radius within which a pointer selects an anchor.
pub const ANCHOR_HIT_RADIUS_PX: f64 = 20.0;

/// Real-world tolerance for a click to count as "on" a trail.
pub const TRAIL_HIT_TOLERANCE_KM: f64 = 0.15;

/// Radius used to collect the trails recorded around an anchor.
pub const ANCHOR_TRAIL_RADIUS_KM: f64 = 5.0;

/// Mean Earth radius used by the haversine helpers.
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;
