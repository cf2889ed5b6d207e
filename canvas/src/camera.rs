#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{DEEP_MAX_ZOOM, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

/// A point in screen space (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Camera state for the wrapping world map.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `k` is the zoom factor relative to the mount-time world frame (1.0 = whole world
/// fits the viewport width).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub k: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { k: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomExtent {
    pub min: f64,
    pub max: f64,
}

impl ZoomExtent {
    /// Range used by datasets detailed enough to warrant street-level zoom.
    pub const DEEP: Self = Self { min: DEFAULT_MIN_ZOOM, max: DEEP_MAX_ZOOM };

    /// [`ZoomExtent::DEEP`] when `deep`, otherwise the default range.
    #[must_use]
    pub fn for_mode(deep: bool) -> Self {
        if deep { Self::DEEP } else { Self::default() }
    }

    #[must_use]
    pub fn clamp(self, k: f64) -> f64 {
        k.clamp(self.min, self.max)
    }
}

impl Default for ZoomExtent {
    fn default() -> Self {
        Self { min: DEFAULT_MIN_ZOOM, max: DEFAULT_MAX_ZOOM }
    }
}

/// Viewport size in CSS pixels. Both dimensions are at least one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: sanitize_dim(width), height: sanitize_dim(height) }
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

fn sanitize_dim(v: f64) -> f64 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}
