//! Wrapping Mercator projection.
//!
//! Horizontal panning never translates pixels directly. The pan offset is folded
//! into a world-unit position, wrapped into one world period, and applied as a
//! rotation of the central meridian. Every consumer that needs screen
//! coordinates (the renderer, the hit tester, the zoom-about-point math) goes
//! through [`derive_projection`], so the mapping from [`ViewState`] to pixels
//! exists exactly once.

#[cfg(test)]
#[path = "projection_test.rs"]
mod projection_test;

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::camera::{Point, ViewState, Viewport};
use crate::consts::MAX_MERCATOR_LAT;
use crate::geo::{GeoPoint, wrap_lon};

/// Zoom-independent constants fixed from the viewport width.
///
/// `base_world_width` is the pixel width of one full longitude period at `k = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFrame {
    pub base_scale: f64,
    pub base_world_width: f64,
}

impl WorldFrame {
    #[must_use]
    pub fn from_width(width: f64) -> Self {
        let base_scale = width / TAU;
        Self { base_scale, base_world_width: TAU * base_scale }
    }
}

/// Fold a world-unit offset into `[0, base_world_width)`.
#[must_use]
pub fn wrap_world_x(world_x: f64, base_world_width: f64) -> f64 {
    let wrapped = ((world_x % base_world_width) + base_world_width) % base_world_width;
    // `-tiny % w + w` can round up to exactly `w`.
    if wrapped >= base_world_width { 0.0 } else { wrapped }
}

/// Central-meridian rotation (degrees) for a view.
#[must_use]
pub fn rotation_deg(view: &ViewState, frame: &WorldFrame) -> f64 {
    let wrapped = wrap_world_x(view.pan_x / view.k, frame.base_world_width);
    (wrapped / frame.base_world_width) * 360.0
}

/// A fully resolved projection for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
    center: Point,
    rotation_deg: f64,
}

/// Build the projection for a view. The single source of truth shared by
/// rendering and hit-testing.
#[must_use]
pub fn derive_projection(view: &ViewState, frame: &WorldFrame, viewport: Viewport) -> Projection {
    Projection {
        scale: frame.base_scale * view.k,
        center: Point::new(viewport.width * 0.5, viewport.height * 0.5 + view.pan_y),
        rotation_deg: rotation_deg(view, frame),
    }
}

impl Projection {
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// Pixel width of one longitude period at this zoom.
    #[must_use]
    pub fn world_span_px(&self) -> f64 {
        TAU * self.scale
    }

    /// Project a geographic point to the screen.
    ///
    /// Returns `None` outside the Mercator latitude domain or for non-finite input.
    #[must_use]
    pub fn project(&self, geo: GeoPoint) -> Option<Point> {
        if !geo.is_finite() || geo.lat.abs() > MAX_MERCATOR_LAT {
            return None;
        }
        Some(self.project_unchecked(geo))
    }

    /// Project with latitude clamped into the domain. Render-only: polar boundary
    /// rings still need a drawable outline.
    #[must_use]
    pub fn project_clamped(&self, geo: GeoPoint) -> Option<Point> {
        if !geo.is_finite() {
            return None;
        }
        let lat = geo.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        Some(self.project_unchecked(GeoPoint::new(geo.lon, lat)))
    }

    fn project_unchecked(&self, geo: GeoPoint) -> Point {
        let lambda = wrap_lon(geo.lon + self.rotation_deg).to_radians();
        let phi = geo.lat.to_radians();
        Point::new(
            self.center.x + self.scale * lambda,
            self.center.y - self.scale * (FRAC_PI_4 + phi / 2.0).tan().ln(),
        )
    }

    /// Map a screen point back to geographic coordinates.
    ///
    /// Returns `None` when the point lies outside the Mercator latitude domain.
    #[must_use]
    pub fn unproject(&self, screen: Point) -> Option<GeoPoint> {
        if !screen.x.is_finite() || !screen.y.is_finite() {
            return None;
        }
        let lambda = ((screen.x - self.center.x) / self.scale).to_degrees();
        let y = (self.center.y - screen.y) / self.scale;
        let lat = (2.0 * y.exp().atan() - FRAC_PI_2).to_degrees();
        if !lat.is_finite() || lat.abs() > MAX_MERCATOR_LAT {
            return None;
        }
        Some(GeoPoint::new(wrap_lon(lambda - self.rotation_deg), lat))
    }
}
