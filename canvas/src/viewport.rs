//! Viewport controller: the sole writer of [`ViewState`].
//!
//! The controller has one state and one transition. Every drag, wheel, or pinch
//! sample arrives as a [`Gesture`] and produces the next `ViewState`
//! synchronously; there is no animation or inertia phase. Resizes rebuild the
//! [`WorldFrame`] while keeping the wrapped world position where it was.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::camera::{Point, ViewState, Viewport, ZoomExtent};
use crate::input::Gesture;
use crate::projection::{Projection, WorldFrame, derive_projection, wrap_world_x};

/// Owns the view state, the world frame, and the viewport size.
#[derive(Debug, Clone)]
pub struct ViewportController {
    view: ViewState,
    frame: WorldFrame,
    viewport: Viewport,
    extent: ZoomExtent,
}

impl ViewportController {
    /// Mount a controller for a viewport. The world frame is fixed from this width.
    #[must_use]
    pub fn new(viewport: Viewport, extent: ZoomExtent) -> Self {
        Self {
            view: ViewState { k: extent.clamp(1.0), ..ViewState::default() },
            frame: WorldFrame::from_width(viewport.width),
            viewport,
            extent,
        }
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.view
    }

    #[must_use]
    pub fn frame(&self) -> WorldFrame {
        self.frame
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn extent(&self) -> ZoomExtent {
        self.extent
    }

    /// The projection for the current state.
    #[must_use]
    pub fn projection(&self) -> Projection {
        derive_projection(&self.view, &self.frame, self.viewport)
    }

    /// Apply one gesture sample and return the resulting view.
    pub fn on_gesture(&mut self, gesture: Gesture) -> ViewState {
        match gesture {
            Gesture::Pan { dx, dy } => {
                if dx.is_finite() && dy.is_finite() {
                    self.view.pan_x += dx;
                    self.view.pan_y += dy;
                }
            }
            Gesture::Zoom { focus, factor } => self.zoom_about(focus, factor),
        }
        self.normalize_pan();
        self.view
    }

    /// Scale about `focus` so the geographic point under it stays put.
    fn zoom_about(&mut self, focus: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 || !focus.x.is_finite() || !focus.y.is_finite() {
            return;
        }
        let k = self.view.k;
        let next_k = self.extent.clamp(k * factor);
        if (next_k - k).abs() < f64::EPSILON {
            return;
        }
        let ratio = next_k / k;
        let c = self.viewport.center();
        self.view.pan_x = focus.x - c.x - ratio * (focus.x - c.x - self.view.pan_x);
        self.view.pan_y = focus.y - c.y - ratio * (focus.y - c.y - self.view.pan_y);
        self.view.k = next_k;
    }

    /// Fold `pan_x` into one world period. The projection only sees the wrapped
    /// value, so this never changes what is drawn.
    fn normalize_pan(&mut self) {
        let k = self.view.k;
        self.view.pan_x = wrap_world_x(self.view.pan_x / k, self.frame.base_world_width) * k;
    }

    /// React to a new viewport size, preserving the wrapped world position and the
    /// latitude at the viewport centre.
    pub fn resize(&mut self, viewport: Viewport) -> ViewState {
        let next_frame = WorldFrame::from_width(viewport.width);
        let ratio = next_frame.base_world_width / self.frame.base_world_width;
        let k = self.view.k;
        let wrapped = wrap_world_x(self.view.pan_x / k, self.frame.base_world_width);

        self.view.pan_x = wrapped * ratio * k;
        self.view.pan_y *= ratio;
        self.frame = next_frame;
        self.viewport = viewport;
        self.normalize_pan();
        self.view
    }

    /// Reset to a freshly mounted view, keeping the current viewport.
    pub fn reset(&mut self) {
        *self = Self::new(self.viewport, self.extent);
    }
}
