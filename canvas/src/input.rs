//! Input model: mouse buttons, modifier keys, wheel deltas, gestures, and the
//! pointer state machine.
//!
//! Raw DOM events are reduced to [`Gesture`]s, the only thing the viewport
//! controller understands. `InputState` tracks the press currently in flight so
//! the engine can tell a click from a drag.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::{WHEEL_LINE_RATE, WHEEL_PAGE_RATE, WHEEL_PINCH_BOOST, WHEEL_PIXEL_RATE};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held. Browsers also set this for trackpad pinch wheel events.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"ArrowLeft"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Unit of a wheel delta, mirroring `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Map the numeric DOM `deltaMode`; unknown values are treated as pixels.
    #[must_use]
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }

    fn rate(self) -> f64 {
        match self {
            Self::Pixel => WHEEL_PIXEL_RATE,
            Self::Line => WHEEL_LINE_RATE,
            Self::Page => WHEEL_PAGE_RATE,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount.
    pub dx: f64,
    /// Vertical scroll amount (positive = down = zoom out).
    pub dy: f64,
    pub mode: DeltaMode,
}

impl WheelDelta {
    /// Multiplicative zoom factor for this wheel step.
    #[must_use]
    pub fn zoom_factor(self, modifiers: Modifiers) -> f64 {
        let boost = if modifiers.ctrl { WHEEL_PINCH_BOOST } else { 1.0 };
        (-self.dy * self.mode.rate() * boost).exp2()
    }
}

/// A continuous-gesture sample consumed by the viewport controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Translate the view by a screen-space delta.
    Pan { dx: f64, dy: f64 },
    /// Scale the view by `factor`, keeping the point under `focus` fixed.
    Zoom { focus: Point, factor: f64 },
}

impl Gesture {
    /// Gestures for one two-finger pinch sample: follow the focal point, then scale
    /// about it.
    #[must_use]
    pub fn pinch(prev_focus: Point, focus: Point, factor: f64) -> [Gesture; 2] {
        [
            Gesture::Pan { dx: focus.x - prev_focus.x, dy: focus.y - prev_focus.y },
            Gesture::Zoom { focus, factor },
        ]
    }
}

/// Internal state for the pointer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No press in progress.
    #[default]
    Idle,
    /// Primary button is down but the pointer has not yet travelled past the drag
    /// slop; releasing here is a click.
    Pressed {
        /// Where the press started.
        start: Point,
    },
    /// The user is dragging the map.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last: Point,
    },
}
