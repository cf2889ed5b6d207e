use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Point, ViewState, Viewport, ZoomExtent};
use crate::consts::{ANCHOR_TRAIL_RADIUS_KM, DRAG_SLOP_PX, TRAIL_HIT_TOLERANCE_KM};
use crate::geo::{Anchor, Trail};
use crate::geometry::BoundarySet;
use crate::hit::{self, HitPolicy};
use crate::input::{Button, Gesture, InputState, Key, Modifiers, WheelDelta};
use crate::paint;
use crate::render::{self, Scene, SceneInput};
use crate::theme::{self, LocalStorage, PreferenceStore, Theme};
use crate::viewport::ViewportController;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

const CURSOR_POINTER: &str = "pointer";
const CURSOR_MOVE: &str = "move";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    AnchorSelected { anchor: Anchor },
    /// A click landed on one or more trails.
    TrailsSelectedAtPoint { trails: Vec<Trail>, lat: f64, lon: f64 },
    SelectionCleared,
    SetCursor { cursor: String },
    RenderNeeded,
    ThemeChanged { theme: Theme },
}

/// What the user last picked on the map.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    Anchor(String),
    Trails(Vec<String>),
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub viewport: ViewportController,
    pub boundaries: BoundarySet,
    pub trails: Vec<Trail>,
    pub anchors: Vec<Anchor>,
    pub theme: Theme,
    pub hit_policy: HitPolicy,
    pub input: InputState,
    pub hovered: Option<String>,
    pub selection: Selection,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(Viewport::new(1.0, 1.0), ZoomExtent::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(viewport: Viewport, extent: ZoomExtent) -> Self {
        Self {
            viewport: ViewportController::new(viewport, extent),
            boundaries: BoundarySet::default(),
            trails: Vec::new(),
            anchors: Vec::new(),
            theme: Theme::default(),
            hit_policy: HitPolicy::default(),
            input: InputState::default(),
            hovered: None,
            selection: Selection::None,
            dpr: 1.0,
        }
    }

    // --- Data inputs ---

    /// Decode boundary datasets. A broken world dataset leaves the map usable but
    /// empty; a broken subdivision dataset only drops that layer.
    pub fn load_boundaries(&mut self, world_json: &str, subdivision_json: Option<&str>) -> Vec<Action> {
        self.boundaries = BoundarySet::decode(world_json, subdivision_json);
        vec![Action::RenderNeeded]
    }

    /// Record that boundary data could not be fetched.
    pub fn boundaries_failed(&mut self, reason: &str) -> Vec<Action> {
        log::error!("boundary load failed: {reason}");
        self.boundaries = BoundarySet::failed();
        vec![Action::RenderNeeded]
    }

    /// Replace trails and anchors. Later anchors reusing an id are dropped.
    pub fn load_atlas(&mut self, trails: Vec<Trail>, anchors: Vec<Anchor>) -> Vec<Action> {
        let mut unique: Vec<Anchor> = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            if unique.iter().any(|a| a.id == anchor.id) {
                log::warn!("dropping duplicate anchor id {}", anchor.id);
                continue;
            }
            unique.push(anchor);
        }
        self.trails = trails;
        self.anchors = unique;
        self.hovered = None;
        self.selection = Selection::None;
        vec![Action::RenderNeeded]
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.viewport.resize(Viewport::new(width_css, height_css));
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Primary {
            self.input = InputState::Pressed { start: screen_pt };
        }
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        match self.input {
            InputState::Idle => self.update_hover(screen_pt),
            InputState::Pressed { start } => {
                if screen_pt.distance(start) <= DRAG_SLOP_PX {
                    return Vec::new();
                }
                self.input = InputState::Panning { last: screen_pt };
                let mut actions = self.pan(start, screen_pt);
                if self.hovered.take().is_some() {
                    actions.push(Action::SetCursor { cursor: CURSOR_MOVE.into() });
                }
                actions
            }
            InputState::Panning { last } => {
                self.input = InputState::Panning { last: screen_pt };
                self.pan(last, screen_pt)
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let state = std::mem::take(&mut self.input);
        match state {
            InputState::Pressed { .. } => self.click(screen_pt),
            InputState::Panning { .. } => self.update_hover(screen_pt),
            InputState::Idle => Vec::new(),
        }
    }

    /// Pointer left the canvas: abandon any press and clear hover.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        if self.hovered.take().is_some() {
            return vec![Action::SetCursor { cursor: CURSOR_MOVE.into() }, Action::RenderNeeded];
        }
        Vec::new()
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let factor = delta.zoom_factor(modifiers);
        self.apply(&[Gesture::Zoom { focus: screen_pt, factor }])
    }

    /// One two-finger sample: the focal point moved from `prev_focus` to `focus`
    /// while finger spread changed by `factor`.
    pub fn on_pinch(&mut self, prev_focus: Point, focus: Point, factor: f64) -> Vec<Action> {
        self.input = InputState::Idle;
        self.apply(&Gesture::pinch(prev_focus, focus, factor))
    }

    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "ArrowRight" => self.step_anchor(1),
            "ArrowLeft" => self.step_anchor(-1),
            "Escape" => self.clear_selection(),
            _ => Vec::new(),
        }
    }

    // --- Theme ---

    /// Flip the theme and persist it.
    pub fn toggle_theme(&mut self, store: &mut dyn PreferenceStore) -> Vec<Action> {
        self.theme = self.theme.toggled();
        theme::save_theme(store, self.theme);
        vec![Action::ThemeChanged { theme: self.theme }, Action::RenderNeeded]
    }

    // --- Queries ---

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.viewport.view()
    }

    #[must_use]
    pub fn anchor(&self, id: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.id == id)
    }

    /// Trails recorded around an anchor.
    #[must_use]
    pub fn trails_near_anchor(&self, id: &str) -> Vec<&Trail> {
        match self.anchor(id) {
            Some(anchor) => hit::trails_near(anchor.location, &self.trails, ANCHOR_TRAIL_RADIUS_KM),
            None => Vec::new(),
        }
    }

    /// Compose the current frame. `pulse` drives the anchor halo animation.
    #[must_use]
    pub fn scene(&self, pulse: f64) -> Scene {
        let projection = self.viewport.projection();
        let selected = match &self.selection {
            Selection::Anchor(id) => Some(id.as_str()),
            _ => None,
        };
        render::compose(&SceneInput {
            projection: &projection,
            viewport: self.viewport.viewport(),
            k: self.view().k,
            theme: self.theme,
            boundaries: &self.boundaries,
            trails: &self.trails,
            anchors: &self.anchors,
            hovered: self.hovered.as_deref(),
            selected,
            pulse,
        })
    }

    // --- Internals ---

    fn apply(&mut self, gestures: &[Gesture]) -> Vec<Action> {
        let before = self.view();
        for g in gestures {
            self.viewport.on_gesture(*g);
        }
        if self.view() == before { Vec::new() } else { vec![Action::RenderNeeded] }
    }

    fn pan(&mut self, from: Point, to: Point) -> Vec<Action> {
        self.apply(&[Gesture::Pan { dx: to.x - from.x, dy: to.y - from.y }])
    }

    fn anchor_at(&self, screen_pt: Point) -> Option<&Anchor> {
        hit::hit_test(
            screen_pt,
            &self.viewport.view(),
            &self.viewport.frame(),
            self.viewport.viewport(),
            &self.anchors,
            self.hit_policy,
        )
    }

    fn update_hover(&mut self, screen_pt: Point) -> Vec<Action> {
        let next = self.anchor_at(screen_pt).map(|a| a.id.clone());
        if next == self.hovered {
            return Vec::new();
        }
        let cursor = if next.is_some() { CURSOR_POINTER } else { CURSOR_MOVE };
        self.hovered = next;
        vec![Action::SetCursor { cursor: cursor.into() }, Action::RenderNeeded]
    }

    fn click(&mut self, screen_pt: Point) -> Vec<Action> {
        if let Some(anchor) = self.anchor_at(screen_pt).cloned() {
            self.selection = Selection::Anchor(anchor.id.clone());
            return vec![Action::AnchorSelected { anchor }, Action::RenderNeeded];
        }

        let view = self.viewport.view();
        let hits = hit::hit_test_trails(
            screen_pt,
            &view,
            &self.viewport.frame(),
            self.viewport.viewport(),
            &self.trails,
            TRAIL_HIT_TOLERANCE_KM,
        );
        if let Some(hits) = hits {
            let trails: Vec<Trail> = hits.trails.into_iter().cloned().collect();
            let was_anchor = matches!(self.selection, Selection::Anchor(_));
            self.selection = Selection::Trails(trails.iter().map(|t| t.id.clone()).collect());
            let mut actions = vec![Action::TrailsSelectedAtPoint { trails, lat: hits.at.lat, lon: hits.at.lon }];
            if was_anchor {
                actions.push(Action::RenderNeeded);
            }
            return actions;
        }

        self.clear_selection()
    }

    fn clear_selection(&mut self) -> Vec<Action> {
        if std::mem::take(&mut self.selection) == Selection::None {
            return Vec::new();
        }
        vec![Action::SelectionCleared, Action::RenderNeeded]
    }

    /// Move the anchor selection by `step`, wrapping at either end.
    fn step_anchor(&mut self, step: isize) -> Vec<Action> {
        let Selection::Anchor(current) = &self.selection else {
            return Vec::new();
        };
        let Some(index) = self.anchors.iter().position(|a| &a.id == current) else {
            return Vec::new();
        };
        let len = self.anchors.len().cast_signed();
        let next = (index.cast_signed() + step).rem_euclid(len).cast_unsigned();
        let anchor = self.anchors[next].clone();
        self.selection = Selection::Anchor(anchor.id.clone());
        vec![Action::AnchorSelected { anchor }, Action::RenderNeeded]
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    store: LocalStorage,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element with the given zoom
    /// range, restoring the persisted theme.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, extent: ZoomExtent) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let viewport = Viewport::new(f64::from(canvas.client_width()), f64::from(canvas.client_height()));
        let store = LocalStorage;
        let mut core = EngineCore::new(viewport, extent);
        core.theme = theme::load_theme(&store);
        Ok(Self { canvas, ctx, store, core })
    }

    // --- Delegated data inputs ---

    pub fn load_boundaries(&mut self, world_json: &str, subdivision_json: Option<&str>) -> Vec<Action> {
        self.core.load_boundaries(world_json, subdivision_json)
    }

    pub fn boundaries_failed(&mut self, reason: &str) -> Vec<Action> {
        self.core.boundaries_failed(reason)
    }

    pub fn load_atlas(&mut self, trails: Vec<Trail>, anchors: Vec<Anchor>) -> Vec<Action> {
        self.core.load_atlas(trails, anchors)
    }

    // --- Viewport ---

    /// Resize the backing store to `css * dpr` and update the viewport.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        let vp = self.core.viewport.viewport();
        self.canvas.set_width(device_px(vp.width * self.core.dpr));
        self.canvas.set_height(device_px(vp.height * self.core.dpr));
        actions
    }

    // --- Delegated input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_pinch(&mut self, prev_focus: Point, focus: Point, factor: f64) -> Vec<Action> {
        self.core.on_pinch(prev_focus, focus, factor)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn toggle_theme(&mut self) -> Vec<Action> {
        self.core.toggle_theme(&mut self.store)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    pub fn render(&self, pulse: f64) {
        let scene = self.core.scene(pulse);
        if let Err(e) = paint::draw(&self.ctx, &scene, self.core.dpr) {
            log::error!("render failed: {e:?}");
        }
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.core.view()
    }

    #[must_use]
    pub fn trails_near_anchor(&self, id: &str) -> Vec<&Trail> {
        self.core.trails_near_anchor(id)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_px(v: f64) -> u32 {
    v.round().clamp(1.0, f64::from(u32::MAX)) as u32
}
