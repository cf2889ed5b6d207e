//! JavaScript surface of the map engine.
//!
//! The host owns the DOM listeners and the animation frame loop; it forwards
//! raw event fields to a [`MapHandle`] and receives the resulting actions as
//! plain JS objects (`{ type: "anchor_selected", anchor: {...} }`). Boundary and
//! atlas data are fetched here, once, with an optional fallback URL each.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_net::http::Request;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlCanvasElement;

use crate::camera::{Point, ZoomExtent};
use crate::engine::{Action, Engine};
use crate::geo::{Anchor, Trail};
use crate::input::{Button, DeltaMode, Key, Modifiers, WheelDelta};

const MOD_SHIFT: u8 = 1;
const MOD_CTRL: u8 = 2;
const MOD_ALT: u8 = 4;
const MOD_META: u8 = 8;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("console logger already installed");
    }
}

/// Trails and anchors as served by `/api/atlas`. Extra fields are ignored.
#[derive(Debug, Default, Deserialize)]
struct AtlasPayload {
    #[serde(default)]
    trails: Vec<Trail>,
    #[serde(default)]
    anchors: Vec<Anchor>,
}

#[wasm_bindgen]
pub struct MapHandle {
    engine: Rc<RefCell<Engine>>,
}

#[wasm_bindgen]
impl MapHandle {
    /// Bind to the `<canvas>` element with the given id. `deep_zoom` widens the
    /// zoom range to `[1, 1000]` for street-level datasets.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, deep_zoom: Option<bool>) -> Result<MapHandle, JsValue> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(canvas_id))
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let engine = Engine::new(canvas, ZoomExtent::for_mode(deep_zoom.unwrap_or(false)))?;
        Ok(Self { engine: Rc::new(RefCell::new(engine)) })
    }

    pub fn set_viewport(&self, width_css: f64, height_css: f64, dpr: f64) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow_mut().set_viewport(width_css, height_css, dpr))
    }

    pub fn pointer_down(&self, x: f64, y: f64, button: i16, modifiers: u8) -> Result<JsValue, JsValue> {
        let Some(button) = dom_button(button) else {
            return to_js(&[]);
        };
        to_js(&self.engine.borrow_mut().on_pointer_down(Point::new(x, y), button, dom_modifiers(modifiers)))
    }

    pub fn pointer_move(&self, x: f64, y: f64, modifiers: u8) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow_mut().on_pointer_move(Point::new(x, y), dom_modifiers(modifiers)))
    }

    pub fn pointer_up(&self, x: f64, y: f64, button: i16, modifiers: u8) -> Result<JsValue, JsValue> {
        let Some(button) = dom_button(button) else {
            return to_js(&[]);
        };
        to_js(&self.engine.borrow_mut().on_pointer_up(Point::new(x, y), button, dom_modifiers(modifiers)))
    }

    pub fn pointer_leave(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow_mut().on_pointer_leave())
    }

    pub fn wheel(&self, x: f64, y: f64, dx: f64, dy: f64, delta_mode: u32, modifiers: u8) -> Result<JsValue, JsValue> {
        let delta = WheelDelta { dx, dy, mode: DeltaMode::from_dom(delta_mode) };
        to_js(&self.engine.borrow_mut().on_wheel(Point::new(x, y), delta, dom_modifiers(modifiers)))
    }

    pub fn pinch(&self, prev_x: f64, prev_y: f64, x: f64, y: f64, factor: f64) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow_mut().on_pinch(Point::new(prev_x, prev_y), Point::new(x, y), factor))
    }

    pub fn key_down(&self, key: String, modifiers: u8) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow_mut().on_key_down(Key(key), dom_modifiers(modifiers)))
    }

    pub fn toggle_theme(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow_mut().toggle_theme())
    }

    /// Paint one frame. `pulse` in `[0, 1]` animates the anchor halos.
    pub fn render(&self, pulse: f64) {
        self.engine.borrow().render(pulse);
    }

    /// Replace trails and anchors from an atlas JSON document.
    pub fn load_atlas(&self, json: &str) -> Result<JsValue, JsValue> {
        let payload: AtlasPayload = serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&self.engine.borrow_mut().load_atlas(payload.trails, payload.anchors))
    }

    /// Fetch the atlas document and load it. Failures leave the map without trails.
    pub fn fetch_atlas(&self, url: String) {
        let engine = Rc::clone(&self.engine);
        spawn_local(async move {
            let text = match fetch_text(&url).await {
                Ok(text) => text,
                Err(e) => {
                    log::error!("atlas fetch failed: {e}");
                    return;
                }
            };
            match serde_json::from_str::<AtlasPayload>(&text) {
                Ok(payload) => {
                    let mut engine = engine.borrow_mut();
                    engine.load_atlas(payload.trails, payload.anchors);
                    engine.render(0.0);
                }
                Err(e) => log::error!("atlas payload invalid: {e}"),
            }
        });
    }

    /// Fetch the boundary datasets once, trying each fallback URL when the
    /// primary fails. A missing world dataset leaves the map usable but empty.
    pub fn load_boundaries(
        &self,
        world_url: String,
        world_fallback: Option<String>,
        subdivision_url: Option<String>,
        subdivision_fallback: Option<String>,
    ) {
        let engine = Rc::clone(&self.engine);
        spawn_local(async move {
            let world = fetch_with_fallback(&world_url, world_fallback.as_deref()).await;
            let subdivisions = match subdivision_url {
                Some(url) => match fetch_with_fallback(&url, subdivision_fallback.as_deref()).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        log::warn!("subdivision boundaries unavailable: {e}");
                        None
                    }
                },
                None => None,
            };

            let mut engine = engine.borrow_mut();
            match world {
                Ok(text) => engine.load_boundaries(&text, subdivisions.as_deref()),
                Err(e) => engine.boundaries_failed(&e),
            };
            engine.render(0.0);
        });
    }

    /// Trails recorded near an anchor, as a JS array.
    pub fn trails_near_anchor(&self, id: &str) -> Result<JsValue, JsValue> {
        let engine = self.engine.borrow();
        json_to_js(&engine.trails_near_anchor(id))
    }
}

fn dom_button(button: i16) -> Option<Button> {
    match button {
        0 => Some(Button::Primary),
        1 => Some(Button::Middle),
        2 => Some(Button::Secondary),
        _ => None,
    }
}

fn dom_modifiers(bits: u8) -> Modifiers {
    Modifiers {
        shift: bits & MOD_SHIFT != 0,
        ctrl: bits & MOD_CTRL != 0,
        alt: bits & MOD_ALT != 0,
        meta: bits & MOD_META != 0,
    }
}

fn to_js(actions: &[Action]) -> Result<JsValue, JsValue> {
    json_to_js(actions)
}

fn json_to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&text)
}

async fn fetch_with_fallback(primary: &str, fallback: Option<&str>) -> Result<String, String> {
    match fetch_text(primary).await {
        Ok(text) => Ok(text),
        Err(e) => {
            let Some(fallback) = fallback else { return Err(e) };
            log::warn!("{primary} failed ({e}); trying {fallback}");
            fetch_text(fallback).await
        }
    }
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    let status = resp.status();
    if !(200..300).contains(&status) {
        return Err(format!("HTTP {status} for {url}"));
    }
    resp.text().await.map_err(|e| e.to_string())
}
