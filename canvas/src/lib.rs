//! Map core for the world-wrapping trail map.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! full lifecycle of the map canvas: translating raw DOM input events into
//! zoom/pan gestures, deriving the wrapping Mercator projection from view
//! state, composing and painting the layered scene, and hit-testing anchors and
//! trails against the same projection that was painted. The host JavaScript
//! layer only wires DOM events to [`bindings::MapHandle`] and reacts to the
//! resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`bindings`] | `wasm_bindgen` surface and data fetching |
//! | [`projection`] | World frame, wrap rotation, project/unproject |
//! | [`viewport`] | Zoom/pan controller, the only writer of view state |
//! | [`camera`] | Screen points, view state, viewport size, zoom extent |
//! | [`input`] | Input event types, wheel/pinch gestures, pointer state |
//! | [`render`] | Scene composition: layer order, LOD, styling, seam copies |
//! | [`paint`] | Replays a scene onto a 2D canvas context |
//! | [`hit`] | Anchor and trail hit-testing |
//! | [`geometry`] | TopoJSON boundary decoding and load state |
//! | [`geo`] | Trails, anchors, great-circle distance |
//! | [`theme`] | Light/dark palette and persisted preference |
//! | [`consts`] | Shared numeric constants (zoom limits, radii, thresholds) |

pub mod bindings;
pub mod camera;
pub mod consts;
pub mod engine;
pub mod geo;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod paint;
pub mod projection;
pub mod render;
pub mod theme;
pub mod viewport;
