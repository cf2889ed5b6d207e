//! Painting: replays a composed [`Scene`] onto a 2D canvas context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads the scene and produces pixels; it does not mutate any map state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule};

use crate::camera::Point;
use crate::render::{Item, Layer, Scene, Shape, Style};

/// Draw the full scene.
///
/// `dpr` is the device pixel ratio; scene coordinates are CSS pixels.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, scene: &Scene, dpr: f64) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, scene.viewport.width, scene.viewport.height);

    for layer in &scene.layers {
        draw_layer(ctx, layer)?;
    }
    Ok(())
}

fn draw_layer(ctx: &CanvasRenderingContext2d, layer: &Layer) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_global_composite_operation(layer.blend.css())?;
    for item in &layer.items {
        draw_item(ctx, item, layer.alpha)?;
    }
    ctx.restore();
    Ok(())
}

fn draw_item(ctx: &CanvasRenderingContext2d, item: &Item, layer_alpha: f64) -> Result<(), JsValue> {
    ctx.set_global_alpha(layer_alpha * item.style.alpha);

    match &item.shape {
        Shape::Rect { x, y, width, height } => {
            if let Some(fill) = item.style.fill {
                ctx.set_fill_style_str(fill);
                ctx.fill_rect(*x, *y, *width, *height);
            }
            if let Some(stroke) = item.style.stroke {
                apply_stroke_style(ctx, &item.style, stroke);
                ctx.stroke_rect(*x, *y, *width, *height);
            }
        }
        Shape::Polygon { rings } => {
            ctx.begin_path();
            for ring in rings {
                trace(ctx, ring);
                ctx.close_path();
            }
            finish(ctx, &item.style, true);
        }
        Shape::Polyline { points } => {
            ctx.begin_path();
            trace(ctx, points);
            finish(ctx, &item.style, false);
        }
        Shape::Circle { center, radius } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, TAU)?;
            finish(ctx, &item.style, false);
        }
    }
    Ok(())
}

fn trace(ctx: &CanvasRenderingContext2d, points: &[Point]) {
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        ctx.move_to(first.x, first.y);
    }
    for p in iter {
        ctx.line_to(p.x, p.y);
    }
}

/// Fill then stroke the current path per `style`.
fn finish(ctx: &CanvasRenderingContext2d, style: &Style, even_odd: bool) {
    if let Some(fill) = style.fill {
        ctx.set_fill_style_str(fill);
        if even_odd {
            ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
        } else {
            ctx.fill();
        }
    }
    if let Some(stroke) = style.stroke {
        apply_stroke_style(ctx, style, stroke);
        ctx.stroke();
    }
}

fn apply_stroke_style(ctx: &CanvasRenderingContext2d, style: &Style, color: &str) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(style.line_width);
    let join = if style.round { "round" } else { "miter" };
    ctx.set_line_cap(if style.round { "round" } else { "butt" });
    ctx.set_line_join(join);
}
