//! Canvas2D replay of the retained draw-op list.
//!
//! Clears the canvas and draws every op in order to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`.

use std::collections::HashMap;

use dg_core::model::{Bounds, Point};
use dg_render::DrawOp;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

const BACKGROUND: &str = "#f0f0f0";
const HANDLE_FILL: &str = "#FFFFFF";
const HANDLE_STROKE: &str = "#1e88e5";
const SELECTION_STROKE: &str = "#1e88e5";
/// Gap between an element's box and its selection outline.
const SELECTION_PAD: f64 = 4.0;

/// Decoded `<img>` elements keyed by source, reused across frames.
#[derive(Default)]
pub struct ImageCache {
    images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
    fn get_or_load(&mut self, src: &str) -> Option<&HtmlImageElement> {
        if !self.images.contains_key(src) {
            let img = HtmlImageElement::new().ok()?;
            img.set_src(src);
            self.images.insert(src.to_string(), img);
        }
        self.images.get(src)
    }

    /// Whether any image is still decoding (the host should draw again).
    pub fn pending(&self) -> bool {
        self.images.values().any(|img| !img.complete())
    }

    /// Forget images no longer referenced by any op.
    pub fn retain_used(&mut self, ops: &[&DrawOp]) {
        self.images.retain(|src, _| {
            ops.iter()
                .any(|op| matches!(op, DrawOp::Image { src: s, .. } if s == src))
        });
    }
}

/// Render a display list to a Canvas2D context.
pub fn render_ops(
    ctx: &CanvasRenderingContext2d,
    ops: &[&DrawOp],
    canvas_width: f64,
    canvas_height: f64,
    images: &mut ImageCache,
) {
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

    for op in ops {
        draw_op(ctx, op, images);
    }
}

fn draw_op(ctx: &CanvasRenderingContext2d, op: &DrawOp, images: &mut ImageCache) {
    match op {
        DrawOp::Ellipse {
            bounds,
            stroke,
            width,
        } => {
            let (x, y, w, h) = rect(bounds);
            ctx.begin_path();
            let _ = ctx.ellipse(
                x + w / 2.0,
                y + h / 2.0,
                w / 2.0,
                h / 2.0,
                0.0,
                0.0,
                std::f64::consts::TAU,
            );
            stroke_current_path(ctx, stroke, *width);
        }
        DrawOp::RoundRect {
            bounds,
            radius,
            stroke,
            width,
        } => {
            let (x, y, w, h) = rect(bounds);
            rounded_rect_path(ctx, x, y, w, h, *radius as f64);
            stroke_current_path(ctx, stroke, *width);
        }
        DrawOp::Line {
            a,
            b,
            stroke,
            width,
        } => {
            ctx.begin_path();
            ctx.move_to(a.x as f64, a.y as f64);
            ctx.line_to(b.x as f64, b.y as f64);
            stroke_current_path(ctx, stroke, *width);
        }
        DrawOp::Triangle { points, fill } => {
            ctx.begin_path();
            move_to(ctx, points[0]);
            line_to(ctx, points[1]);
            line_to(ctx, points[2]);
            ctx.close_path();
            ctx.set_fill_style_str(fill);
            ctx.fill();
        }
        DrawOp::Text {
            text,
            x,
            y,
            font,
            fill,
        } => {
            ctx.set_font(font);
            ctx.set_fill_style_str(fill);
            ctx.set_text_align("center");
            ctx.set_text_baseline("alphabetic");
            let _ = ctx.fill_text(text, *x as f64, *y as f64);
        }
        DrawOp::Image { src, bounds } => draw_image(ctx, src, bounds, images),
        DrawOp::Handle { center, radius } => {
            ctx.begin_path();
            let _ = ctx.arc(
                center.x as f64,
                center.y as f64,
                *radius as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.set_fill_style_str(HANDLE_FILL);
            ctx.fill();
            ctx.set_stroke_style_str(HANDLE_STROKE);
            ctx.set_line_width(1.5);
            ctx.stroke();
        }
        DrawOp::CornerHandle { center, radius } => {
            let r = *radius as f64;
            ctx.set_fill_style_str(HANDLE_STROKE);
            ctx.fill_rect(center.x as f64 - r, center.y as f64 - r, r * 2.0, r * 2.0);
        }
        DrawOp::SelectionOutline { bounds } => {
            let (x, y, w, h) = rect(bounds);
            ctx.save();
            ctx.set_stroke_style_str(SELECTION_STROKE);
            ctx.set_line_width(1.0);
            let _ = ctx.set_line_dash(&js_sys::Array::of2(
                &wasm_bindgen::JsValue::from_f64(4.0),
                &wasm_bindgen::JsValue::from_f64(3.0),
            ));
            ctx.stroke_rect(
                x - SELECTION_PAD,
                y - SELECTION_PAD,
                w + SELECTION_PAD * 2.0,
                h + SELECTION_PAD * 2.0,
            );
            ctx.restore();
        }
    }
}

fn draw_image(ctx: &CanvasRenderingContext2d, src: &str, bounds: &Bounds, images: &mut ImageCache) {
    let (x, y, w, h) = rect(bounds);
    match images.get_or_load(src) {
        Some(img) if img.complete() && img.natural_width() > 0 => {
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h);
        }
        _ => {
            // Still decoding (or undecodable): draw the frame only
            ctx.save();
            ctx.set_stroke_style_str("#9e9e9e");
            ctx.set_line_width(1.0);
            ctx.stroke_rect(x, y, w, h);
            ctx.restore();
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn rect(b: &Bounds) -> (f64, f64, f64, f64) {
    (b.x as f64, b.y as f64, b.width as f64, b.height as f64)
}

fn move_to(ctx: &CanvasRenderingContext2d, p: Point) {
    ctx.move_to(p.x as f64, p.y as f64);
}

fn line_to(ctx: &CanvasRenderingContext2d, p: Point) {
    ctx.line_to(p.x as f64, p.y as f64);
}

fn stroke_current_path(ctx: &CanvasRenderingContext2d, color: &str, width: f32) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width as f64);
    ctx.stroke();
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}
