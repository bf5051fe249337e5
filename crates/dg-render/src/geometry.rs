//! Shared element geometry for hit testing and both rendering backends.
//!
//! Model coordinates are `f32`; kurbo works in `f64`. Conversion happens
//! here and nowhere else.

use dg_core::model::{Bounds, ImageData, LineData, Point, ShapeData, ShapeKind};
use kurbo::{Ellipse, Line, ParamCurveNearest, Rect, RoundedRect, Shape};

/// Stroke width used for every outline and line.
pub const STROKE_WIDTH: f32 = 2.0;

/// Arrowhead length along the line direction, measured from endpoint B.
pub const ARROW_LENGTH: f32 = 18.0;

/// Half the arrowhead base width.
pub const ARROW_HALF_WIDTH: f32 = 7.0;

/// Text colour for shape labels.
pub const TEXT_COLOR: &str = "#000000";

/// Line height as a multiple of font size.
pub const LINE_HEIGHT: f32 = 1.2;

pub fn to_kurbo_point(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x as f64, p.y as f64)
}

pub fn to_kurbo_rect(b: &Bounds) -> Rect {
    Rect::from_origin_size(
        (b.x as f64, b.y as f64),
        (b.width as f64, b.height as f64),
    )
}

/// Whether (px, py) falls inside a shape's outline: an ellipse inscribed in
/// the box for circles, a rounded rectangle otherwise.
pub fn shape_contains(shape: &ShapeData, px: f32, py: f32) -> bool {
    let rect = to_kurbo_rect(&shape.bounds());
    let pt = kurbo::Point::new(px as f64, py as f64);
    match shape.kind {
        ShapeKind::Circle => Ellipse::from_rect(rect).contains(pt),
        ShapeKind::RoundedRect | ShapeKind::Bubble => {
            RoundedRect::from_rect(rect, shape.kind.corner_radius() as f64).contains(pt)
        }
    }
}

/// Distance from (px, py) to the closest point of a line segment.
/// Coincident endpoints degrade to point distance.
pub fn distance_to_line(line: &LineData, px: f32, py: f32) -> f32 {
    let pt = kurbo::Point::new(px as f64, py as f64);
    let a = to_kurbo_point(line.a);
    let b = to_kurbo_point(line.b);
    if a == b {
        return a.distance(pt) as f32;
    }
    Line::new(a, b).nearest(pt, 1e-6).distance_sq.sqrt() as f32
}

pub fn image_contains(image: &ImageData, px: f32, py: f32) -> bool {
    image.bounds().contains(px, py)
}

/// Within `radius` of a handle centred on `center`.
pub fn near(center: Point, px: f32, py: f32, radius: f32) -> bool {
    let dx = px - center.x;
    let dy = py - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Triangle at endpoint B pointing away from A: base centred on B, tip
/// `ARROW_LENGTH` beyond it. `None` for a zero-length line (no direction).
pub fn arrowhead(a: Point, b: Point) -> Option<[Point; 3]> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return None;
    }
    let (ux, uy) = (dx / len, dy / len);
    let (px, py) = (-uy * ARROW_HALF_WIDTH, ux * ARROW_HALF_WIDTH);
    Some([
        Point::new(b.x + px, b.y + py),
        Point::new(b.x - px, b.y - py),
        Point::new(b.x + ux * ARROW_LENGTH, b.y + uy * ARROW_LENGTH),
    ])
}

/// CSS font shorthand for a shape label, e.g. `"14px sans-serif"`.
pub fn css_font(shape: &ShapeData) -> String {
    format!("{} {}", shape.font_size, shape.font_family)
}

/// Font size in pixels, parsed from a CSS length. Falls back to 14 for
/// anything that is not a plain number with an optional `px` suffix.
pub fn font_px(size: &str) -> f32 {
    size.trim()
        .trim_end_matches("px")
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(14.0)
}

/// Baseline y for each label line, vertically centred in the shape box.
pub fn label_baselines(shape: &ShapeData) -> Vec<(f32, &str)> {
    let lines: Vec<&str> = shape.text.split('\n').collect();
    let size = font_px(&shape.font_size);
    let line_height = size * LINE_HEIGHT;
    let bounds = shape.bounds();
    let total = lines.len() as f32 * line_height;
    let mut y = bounds.y + (bounds.height - total) / 2.0 + size * 0.9;
    lines
        .into_iter()
        .map(|line| {
            let at = y;
            y += line_height;
            (at, line)
        })
        .collect()
}
