//! Hit testing: point → element lookup.
//!
//! Reverse-walks the scene (front-to-back) to find which element is at a
//! given (x, y) canvas position. Handles are checked before bodies, so a
//! line endpoint or image corner wins over anything drawn above its owner.

use dg_core::config::EditorConfig;
use dg_core::id::ElementId;
use dg_core::model::{Element, ElementKind, Endpoint, Scene};

use crate::geometry;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The element itself (shape outline, image box, line stroke).
    Body,
    /// A line endpoint handle.
    Endpoint(Endpoint),
    /// An image's bottom-right resize handle.
    ResizeCorner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: ElementId,
    pub part: HitPart,
}

/// Hit-test tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOptions {
    /// Grab radius of endpoint and corner handles.
    pub handle_radius: f32,
    /// Max distance from a line's segment that still hits the line.
    pub line_tolerance: f32,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            handle_radius: 5.0,
            line_tolerance: 4.0,
        }
    }
}

impl HitOptions {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            handle_radius: config.handle_radius,
            line_tolerance: config.line_hit_tolerance,
        }
    }
}

/// Find the topmost element part at position (px, py).
/// Returns `None` if nothing is hit (background).
pub fn hit_test(scene: &Scene, px: f32, py: f32, opts: &HitOptions) -> Option<Hit> {
    // Walk in reverse order (last painted = topmost)
    let handle = scene
        .iter()
        .rev()
        .find_map(|element| hit_handle(element, px, py, opts));
    if handle.is_some() {
        return handle;
    }

    scene
        .iter()
        .rev()
        .find(|element| hit_body(element, px, py, opts))
        .map(|element| Hit {
            id: element.id,
            part: HitPart::Body,
        })
}

fn hit_handle(element: &Element, px: f32, py: f32, opts: &HitOptions) -> Option<Hit> {
    let part = match &element.kind {
        ElementKind::Line(line) => {
            // B is drawn last, so it wins when the endpoints overlap
            if geometry::near(line.b, px, py, opts.handle_radius) {
                HitPart::Endpoint(Endpoint::B)
            } else if geometry::near(line.a, px, py, opts.handle_radius) {
                HitPart::Endpoint(Endpoint::A)
            } else {
                return None;
            }
        }
        ElementKind::Image(image) => {
            let corner = image.bounds().bottom_right();
            if !geometry::near(corner, px, py, opts.handle_radius) {
                return None;
            }
            HitPart::ResizeCorner
        }
        ElementKind::Shape(_) => return None,
    };
    Some(Hit {
        id: element.id,
        part,
    })
}

fn hit_body(element: &Element, px: f32, py: f32, opts: &HitOptions) -> bool {
    match &element.kind {
        ElementKind::Shape(shape) => geometry::shape_contains(shape, px, py),
        ElementKind::Line(line) => geometry::distance_to_line(line, px, py) <= opts.line_tolerance,
        ElementKind::Image(image) => geometry::image_contains(image, px, py),
    }
}
