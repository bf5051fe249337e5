//! SVG backend: one `<g data-id="…">` node per element.
//!
//! The host either swaps the whole `<svg>` document in via `to_markup`, or
//! patches individual nodes located by their `data-id` attribute using
//! `node_markup`.

use std::collections::HashMap;

use dg_core::id::ElementId;
use dg_core::model::{Bounds, Element, ElementKind, ImageData, LineData, LineKind, ShapeData, ShapeKind};

use crate::geometry::{self, ARROW_HALF_WIDTH, ARROW_LENGTH, STROKE_WIDTH, TEXT_COLOR};
use crate::surface::RenderSurface;

/// Colour of endpoint / corner handles and the selection outline.
const HANDLE_COLOR: &str = "#1e88e5";

struct SvgNode {
    markup: String,
    bounds: Bounds,
}

/// Retained SVG node tree.
pub struct SvgSurface {
    width: f32,
    height: f32,
    handle_radius: f32,
    /// Stacking order, bottom first.
    order: Vec<ElementId>,
    nodes: HashMap<ElementId, SvgNode>,
    active: Option<ElementId>,
}

impl SvgSurface {
    pub fn new(width: f32, height: f32, handle_radius: f32) -> Self {
        Self {
            width,
            height,
            handle_radius,
            order: Vec::new(),
            nodes: HashMap::new(),
            active: None,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    /// Markup of a single element node, if mounted.
    pub fn node_markup(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.markup.as_str())
    }

    /// Full `<svg>` document: element nodes in stacking order, then the
    /// selection outline on top.
    pub fn to_markup(&self) -> String {
        let (w, h) = (self.width, self.height);
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
        ));
        for id in &self.order {
            if let Some(node) = self.nodes.get(id) {
                svg.push_str(&node.markup);
            }
        }
        if let Some(node) = self.active.and_then(|id| self.nodes.get(&id)) {
            push_selection_outline(&mut svg, &node.bounds);
        }
        svg.push_str("</svg>");
        svg
    }

    fn build(&self, element: &Element) -> SvgNode {
        let mut out = String::new();
        out.push_str(&format!(
            "<g data-id=\"{}\" class=\"{}\">\n",
            escape(element.id.as_str()),
            element.type_name()
        ));
        match &element.kind {
            ElementKind::Shape(shape) => push_shape(&mut out, shape),
            ElementKind::Line(line) => push_line(&mut out, element.id, line, self.handle_radius),
            ElementKind::Image(image) => push_image(&mut out, image, self.handle_radius),
        }
        out.push_str("</g>\n");
        SvgNode {
            markup: out,
            bounds: element.bounds(),
        }
    }
}

impl RenderSurface for SvgSurface {
    fn mount(&mut self, element: &Element) {
        let node = self.build(element);
        if self.nodes.insert(element.id, node).is_none() {
            self.order.push(element.id);
        }
    }

    fn refresh(&mut self, element: &Element) {
        if !self.nodes.contains_key(&element.id) {
            log::debug!("svg refresh for unmounted {:?}", element.id);
            return;
        }
        let node = self.build(element);
        self.nodes.insert(element.id, node);
    }

    fn unmount(&mut self, id: ElementId) {
        if self.nodes.remove(&id).is_some() {
            self.order.retain(|other| *other != id);
        }
        if self.active == Some(id) {
            self.active = None;
        }
    }

    fn clear(&mut self) {
        self.order.clear();
        self.nodes.clear();
        self.active = None;
    }

    fn set_active(&mut self, id: Option<ElementId>) {
        self.active = id;
    }
}

// ─── Element nodes ───────────────────────────────────────────────────────

fn push_shape(out: &mut String, shape: &ShapeData) {
    let b = shape.bounds();
    let stroke = escape(&shape.stroke_color);
    match shape.kind {
        ShapeKind::Circle => {
            let c = b.center();
            out.push_str(&format!(
                "  <ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" />\n",
                c.x,
                c.y,
                b.width / 2.0,
                b.height / 2.0,
                stroke,
                STROKE_WIDTH
            ));
        }
        ShapeKind::RoundedRect | ShapeKind::Bubble => {
            let r = shape.kind.corner_radius();
            out.push_str(&format!(
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" />\n",
                b.x, b.y, b.width, b.height, r, r, stroke, STROKE_WIDTH
            ));
        }
    }

    if shape.text.is_empty() {
        return;
    }
    let cx = b.center().x;
    let size = escape(&shape.font_size);
    let family = escape(&shape.font_family);
    for (y, line) in geometry::label_baselines(shape) {
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"{}\" fill=\"{}\" text-anchor=\"middle\">{}</text>\n",
            cx,
            y,
            size,
            family,
            TEXT_COLOR,
            escape(line)
        ));
    }
}

fn push_line(out: &mut String, id: ElementId, line: &LineData, handle_radius: f32) {
    let stroke = escape(&line.stroke_color);
    let mut marker_ref = String::new();
    if line.kind == LineKind::Arrow {
        // One marker per arrow so each head takes its own line's colour
        let marker_id = format!("arrowhead-{}", escape(id.as_str()));
        out.push_str(&format!(
            "  <defs><marker id=\"{}\" markerWidth=\"{}\" markerHeight=\"{}\" refX=\"0\" refY=\"{}\" orient=\"auto\" markerUnits=\"userSpaceOnUse\"><path d=\"M0,0 L0,{} L{},{} z\" fill=\"{}\" /></marker></defs>\n",
            marker_id,
            ARROW_LENGTH,
            ARROW_HALF_WIDTH * 2.0,
            ARROW_HALF_WIDTH,
            ARROW_HALF_WIDTH * 2.0,
            ARROW_LENGTH,
            ARROW_HALF_WIDTH,
            stroke
        ));
        marker_ref = format!(" marker-end=\"url(#{marker_id})\"");
    }
    out.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{} />\n",
        line.a.x, line.a.y, line.b.x, line.b.y, stroke, STROKE_WIDTH, marker_ref
    ));
    for p in [line.a, line.b] {
        out.push_str(&format!(
            "  <circle class=\"line-handle\" cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"#ffffff\" stroke=\"{}\" />\n",
            p.x, p.y, handle_radius, HANDLE_COLOR
        ));
    }
}

fn push_image(out: &mut String, image: &ImageData, handle_radius: f32) {
    let b = image.bounds();
    out.push_str(&format!(
        "  <image href=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" />\n",
        escape(&image.src),
        b.x,
        b.y,
        b.width,
        b.height
    ));
    let corner = b.bottom_right();
    let side = handle_radius * 2.0;
    out.push_str(&format!(
        "  <rect class=\"resize-handle\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" />\n",
        corner.x - handle_radius,
        corner.y - handle_radius,
        side,
        side,
        HANDLE_COLOR
    ));
}

fn push_selection_outline(out: &mut String, b: &Bounds) {
    let pad = 4.0;
    out.push_str(&format!(
        "<rect class=\"selection\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-dasharray=\"4 3\" />\n",
        b.x - pad,
        b.y - pad,
        b.width + pad * 2.0,
        b.height + pad * 2.0,
        HANDLE_COLOR
    ));
}

/// Escape text for use in XML content and double-quoted attributes.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
