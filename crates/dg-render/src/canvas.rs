//! Canvas backend: a retained list of draw ops per element.
//!
//! Each mounted element owns a small op list rebuilt on refresh. The host
//! replays `display_list` onto a 2D context every frame; nothing here touches
//! the browser.

use std::collections::HashMap;

use dg_core::id::ElementId;
use dg_core::model::{Bounds, Element, ElementKind, ImageData, LineData, LineKind, Point, ShapeData, ShapeKind};
use smallvec::SmallVec;

use crate::geometry::{self, STROKE_WIDTH, TEXT_COLOR};
use crate::surface::RenderSurface;

/// One primitive drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Stroked ellipse inscribed in `bounds`.
    Ellipse { bounds: Bounds, stroke: String, width: f32 },
    /// Stroked rounded rectangle.
    RoundRect { bounds: Bounds, radius: f32, stroke: String, width: f32 },
    /// Stroked straight segment.
    Line { a: Point, b: Point, stroke: String, width: f32 },
    /// Filled triangle (arrowheads).
    Triangle { points: [Point; 3], fill: String },
    /// Horizontally centred text at a baseline.
    Text { text: String, x: f32, y: f32, font: String, fill: String },
    /// Raster image stretched to `bounds`.
    Image { src: String, bounds: Bounds },
    /// Round grab handle.
    Handle { center: Point, radius: f32 },
    /// Square grab handle.
    CornerHandle { center: Point, radius: f32 },
    /// Dashed outline around the active element.
    SelectionOutline { bounds: Bounds },
}

type OpList = SmallVec<[DrawOp; 4]>;

struct ElementOps {
    bounds: Bounds,
    ops: OpList,
}

/// Retained draw-op lists keyed by element.
pub struct CanvasSurface {
    handle_radius: f32,
    /// Stacking order, bottom first.
    order: Vec<ElementId>,
    views: HashMap<ElementId, ElementOps>,
    active: Option<ElementId>,
    /// Drawn after every element so it is never covered.
    outline: Option<DrawOp>,
}

impl CanvasSurface {
    pub fn new(handle_radius: f32) -> Self {
        Self {
            handle_radius,
            order: Vec::new(),
            views: HashMap::new(),
            active: None,
            outline: None,
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

    /// Ops for a single element, if mounted.
    pub fn ops_for(&self, id: ElementId) -> Option<&[DrawOp]> {
        self.views.get(&id).map(|v| v.ops.as_slice())
    }

    /// Every op in paint order, ending with the selection outline.
    pub fn display_list(&self) -> Vec<&DrawOp> {
        self.order
            .iter()
            .filter_map(|id| self.views.get(id))
            .flat_map(|view| view.ops.iter())
            .chain(self.outline.iter())
            .collect()
    }

    fn build(&self, element: &Element) -> ElementOps {
        let mut ops = OpList::new();
        match &element.kind {
            ElementKind::Shape(shape) => shape_ops(&mut ops, shape),
            ElementKind::Line(line) => line_ops(&mut ops, line, self.handle_radius),
            ElementKind::Image(image) => image_ops(&mut ops, image, self.handle_radius),
        }
        ElementOps {
            bounds: element.bounds(),
            ops,
        }
    }

    fn update_outline(&mut self) {
        self.outline = self
            .active
            .and_then(|id| self.views.get(&id))
            .map(|view| DrawOp::SelectionOutline {
                bounds: view.bounds,
            });
    }
}

impl RenderSurface for CanvasSurface {
    fn mount(&mut self, element: &Element) {
        let view = self.build(element);
        if self.views.insert(element.id, view).is_none() {
            self.order.push(element.id);
        }
        if self.active == Some(element.id) {
            self.update_outline();
        }
    }

    fn refresh(&mut self, element: &Element) {
        if !self.views.contains_key(&element.id) {
            log::debug!("canvas refresh for unmounted {:?}", element.id);
            return;
        }
        let view = self.build(element);
        self.views.insert(element.id, view);
        if self.active == Some(element.id) {
            self.update_outline();
        }
    }

    fn unmount(&mut self, id: ElementId) {
        if self.views.remove(&id).is_some() {
            self.order.retain(|other| *other != id);
        }
        if self.active == Some(id) {
            self.active = None;
            self.outline = None;
        }
    }

    fn clear(&mut self) {
        self.order.clear();
        self.views.clear();
        self.active = None;
        self.outline = None;
    }

    fn set_active(&mut self, id: Option<ElementId>) {
        self.active = id;
        self.update_outline();
    }
}

// ─── Op builders ─────────────────────────────────────────────────────────

fn shape_ops(ops: &mut OpList, shape: &ShapeData) {
    let bounds = shape.bounds();
    let stroke = shape.stroke_color.clone();
    ops.push(match shape.kind {
        ShapeKind::Circle => DrawOp::Ellipse {
            bounds,
            stroke,
            width: STROKE_WIDTH,
        },
        ShapeKind::RoundedRect | ShapeKind::Bubble => DrawOp::RoundRect {
            bounds,
            radius: shape.kind.corner_radius(),
            stroke,
            width: STROKE_WIDTH,
        },
    });

    if shape.text.is_empty() {
        return;
    }
    let font = geometry::css_font(shape);
    let x = bounds.center().x;
    for (y, line) in geometry::label_baselines(shape) {
        ops.push(DrawOp::Text {
            text: line.to_string(),
            x,
            y,
            font: font.clone(),
            fill: TEXT_COLOR.to_string(),
        });
    }
}

fn line_ops(ops: &mut OpList, line: &LineData, handle_radius: f32) {
    ops.push(DrawOp::Line {
        a: line.a,
        b: line.b,
        stroke: line.stroke_color.clone(),
        width: STROKE_WIDTH,
    });
    if line.kind == LineKind::Arrow
        && let Some(points) = geometry::arrowhead(line.a, line.b)
    {
        ops.push(DrawOp::Triangle {
            points,
            fill: line.stroke_color.clone(),
        });
    }
    ops.push(DrawOp::Handle {
        center: line.a,
        radius: handle_radius,
    });
    ops.push(DrawOp::Handle {
        center: line.b,
        radius: handle_radius,
    });
}

fn image_ops(ops: &mut OpList, image: &ImageData, handle_radius: f32) {
    let bounds = image.bounds();
    ops.push(DrawOp::Image {
        src: image.src.clone(),
        bounds,
    });
    ops.push(DrawOp::CornerHandle {
        center: bounds.bottom_right(),
        radius: handle_radius,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::sync;
    use dg_core::model::*;
    use pretty_assertions::assert_eq;

    fn arrow(a: Point, b: Point) -> Element {
        Element::new(ElementKind::Line(LineData::new(LineKind::Arrow, a, b, "#ff0000")))
    }

    #[test]
    fn arrow_ops() {
        let element = arrow(DEFAULT_LINE_START, DEFAULT_LINE_END);
        let mut canvas = CanvasSurface::new(5.0);
        canvas.mount(&element);

        let ops = canvas.ops_for(element.id).unwrap();
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], DrawOp::Line { .. }));
        match &ops[1] {
            DrawOp::Triangle { points, fill } => {
                assert_eq!(points[2], Point::new(218.0, 100.0));
                assert_eq!(fill, "#ff0000");
            }
            other => panic!("expected arrowhead, got {other:?}"),
        }
    }

    #[test]
    fn zero_length_arrow_has_no_head() {
        let p = Point::new(50.0, 50.0);
        let element = arrow(p, p);
        let mut canvas = CanvasSurface::new(5.0);
        canvas.mount(&element);
        let ops = canvas.ops_for(element.id).unwrap();
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Triangle { .. })));
    }

    #[test]
    fn multiline_label_becomes_one_text_op_per_line() {
        let mut shape = ShapeData::new(ShapeKind::RoundedRect, Point::new(0.0, 0.0), "#000000");
        shape.text = "one\ntwo".into();
        shape.font_size = "20px".into();
        let element = Element::new(ElementKind::Shape(shape));
        let mut canvas = CanvasSurface::new(5.0);
        canvas.mount(&element);

        let texts: Vec<_> = canvas
            .ops_for(element.id)
            .unwrap()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, font, x, .. } => Some((text.as_str(), font.as_str(), *x)),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![("one", "20px sans-serif", 75.0), ("two", "20px sans-serif", 75.0)]
        );
    }

    #[test]
    fn selection_outline_moves_with_active() {
        let mut scene = Scene::new();
        let a = scene.create(ElementKind::Shape(ShapeData::new(
            ShapeKind::Circle,
            Point::new(0.0, 0.0),
            "#000000",
        )));
        let b = scene.create(ElementKind::Image(ImageData::new(
            Point::new(200.0, 200.0),
            Size::new(50.0, 50.0),
            "data:,",
        )));
        let mut canvas = CanvasSurface::new(5.0);
        let events = scene.drain_events();
        sync(&mut canvas, &scene, &events);

        canvas.set_active(Some(a));
        assert!(matches!(
            canvas.display_list().last(),
            Some(DrawOp::SelectionOutline { bounds }) if bounds.width == 100.0
        ));

        canvas.set_active(Some(b));
        let outlines = canvas
            .display_list()
            .into_iter()
            .filter(|op| matches!(op, DrawOp::SelectionOutline { .. }))
            .count();
        assert_eq!(outlines, 1);

        // Refresh keeps the outline on the active element
        scene.update(b, Patch::MoveTo(Point::new(300.0, 300.0)));
        let events = scene.drain_events();
        sync(&mut canvas, &scene, &events);
        assert!(matches!(
            canvas.display_list().last(),
            Some(DrawOp::SelectionOutline { bounds }) if bounds.x == 300.0
        ));
    }

    #[test]
    fn clear_drops_everything() {
        let mut canvas = CanvasSurface::new(5.0);
        let element = arrow(DEFAULT_LINE_START, DEFAULT_LINE_END);
        canvas.mount(&element);
        canvas.set_active(Some(element.id));
        canvas.clear();
        assert!(canvas.is_empty());
        assert_eq!(canvas.active(), None);
        assert!(canvas.display_list().is_empty());
    }
}
