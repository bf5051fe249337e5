//! Element model for diagram layouts.
//!
//! A `Scene` is an ordered list of `Element`s. Order is insertion order and
//! doubles as stacking order (later elements paint on top). Every element has
//! a stable `ElementId`; views derived from the scene are keyed by that ID and
//! are disposable; the scene is the single source of truth.
//!
//! All mutation goes through `Scene::create`, `Scene::update` and
//! `Scene::remove`. Each change is recorded as a `SceneEvent` that rendering
//! surfaces replay to stay in sync.

use crate::id::ElementId;
use std::collections::HashMap;
use std::ops::{Add, Sub};

// ─── Defaults ────────────────────────────────────────────────────────────

/// Font size given to shapes created without one (and to loaded records that omit it).
pub const DEFAULT_FONT_SIZE: &str = "14px";

/// Font family given to shapes created without one.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Stroke colour given to elements created without one.
pub const DEFAULT_STROKE_COLOR: &str = "#000000";

/// Image size used when the intrinsic size is unknown.
pub const DEFAULT_IMAGE_SIZE: Size = Size::new(100.0, 100.0);

/// Smallest image dimension reachable through a resize.
pub const DEFAULT_IMAGE_FLOOR: f32 = 10.0;

/// Endpoints given to a freshly added line or arrow.
pub const DEFAULT_LINE_START: Point = Point::new(100.0, 100.0);
pub const DEFAULT_LINE_END: Point = Point::new(200.0, 100.0);

/// Position given to a freshly added image.
pub const DEFAULT_IMAGE_POSITION: Point = Point::new(100.0, 100.0);

// ─── Geometry ────────────────────────────────────────────────────────────

/// A canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width × height of an element's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions to at least `floor`. Never inverts.
    pub fn clamped(self, floor: f32) -> Self {
        Self::new(self.width.max(floor), self.height.max(floor))
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Smallest box containing both points, whatever their order.
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }
}

// ─── Element kinds ───────────────────────────────────────────────────────

/// The three text-bearing shape flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    RoundedRect,
    Bubble,
}

impl ShapeKind {
    /// The `type` tag used in saved layouts.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::RoundedRect => "rounded-rect",
            ShapeKind::Bubble => "bubble",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "circle" => Some(ShapeKind::Circle),
            "rounded-rect" => Some(ShapeKind::RoundedRect),
            "bubble" => Some(ShapeKind::Bubble),
            _ => None,
        }
    }

    /// Nominal box the shape occupies on the canvas.
    pub fn nominal_size(&self) -> Size {
        match self {
            ShapeKind::Circle => Size::new(100.0, 100.0),
            ShapeKind::RoundedRect => Size::new(150.0, 100.0),
            ShapeKind::Bubble => Size::new(140.0, 90.0),
        }
    }

    /// Corner radius of the outline. Circles are drawn as ellipses instead.
    pub fn corner_radius(&self) -> f32 {
        match self {
            ShapeKind::Circle => 0.0,
            ShapeKind::RoundedRect => 15.0,
            ShapeKind::Bubble => 45.0,
        }
    }
}

/// Plain line or line with an arrowhead at endpoint B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Line,
    Arrow,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Line => "line",
            LineKind::Arrow => "arrow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "line" => Some(LineKind::Line),
            "arrow" => Some(LineKind::Arrow),
            _ => None,
        }
    }
}

/// Which end of a line a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    A,
    B,
}

/// A shape with an editable text label.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeData {
    pub kind: ShapeKind,
    /// Top-left of the bounding box.
    pub position: Point,
    pub text: String,
    pub stroke_color: String,
    pub font_size: String,
    pub font_family: String,
}

impl ShapeData {
    /// A shape with empty text and default font.
    pub fn new(kind: ShapeKind, position: Point, stroke_color: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            text: String::new(),
            stroke_color: stroke_color.into(),
            font_size: DEFAULT_FONT_SIZE.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.kind.nominal_size())
    }
}

/// A straight line or arrow between two independent endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub kind: LineKind,
    pub a: Point,
    pub b: Point,
    pub stroke_color: String,
}

impl LineData {
    pub fn new(kind: LineKind, a: Point, b: Point, stroke_color: impl Into<String>) -> Self {
        Self {
            kind,
            a,
            b,
            stroke_color: stroke_color.into(),
        }
    }

    pub fn endpoint(&self, end: Endpoint) -> Point {
        match end {
            Endpoint::A => self.a,
            Endpoint::B => self.b,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::spanning(self.a, self.b)
    }
}

/// An embedded raster image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub position: Point,
    pub size: Size,
    /// Embedded image data (typically a `data:` URL).
    pub src: String,
}

impl ImageData {
    pub fn new(position: Point, size: Size, src: impl Into<String>) -> Self {
        Self {
            position,
            size,
            src: src.into(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.size)
    }
}

/// What an element is.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Shape(ShapeData),
    Line(LineData),
    Image(ImageData),
}

impl ElementKind {
    /// The `type` tag used in saved layouts (also the ID prefix).
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Shape(s) => s.kind.as_str(),
            ElementKind::Line(l) => l.kind.as_str(),
            ElementKind::Image(_) => "image",
        }
    }
}

/// A single placed element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
}

impl Element {
    /// Wrap a kind with a freshly allocated ID.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::with_prefix(kind.type_name()),
            kind,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn bounds(&self) -> Bounds {
        match &self.kind {
            ElementKind::Shape(s) => s.bounds(),
            ElementKind::Line(l) => l.bounds(),
            ElementKind::Image(i) => i.bounds(),
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeData> {
        match &self.kind {
            ElementKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineData> {
        match &self.kind {
            ElementKind::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match &self.kind {
            ElementKind::Image(i) => Some(i),
            _ => None,
        }
    }

    /// Apply a patch in place.
    ///
    /// Returns `None` when the patch does not fit this element's kind,
    /// otherwise `Some(changed)`.
    fn apply(&mut self, patch: &Patch, image_floor: f32) -> Option<bool> {
        match (&mut self.kind, patch) {
            (ElementKind::Shape(s), Patch::MoveTo(p)) => Some(replace(&mut s.position, *p)),
            (ElementKind::Image(i), Patch::MoveTo(p)) => Some(replace(&mut i.position, *p)),
            (ElementKind::Line(l), Patch::SetEndpoint { end, to }) => {
                let slot = match end {
                    Endpoint::A => &mut l.a,
                    Endpoint::B => &mut l.b,
                };
                Some(replace(slot, *to))
            }
            (ElementKind::Line(l), Patch::SetEndpoints { a, b }) => {
                let changed_a = replace(&mut l.a, *a);
                let changed_b = replace(&mut l.b, *b);
                Some(changed_a || changed_b)
            }
            (ElementKind::Image(i), Patch::Resize(size)) => {
                Some(replace(&mut i.size, size.clamped(image_floor)))
            }
            (ElementKind::Shape(s), Patch::SetText(text)) => {
                Some(replace(&mut s.text, text.clone()))
            }
            (ElementKind::Shape(s), Patch::SetStrokeColor(color)) => {
                Some(replace(&mut s.stroke_color, color.clone()))
            }
            (ElementKind::Line(l), Patch::SetStrokeColor(color)) => {
                Some(replace(&mut l.stroke_color, color.clone()))
            }
            (ElementKind::Shape(s), Patch::SetFont { size, family }) => {
                let changed_size = replace(&mut s.font_size, size.clone());
                let changed_family = replace(&mut s.font_family, family.clone());
                Some(changed_size || changed_family)
            }
            _ => None,
        }
    }
}

/// Overwrite `slot` with `value`, reporting whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

// ─── Patches ─────────────────────────────────────────────────────────────

/// A partial mutation of one element.
///
/// Every patch carries absolute values, so applying the same patch twice
/// yields the same state as applying it once.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Move a shape or image so its top-left sits at the point.
    MoveTo(Point),
    /// Move one endpoint of a line.
    SetEndpoint { end: Endpoint, to: Point },
    /// Move both endpoints of a line (whole-line translation).
    SetEndpoints { a: Point, b: Point },
    /// Resize an image; each dimension is clamped to the scene's image floor.
    Resize(Size),
    /// Replace a shape's text.
    SetText(String),
    /// Change the stroke colour of a shape or line.
    SetStrokeColor(String),
    /// Change a shape's font.
    SetFont { size: String, family: String },
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// A change to the scene, replayed by rendering surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    Added(ElementId),
    Changed(ElementId),
    Removed(ElementId),
    Cleared,
}

/// The ordered collection of all live elements.
#[derive(Debug, Clone)]
pub struct Scene {
    elements: Vec<Element>,
    /// Index from ElementId → position in `elements`.
    index: HashMap<ElementId, usize>,
    /// Smallest image dimension a `Patch::Resize` can produce.
    image_floor: f32,
    /// Changes not yet drained by a rendering surface.
    events: Vec<SceneEvent>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            index: HashMap::new(),
            image_floor: DEFAULT_IMAGE_FLOOR,
            events: Vec::new(),
        }
    }

    /// Append a new element with a freshly allocated ID.
    pub fn create(&mut self, kind: ElementKind) -> ElementId {
        self.push(Element::new(kind))
    }

    /// Append an already-built element. If its ID is already present the
    /// element is given a fresh one, so IDs stay unique.
    pub fn push(&mut self, mut element: Element) -> ElementId {
        if self.index.contains_key(&element.id) {
            let fresh = ElementId::with_prefix(element.type_name());
            log::debug!("duplicate id {:?} re-allocated as {:?}", element.id, fresh);
            element.id = fresh;
        }
        let id = element.id;
        self.index.insert(id, self.elements.len());
        self.elements.push(element);
        self.events.push(SceneEvent::Added(id));
        id
    }

    /// Apply a partial mutation to the element with `id`.
    ///
    /// Returns `true` if the element exists and the patch fits its kind.
    /// Unknown IDs and mismatched patches are ignored.
    pub fn update(&mut self, id: ElementId, patch: Patch) -> bool {
        let Some(&pos) = self.index.get(&id) else {
            return false;
        };
        let floor = self.image_floor;
        match self.elements[pos].apply(&patch, floor) {
            Some(changed) => {
                if changed {
                    log::trace!("update {id:?}: {patch:?}");
                    self.events.push(SceneEvent::Changed(id));
                }
                true
            }
            None => {
                log::debug!(
                    "patch {patch:?} does not apply to {} {id:?}",
                    self.elements[pos].type_name()
                );
                false
            }
        }
    }

    /// Remove an element. No-op (returns `None`) if it is absent.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let pos = self.index.remove(&id)?;
        let removed = self.elements.remove(pos);
        for (i, element) in self.elements.iter().enumerate().skip(pos) {
            self.index.insert(element.id, i);
        }
        self.events.push(SceneEvent::Removed(id));
        Some(removed)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.index.clear();
        self.events.push(SceneEvent::Cleared);
    }

    /// Swap in the contents of `other`, recording a clear followed by one add
    /// per element so surfaces rebuild their views in stacking order.
    pub fn replace_with(&mut self, other: Scene) {
        self.clear();
        for element in other.elements {
            self.push(element);
        }
    }

    pub fn find(&self, id: ElementId) -> Option<&Element> {
        self.index.get(&id).map(|&pos| &self.elements[pos])
    }

    /// Direct mutable access. Changes made this way are not recorded;
    /// follow up with `mark_changed` so surfaces refresh.
    pub fn find_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.index.get(&id).map(|&pos| &mut self.elements[pos])
    }

    pub fn mark_changed(&mut self, id: ElementId) {
        if self.contains(id) {
            self.events.push(SceneEvent::Changed(id));
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index.contains_key(&id)
    }

    /// Stacking position of an element (0 = bottom).
    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Elements in stacking order (bottom first).
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn image_floor(&self) -> f32 {
        self.image_floor
    }

    pub fn set_image_floor(&mut self, floor: f32) {
        self.image_floor = floor.max(0.0);
    }

    /// Take all pending change events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Scene {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
