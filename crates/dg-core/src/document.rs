//! Layout documents: the JSON form of a scene.
//!
//! A document is a JSON array of records, one per element, in stacking
//! order. Each record carries a `type` tag plus exactly the fields of that
//! kind:
//!
//! ```text
//! { "type": "circle" | "rounded-rect" | "bubble", "x", "y", "text", "color", "fontSize", "fontFamily" }
//! { "type": "line" | "arrow", "x1", "y1", "x2", "y2", "color" }
//! { "type": "image", "x", "y", "width", "height", "src" }
//! ```
//!
//! Element IDs are not persisted; loading allocates fresh ones.

use crate::error::{DocumentError, DocumentResult};
use crate::model::{
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_IMAGE_SIZE, DEFAULT_STROKE_COLOR, Element,
    ElementKind, ImageData, LineData, LineKind, Point, Scene, ShapeData, ShapeKind, Size,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Records ─────────────────────────────────────────────────────────────

/// Persisted fields of a text-bearing shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub font_size: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
}

/// Persisted fields of a line or arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(default)]
    pub color: Option<String>,
}

/// Persisted fields of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    pub src: String,
}

/// One element in its persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Record {
    Circle(ShapeRecord),
    RoundedRect(ShapeRecord),
    Bubble(ShapeRecord),
    Line(LineRecord),
    Arrow(LineRecord),
    Image(ImageRecord),
}

/// Every `type` tag this version understands.
const KNOWN_TYPES: &[&str] = &["circle", "rounded-rect", "bubble", "line", "arrow", "image"];

impl Record {
    /// Capture an element's current state.
    pub fn from_element(element: &Element) -> Self {
        match &element.kind {
            ElementKind::Shape(s) => {
                let fields = ShapeRecord {
                    x: s.position.x,
                    y: s.position.y,
                    text: Some(s.text.clone()),
                    color: Some(s.stroke_color.clone()),
                    font_size: Some(s.font_size.clone()),
                    font_family: Some(s.font_family.clone()),
                };
                match s.kind {
                    ShapeKind::Circle => Record::Circle(fields),
                    ShapeKind::RoundedRect => Record::RoundedRect(fields),
                    ShapeKind::Bubble => Record::Bubble(fields),
                }
            }
            ElementKind::Line(l) => {
                let fields = LineRecord {
                    x1: l.a.x,
                    y1: l.a.y,
                    x2: l.b.x,
                    y2: l.b.y,
                    color: Some(l.stroke_color.clone()),
                };
                match l.kind {
                    LineKind::Line => Record::Line(fields),
                    LineKind::Arrow => Record::Arrow(fields),
                }
            }
            ElementKind::Image(i) => Record::Image(ImageRecord {
                x: i.position.x,
                y: i.position.y,
                width: Some(i.size.width),
                height: Some(i.size.height),
                src: i.src.clone(),
            }),
        }
    }

    /// Build the element kind, filling omitted optional fields with the
    /// same defaults a freshly created element gets.
    pub fn to_kind(&self) -> ElementKind {
        match self {
            Record::Circle(r) => shape_kind(ShapeKind::Circle, r),
            Record::RoundedRect(r) => shape_kind(ShapeKind::RoundedRect, r),
            Record::Bubble(r) => shape_kind(ShapeKind::Bubble, r),
            Record::Line(r) => line_kind(LineKind::Line, r),
            Record::Arrow(r) => line_kind(LineKind::Arrow, r),
            Record::Image(r) => ElementKind::Image(ImageData::new(
                Point::new(r.x, r.y),
                Size::new(
                    r.width.unwrap_or(DEFAULT_IMAGE_SIZE.width),
                    r.height.unwrap_or(DEFAULT_IMAGE_SIZE.height),
                ),
                r.src.clone(),
            )),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Record::Circle(_) => "circle",
            Record::RoundedRect(_) => "rounded-rect",
            Record::Bubble(_) => "bubble",
            Record::Line(_) => "line",
            Record::Arrow(_) => "arrow",
            Record::Image(_) => "image",
        }
    }
}

fn shape_kind(kind: ShapeKind, r: &ShapeRecord) -> ElementKind {
    ElementKind::Shape(ShapeData {
        kind,
        position: Point::new(r.x, r.y),
        text: r.text.clone().unwrap_or_default(),
        stroke_color: or_default(&r.color, DEFAULT_STROKE_COLOR),
        font_size: or_default(&r.font_size, DEFAULT_FONT_SIZE),
        font_family: or_default(&r.font_family, DEFAULT_FONT_FAMILY),
    })
}

fn line_kind(kind: LineKind, r: &LineRecord) -> ElementKind {
    ElementKind::Line(LineData::new(
        kind,
        Point::new(r.x1, r.y1),
        Point::new(r.x2, r.y2),
        or_default(&r.color, DEFAULT_STROKE_COLOR),
    ))
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

// ─── Document ────────────────────────────────────────────────────────────

/// An ordered list of records, first = bottom of the stack.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub records: Vec<Record>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Capture a scene as a document, one record per element in scene order.
pub fn serialize(scene: &Scene) -> Document {
    Document {
        records: scene.iter().map(Record::from_element).collect(),
    }
}

/// Build a fresh scene from a document, in document order.
pub fn deserialize(document: &Document) -> Scene {
    let mut scene = Scene::new();
    for record in &document.records {
        scene.create(record.to_kind());
    }
    scene
}

/// Parse layout text into a document.
///
/// The whole text is validated before anything is returned. Records whose
/// `type` is missing, not a string, or not one this version knows are
/// skipped with a warning. A known record with missing or mistyped fields
/// rejects the entire document.
///
/// # Errors
/// Returns `DocumentError` for invalid JSON, a non-array root, or a malformed
/// known record.
pub fn parse_document(text: &str) -> DocumentResult<Document> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Array(items) = root else {
        return Err(DocumentError::NotAnArray {
            found: json_type_name(&root),
        });
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let tag = item.get("type").and_then(Value::as_str);
        let Some(kind) = tag.filter(|t| KNOWN_TYPES.contains(t)) else {
            log::warn!("skipping record {index}: unknown type {:?}", item.get("type"));
            continue;
        };
        let kind = kind.to_string();
        let record: Record =
            serde_json::from_value(item).map_err(|source| DocumentError::InvalidRecord {
                index,
                kind,
                source,
            })?;
        records.push(record);
    }
    Ok(Document { records })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize a scene to pretty-printed JSON (2-space indent).
///
/// # Errors
/// Only fails if serde_json itself fails to write, which plain records never trigger.
pub fn to_json(scene: &Scene) -> DocumentResult<String> {
    let document = serialize(scene);
    let text = serde_json::to_string_pretty(&document)?;
    log::info!("saved layout with {} elements", document.len());
    Ok(text)
}

/// Parse layout text into a new scene. Nothing is built unless the whole
/// text is valid.
pub fn from_json(text: &str) -> DocumentResult<Scene> {
    let document = parse_document(text)?;
    log::info!("loaded layout with {} elements", document.len());
    Ok(deserialize(&document))
}
