//! Integration tests: scene → JSON → scene round-trip.
//!
//! Verifies that saving and loading preserves kind, geometry, text, colour,
//! font and stacking order for every element kind.

use dg_core::document::{Record, from_json, parse_document, serialize, to_json};
use dg_core::error::DocumentError;
use dg_core::model::*;
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Element kinds in stacking order; IDs are reallocated on load so they
/// are left out of comparisons.
fn kinds(scene: &Scene) -> Vec<ElementKind> {
    scene.iter().map(|e| e.kind.clone()).collect()
}

fn assert_roundtrip_preserves(scene: &Scene) {
    let text = to_json(scene).expect("save failed");
    let reloaded = from_json(&text).expect("load failed");
    assert_eq!(
        kinds(scene),
        kinds(&reloaded),
        "scene changed after round-trip.\nSaved:\n{text}"
    );
}

// ─── Fixture-based tests ─────────────────────────────────────────────────

#[test]
fn roundtrip_mixed_layout_fixture() {
    init_logging();
    let scene = from_json(include_str!("fixtures/mixed_layout.json")).unwrap();
    assert_eq!(scene.len(), 6);
    let names: Vec<_> = scene.iter().map(Element::type_name).collect();
    assert_eq!(
        names,
        vec!["circle", "arrow", "rounded-rect", "bubble", "line", "image"]
    );
    assert_roundtrip_preserves(&scene);
}

#[test]
fn fixture_fields_are_loaded() {
    let scene = from_json(include_str!("fixtures/mixed_layout.json")).unwrap();

    let circle = scene.elements()[0].as_shape().unwrap();
    assert_eq!(circle.text, "Start");
    assert_eq!(circle.stroke_color, "#1e88e5");
    assert_eq!(circle.font_size, "18px");
    assert_eq!(circle.font_family, "Georgia");

    let image = scene.elements()[5].as_image().unwrap();
    assert_eq!(image.position, Point::new(100.0, 100.0));
    assert_eq!(image.size, Size::new(64.0, 48.0));
}

#[test]
fn unknown_type_is_skipped_preserving_order() {
    init_logging();
    let scene = from_json(include_str!("fixtures/unknown_widget.json")).unwrap();
    assert_eq!(scene.len(), 2);
    assert_eq!(scene.elements()[0].as_shape().unwrap().text, "first");
    assert_eq!(scene.elements()[1].type_name(), "line");
}

#[test]
fn omitted_fields_roundtrip_like_explicit_defaults() {
    let sparse = from_json(include_str!("fixtures/defaults_omitted.json")).unwrap();
    let text = to_json(&sparse).unwrap();
    let explicit = from_json(&text).unwrap();
    assert_eq!(kinds(&sparse), kinds(&explicit));

    let image = sparse.elements()[2].as_image().unwrap();
    assert_eq!(image.size, DEFAULT_IMAGE_SIZE);
    let arrow = sparse.elements()[1].as_line().unwrap();
    assert_eq!(arrow.stroke_color, DEFAULT_STROKE_COLOR);
}

#[test]
fn malformed_record_rejects_load() {
    init_logging();
    let err = from_json(include_str!("fixtures/malformed_record.json")).unwrap_err();
    assert!(
        matches!(err, DocumentError::InvalidRecord { index: 1, ref kind, .. } if kind == "circle"),
        "unexpected error: {err}"
    );
}

// ─── Built scenes ────────────────────────────────────────────────────────

#[test]
fn roundtrip_every_kind() {
    let mut scene = Scene::new();
    for kind in [ShapeKind::Circle, ShapeKind::RoundedRect, ShapeKind::Bubble] {
        let mut shape = ShapeData::new(kind, Point::new(12.5, 40.0), "#336699");
        shape.text = format!("{} label\nsecond line", kind.as_str());
        shape.font_size = "20px".into();
        shape.font_family = "serif".into();
        scene.create(ElementKind::Shape(shape));
    }
    for kind in [LineKind::Line, LineKind::Arrow] {
        scene.create(ElementKind::Line(LineData::new(
            kind,
            Point::new(300.0, 10.0),
            Point::new(-20.0, 75.5),
            "#aa0000",
        )));
    }
    scene.create(ElementKind::Image(ImageData::new(
        Point::new(0.0, 0.0),
        Size::new(10.0, 250.0),
        "data:image/png;base64,AAAA",
    )));

    assert_roundtrip_preserves(&scene);
}

#[test]
fn empty_scene_roundtrips_to_empty_array() {
    let scene = Scene::new();
    let text = to_json(&scene).unwrap();
    assert_eq!(text, "[]");
    assert!(from_json(&text).unwrap().is_empty());
}

#[test]
fn circle_with_text_saves_one_record() {
    let mut scene = Scene::new();
    let id = scene.create(ElementKind::Shape(ShapeData::new(
        ShapeKind::Circle,
        dg_core::Viewport::default().new_shape_position(),
        DEFAULT_STROKE_COLOR,
    )));
    scene.update(id, Patch::SetText("Hi".into()));

    let doc = serialize(&scene);
    assert_eq!(doc.len(), 1);
    match &doc.records[0] {
        Record::Circle(r) => assert_eq!(r.text.as_deref(), Some("Hi")),
        other => panic!("expected a circle record, got {other:?}"),
    }

    let text = to_json(&scene).unwrap();
    let reparsed = parse_document(&text).unwrap();
    assert_eq!(reparsed, doc);
}
