//! Integration tests: end-to-end editing sessions driven through `Editor`.
//!
//! Each test plays pointer and key events the way the host page forwards
//! them, then checks the scene and the saved layout.

use dg_core::document::{Record, parse_document};
use dg_core::model::*;
use dg_editor::{Editor, GestureOutcome, InputEvent, Modifiers};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn records(editor: &Editor) -> Vec<Record> {
    let text = editor.save().expect("save failed");
    parse_document(&text).expect("saved layout must parse").records
}

// ─── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn circle_with_text_survives_save_and_load() {
    init_logging();
    let mut editor = Editor::default();
    let id = editor.add_shape(ShapeKind::Circle, DEFAULT_STROKE_COLOR);
    assert!(editor.edit_text(id, "Hi"));

    let saved = editor.save().unwrap();
    match records(&editor).as_slice() {
        [Record::Circle(r)] => {
            assert_eq!(r.text.as_deref(), Some("Hi"));
            assert_eq!((r.x, r.y), (350.0, 275.0));
            assert_eq!(r.font_size.as_deref(), Some("14px"));
            assert_eq!(r.font_family.as_deref(), Some("sans-serif"));
        }
        other => panic!("expected one circle record, got {other:?}"),
    }

    let mut fresh = Editor::default();
    assert_eq!(fresh.load(&saved).unwrap(), 1);
    let shape = fresh.scene().elements()[0].as_shape().unwrap();
    assert_eq!(shape.kind, ShapeKind::Circle);
    assert_eq!(shape.text, "Hi");
}

#[test]
fn dragging_arrow_endpoint_updates_saved_coordinates() {
    init_logging();
    let mut editor = Editor::default();
    editor.add_line(LineKind::Arrow, DEFAULT_STROKE_COLOR);

    assert!(editor.pointer_down(200.0, 100.0));
    editor.pointer_move(220.0, 120.0);
    editor.pointer_move(250.0, 150.0);
    editor.pointer_up(250.0, 150.0);

    match records(&editor).as_slice() {
        [Record::Arrow(r)] => {
            assert_eq!((r.x1, r.y1, r.x2, r.y2), (100.0, 100.0, 250.0, 150.0));
        }
        other => panic!("expected one arrow record, got {other:?}"),
    }
}

#[test]
fn endpoint_released_past_dead_zone_without_move() {
    let mut editor = Editor::default();
    let id = editor.add_line(LineKind::Arrow, DEFAULT_STROKE_COLOR);

    // Grip offset (2, 1) from endpoint B; no move events in between
    assert!(editor.pointer_down(202.0, 101.0));
    assert_eq!(editor.pointer_up(252.0, 151.0), Some(GestureOutcome::Moved(id)));

    let line = editor.scene().find(id).unwrap().as_line().unwrap();
    assert_eq!(line.a, DEFAULT_LINE_START);
    assert_eq!(line.b, Point::new(250.0, 150.0));
    assert_eq!(editor.selected(), Some(id));
}

#[test]
fn resizing_image_from_corner() {
    let mut editor = Editor::default();
    let id = editor.add_image("data:image/png;base64,AA==", None);

    assert!(editor.pointer_down(200.0, 200.0));
    editor.pointer_move(215.0, 210.0);
    assert_eq!(
        editor.pointer_up(230.0, 220.0),
        Some(GestureOutcome::Resized(id))
    );
    let image = editor.scene().find(id).unwrap().as_image().unwrap();
    assert_eq!(image.size, Size::new(130.0, 120.0));
    assert_eq!(image.position, DEFAULT_IMAGE_POSITION);

    // Past the opposite edge: clamps at the floor, never inverts
    editor.pointer_down(230.0, 220.0);
    editor.pointer_move(20.0, 40.0);
    editor.pointer_up(20.0, 40.0);
    let image = editor.scene().find(id).unwrap().as_image().unwrap();
    assert_eq!(image.size, Size::new(10.0, 10.0));
}

#[test]
fn unknown_record_is_skipped_on_load() {
    init_logging();
    let mut editor = Editor::default();
    let count = editor
        .load(include_str!("fixtures/with_unknown_widget.json"))
        .unwrap();
    assert_eq!(count, 2);

    let names: Vec<_> = editor.scene().iter().map(Element::type_name).collect();
    assert_eq!(names, vec!["bubble", "arrow"]);
    assert_eq!(editor.scene().elements()[0].as_shape().unwrap().text, "before");
}

// ─── Properties ──────────────────────────────────────────────────────────

#[test]
fn dead_zone_keeps_position() {
    let mut editor = Editor::default();
    let id = editor.add_shape(ShapeKind::RoundedRect, DEFAULT_STROKE_COLOR);

    editor.pointer_down(400.0, 300.0);
    assert!(!editor.pointer_move(404.0, 296.0));
    assert!(!editor.pointer_move(395.0, 305.0));
    assert_eq!(editor.pointer_up(403.0, 303.0), Some(GestureOutcome::Click(id)));

    let shape = editor.scene().find(id).unwrap().as_shape().unwrap();
    assert_eq!(shape.position, Point::new(350.0, 275.0));
}

#[test]
fn drag_past_dead_zone_lands_at_pointer_minus_offset() {
    let mut editor = Editor::default();
    let id = editor.add_shape(ShapeKind::RoundedRect, DEFAULT_STROKE_COLOR);

    // Offset (50, 25) from the top-left
    editor.pointer_down(400.0, 300.0);
    assert!(editor.pointer_move(406.0, 300.0));
    assert_eq!(editor.pointer_up(500.0, 420.0), Some(GestureOutcome::Moved(id)));

    let shape = editor.scene().find(id).unwrap().as_shape().unwrap();
    assert_eq!(shape.position, Point::new(450.0, 395.0));
    // A drag also selects its target
    assert_eq!(editor.selected(), Some(id));
}

#[test]
fn whole_line_drag_moves_both_ends() {
    let mut editor = Editor::default();
    let id = editor.add_line(LineKind::Line, DEFAULT_STROKE_COLOR);

    editor.pointer_down(150.0, 101.0);
    editor.pointer_move(170.0, 131.0);
    editor.pointer_up(170.0, 131.0);

    let line = editor.scene().find(id).unwrap().as_line().unwrap();
    assert_eq!(line.a, Point::new(120.0, 130.0));
    assert_eq!(line.b, Point::new(220.0, 130.0));
}

#[test]
fn delete_without_selection_twice_changes_nothing() {
    let mut editor = Editor::default();
    editor.add_shape(ShapeKind::Circle, DEFAULT_STROKE_COLOR);
    editor.add_line(LineKind::Line, DEFAULT_STROKE_COLOR);
    let before = records(&editor);

    assert!(!editor.delete_selected());
    assert!(!editor.delete_selected());
    assert_eq!(records(&editor), before);
}

#[test]
fn backspace_deletes_selection() {
    let mut editor = Editor::default();
    let keep = editor.add_line(LineKind::Line, DEFAULT_STROKE_COLOR);
    let doomed = editor.add_shape(ShapeKind::Bubble, DEFAULT_STROKE_COLOR);

    editor.handle(&InputEvent::PointerDown { x: 420.0, y: 320.0 });
    editor.handle(&InputEvent::PointerUp { x: 420.0, y: 320.0 });
    assert_eq!(editor.selected(), Some(doomed));

    let key = InputEvent::Key {
        key: "Backspace".into(),
        modifiers: Modifiers::default(),
    };
    assert!(editor.handle(&key));
    assert_eq!(editor.selected(), None);
    assert!(editor.scene().find(doomed).is_none());
    assert!(editor.scene().find(keep).is_some());

    // Nothing active any more
    assert!(!editor.handle(&key));
}

#[test]
fn many_additions_get_distinct_ids() {
    let mut editor = Editor::default();
    let mut ids = HashSet::new();
    for i in 0..30 {
        let id = match i % 3 {
            0 => editor.add_shape(ShapeKind::Circle, DEFAULT_STROKE_COLOR),
            1 => editor.add_line(LineKind::Arrow, DEFAULT_STROKE_COLOR),
            _ => editor.add_image("data:,", None),
        };
        ids.insert(id);
    }
    assert_eq!(ids.len(), 30);
    assert_eq!(editor.scene().len(), 30);
}

#[test]
fn style_edits_reach_saved_layout() {
    let mut editor = Editor::default();
    let id = editor.add_shape(ShapeKind::Bubble, "#ff0000");

    // Nothing active: ignored
    assert!(!editor.apply_style("24px", "monospace"));

    editor.pointer_down(420.0, 320.0);
    editor.pointer_up(420.0, 320.0);
    assert_eq!(editor.selected(), Some(id));
    assert!(editor.apply_style("24px", "monospace"));

    let style = editor.active_style().unwrap();
    assert_eq!((style.size.as_str(), style.family.as_str()), ("24px", "monospace"));

    match records(&editor).as_slice() {
        [Record::Bubble(r)] => {
            assert_eq!(r.font_size.as_deref(), Some("24px"));
            assert_eq!(r.font_family.as_deref(), Some("monospace"));
        }
        other => panic!("expected one bubble record, got {other:?}"),
    }
}

#[test]
fn deleting_mid_gesture_ends_silently() {
    let mut editor = Editor::default();
    let id = editor.add_shape(ShapeKind::Circle, DEFAULT_STROKE_COLOR);

    editor.pointer_down(400.0, 325.0);
    editor.pointer_up(400.0, 325.0);
    editor.pointer_down(400.0, 325.0);
    editor.pointer_move(450.0, 325.0);
    assert!(editor.delete_selected());

    assert!(!editor.pointer_move(460.0, 325.0));
    assert_eq!(editor.pointer_up(470.0, 325.0), None);
    assert!(editor.scene().find(id).is_none());
}
