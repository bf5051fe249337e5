//! The editor controller.
//!
//! `Editor` owns the scene, the interaction engine and the selection. Every
//! host event handler calls exactly one method here; all mutation happens
//! synchronously inside it. Rendering surfaces catch up by draining
//! `SceneEvent`s afterwards.

use dg_core::config::EditorConfig;
use dg_core::document;
use dg_core::error::DocumentError;
use dg_core::id::ElementId;
use dg_core::model::{
    DEFAULT_IMAGE_POSITION, DEFAULT_IMAGE_SIZE, DEFAULT_LINE_END, DEFAULT_LINE_START, ElementKind,
    ImageData, LineData, LineKind, Patch, Scene, SceneEvent, ShapeData, ShapeKind, Size,
};
use dg_render::hit::{HitOptions, hit_test};

use crate::gesture::{GestureOutcome, GestureStep, InteractionEngine};
use crate::input::{InputEvent, Modifiers};
use crate::selection::{FontStyle, Propagation, Selection};
use crate::shortcuts::{ShortcutAction, ShortcutMap};

pub struct Editor {
    scene: Scene,
    engine: InteractionEngine,
    selection: Selection,
    config: EditorConfig,
    hit_options: HitOptions,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let mut scene = Scene::new();
        scene.set_image_floor(config.min_image_size);
        Self {
            scene,
            engine: InteractionEngine::new(config.drag_threshold),
            selection: Selection::new(),
            hit_options: HitOptions::from_config(&config),
            config,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The active element, if any.
    pub fn selected(&self) -> Option<ElementId> {
        self.selection.active()
    }

    /// Take all scene changes since the last call.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.scene.drain_events()
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Add a shape left of the viewport centre with empty text.
    pub fn add_shape(&mut self, kind: ShapeKind, stroke_color: &str) -> ElementId {
        let position = self.config.viewport.new_shape_position();
        let id = self
            .scene
            .create(ElementKind::Shape(ShapeData::new(kind, position, stroke_color)));
        log::debug!("added {id:?}");
        id
    }

    /// Add a line or arrow with the default endpoints.
    pub fn add_line(&mut self, kind: LineKind, stroke_color: &str) -> ElementId {
        let id = self.scene.create(ElementKind::Line(LineData::new(
            kind,
            DEFAULT_LINE_START,
            DEFAULT_LINE_END,
            stroke_color,
        )));
        log::debug!("added {id:?}");
        id
    }

    /// Add an image at the default position. `size` is the intrinsic size
    /// when the host knows it.
    pub fn add_image(&mut self, src: &str, size: Option<Size>) -> ElementId {
        let size = size
            .filter(|s| s.width > 0.0 && s.height > 0.0)
            .unwrap_or(DEFAULT_IMAGE_SIZE);
        let id = self.scene.create(ElementKind::Image(ImageData::new(
            DEFAULT_IMAGE_POSITION,
            size,
            src,
        )));
        log::debug!("added {id:?}");
        id
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch one input event. Returns `true` when the scene or the
    /// selection changed and the host should re-render.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(*x, *y),
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y),
            InputEvent::PointerUp { x, y } => self.pointer_up(*x, *y).is_some(),
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers),
        }
    }

    /// Returns `true` if the press landed on an element.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        let hit = hit_test(&self.scene, x, y, &self.hit_options);
        let event = InputEvent::PointerDown { x, y };
        self.engine.handle(&event, hit, &self.scene);
        hit.is_some()
    }

    /// Returns `true` if the scene changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let event = InputEvent::PointerMove { x, y };
        let step = self.engine.handle(&event, None, &self.scene);
        self.apply_step(&step)
    }

    /// Ends the gesture. A release on an element (click or drag) selects
    /// it; a release on empty canvas deselects.
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<GestureOutcome> {
        let event = InputEvent::PointerUp { x, y };
        let step = self.engine.handle(&event, None, &self.scene);
        self.apply_step(&step);

        let outcome = step.outcome?;
        let propagation = match outcome.target() {
            Some(id) => self.selection.click(id),
            None => Propagation::Continue,
        };
        if propagation == Propagation::Continue {
            self.selection.click_background();
        }
        Some(outcome)
    }

    fn apply_step(&mut self, step: &GestureStep) -> bool {
        match &step.patch {
            Some((id, patch)) => self.scene.update(*id, patch.clone()),
            None => false,
        }
    }

    /// Returns `true` if the key triggered an action.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        match ShortcutMap::resolve(key, modifiers) {
            Some(ShortcutAction::Delete) => self.delete_selected(),
            Some(ShortcutAction::Deselect) => {
                let had = self.selection.active().is_some();
                self.selection.click_background();
                had
            }
            None => false,
        }
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Replace a shape's text. Called on every input event of the host's
    /// text field so the model never lags behind what the user sees.
    pub fn edit_text(&mut self, id: ElementId, text: &str) -> bool {
        self.scene.update(id, Patch::SetText(text.to_string()))
    }

    pub fn set_stroke_color(&mut self, id: ElementId, color: &str) -> bool {
        self.scene.update(id, Patch::SetStrokeColor(color.to_string()))
    }

    /// Delete the active element. No-op without one.
    pub fn delete_selected(&mut self) -> bool {
        // A gesture on the removed element ends silently at pointer up
        self.selection.delete(&mut self.scene).is_some()
    }

    /// Set the font of the active shape. No-op unless a shape is active.
    pub fn apply_style(&mut self, size: &str, family: &str) -> bool {
        self.selection.apply_style(&mut self.scene, size, family)
    }

    pub fn active_style(&self) -> Option<FontStyle> {
        self.selection.active_style(&self.scene)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Serialize the scene to pretty-printed JSON.
    pub fn save(&self) -> Result<String, DocumentError> {
        document::to_json(&self.scene)
    }

    pub fn save_file_name(&self) -> &str {
        &self.config.save_file_name
    }

    /// Replace the scene with a parsed layout. On error nothing changes.
    /// Returns the number of elements loaded.
    pub fn load(&mut self, text: &str) -> Result<usize, DocumentError> {
        let loaded = document::from_json(text).inspect_err(|err| {
            log::warn!("rejected layout: {err}");
        })?;
        let count = loaded.len();
        self.engine.reset();
        self.scene.replace_with(loaded);
        self.selection.retain_live(&self.scene);
        Ok(count)
    }
}
