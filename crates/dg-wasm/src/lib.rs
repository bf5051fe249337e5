//! WASM bridge for the diagram editor, exposing the Rust editor to the host page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM chrome
//! (menus, pickers, file input, download link) and forwards pointer and key
//! events here; this crate owns the model and draws either onto a 2D canvas
//! or as SVG markup.

mod render2d;

use dg_core::config::EditorConfig;
use dg_core::id::ElementId;
use dg_core::model::{LineKind, ShapeKind, Size};
use dg_editor::{Editor, Modifiers};
use dg_render::{CanvasSurface, RenderSurface, SvgSurface, sync};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
///
/// Holds the editor plus both rendering surfaces. All interaction from the
/// page goes through this struct; every mutating call leaves both surfaces
/// in sync with the scene.
#[wasm_bindgen]
pub struct DiagramCanvas {
    editor: Editor,
    canvas: CanvasSurface,
    svg: SvgSurface,
    images: render2d::ImageCache,
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl DiagramCanvas {
    /// Create a controller for a canvas of the given size. `config_json` is
    /// an optional (possibly partial) `EditorConfig` object; an invalid one
    /// is logged and replaced by the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Self {
        // Set up panic hook for better error messages in console
        console_error_panic_hook_setup();

        let mut config = match config_json.as_deref() {
            Some(text) => EditorConfig::from_json(text).unwrap_or_else(|err| {
                log::warn!("invalid editor config, using defaults: {err}");
                EditorConfig::default()
            }),
            None => EditorConfig::default(),
        };
        config.viewport.width = width as f32;
        config.viewport.height = height as f32;

        let handle_radius = config.handle_radius;
        Self {
            editor: Editor::new(config),
            canvas: CanvasSurface::new(handle_radius),
            svg: SvgSurface::new(width as f32, height as f32, handle_radius),
            images: render2d::ImageCache::default(),
            width,
            height,
        }
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Add a shape (`"circle"`, `"rounded-rect"` or `"bubble"`).
    /// Returns the new element ID, or `undefined` for an unknown kind.
    pub fn add_shape(&mut self, kind: &str, color: &str) -> Option<String> {
        let kind = ShapeKind::from_name(kind)?;
        let id = self.editor.add_shape(kind, color);
        self.flush();
        Some(id.to_string())
    }

    /// Add a line or arrow (`"line"` or `"arrow"`).
    pub fn add_line(&mut self, kind: &str, color: &str) -> Option<String> {
        let kind = LineKind::from_name(kind)?;
        let id = self.editor.add_line(kind, color);
        self.flush();
        Some(id.to_string())
    }

    /// Add an image from a data URL. Pass the intrinsic size, or zeros when
    /// it is unknown.
    pub fn add_image(&mut self, src: &str, width: f64, height: f64) -> String {
        let size = Size::new(width as f32, height as f32);
        let id = self.editor.add_image(src, Some(size));
        self.flush();
        id.to_string()
    }

    // ─── Pointer API ─────────────────────────────────────────────────────

    /// Handle pointer down event. Returns true if the press hit an element.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.editor.pointer_down(x, y)
    }

    /// Handle pointer move event. Returns true if the scene changed.
    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        let changed = self.editor.pointer_move(x, y);
        if changed {
            self.flush();
        }
        changed
    }

    /// Handle pointer up event. Returns true if a gesture ended (the scene
    /// or the selection may have changed).
    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        let ended = self.editor.pointer_up(x, y).is_some();
        self.flush();
        ended
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Replace a shape's text. The page calls this on every `input` event of
    /// its label editor. Returns false for unknown IDs or non-shapes.
    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        let Some(id) = ElementId::lookup(id) else {
            return false;
        };
        let changed = self.editor.edit_text(id, text);
        self.flush();
        changed
    }

    /// Change the stroke colour of a shape or line.
    pub fn set_color(&mut self, id: &str, color: &str) -> bool {
        let Some(id) = ElementId::lookup(id) else {
            return false;
        };
        let changed = self.editor.set_stroke_color(id, color);
        self.flush();
        changed
    }

    /// Delete the selected element. Returns true if one was deleted.
    pub fn delete_selected(&mut self) -> bool {
        let changed = self.editor.delete_selected();
        self.flush();
        changed
    }

    /// Apply a font to the selected shape. No-op unless a shape is selected.
    pub fn apply_style(&mut self, font_size: &str, font_family: &str) -> bool {
        let changed = self.editor.apply_style(font_size, font_family);
        self.flush();
        changed
    }

    /// `[fontSize, fontFamily]` of the selected shape, or an empty array.
    pub fn selected_style(&self) -> js_sys::Array {
        match self.editor.active_style() {
            Some(style) => js_sys::Array::of2(
                &JsValue::from_str(&style.size),
                &JsValue::from_str(&style.family),
            ),
            None => js_sys::Array::new(),
        }
    }

    pub fn selected_id(&self) -> Option<String> {
        self.editor.selected().map(|id| id.to_string())
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Only forward keys while no label is being
    /// edited. Returns true if a shortcut fired.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        let changed = self.editor.handle_key(key, modifiers);
        self.flush();
        changed
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Serialize the layout to pretty-printed JSON for download.
    pub fn save(&self) -> Option<String> {
        self.editor
            .save()
            .inspect_err(|err| log::warn!("save failed: {err}"))
            .ok()
    }

    pub fn save_file_name(&self) -> String {
        self.editor.save_file_name().to_string()
    }

    /// Replace the layout with the given JSON text. Returns false (leaving
    /// everything untouched) if the text is not a valid layout.
    pub fn load(&mut self, text: &str) -> bool {
        let loaded = self.editor.load(text).is_ok();
        self.flush();
        loaded
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Render the scene to a Canvas2D context.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        let ops = self.canvas.display_list();
        self.images.retain_used(&ops);
        render2d::render_ops(ctx, &ops, self.width, self.height, &mut self.images);
    }

    /// Whether an image is still decoding and another `render` is needed.
    pub fn images_pending(&self) -> bool {
        self.images.pending()
    }

    /// The scene as a standalone `<svg>` document.
    pub fn svg_markup(&self) -> String {
        self.svg.to_markup()
    }

    /// Markup of one element's `<g data-id>` node, for in-place DOM patching.
    pub fn svg_node(&self, id: &str) -> Option<String> {
        let id = ElementId::lookup(id)?;
        self.svg.node_markup(id).map(str::to_string)
    }

    pub fn element_count(&self) -> usize {
        self.editor.scene().len()
    }
}

impl DiagramCanvas {
    /// Replay pending scene changes and the current selection onto both
    /// surfaces.
    fn flush(&mut self) {
        let events = self.editor.drain_events();
        sync(&mut self.canvas, self.editor.scene(), &events);
        sync(&mut self.svg, self.editor.scene(), &events);
        let active = self.editor.selected();
        self.canvas.set_active(active);
        self.svg.set_active(active);
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("diagram WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
