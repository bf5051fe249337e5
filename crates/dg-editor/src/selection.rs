//! Single-element selection.
//!
//! At most one element is active. Clicking an element makes it active and
//! stops the click from reaching the background handler, which would
//! otherwise clear it again.

use dg_core::id::ElementId;
use dg_core::model::{Element, ElementKind, Patch, Scene};

/// Whether a click should continue on to the background handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// A shape's font, as shown in the host's style picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontStyle {
    pub size: String,
    pub family: String,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    active: Option<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    /// Make `id` the active element.
    pub fn click(&mut self, id: ElementId) -> Propagation {
        if self.active != Some(id) {
            log::debug!("select {id:?}");
        }
        self.active = Some(id);
        Propagation::Stop
    }

    /// Background click: nothing is active afterwards.
    pub fn click_background(&mut self) {
        if let Some(id) = self.active.take() {
            log::debug!("deselect {id:?}");
        }
    }

    /// Remove the active element from the scene. No-op without one.
    pub fn delete(&mut self, scene: &mut Scene) -> Option<Element> {
        let id = self.active.take()?;
        let removed = scene.remove(id);
        if removed.is_some() {
            log::debug!("deleted {id:?}");
        }
        removed
    }

    /// Set the active shape's font. No-op (returns `false`) when nothing is
    /// active or the active element is not a shape.
    pub fn apply_style(&self, scene: &mut Scene, size: &str, family: &str) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        if !matches!(scene.find(id).map(|e| &e.kind), Some(ElementKind::Shape(_))) {
            return false;
        }
        scene.update(
            id,
            Patch::SetFont {
                size: size.to_string(),
                family: family.to_string(),
            },
        )
    }

    /// Font of the active shape, if a shape is active.
    pub fn active_style(&self, scene: &Scene) -> Option<FontStyle> {
        let shape = scene.find(self.active?)?.as_shape()?;
        Some(FontStyle {
            size: shape.font_size.clone(),
            family: shape.font_family.clone(),
        })
    }

    /// Drop the selection if the active element no longer exists.
    pub fn retain_live(&mut self, scene: &Scene) {
        if let Some(id) = self.active
            && !scene.contains(id)
        {
            log::debug!("active {id:?} disappeared; deselecting");
            self.active = None;
        }
    }
}
