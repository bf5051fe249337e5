//! The rendering-surface seam.
//!
//! A surface keeps one derived view per element, keyed by `ElementId`.
//! Views are disposable: the scene is the source of truth and `sync`
//! replays its change log onto any surface.

use dg_core::id::ElementId;
use dg_core::model::{Element, Scene, SceneEvent};

pub trait RenderSurface {
    /// Create the view for a newly added element, on top of all others.
    fn mount(&mut self, element: &Element);

    /// Rebuild the view of an element whose state changed.
    fn refresh(&mut self, element: &Element);

    /// Drop the view of a removed element. Unknown IDs are ignored.
    fn unmount(&mut self, id: ElementId);

    /// Drop every view.
    fn clear(&mut self);

    /// Highlight the active element (or none).
    fn set_active(&mut self, id: Option<ElementId>);
}

/// Apply drained scene events to a surface, oldest first.
///
/// Events for elements that no longer exist by the time of the sync (added
/// and removed within one batch) are skipped.
pub fn sync<S: RenderSurface + ?Sized>(surface: &mut S, scene: &Scene, events: &[SceneEvent]) {
    for event in events {
        match *event {
            SceneEvent::Added(id) => {
                if let Some(element) = scene.find(id) {
                    surface.mount(element);
                }
            }
            SceneEvent::Changed(id) => {
                if let Some(element) = scene.find(id) {
                    surface.refresh(element);
                }
            }
            SceneEvent::Removed(id) => surface.unmount(id),
            SceneEvent::Cleared => surface.clear(),
        }
    }
}

/// Throw away every view and mount the whole scene afresh.
pub fn rebuild<S: RenderSurface + ?Sized>(surface: &mut S, scene: &Scene) {
    surface.clear();
    for element in scene {
        surface.mount(element);
    }
}
