//! Drag/resize interaction engine.
//!
//! One explicit state machine replaces per-element listeners and captured
//! closure state.
//!
//! ## State Transitions
//!
//! ```text
//! Idle     -> Armed      (pointer down on an element body or line endpoint)
//! Idle     -> Resizing   (pointer down on an image's corner handle)
//! Armed    -> Dragging   (displacement exceeds the dead-zone on either axis)
//! Armed    -> Idle       (pointer up inside the dead-zone: a click)
//! Armed    -> Idle       (pointer up past the dead-zone: commit as a move)
//! Dragging -> Idle       (pointer up: commit)
//! Resizing -> Idle       (pointer up: commit)
//! ```
//!
//! The engine never writes to the scene itself. Each step yields at most one
//! `Patch` for the controller to apply, always carrying absolute values, so
//! moves arriving in order always leave the element at the latest pointer.

use dg_core::id::ElementId;
use dg_core::model::{Element, ElementKind, Endpoint, Patch, Point, Scene, Size};
use dg_render::hit::{Hit, HitPart};

use crate::input::InputEvent;

/// How the pointer holds the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grip {
    /// Shape or image body; `offset` is pointer − top-left at press time.
    Body { offset: Point },
    /// One line endpoint; `offset` is pointer − endpoint at press time.
    Endpoint { end: Endpoint, offset: Point },
    /// A line's stroke; both endpoints follow the pointer displacement.
    WholeLine { start_a: Point, start_b: Point },
    /// An image's bottom-right handle.
    Corner { start_size: Size },
}

/// One pointer-down … pointer-up interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub target: ElementId,
    pub grip: Grip,
    /// Pointer position at press time.
    pub start: Point,
}

impl Gesture {
    /// The patch that puts the target where the pointer at `at` says.
    fn patch_at(&self, at: Point) -> Patch {
        match self.grip {
            Grip::Body { offset } => Patch::MoveTo(at - offset),
            Grip::Endpoint { end, offset } => Patch::SetEndpoint {
                end,
                to: at - offset,
            },
            Grip::WholeLine { start_a, start_b } => {
                let delta = at - self.start;
                Patch::SetEndpoints {
                    a: start_a + delta,
                    b: start_b + delta,
                }
            }
            Grip::Corner { start_size } => {
                let delta = at - self.start;
                Patch::Resize(Size::new(
                    start_size.width + delta.x,
                    start_size.height + delta.y,
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pressed on an element; no movement past the dead-zone yet.
    Armed(Gesture),
    /// Moving the target with the pointer.
    Dragging(Gesture),
    /// Resizing an image from its corner.
    Resizing(Gesture),
}

/// What a completed gesture amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Pressed and released without leaving the dead-zone.
    Click(ElementId),
    /// The target was dragged.
    Moved(ElementId),
    /// The target was resized.
    Resized(ElementId),
    /// Pressed on empty canvas.
    Background,
}

impl GestureOutcome {
    pub fn target(&self) -> Option<ElementId> {
        match *self {
            Self::Click(id) | Self::Moved(id) | Self::Resized(id) => Some(id),
            Self::Background => None,
        }
    }
}

/// Result of feeding one event to the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureStep {
    /// Mutation to apply to the scene, if any.
    pub patch: Option<(ElementId, Patch)>,
    /// Set when the event ended a gesture.
    pub outcome: Option<GestureOutcome>,
}

pub struct InteractionEngine {
    state: GestureState,
    /// Dead-zone half-width on each axis.
    threshold: f32,
}

impl InteractionEngine {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: GestureState::Idle,
            threshold,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Drop any gesture in progress without committing anything further.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Feed one pointer event. `hit` is the hit-test result at the event
    /// position (only consulted on pointer down).
    pub fn handle(&mut self, event: &InputEvent, hit: Option<Hit>, scene: &Scene) -> GestureStep {
        match *event {
            InputEvent::PointerDown { x, y } => {
                self.press(Point::new(x, y), hit, scene);
                GestureStep::default()
            }
            InputEvent::PointerMove { x, y } => GestureStep {
                patch: self.drag(Point::new(x, y), scene),
                outcome: None,
            },
            InputEvent::PointerUp { x, y } => self.release(Point::new(x, y), scene),
            InputEvent::Key { .. } => GestureStep::default(),
        }
    }

    fn press(&mut self, at: Point, hit: Option<Hit>, scene: &Scene) {
        if self.is_active() {
            log::debug!("pointer down during {:?}; restarting", self.state);
        }
        let Some(hit) = hit else {
            self.state = GestureState::Idle;
            return;
        };
        let Some(element) = scene.find(hit.id) else {
            self.state = GestureState::Idle;
            return;
        };
        self.state = match grip_for(element, hit.part, at) {
            Some(grip @ Grip::Corner { .. }) => GestureState::Resizing(Gesture {
                target: hit.id,
                grip,
                start: at,
            }),
            Some(grip) => GestureState::Armed(Gesture {
                target: hit.id,
                grip,
                start: at,
            }),
            None => GestureState::Idle,
        };
        log::debug!("gesture start: {:?}", self.state);
    }

    fn drag(&mut self, at: Point, scene: &Scene) -> Option<(ElementId, Patch)> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Armed(g) => {
                if !scene.contains(g.target) {
                    return None;
                }
                if self.beyond_threshold(at - g.start) {
                    log::debug!("gesture on {:?} left dead-zone", g.target);
                    self.state = GestureState::Dragging(g);
                    Some((g.target, g.patch_at(at)))
                } else {
                    None
                }
            }
            GestureState::Dragging(g) | GestureState::Resizing(g) => {
                if !scene.contains(g.target) {
                    return None;
                }
                log::trace!("gesture move {:?} to ({}, {})", g.target, at.x, at.y);
                Some((g.target, g.patch_at(at)))
            }
        }
    }

    fn beyond_threshold(&self, d: Point) -> bool {
        d.x.abs() > self.threshold || d.y.abs() > self.threshold
    }

    fn release(&mut self, at: Point, scene: &Scene) -> GestureStep {
        let state = std::mem::take(&mut self.state);
        let step = match state {
            GestureState::Idle => GestureStep {
                patch: None,
                outcome: Some(GestureOutcome::Background),
            },
            GestureState::Armed(g) | GestureState::Dragging(g) | GestureState::Resizing(g)
                if !scene.contains(g.target) =>
            {
                log::debug!("gesture target {:?} vanished; ending silently", g.target);
                GestureStep::default()
            }
            // Released past the dead-zone without an intervening move
            GestureState::Armed(g) if self.beyond_threshold(at - g.start) => GestureStep {
                patch: Some((g.target, g.patch_at(at))),
                outcome: Some(GestureOutcome::Moved(g.target)),
            },
            GestureState::Armed(g) => GestureStep {
                patch: None,
                outcome: Some(GestureOutcome::Click(g.target)),
            },
            GestureState::Dragging(g) => GestureStep {
                patch: Some((g.target, g.patch_at(at))),
                outcome: Some(GestureOutcome::Moved(g.target)),
            },
            GestureState::Resizing(g) => GestureStep {
                patch: Some((g.target, g.patch_at(at))),
                outcome: Some(GestureOutcome::Resized(g.target)),
            },
        };
        log::debug!("gesture end: {:?}", step.outcome);
        step
    }
}

/// Decide how a press on `part` of `element` grips it.
fn grip_for(element: &Element, part: HitPart, at: Point) -> Option<Grip> {
    match (&element.kind, part) {
        (ElementKind::Shape(s), HitPart::Body) => Some(Grip::Body {
            offset: at - s.position,
        }),
        (ElementKind::Image(i), HitPart::Body) => Some(Grip::Body {
            offset: at - i.position,
        }),
        (ElementKind::Image(i), HitPart::ResizeCorner) => Some(Grip::Corner {
            start_size: i.size,
        }),
        (ElementKind::Line(l), HitPart::Endpoint(end)) => Some(Grip::Endpoint {
            end,
            offset: at - l.endpoint(end),
        }),
        (ElementKind::Line(l), HitPart::Body) => Some(Grip::WholeLine {
            start_a: l.a,
            start_b: l.b,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_core::model::*;
    use pretty_assertions::assert_eq;

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown { x, y }
    }
    fn mv(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMove { x, y }
    }
    fn up(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerUp { x, y }
    }

    fn body(id: ElementId) -> Option<Hit> {
        Some(Hit {
            id,
            part: HitPart::Body,
        })
    }

    fn scene_with_circle() -> (Scene, ElementId) {
        let mut scene = Scene::new();
        let id = scene.create(ElementKind::Shape(ShapeData::new(
            ShapeKind::Circle,
            Point::new(100.0, 100.0),
            DEFAULT_STROKE_COLOR,
        )));
        (scene, id)
    }

    #[test]
    fn press_arms_without_mutation() {
        let (scene, id) = scene_with_circle();
        let mut engine = InteractionEngine::new(5.0);
        let step = engine.handle(&down(120.0, 130.0), body(id), &scene);
        assert_eq!(step, GestureStep::default());
        assert!(matches!(engine.state(), GestureState::Armed(g) if g.target == id));
    }

    #[test]
    fn moves_inside_dead_zone_do_nothing() {
        let (scene, id) = scene_with_circle();
        let mut engine = InteractionEngine::new(5.0);
        engine.handle(&down(120.0, 130.0), body(id), &scene);
        assert_eq!(engine.handle(&mv(125.0, 125.0), None, &scene).patch, None);
        assert_eq!(engine.handle(&mv(115.0, 135.0), None, &scene).patch, None);

        let step = engine.handle(&up(124.0, 134.0), None, &scene);
        assert_eq!(step.patch, None);
        assert_eq!(step.outcome, Some(GestureOutcome::Click(id)));
        assert_eq!(engine.state(), &GestureState::Idle);
    }

    #[test]
    fn crossing_dead_zone_moves_by_offset() {
        let (scene, id) = scene_with_circle();
        let mut engine = InteractionEngine::new(5.0);
        engine.handle(&down(120.0, 130.0), body(id), &scene);

        let step = engine.handle(&mv(126.0, 130.0), None, &scene);
        assert_eq!(step.patch, Some((id, Patch::MoveTo(Point::new(106.0, 100.0)))));

        let step = engine.handle(&up(200.0, 50.0), None, &scene);
        assert_eq!(step.patch, Some((id, Patch::MoveTo(Point::new(180.0, 20.0)))));
        assert_eq!(step.outcome, Some(GestureOutcome::Moved(id)));
    }

    #[test]
    fn endpoint_grip_moves_one_end() {
        let mut scene = Scene::new();
        let id = scene.create(ElementKind::Line(LineData::new(
            LineKind::Arrow,
            DEFAULT_LINE_START,
            DEFAULT_LINE_END,
            DEFAULT_STROKE_COLOR,
        )));
        let mut engine = InteractionEngine::new(5.0);
        let hit = Some(Hit {
            id,
            part: HitPart::Endpoint(Endpoint::B),
        });
        engine.handle(&down(202.0, 101.0), hit, &scene);
        let step = engine.handle(&up(252.0, 151.0), None, &scene);
        assert_eq!(
            step.patch,
            Some((
                id,
                Patch::SetEndpoint {
                    end: Endpoint::B,
                    to: Point::new(250.0, 150.0)
                }
            ))
        );
        assert_eq!(step.outcome, Some(GestureOutcome::Moved(id)));
    }

    #[test]
    fn whole_line_translates_both_ends() {
        let mut scene = Scene::new();
        let id = scene.create(ElementKind::Line(LineData::new(
            LineKind::Line,
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            DEFAULT_STROKE_COLOR,
        )));
        let mut engine = InteractionEngine::new(5.0);
        engine.handle(&down(50.0, 1.0), body(id), &scene);
        engine.handle(&mv(60.0, 11.0), None, &scene);
        let step = engine.handle(&up(70.0, 21.0), None, &scene);
        assert_eq!(
            step.patch,
            Some((
                id,
                Patch::SetEndpoints {
                    a: Point::new(20.0, 20.0),
                    b: Point::new(120.0, 20.0)
                }
            ))
        );
    }

    #[test]
    fn corner_goes_straight_to_resizing() {
        let mut scene = Scene::new();
        let id = scene.create(ElementKind::Image(ImageData::new(
            DEFAULT_IMAGE_POSITION,
            DEFAULT_IMAGE_SIZE,
            "data:,",
        )));
        let mut engine = InteractionEngine::new(5.0);
        let hit = Some(Hit {
            id,
            part: HitPart::ResizeCorner,
        });
        engine.handle(&down(200.0, 200.0), hit, &scene);
        assert!(matches!(engine.state(), GestureState::Resizing(_)));

        // No dead-zone for resizing
        let step = engine.handle(&mv(202.0, 201.0), None, &scene);
        assert_eq!(step.patch, Some((id, Patch::Resize(Size::new(102.0, 101.0)))));

        let step = engine.handle(&up(230.0, 220.0), None, &scene);
        assert_eq!(step.patch, Some((id, Patch::Resize(Size::new(130.0, 120.0)))));
        assert_eq!(step.outcome, Some(GestureOutcome::Resized(id)));
    }

    #[test]
    fn background_press_reports_background() {
        let (scene, _) = scene_with_circle();
        let mut engine = InteractionEngine::new(5.0);
        engine.handle(&down(700.0, 500.0), None, &scene);
        let step = engine.handle(&up(700.0, 500.0), None, &scene);
        assert_eq!(step.outcome, Some(GestureOutcome::Background));
    }

    #[test]
    fn removed_target_ends_silently() {
        let (mut scene, id) = scene_with_circle();
        let mut engine = InteractionEngine::new(5.0);
        engine.handle(&down(120.0, 130.0), body(id), &scene);
        engine.handle(&mv(150.0, 150.0), None, &scene);
        scene.remove(id);

        assert_eq!(engine.handle(&mv(160.0, 160.0), None, &scene).patch, None);
        assert_eq!(engine.handle(&up(170.0, 170.0), None, &scene), GestureStep::default());
        assert!(!engine.is_active());
    }

    #[test]
    fn new_press_replaces_active_gesture() {
        let (mut scene, first) = scene_with_circle();
        let second = scene.create(ElementKind::Shape(ShapeData::new(
            ShapeKind::Bubble,
            Point::new(400.0, 400.0),
            DEFAULT_STROKE_COLOR,
        )));
        let mut engine = InteractionEngine::new(5.0);
        engine.handle(&down(120.0, 130.0), body(first), &scene);
        engine.handle(&down(410.0, 410.0), body(second), &scene);
        let step = engine.handle(&up(410.0, 410.0), None, &scene);
        assert_eq!(step.outcome, Some(GestureOutcome::Click(second)));
    }
}
