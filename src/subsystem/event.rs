//! The event stage: route pointer input to elements.
//!
//! Inputs are queued on the document between frames and resolved here
//! against the current tree: the window's children are hit-tested in
//! tree order and the first hit wins. A click is synthesized when a
//! release lands on the element that took the matching press.

use log::trace;

use crate::element::{ElementId, ElementTree, InvalidateReason};
use crate::error::UiError;
use crate::math::Ray;

use super::{FrameContext, SubsystemStage, UiSubsystem};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Press,
    Release,
}

/// Raw pointer input queued by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub button: PointerButton,
    pub action: PointerAction,
    pub ray: Ray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Up,
    Click,
}

/// A routed pointer event, ready for the host to consume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub target: ElementId,
    pub kind: PointerEventKind,
    pub button: PointerButton,
}

pub struct EventSubsystem {
    /// Element that took the last press, for click synthesis.
    pressed: Option<ElementId>,
}

impl EventSubsystem {
    pub fn new() -> Self {
        Self { pressed: None }
    }

    /// First of the window's children, in tree order, that the ray
    /// hits. The window itself is not a target, and there is no
    /// z-sorting beyond traversal order.
    fn route(tree: &mut ElementTree, ray: Ray) -> Option<ElementId> {
        let window = tree.window()?;
        tree.children(window)
            .into_iter()
            .find(|&child| tree.hit_test(child, ray))
    }
}

impl Default for EventSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSubsystem for EventSubsystem {
    fn stage(&self) -> SubsystemStage {
        SubsystemStage::Event
    }

    fn invalidate(&mut self, _element: ElementId, _reasons: InvalidateReason) {}

    fn update(&mut self, tree: &mut ElementTree, frame: &mut FrameContext) -> Result<(), UiError> {
        for input in frame.pointer_inputs {
            let target = Self::route(tree, input.ray);
            match input.action {
                PointerAction::Press => {
                    self.pressed = target;
                    if let Some(target) = target {
                        trace!("pointer down on {:?}", target.as_u64());
                        frame.pointer_events.push(PointerEvent {
                            target,
                            kind: PointerEventKind::Down,
                            button: input.button,
                        });
                    }
                }
                PointerAction::Release => {
                    if let Some(target) = target {
                        frame.pointer_events.push(PointerEvent {
                            target,
                            kind: PointerEventKind::Up,
                            button: input.button,
                        });
                        if self.pressed == Some(target) {
                            trace!("click on {:?}", target.as_u64());
                            frame.pointer_events.push(PointerEvent {
                                target,
                                kind: PointerEventKind::Click,
                                button: input.button,
                            });
                        }
                    }
                    self.pressed = None;
                }
            }
        }
        Ok(())
    }
}
