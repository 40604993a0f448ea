//! Update subsystems and their registry.
//!
//! A document owns one subsystem instance per registered factory and
//! runs them once per frame in stage order. Before each stage the
//! document drains the tree's pending invalidations and fans every
//! entry out to every subsystem, so a subsystem never misses a reason
//! raised by an earlier stage in the same frame.

pub mod event;
pub mod layout;
pub mod transform;

use std::cell::RefCell;

use crate::element::{ElementId, ElementTree, InvalidateReason};
use crate::error::UiError;
use crate::render::device::RenderDevice;

use event::{PointerEvent, PointerInput};

/// Fixed execution order of the built-in stages. Custom subsystems
/// slot in by choosing one of these stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubsystemStage {
    Event,
    Layout,
    Transform,
    Paint,
}

/// Per-frame state handed to each subsystem's update.
pub struct FrameContext<'a> {
    pub device: &'a mut dyn RenderDevice,
    /// Pointer inputs queued since the last frame.
    pub pointer_inputs: &'a [PointerInput],
    /// Events produced by the event stage this frame.
    pub pointer_events: &'a mut Vec<PointerEvent>,
    /// Measure/arrange alternation budget before the frame fails.
    pub max_layout_iterations: u32,
}

/// A pass over the element tree, run once per frame in stage order.
pub trait UiSubsystem {
    fn stage(&self) -> SubsystemStage;

    /// Record that an element was dirtied. Called for every pending
    /// invalidation; implementations keep the reasons they care about.
    fn invalidate(&mut self, element: ElementId, reasons: InvalidateReason);

    fn update(&mut self, tree: &mut ElementTree, frame: &mut FrameContext) -> Result<(), UiError>;
}

type SubsystemFactory = fn() -> Box<dyn UiSubsystem>;

thread_local! {
    static FACTORIES: RefCell<Vec<SubsystemFactory>> = const { RefCell::new(Vec::new()) };
    static BUILTINS_REGISTERED: RefCell<bool> = const { RefCell::new(false) };
}

/// Register a subsystem factory. Every document created afterwards
/// instantiates it.
pub fn register_subsystem(factory: SubsystemFactory) {
    FACTORIES.with(|factories| factories.borrow_mut().push(factory));
}

/// Register the built-in stages exactly once.
pub(crate) fn ensure_builtins() {
    BUILTINS_REGISTERED.with(|flag| {
        let mut flag = flag.borrow_mut();
        if *flag {
            return;
        }
        *flag = true;
        register_subsystem(|| Box::new(event::EventSubsystem::new()));
        register_subsystem(|| Box::new(layout::LayoutSubsystem::new()));
        register_subsystem(|| Box::new(transform::TransformSubsystem::new()));
        register_subsystem(|| Box::new(crate::render::RenderSubsystem::new()));
    });
}

/// Instantiate every registered subsystem, sorted by stage.
pub(crate) fn instantiate_all() -> Vec<Box<dyn UiSubsystem>> {
    let mut subsystems: Vec<Box<dyn UiSubsystem>> =
        FACTORIES.with(|factories| factories.borrow().iter().map(|factory| factory()).collect());
    subsystems.sort_by_key(|subsystem| subsystem.stage());
    subsystems
}
