//! The transform stage: force recomputation of dirty world matrices.
//!
//! World transforms recompute lazily on read, so this stage only has
//! to touch each dirty element once; the recursion inside
//! `world_transform` refreshes any stale ancestors along the way.

use std::collections::HashSet;

use crate::element::{retain_live, ElementId, ElementTree, InvalidateReason};
use crate::error::UiError;

use super::{FrameContext, SubsystemStage, UiSubsystem};

pub struct TransformSubsystem {
    dirty: HashSet<ElementId>,
}

impl TransformSubsystem {
    pub fn new() -> Self {
        Self {
            dirty: HashSet::new(),
        }
    }
}

impl Default for TransformSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSubsystem for TransformSubsystem {
    fn stage(&self) -> SubsystemStage {
        SubsystemStage::Transform
    }

    fn invalidate(&mut self, element: ElementId, reasons: InvalidateReason) {
        if reasons.contains(InvalidateReason::TRANSFORM) {
            self.dirty.insert(element);
        }
    }

    fn update(&mut self, tree: &mut ElementTree, _frame: &mut FrameContext) -> Result<(), UiError> {
        retain_live(&mut self.dirty, tree);
        for id in self.dirty.drain().collect::<Vec<_>>() {
            tree.world_transform(id);
        }
        Ok(())
    }
}
