//! The layout stage: measure deepest-first, arrange shallowest-first.
//!
//! Measuring parents after children lets desired-size changes bubble
//! up in one sweep; arranging parents before children lets rect
//! changes flow down the same way. Each measure or arrange can raise
//! fresh invalidations, so the stage re-absorbs the tree's pending
//! queue after every step and alternates until both sets drain. The
//! alternation is capped; blowing the cap fails the frame.

use std::collections::HashSet;

use log::{debug, trace};

use crate::element::{retain_live, ElementId, ElementTree, InvalidateReason};
use crate::error::UiError;

use super::{FrameContext, SubsystemStage, UiSubsystem};

pub struct LayoutSubsystem {
    measure_queue: HashSet<ElementId>,
    arrange_queue: HashSet<ElementId>,
}

impl LayoutSubsystem {
    pub fn new() -> Self {
        Self {
            measure_queue: HashSet::new(),
            arrange_queue: HashSet::new(),
        }
    }

    /// Move pending layout invalidations into the queues, re-queueing
    /// every other reason for later stages.
    fn absorb_pending(&mut self, tree: &mut ElementTree) {
        if !tree.has_pending() {
            return;
        }
        for (id, reasons) in tree.drain_pending() {
            self.invalidate(id, reasons);
            let rest = reasons - (InvalidateReason::MEASURE | InvalidateReason::ARRANGE);
            if !rest.is_empty() {
                tree.requeue(id, rest);
            }
        }
    }

    fn pop_deepest(&mut self, tree: &ElementTree) -> Option<ElementId> {
        retain_live(&mut self.measure_queue, tree);
        let id = self
            .measure_queue
            .iter()
            .copied()
            .max_by_key(|&id| tree.hierarchy_level(id))?;
        self.measure_queue.remove(&id);
        Some(id)
    }

    fn pop_shallowest(&mut self, tree: &ElementTree) -> Option<ElementId> {
        retain_live(&mut self.arrange_queue, tree);
        let id = self
            .arrange_queue
            .iter()
            .copied()
            .min_by_key(|&id| tree.hierarchy_level(id))?;
        self.arrange_queue.remove(&id);
        Some(id)
    }
}

impl Default for LayoutSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSubsystem for LayoutSubsystem {
    fn stage(&self) -> SubsystemStage {
        SubsystemStage::Layout
    }

    fn invalidate(&mut self, element: ElementId, reasons: InvalidateReason) {
        if reasons.contains(InvalidateReason::MEASURE) {
            self.measure_queue.insert(element);
        }
        if reasons.contains(InvalidateReason::ARRANGE) {
            self.arrange_queue.insert(element);
        }
    }

    fn update(&mut self, tree: &mut ElementTree, frame: &mut FrameContext) -> Result<(), UiError> {
        let limit = frame.max_layout_iterations;
        let mut iterations = 0u32;
        self.absorb_pending(tree);

        while !self.measure_queue.is_empty() || !self.arrange_queue.is_empty() {
            iterations += 1;
            if iterations > limit {
                return Err(UiError::MaxLayoutIteration { limit });
            }

            while let Some(id) = self.pop_deepest(tree) {
                trace!("measure pass: element {:?}", id.as_u64());
                tree.measure(id);
                self.absorb_pending(tree);
            }
            while let Some(id) = self.pop_shallowest(tree) {
                trace!("arrange pass: element {:?}", id.as_u64());
                let anchor = tree.arrange_anchor(id);
                tree.arrange(id, anchor);
                self.absorb_pending(tree);
            }
        }

        if iterations > 1 {
            debug!("layout converged after {iterations} iterations");
        }
        Ok(())
    }
}
