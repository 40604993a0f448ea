//! The paint stage: proxy maintenance and batch building.
//!
//! The render subsystem mirrors mounted elements into a visual proxy
//! tree, consumes the four render-relevant dirty reasons (hierarchy,
//! transform, style, paint), and then rebuilds the frame's submeshes
//! in one walk over the proxies.

pub mod batch;
pub mod commands;
pub mod context;
pub mod device;
pub mod proxy;

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use log::trace;

use crate::element::{retain_live, ElementId, ElementKind, ElementTree, InvalidateReason, Visibility};
use crate::error::UiError;
use crate::math::Rect;
use crate::subsystem::{FrameContext, SubsystemStage, UiSubsystem};

use batch::BatchBuilder;
use commands::{Color, DrawCommand};
use context::DrawingContext;
use proxy::{ProxyArena, ProxyId, VisualDirty};

pub struct RenderSubsystem {
    proxies: ProxyArena,
    by_element: HashMap<ElementId, ProxyId>,
    hierarchy_dirty: HashSet<ElementId>,
    transform_dirty: HashSet<ElementId>,
    style_dirty: HashSet<ElementId>,
    paint_dirty: HashSet<ElementId>,
    batcher: BatchBuilder,
}

impl RenderSubsystem {
    pub fn new() -> Self {
        Self {
            proxies: ProxyArena::new(),
            by_element: HashMap::new(),
            hierarchy_dirty: HashSet::new(),
            transform_dirty: HashSet::new(),
            style_dirty: HashSet::new(),
            paint_dirty: HashSet::new(),
            batcher: BatchBuilder::new(),
        }
    }

    fn ensure_proxy(&mut self, tree: &mut ElementTree, element: ElementId) -> ProxyId {
        if let Some(&id) = self.by_element.get(&element) {
            return id;
        }
        let id = self.proxies.alloc(element);
        self.by_element.insert(element, id);
        let world = tree.world_transform(element);
        let opacity = tree.opacity(element);
        let visible = tree.visibility(element) == Visibility::Visible;
        if let Some(proxy) = self.proxies.get_mut(id) {
            proxy.world_matrix = world;
            proxy.opacity = opacity;
            proxy.visible = visible;
        }
        id
    }

    /// Drop proxies whose elements left the document.
    fn prune(&mut self, tree: &ElementTree) {
        let stale: Vec<ElementId> = self
            .by_element
            .keys()
            .copied()
            .filter(|&element| !tree.is_mounted(element))
            .collect();
        for element in stale {
            if let Some(id) = self.by_element.remove(&element) {
                self.proxies.free(id);
            }
        }
    }

    /// Regenerate an element's draw commands from its kind.
    fn paint_element(tree: &ElementTree, element: ElementId) -> Vec<DrawCommand> {
        let Some(kind) = tree.kind(element) else {
            return Vec::new();
        };
        let size = tree.layout_rect(element).size();
        let local = Rect::from_center_size(Vec2::ZERO, size);
        let mut ctx = DrawingContext::new();
        match kind {
            ElementKind::Content {
                background: Some(color),
            }
            | ElementKind::Panel {
                background: Some(color),
            }
            | ElementKind::Canvas {
                background: Some(color),
            } => ctx.draw_rect(local, color),
            ElementKind::Image { texture, .. } => ctx.draw_image(local, texture, Color::WHITE),
            _ => {}
        }
        ctx.take_commands()
    }
}

impl Default for RenderSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSubsystem for RenderSubsystem {
    fn stage(&self) -> SubsystemStage {
        SubsystemStage::Paint
    }

    fn invalidate(&mut self, element: ElementId, reasons: InvalidateReason) {
        if reasons.contains(InvalidateReason::HIERARCHY) {
            self.hierarchy_dirty.insert(element);
        }
        if reasons.contains(InvalidateReason::TRANSFORM) {
            self.transform_dirty.insert(element);
        }
        if reasons.contains(InvalidateReason::STYLE) {
            self.style_dirty.insert(element);
        }
        if reasons.contains(InvalidateReason::PAINT) {
            self.paint_dirty.insert(element);
        }
    }

    fn update(&mut self, tree: &mut ElementTree, frame: &mut FrameContext) -> Result<(), UiError> {
        let Some(window) = tree.window() else {
            self.hierarchy_dirty.clear();
            self.transform_dirty.clear();
            self.style_dirty.clear();
            self.paint_dirty.clear();
            return Ok(());
        };
        let root = self.ensure_proxy(tree, window);

        if !self.hierarchy_dirty.is_empty() {
            self.prune(tree);
            retain_live(&mut self.hierarchy_dirty, tree);
            for element in std::mem::take(&mut self.hierarchy_dirty) {
                if !tree.is_mounted(element) {
                    continue;
                }
                let id = self.ensure_proxy(tree, element);
                let mounted: Vec<ElementId> = tree
                    .children(element)
                    .into_iter()
                    .filter(|&child| tree.is_mounted(child))
                    .collect();
                let children: Vec<ProxyId> = mounted
                    .into_iter()
                    .map(|child| self.ensure_proxy(tree, child))
                    .collect();
                self.proxies.link_children(id, &children);
            }
        }

        for element in std::mem::take(&mut self.transform_dirty) {
            if let Some(&id) = self.by_element.get(&element) {
                let world = tree.world_transform(element);
                if let Some(proxy) = self.proxies.get_mut(id) {
                    proxy.world_matrix = world;
                    proxy.dirty |= VisualDirty::TRANSFORM;
                }
            }
        }

        for element in std::mem::take(&mut self.style_dirty) {
            if let Some(&id) = self.by_element.get(&element) {
                let opacity = tree.opacity(element);
                let visible = tree.visibility(element) == Visibility::Visible;
                if let Some(proxy) = self.proxies.get_mut(id) {
                    proxy.opacity = opacity;
                    proxy.visible = visible;
                    proxy.dirty |= VisualDirty::OPACITY;
                }
            }
        }

        for element in std::mem::take(&mut self.paint_dirty) {
            if let Some(&id) = self.by_element.get(&element) {
                let commands = Self::paint_element(tree, element);
                if let Some(proxy) = self.proxies.get_mut(id) {
                    proxy.commands = commands;
                    // Fresh geometry needs projecting and alpha.
                    proxy.dirty |= VisualDirty::TRANSFORM | VisualDirty::OPACITY;
                }
            }
        }

        trace!("batching {} proxies", self.proxies.len());
        self.batcher.build(&mut self.proxies, root, frame.device);
        Ok(())
    }
}
