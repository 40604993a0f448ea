//! The visual proxy tree mirrored from mounted elements.
//!
//! Proxies live in a slot arena and link to each other through
//! parent/first-child/next-sibling indices, so reordering a parent's
//! children is one relink instead of a vector splice. The render
//! subsystem owns the arena and keeps it in sync from hierarchy
//! invalidations.

use bitflags::bitflags;
use glam::Mat4;

use crate::element::ElementId;

use super::commands::DrawCommand;

/// Index of a proxy slot in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProxyId(u32);

impl ProxyId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// What the batcher must refresh before uploading a proxy.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct VisualDirty: u8 {
        /// World vertices need re-projecting.
        const TRANSFORM = 1 << 0;
        /// Vertex alpha needs rewriting.
        const OPACITY = 1 << 1;
    }
}

/// Render-side mirror of one element.
pub struct VisualProxy {
    pub element: ElementId,
    pub parent: Option<ProxyId>,
    pub first_child: Option<ProxyId>,
    pub next_sibling: Option<ProxyId>,
    pub world_matrix: Mat4,
    pub opacity: f32,
    pub visible: bool,
    pub dirty: VisualDirty,
    pub commands: Vec<DrawCommand>,
}

impl VisualProxy {
    fn new(element: ElementId) -> Self {
        Self {
            element,
            parent: None,
            first_child: None,
            next_sibling: None,
            world_matrix: Mat4::IDENTITY,
            opacity: 1.0,
            visible: true,
            dirty: VisualDirty::all(),
            commands: Vec::new(),
        }
    }
}

/// Slot arena for visual proxies with a free list for reuse.
#[derive(Default)]
pub struct ProxyArena {
    slots: Vec<Option<VisualProxy>>,
    free: Vec<u32>,
}

impl ProxyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, element: ElementId) -> ProxyId {
        let proxy = VisualProxy::new(element);
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(proxy);
            ProxyId(index)
        } else {
            self.slots.push(Some(proxy));
            ProxyId(self.slots.len() as u32 - 1)
        }
    }

    pub fn get(&self, id: ProxyId) -> Option<&VisualProxy> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: ProxyId) -> Option<&mut VisualProxy> {
        self.slots
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
    }

    /// Rebuild a parent's sibling chain to exactly `children`, in
    /// order.
    pub fn link_children(&mut self, parent: ProxyId, children: &[ProxyId]) {
        let mut next = None;
        for &child in children.iter().rev() {
            if let Some(proxy) = self.get_mut(child) {
                proxy.parent = Some(parent);
                proxy.next_sibling = next;
            }
            next = Some(child);
        }
        if let Some(proxy) = self.get_mut(parent) {
            proxy.first_child = next;
        }
    }

    /// Children of a proxy, walked through the sibling chain.
    pub fn children(&self, parent: ProxyId) -> Vec<ProxyId> {
        let mut result = Vec::new();
        let mut cursor = self.get(parent).and_then(|proxy| proxy.first_child);
        while let Some(id) = cursor {
            result.push(id);
            cursor = self.get(id).and_then(|proxy| proxy.next_sibling);
        }
        result
    }

    /// Free a single proxy slot. The parent's chain is not touched;
    /// callers relink the parent separately.
    pub fn free(&mut self, id: ProxyId) {
        if self.slots[id.index()].take().is_some() {
            self.free.push(id.0);
        }
    }

    /// Free a proxy and everything below it. The parent's chain is
    /// not touched; callers relink the parent separately.
    pub fn free_subtree(&mut self, id: ProxyId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend(self.children(current));
            if self.slots[current.index()].take().is_some() {
                self.free.push(current.0);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
