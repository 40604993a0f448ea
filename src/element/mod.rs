//! Arena-based element storage and hierarchy management.
//!
//! Elements live in a sparse-set arena with generational indices:
//! dense storage for cache-friendly passes, a sparse map for O(1)
//! lookup, and swap-remove so despawning never leaves holes. All
//! hierarchy operations validate before mutating, so errors leave the
//! tree untouched.
//!
//! Mutations do not recompute anything on the spot. They raise
//! [`InvalidateReason`] flags that the document fans out to its
//! subsystems on the next update.

pub mod behavior;
mod layout;
mod transform;

use std::collections::HashSet;

use bitflags::bitflags;
use glam::Mat4;

use crate::error::UiError;
use crate::math::{Rect, Size};
use crate::property::{self, BuiltinProperties, OwnerType, PropertyId, PropertyStore, PropertyValue};
use crate::render::commands::{Color, TextureId};

use behavior::BehaviorFlags;

bitflags! {
    /// Reasons an element can be dirtied. Each subsystem subscribes to
    /// the subset it cares about.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InvalidateReason: u8 {
        /// Children were added, removed, or reordered.
        const HIERARCHY = 1 << 0;
        /// The desired size may have changed.
        const MEASURE = 1 << 1;
        /// Children need new layout rects.
        const ARRANGE = 1 << 2;
        /// Opacity or visibility changed.
        const STYLE = 1 << 3;
        /// The world transform of this element (and its subtree) is stale.
        const TRANSFORM = 1 << 4;
        /// The element's draw commands need regenerating.
        const PAINT = 1 << 5;
    }
}

/// Whether an element takes part in rendering and layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Rendered and laid out.
    #[default]
    Visible,
    /// Skipped by rendering and hit testing but still occupies layout space.
    Hidden,
    /// Skipped by rendering and excluded from the parent's arrangement.
    Collapsed,
}

/// The built-in element varieties.
///
/// `Window` and `Content` hold at most one child, `Panel` and `Canvas`
/// any number, `Fixed` and `Image` are leaves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ElementKind {
    /// A leaf that always desires a fixed size.
    Fixed { size: Size },
    /// A single-child container, optionally painting a background quad.
    Content { background: Option<Color> },
    /// A multi-child container, optionally painting a background quad.
    Panel { background: Option<Color> },
    /// A multi-child container placing children by anchors and offsets
    /// instead of alignment. Desires no size of its own.
    Canvas { background: Option<Color> },
    /// A textured leaf whose desired size is its natural texture size.
    Image { natural: Size, texture: TextureId },
    /// The document root. Single child, arranged into the viewport.
    Window,
}

impl ElementKind {
    fn accepts_children(&self) -> bool {
        matches!(
            self,
            Self::Content { .. } | Self::Panel { .. } | Self::Canvas { .. } | Self::Window
        )
    }

    fn single_child(&self) -> bool {
        matches!(self, Self::Content { .. } | Self::Window)
    }
}

/// Unique identifier for an element.
///
/// Generational index: `index` addresses a sparse slot that is reused
/// after despawn, `generation` detects stale ids referring to a reused
/// slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combine generation (high bits) and index (low bits) for use as
    /// an external key.
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Entry in the sparse map, pointing to a dense slot.
struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

pub(crate) struct Node {
    pub(crate) kind: ElementKind,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) props: PropertyStore,
    pub(crate) behaviors: BehaviorFlags,
    /// Cached render-transform matrix, pivot not applied.
    pub(crate) local_matrix: Mat4,
    pub(crate) local_dirty: bool,
    /// Layout rect relative to the parent rect's center.
    pub(crate) layout_rect: Rect,
    /// Rect passed to the last arrange, for early-out on clean repeats.
    pub(crate) previous_arrange: Rect,
    pub(crate) desired_size: Size,
    pub(crate) world_matrix: Mat4,
    pub(crate) measure_dirty: bool,
    pub(crate) arrange_dirty: bool,
    pub(crate) world_dirty: bool,
    /// Distance from the tree root (parentless elements sit at 0).
    pub(crate) level: u32,
    /// Whether this element is reachable from a document window.
    pub(crate) mounted: bool,
    /// Back-pointer for swap-remove fixup.
    sparse_index: u32,
}

/// Central storage for elements and their hierarchy.
pub struct ElementTree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    free_indices: Vec<u32>,
    /// Invalidations waiting to be fanned out to subsystems.
    pending: Vec<(ElementId, InvalidateReason)>,
    pub(crate) builtins: BuiltinProperties,
    window: Option<ElementId>,
    /// Rect the window is arranged into, set by the owning document.
    pub(crate) viewport: Rect,
    /// Composed in front of the window's world transform.
    pub(crate) origin: Mat4,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            pending: Vec::new(),
            builtins: property::builtins(),
            window: None,
            viewport: Rect::ZERO,
            origin: Mat4::IDENTITY,
        }
    }

    /// Create an element of the given kind, detached from any parent.
    pub fn spawn(&mut self, kind: ElementKind) -> ElementId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            let old_gen = self.sparse[idx as usize]
                .as_ref()
                .map(|e| e.generation)
                .unwrap_or(0);
            (idx, old_gen.wrapping_add(1))
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        let id = ElementId::new(sparse_index, generation);

        self.dense.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            props: PropertyStore::default(),
            behaviors: BehaviorFlags::empty(),
            local_matrix: Mat4::IDENTITY,
            local_dirty: false,
            layout_rect: Rect::ZERO,
            previous_arrange: Rect::ZERO,
            desired_size: Size::ZERO,
            world_matrix: Mat4::IDENTITY,
            measure_dirty: true,
            arrange_dirty: true,
            world_dirty: true,
            level: 0,
            mounted: false,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });
        id
    }

    /// Create the window root. At most one per tree.
    pub(crate) fn spawn_window(&mut self) -> ElementId {
        debug_assert!(self.window.is_none());
        let id = self.spawn(ElementKind::Window);
        if let Some(node) = self.node_mut(id) {
            node.mounted = true;
        }
        self.window = Some(id);
        id
    }

    /// Remove an element and its whole subtree from the tree.
    pub fn despawn(&mut self, id: ElementId) {
        if Some(id) == self.window {
            return;
        }
        if !self.contains(id) {
            return;
        }
        // Detaching first raises the hierarchy invalidations.
        let _ = self.set_parent(id, None, None);

        let mut stack = vec![id];
        let mut subtree = Vec::new();
        while let Some(current) = stack.pop() {
            subtree.push(current);
            if let Some(node) = self.node(current) {
                stack.extend(node.children.iter().copied());
            }
        }
        for element in subtree {
            self.free_slot(element);
        }
    }

    /// Swap-remove a single dense slot, fixing up the moved node's
    /// sparse entry.
    fn free_slot(&mut self, id: ElementId) {
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };
        let last = self.dense.len() - 1;
        self.dense.swap_remove(dense_index);
        if dense_index != last {
            let moved_sparse = self.dense[dense_index].sparse_index;
            if let Some(entry) = self.sparse[moved_sparse as usize].as_mut() {
                entry.dense_index = dense_index;
            }
        }
        self.sparse[id.index as usize] = None;
        self.free_indices.push(id.index);
    }

    fn dense_index(&self, id: ElementId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)?
            .as_ref()
            .filter(|entry| entry.generation == id.generation)
            .map(|entry| entry.dense_index)
    }

    /// Whether the id refers to a live element.
    pub fn contains(&self, id: ElementId) -> bool {
        self.dense_index(id).is_some()
    }

    pub(crate) fn node(&self, id: ElementId) -> Option<&Node> {
        self.dense_index(id).map(|idx| &self.dense[idx])
    }

    pub(crate) fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.dense_index(id).map(move |idx| &mut self.dense[idx])
    }

    pub fn element_count(&self) -> usize {
        self.dense.len()
    }

    pub fn window(&self) -> Option<ElementId> {
        self.window
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.node(id).map(|node| node.kind)
    }

    // === Hierarchy ===

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// The element's children, in arrangement order.
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.node(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn child_count(&self, id: ElementId) -> usize {
        self.node(id).map(|node| node.children.len()).unwrap_or(0)
    }

    pub fn child_at(&self, parent: ElementId, index: usize) -> Result<ElementId, UiError> {
        let node = self.node(parent).ok_or(UiError::InvalidInput)?;
        node.children
            .get(index)
            .copied()
            .ok_or(UiError::OutOfRange {
                index,
                len: node.children.len(),
            })
    }

    pub fn child_index(&self, parent: ElementId, child: ElementId) -> Result<usize, UiError> {
        let node = self.node(parent).ok_or(UiError::InvalidInput)?;
        node.children
            .iter()
            .position(|&c| c == child)
            .ok_or(UiError::InvalidInput)
    }

    /// Append a child. Fails if `child` is already a child of `parent`.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), UiError> {
        if self.parent(child) == Some(parent) {
            return Err(UiError::InvalidInput);
        }
        self.set_parent(child, Some(parent), None)
    }

    /// Insert a child before the element currently at `index`. The
    /// valid range is `0..child_count`, exclusive, so inserting into an
    /// empty container is rejected; use [`Self::add_child`] instead.
    pub fn insert_child_at(
        &mut self,
        parent: ElementId,
        child: ElementId,
        index: usize,
    ) -> Result<(), UiError> {
        let len = self.child_count(parent);
        if len == 0 || index > len - 1 {
            return Err(UiError::OutOfRange { index, len });
        }
        if self.parent(child) == Some(parent) {
            return Err(UiError::InvalidInput);
        }
        self.set_parent(child, Some(parent), Some(index))
    }

    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), UiError> {
        if self.parent(child) != Some(parent) {
            return Err(UiError::InvalidInput);
        }
        self.set_parent(child, None, None)
    }

    pub fn remove_child_at(&mut self, parent: ElementId, index: usize) -> Result<(), UiError> {
        let len = self.child_count(parent);
        if len == 0 || index > len - 1 {
            return Err(UiError::OutOfRange { index, len });
        }
        let child = self.children(parent)[index];
        self.set_parent(child, None, None)
    }

    /// Detach all children, last to first.
    pub fn clear_children(&mut self, parent: ElementId) -> Result<(), UiError> {
        for index in (0..self.child_count(parent)).rev() {
            self.remove_child_at(parent, index)?;
        }
        Ok(())
    }

    pub fn remove_from_parent(&mut self, child: ElementId) -> Result<(), UiError> {
        if self.parent(child).is_none() {
            return Ok(());
        }
        self.set_parent(child, None, None)
    }

    fn set_parent(
        &mut self,
        child: ElementId,
        parent: Option<ElementId>,
        index: Option<usize>,
    ) -> Result<(), UiError> {
        if Some(child) == self.window {
            return Err(UiError::InvalidWindowParent);
        }
        if !self.contains(child) {
            return Err(UiError::InvalidInput);
        }
        if let Some(new_parent) = parent {
            let parent_kind = self.kind(new_parent).ok_or(UiError::InvalidInput)?;
            if new_parent == child || !parent_kind.accepts_children() {
                return Err(UiError::InvalidInput);
            }
            if parent_kind.single_child() && self.child_count(new_parent) == 1 {
                return Err(UiError::MultipleChild);
            }
            // Reject cycles: the new parent must not sit below the child.
            let mut ancestor = Some(new_parent);
            while let Some(current) = ancestor {
                if current == child {
                    return Err(UiError::InvalidInput);
                }
                ancestor = self.parent(current);
            }
        }

        if let Some(old_parent) = self.parent(child) {
            if let Some(node) = self.node_mut(old_parent) {
                node.children.retain(|&c| c != child);
            }
            self.remove_behavior(child, behavior::BehaviorKind::Slot);
            self.invalidate(
                old_parent,
                InvalidateReason::HIERARCHY | InvalidateReason::MEASURE | InvalidateReason::ARRANGE,
            );
        }

        if let Some(node) = self.node_mut(child) {
            node.parent = parent;
        }

        if let Some(new_parent) = parent {
            if let Some(node) = self.node_mut(new_parent) {
                match index {
                    Some(index) => node.children.insert(index, child),
                    None => node.children.push(child),
                }
            }
            self.add_behavior(child, behavior::BehaviorKind::Slot);
            self.invalidate(
                new_parent,
                InvalidateReason::HIERARCHY | InvalidateReason::MEASURE | InvalidateReason::ARRANGE,
            );
        }

        let mounted = parent
            .and_then(|p| self.node(p))
            .map(|node| node.mounted)
            .unwrap_or(false);
        self.propagate_mounted(child, mounted);
        self.update_levels(child);
        self.invalidate(child, InvalidateReason::TRANSFORM);
        Ok(())
    }

    /// Flip document membership for a whole subtree. Newly mounted
    /// elements announce themselves so the render side can build
    /// proxies and pick up current state.
    fn propagate_mounted(&mut self, root: ElementId, mounted: bool) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node_mut(id) else {
                continue;
            };
            if node.mounted != mounted {
                node.mounted = mounted;
                if mounted {
                    self.pending.push((
                        id,
                        InvalidateReason::HIERARCHY
                            | InvalidateReason::STYLE
                            | InvalidateReason::TRANSFORM
                            | InvalidateReason::PAINT,
                    ));
                }
            }
            stack.extend(self.children(id));
        }
    }

    fn update_levels(&mut self, root: ElementId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let level = self
                .parent(id)
                .and_then(|p| self.node(p))
                .map(|node| node.level + 1)
                .unwrap_or(0);
            if let Some(node) = self.node_mut(id) {
                node.level = level;
            }
            stack.extend(self.children(id));
        }
    }

    /// Distance from the root of the element's tree. Parentless
    /// elements (including the window) sit at level 0.
    pub fn hierarchy_level(&self, id: ElementId) -> u32 {
        self.node(id).map(|node| node.level).unwrap_or(0)
    }

    pub fn is_mounted(&self, id: ElementId) -> bool {
        self.node(id).map(|node| node.mounted).unwrap_or(false)
    }

    // === Invalidation ===

    /// Raise dirty reasons on an element. Flags take effect on the
    /// element immediately; delivery to subsystems happens when the
    /// owning document drains the queue. `TRANSFORM` propagates down
    /// the whole subtree eagerly.
    pub fn invalidate(&mut self, id: ElementId, reasons: InvalidateReason) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if reasons.contains(InvalidateReason::MEASURE) {
            node.measure_dirty = true;
        }
        if reasons.contains(InvalidateReason::ARRANGE) {
            node.arrange_dirty = true;
        }
        if reasons.contains(InvalidateReason::TRANSFORM) {
            node.world_dirty = true;
        }
        if node.mounted {
            self.pending.push((id, reasons));
        }
        if reasons.contains(InvalidateReason::TRANSFORM) {
            for child in self.children(id) {
                self.invalidate(child, InvalidateReason::TRANSFORM);
            }
        }
    }

    /// Put already-delivered reasons back on the queue for the next
    /// fan-out, without touching element flags.
    pub(crate) fn requeue(&mut self, id: ElementId, reasons: InvalidateReason) {
        self.pending.push((id, reasons));
    }

    pub(crate) fn drain_pending(&mut self) -> Vec<(ElementId, InvalidateReason)> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    // === Kind mutation ===

    /// Change the size a `Fixed` leaf reports as its desired size.
    pub fn set_fixed_size(&mut self, id: ElementId, size: Size) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let changed = match &mut node.kind {
            ElementKind::Fixed { size: current } if *current != size => {
                *current = size;
                true
            }
            _ => false,
        };
        if changed {
            self.invalidate(id, InvalidateReason::MEASURE);
            if let Some(parent) = self.parent(id) {
                self.invalidate(
                    parent,
                    InvalidateReason::MEASURE | InvalidateReason::ARRANGE,
                );
            }
        }
    }

    /// Set or clear the background quad of a container element.
    pub fn set_background(&mut self, id: ElementId, background: Option<Color>) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let changed = match &mut node.kind {
            ElementKind::Content { background: slot }
            | ElementKind::Panel { background: slot }
            | ElementKind::Canvas { background: slot } => {
                if *slot != background {
                    *slot = background;
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        if changed {
            self.invalidate(id, InvalidateReason::PAINT);
        }
    }

    /// Swap the texture of an `Image` leaf, keeping its natural size.
    pub fn set_image_texture(&mut self, id: ElementId, texture: TextureId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let changed = match &mut node.kind {
            ElementKind::Image { texture: slot, .. } if *slot != texture => {
                *slot = texture;
                true
            }
            _ => false,
        };
        if changed {
            self.invalidate(id, InvalidateReason::PAINT);
        }
    }

    // === Properties ===

    /// Read a property value, falling back to the registered default.
    pub fn property(&self, id: ElementId, prop: PropertyId) -> PropertyValue {
        self.node(id)
            .map(|node| node.props.value(prop))
            .unwrap_or_else(|| property::descriptor(prop).default)
    }

    /// Write a property value and raise the descriptor's invalidation
    /// reasons. Slot-owned properties dirty the parent, everything else
    /// dirties the element itself.
    pub fn set_property(&mut self, id: ElementId, prop: PropertyId, value: PropertyValue) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if !node.props.set_value(prop, value) {
            return;
        }
        let desc = property::descriptor(prop);
        if desc.owner == OwnerType::RenderTransform {
            if let Some(node) = self.node_mut(id) {
                node.local_dirty = true;
            }
        }
        if desc.invalidates.is_empty() {
            return;
        }
        match desc.owner {
            OwnerType::Slot => {
                if let Some(parent) = self.parent(id) {
                    self.invalidate(parent, desc.invalidates);
                }
            }
            _ => self.invalidate(id, desc.invalidates),
        }
    }
}

/// Track which elements are still live in a dirty set, dropping stale
/// ids as they surface.
pub(crate) fn retain_live(set: &mut HashSet<ElementId>, tree: &ElementTree) {
    set.retain(|&id| tree.contains(id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(tree: &mut ElementTree, w: f32, h: f32) -> ElementId {
        tree.spawn(ElementKind::Fixed {
            size: Size::new(w, h),
        })
    }

    fn content(tree: &mut ElementTree) -> ElementId {
        tree.spawn(ElementKind::Content { background: None })
    }

    fn panel(tree: &mut ElementTree) -> ElementId {
        tree.spawn(ElementKind::Panel { background: None })
    }

    #[test]
    fn spawned_ids_survive_slot_reuse() {
        let mut tree = ElementTree::new();
        let first = fixed(&mut tree, 10.0, 10.0);
        tree.despawn(first);
        let second = fixed(&mut tree, 10.0, 10.0);
        assert!(!tree.contains(first));
        assert!(tree.contains(second));
        assert_ne!(first, second);
    }

    #[test]
    fn add_child_updates_both_sides() {
        let mut tree = ElementTree::new();
        let parent = panel(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, child).unwrap();
        assert_eq!(tree.parent(child), Some(parent));
        assert_eq!(tree.children(parent), vec![child]);
        assert_eq!(tree.child_index(parent, child).unwrap(), 0);
    }

    #[test]
    fn add_child_twice_is_rejected() {
        let mut tree = ElementTree::new();
        let parent = panel(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, child).unwrap();
        assert_eq!(tree.add_child(parent, child), Err(UiError::InvalidInput));
    }

    #[test]
    fn single_child_containers_reject_a_second_child() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let first = fixed(&mut tree, 10.0, 10.0);
        let second = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, first).unwrap();
        assert_eq!(
            tree.add_child(parent, second),
            Err(UiError::MultipleChild)
        );
    }

    #[test]
    fn leaves_reject_children() {
        let mut tree = ElementTree::new();
        let leaf = fixed(&mut tree, 10.0, 10.0);
        let child = fixed(&mut tree, 5.0, 5.0);
        assert_eq!(tree.add_child(leaf, child), Err(UiError::InvalidInput));
    }

    #[test]
    fn insert_rejects_indices_at_or_past_the_end() {
        let mut tree = ElementTree::new();
        let parent = panel(&mut tree);
        let first = fixed(&mut tree, 10.0, 10.0);
        let second = fixed(&mut tree, 10.0, 10.0);
        // Empty container: even index 0 is out of range.
        assert_eq!(
            tree.insert_child_at(parent, first, 0),
            Err(UiError::OutOfRange { index: 0, len: 0 })
        );
        tree.add_child(parent, first).unwrap();
        assert_eq!(
            tree.insert_child_at(parent, second, 1),
            Err(UiError::OutOfRange { index: 1, len: 1 })
        );
        tree.insert_child_at(parent, second, 0).unwrap();
        assert_eq!(tree.children(parent), vec![second, first]);
    }

    #[test]
    fn remove_child_validates_the_relationship() {
        let mut tree = ElementTree::new();
        let parent = panel(&mut tree);
        let other = panel(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, child).unwrap();
        assert_eq!(tree.remove_child(other, child), Err(UiError::InvalidInput));
        tree.remove_child(parent, child).unwrap();
        assert_eq!(tree.parent(child), None);
        assert_eq!(tree.child_count(parent), 0);
    }

    #[test]
    fn clear_children_detaches_everything() {
        let mut tree = ElementTree::new();
        let parent = panel(&mut tree);
        let a = fixed(&mut tree, 1.0, 1.0);
        let b = fixed(&mut tree, 2.0, 2.0);
        tree.add_child(parent, a).unwrap();
        tree.add_child(parent, b).unwrap();
        tree.clear_children(parent).unwrap();
        assert_eq!(tree.child_count(parent), 0);
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    fn reparenting_moves_between_containers() {
        let mut tree = ElementTree::new();
        let first = panel(&mut tree);
        let second = panel(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(first, child).unwrap();
        tree.add_child(second, child).unwrap();
        assert_eq!(tree.parent(child), Some(second));
        assert_eq!(tree.child_count(first), 0);
    }

    #[test]
    fn reparenting_under_a_descendant_is_rejected() {
        let mut tree = ElementTree::new();
        let outer = panel(&mut tree);
        let inner = panel(&mut tree);
        tree.add_child(outer, inner).unwrap();
        assert_eq!(tree.add_child(inner, outer), Err(UiError::InvalidInput));
    }

    #[test]
    fn hierarchy_levels_follow_reparenting() {
        let mut tree = ElementTree::new();
        let root = panel(&mut tree);
        let mid = panel(&mut tree);
        let leaf = fixed(&mut tree, 1.0, 1.0);
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        assert_eq!(tree.hierarchy_level(root), 0);
        assert_eq!(tree.hierarchy_level(mid), 1);
        assert_eq!(tree.hierarchy_level(leaf), 2);
        tree.remove_child(root, mid).unwrap();
        assert_eq!(tree.hierarchy_level(mid), 0);
        assert_eq!(tree.hierarchy_level(leaf), 1);
    }

    #[test]
    fn despawn_frees_the_whole_subtree() {
        let mut tree = ElementTree::new();
        let root = panel(&mut tree);
        let mid = panel(&mut tree);
        let leaf = fixed(&mut tree, 1.0, 1.0);
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        tree.despawn(mid);
        assert!(!tree.contains(mid));
        assert!(!tree.contains(leaf));
        assert!(tree.contains(root));
        assert_eq!(tree.child_count(root), 0);
    }
}
