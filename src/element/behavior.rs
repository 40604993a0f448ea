//! Optional per-element behaviors and their typed property accessors.
//!
//! A behavior is a flag plus a set of properties scoped to its owner
//! type. Removing a behavior clears every value stored under that
//! owner, so the element reads defaults again. The slot behavior is
//! managed by the tree itself: attached when an element gains a
//! parent, removed when it is detached.

use bitflags::bitflags;
use glam::{Quat, Vec2, Vec3};

use crate::math::{Anchors, Thickness};
use crate::property::{OwnerType, PropertyValue};

use super::{ElementId, ElementTree, InvalidateReason, Visibility};

/// Horizontal placement of a child inside its arranged slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
    /// Fill the slot width minus margins.
    Stretch,
}

/// Vertical placement of a child inside its arranged slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    #[default]
    Center,
    Bottom,
    /// Fill the slot height minus margins.
    Stretch,
}

/// The behaviors an element can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorKind {
    /// Local-space position/rotation/scale/shear/pivot on top of the
    /// layout rect.
    RenderTransform,
    /// Layout instructions a parent reads for this child.
    Slot,
}

impl BehaviorKind {
    pub fn owner(self) -> OwnerType {
        match self {
            Self::RenderTransform => OwnerType::RenderTransform,
            Self::Slot => OwnerType::Slot,
        }
    }

    fn flag(self) -> BehaviorFlags {
        match self {
            Self::RenderTransform => BehaviorFlags::RENDER_TRANSFORM,
            Self::Slot => BehaviorFlags::SLOT,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct BehaviorFlags: u8 {
        const RENDER_TRANSFORM = 1 << 0;
        const SLOT = 1 << 1;
    }
}

impl ElementTree {
    pub fn has_behavior(&self, id: ElementId, kind: BehaviorKind) -> bool {
        self.node(id)
            .map(|node| node.behaviors.contains(kind.flag()))
            .unwrap_or(false)
    }

    /// Attach a behavior. Attaching twice is a no-op.
    pub fn add_behavior(&mut self, id: ElementId, kind: BehaviorKind) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if node.behaviors.contains(kind.flag()) {
            return;
        }
        node.behaviors.insert(kind.flag());
        if kind == BehaviorKind::RenderTransform {
            node.local_dirty = true;
            self.invalidate(id, InvalidateReason::TRANSFORM);
        }
    }

    /// Detach a behavior and reset its properties to defaults.
    pub fn remove_behavior(&mut self, id: ElementId, kind: BehaviorKind) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if !node.behaviors.contains(kind.flag()) {
            return;
        }
        node.behaviors.remove(kind.flag());
        node.props.clear_owner(kind.owner());
        match kind {
            BehaviorKind::RenderTransform => {
                if let Some(node) = self.node_mut(id) {
                    node.local_dirty = true;
                }
                self.invalidate(id, InvalidateReason::TRANSFORM);
            }
            BehaviorKind::Slot => {
                if let Some(parent) = self.parent(id) {
                    self.invalidate(
                        parent,
                        InvalidateReason::MEASURE | InvalidateReason::ARRANGE,
                    );
                }
            }
        }
    }

    fn ensure_render_transform(&mut self, id: ElementId) {
        if !self.has_behavior(id, BehaviorKind::RenderTransform) {
            self.add_behavior(id, BehaviorKind::RenderTransform);
        }
    }

    // === Display ===

    pub fn opacity(&self, id: ElementId) -> f32 {
        self.property(id, self.builtins.opacity)
            .as_number()
            .unwrap_or(1.0)
    }

    pub fn set_opacity(&mut self, id: ElementId, value: f32) {
        let prop = self.builtins.opacity;
        self.set_property(id, prop, PropertyValue::Number(value));
    }

    pub fn visibility(&self, id: ElementId) -> Visibility {
        self.property(id, self.builtins.visibility)
            .as_visibility()
            .unwrap_or_default()
    }

    pub fn set_visibility(&mut self, id: ElementId, value: Visibility) {
        let previous = self.visibility(id);
        if previous == value {
            return;
        }
        let prop = self.builtins.visibility;
        self.set_property(id, prop, PropertyValue::Visibility(value));
        // Collapsing in or out changes what the parent arranges.
        if previous == Visibility::Collapsed || value == Visibility::Collapsed {
            if let Some(parent) = self.parent(id) {
                self.invalidate(
                    parent,
                    InvalidateReason::MEASURE | InvalidateReason::ARRANGE,
                );
            }
        }
    }

    // === Render transform ===

    pub fn position(&self, id: ElementId) -> Vec3 {
        self.property(id, self.builtins.position)
            .as_vec3()
            .unwrap_or(Vec3::ZERO)
    }

    pub fn set_position(&mut self, id: ElementId, value: Vec3) {
        self.ensure_render_transform(id);
        let prop = self.builtins.position;
        self.set_property(id, prop, PropertyValue::Vec3(value));
    }

    pub fn rotation(&self, id: ElementId) -> Quat {
        self.property(id, self.builtins.rotation)
            .as_quat()
            .unwrap_or(Quat::IDENTITY)
    }

    pub fn set_rotation(&mut self, id: ElementId, value: Quat) {
        self.ensure_render_transform(id);
        let prop = self.builtins.rotation;
        self.set_property(id, prop, PropertyValue::Quat(value));
    }

    pub fn scale(&self, id: ElementId) -> Vec3 {
        self.property(id, self.builtins.scale)
            .as_vec3()
            .unwrap_or(Vec3::ONE)
    }

    pub fn set_scale(&mut self, id: ElementId, value: Vec3) {
        self.ensure_render_transform(id);
        let prop = self.builtins.scale;
        self.set_property(id, prop, PropertyValue::Vec3(value));
    }

    pub fn shear(&self, id: ElementId) -> Vec2 {
        self.property(id, self.builtins.shear)
            .as_vec2()
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_shear(&mut self, id: ElementId, value: Vec2) {
        self.ensure_render_transform(id);
        let prop = self.builtins.shear;
        self.set_property(id, prop, PropertyValue::Vec2(value));
    }

    /// Normalized pivot the render transform rotates and scales around.
    /// (0.5, 0.5) is the rect center.
    pub fn pivot(&self, id: ElementId) -> Vec2 {
        self.property(id, self.builtins.pivot)
            .as_vec2()
            .unwrap_or(Vec2::new(0.5, 0.5))
    }

    pub fn set_pivot(&mut self, id: ElementId, value: Vec2) {
        self.ensure_render_transform(id);
        let prop = self.builtins.pivot;
        self.set_property(id, prop, PropertyValue::Vec2(value));
    }

    // === Slot ===

    pub fn margin(&self, id: ElementId) -> Thickness {
        self.property(id, self.builtins.margin)
            .as_thickness()
            .unwrap_or(Thickness::ZERO)
    }

    pub fn set_margin(&mut self, id: ElementId, value: Thickness) {
        let prop = self.builtins.margin;
        self.set_property(id, prop, PropertyValue::Thickness(value));
    }

    pub fn horizontal_alignment(&self, id: ElementId) -> HorizontalAlignment {
        self.property(id, self.builtins.horizontal_alignment)
            .as_horizontal_alignment()
            .unwrap_or_default()
    }

    pub fn set_horizontal_alignment(&mut self, id: ElementId, value: HorizontalAlignment) {
        let prop = self.builtins.horizontal_alignment;
        self.set_property(id, prop, PropertyValue::HorizontalAlignment(value));
    }

    pub fn vertical_alignment(&self, id: ElementId) -> VerticalAlignment {
        self.property(id, self.builtins.vertical_alignment)
            .as_vertical_alignment()
            .unwrap_or_default()
    }

    pub fn set_vertical_alignment(&mut self, id: ElementId, value: VerticalAlignment) {
        let prop = self.builtins.vertical_alignment;
        self.set_property(id, prop, PropertyValue::VerticalAlignment(value));
    }

    /// Anchor fractions a canvas parent resolves this child's edges
    /// against. Ignored by the alignment-based containers.
    pub fn anchors(&self, id: ElementId) -> Anchors {
        self.property(id, self.builtins.anchors)
            .as_anchors()
            .unwrap_or_default()
    }

    pub fn set_anchors(&mut self, id: ElementId, value: Anchors) {
        let prop = self.builtins.anchors;
        self.set_property(id, prop, PropertyValue::Anchors(value));
    }

    /// Per-edge insets applied after the anchors, pushing each edge
    /// inward (or outward when negative).
    pub fn offsets(&self, id: ElementId) -> Thickness {
        self.property(id, self.builtins.offsets)
            .as_thickness()
            .unwrap_or(Thickness::ZERO)
    }

    pub fn set_offsets(&mut self, id: ElementId, value: Thickness) {
        let prop = self.builtins.offsets;
        self.set_property(id, prop, PropertyValue::Thickness(value));
    }
}
