//! Dense-id attached properties.
//!
//! Properties are registered once per process into a thread-local
//! registry and identified by a dense `PropertyId`. Elements store only
//! the values that differ from the registered default, so reads fall
//! back to the descriptor. Setting a value through the tree raises the
//! descriptor's invalidation reasons automatically.

use std::cell::RefCell;

use glam::{Quat, Vec2, Vec3};

use crate::element::behavior::{HorizontalAlignment, VerticalAlignment};
use crate::element::{InvalidateReason, Visibility};
use crate::math::{Anchors, Thickness};

/// Identifies a registered property. Ids are dense indices into the
/// registry, assigned in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyId(pub(crate) u32);

impl PropertyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The owner scope a property is registered under. Removing a behavior
/// from an element clears every stored value whose property belongs to
/// that behavior's owner type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerType {
    /// Properties that live directly on every element.
    Element,
    /// Properties owned by the render transform behavior.
    RenderTransform,
    /// Properties owned by the layout slot a parent attaches to a child.
    Slot,
}

/// The closed set of value kinds a property can hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    Number(f32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Quat(Quat),
    Thickness(Thickness),
    Anchors(Anchors),
    Visibility(Visibility),
    HorizontalAlignment(HorizontalAlignment),
    VerticalAlignment(VerticalAlignment),
}

impl PropertyValue {
    pub fn as_number(self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec2(self) -> Option<Vec2> {
        match self {
            Self::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_quat(self) -> Option<Quat> {
        match self {
            Self::Quat(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_thickness(self) -> Option<Thickness> {
        match self {
            Self::Thickness(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_anchors(self) -> Option<Anchors> {
        match self {
            Self::Anchors(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_visibility(self) -> Option<Visibility> {
        match self {
            Self::Visibility(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_horizontal_alignment(self) -> Option<HorizontalAlignment> {
        match self {
            Self::HorizontalAlignment(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vertical_alignment(self) -> Option<VerticalAlignment> {
        match self {
            Self::VerticalAlignment(v) => Some(v),
            _ => None,
        }
    }
}

/// Metadata recorded for a registered property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyDescriptor {
    pub id: PropertyId,
    pub name: &'static str,
    pub owner: OwnerType,
    pub default: PropertyValue,
    /// Invalidation reasons raised whenever the value changes.
    pub invalidates: InvalidateReason,
}

thread_local! {
    static REGISTRY: RefCell<Vec<PropertyDescriptor>> = const { RefCell::new(Vec::new()) };
    static BUILTINS: RefCell<Option<BuiltinProperties>> = const { RefCell::new(None) };
}

/// Register a property and receive its dense id.
pub fn register(
    name: &'static str,
    owner: OwnerType,
    default: PropertyValue,
    invalidates: InvalidateReason,
) -> PropertyId {
    REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let id = PropertyId(registry.len() as u32);
        registry.push(PropertyDescriptor {
            id,
            name,
            owner,
            default,
            invalidates,
        });
        id
    })
}

/// Look up the descriptor of a registered property.
pub fn descriptor(id: PropertyId) -> PropertyDescriptor {
    REGISTRY.with(|registry| registry.borrow()[id.index()])
}

/// All property ids registered under exactly the given owner type.
pub fn properties_for_owner(owner: OwnerType) -> Vec<PropertyId> {
    REGISTRY.with(|registry| {
        registry
            .borrow()
            .iter()
            .filter(|desc| desc.owner == owner)
            .map(|desc| desc.id)
            .collect()
    })
}

/// Ids of the properties the element tree itself reads.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinProperties {
    pub opacity: PropertyId,
    pub visibility: PropertyId,
    pub position: PropertyId,
    pub rotation: PropertyId,
    pub scale: PropertyId,
    pub shear: PropertyId,
    pub pivot: PropertyId,
    pub margin: PropertyId,
    pub horizontal_alignment: PropertyId,
    pub vertical_alignment: PropertyId,
    pub anchors: PropertyId,
    pub offsets: PropertyId,
}

/// Fetch the built-in property ids, registering them on first use.
pub fn builtins() -> BuiltinProperties {
    BUILTINS.with(|cell| {
        let mut cell = cell.borrow_mut();
        if let Some(builtins) = *cell {
            return builtins;
        }
        let builtins = BuiltinProperties {
            opacity: register(
                "Opacity",
                OwnerType::Element,
                PropertyValue::Number(1.0),
                InvalidateReason::STYLE,
            ),
            visibility: register(
                "Visibility",
                OwnerType::Element,
                PropertyValue::Visibility(Visibility::Visible),
                InvalidateReason::STYLE,
            ),
            position: register(
                "Position",
                OwnerType::RenderTransform,
                PropertyValue::Vec3(Vec3::ZERO),
                InvalidateReason::TRANSFORM,
            ),
            rotation: register(
                "Rotation",
                OwnerType::RenderTransform,
                PropertyValue::Quat(Quat::IDENTITY),
                InvalidateReason::TRANSFORM,
            ),
            scale: register(
                "Scale",
                OwnerType::RenderTransform,
                PropertyValue::Vec3(Vec3::ONE),
                InvalidateReason::TRANSFORM,
            ),
            shear: register(
                "Shear",
                OwnerType::RenderTransform,
                PropertyValue::Vec2(Vec2::ZERO),
                InvalidateReason::TRANSFORM,
            ),
            pivot: register(
                "Pivot",
                OwnerType::RenderTransform,
                PropertyValue::Vec2(Vec2::new(0.5, 0.5)),
                InvalidateReason::TRANSFORM,
            ),
            margin: register(
                "Margin",
                OwnerType::Slot,
                PropertyValue::Thickness(Thickness::ZERO),
                InvalidateReason::MEASURE.union(InvalidateReason::ARRANGE),
            ),
            horizontal_alignment: register(
                "HorizontalAlignment",
                OwnerType::Slot,
                PropertyValue::HorizontalAlignment(HorizontalAlignment::Center),
                InvalidateReason::ARRANGE,
            ),
            vertical_alignment: register(
                "VerticalAlignment",
                OwnerType::Slot,
                PropertyValue::VerticalAlignment(VerticalAlignment::Center),
                InvalidateReason::ARRANGE,
            ),
            anchors: register(
                "Anchors",
                OwnerType::Slot,
                PropertyValue::Anchors(Anchors::ZERO),
                InvalidateReason::ARRANGE,
            ),
            offsets: register(
                "Offsets",
                OwnerType::Slot,
                PropertyValue::Thickness(Thickness::ZERO),
                InvalidateReason::ARRANGE,
            ),
        };
        *cell = Some(builtins);
        builtins
    })
}

/// Per-element storage for property values that differ from defaults.
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    entries: Vec<(PropertyId, PropertyValue)>,
}

impl PropertyStore {
    /// Read a value, falling back to the registered default.
    pub fn value(&self, id: PropertyId) -> PropertyValue {
        self.entries
            .iter()
            .find(|(stored, _)| *stored == id)
            .map(|(_, value)| *value)
            .unwrap_or_else(|| descriptor(id).default)
    }

    /// Store a value, replacing any previous one. Returns whether the
    /// effective value changed.
    pub fn set_value(&mut self, id: PropertyId, value: PropertyValue) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|(stored, _)| *stored == id) {
            if entry.1 == value {
                return false;
            }
            entry.1 = value;
            return true;
        }
        if descriptor(id).default == value {
            return false;
        }
        self.entries.push((id, value));
        true
    }

    /// Drop every stored value whose property belongs to `owner`,
    /// resetting those properties to their defaults.
    pub fn clear_owner(&mut self, owner: OwnerType) {
        self.entries
            .retain(|(id, _)| descriptor(*id).owner != owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_assigns_dense_ids() {
        let first = register(
            "TestDenseA",
            OwnerType::Element,
            PropertyValue::Number(0.0),
            InvalidateReason::empty(),
        );
        let second = register(
            "TestDenseB",
            OwnerType::Element,
            PropertyValue::Bool(false),
            InvalidateReason::empty(),
        );
        assert_eq!(second.index(), first.index() + 1);
        assert_eq!(descriptor(first).name, "TestDenseA");
        assert_eq!(descriptor(second).default, PropertyValue::Bool(false));
    }

    #[test]
    fn unset_reads_return_the_default() {
        let prop = register(
            "TestDefault",
            OwnerType::Element,
            PropertyValue::Number(42.0),
            InvalidateReason::empty(),
        );
        let store = PropertyStore::default();
        assert_eq!(store.value(prop), PropertyValue::Number(42.0));
    }

    #[test]
    fn set_reports_effective_changes_only() {
        let prop = register(
            "TestChange",
            OwnerType::Element,
            PropertyValue::Number(1.0),
            InvalidateReason::empty(),
        );
        let mut store = PropertyStore::default();
        assert!(!store.set_value(prop, PropertyValue::Number(1.0)));
        assert!(store.set_value(prop, PropertyValue::Number(2.0)));
        assert!(!store.set_value(prop, PropertyValue::Number(2.0)));
        assert_eq!(store.value(prop), PropertyValue::Number(2.0));
    }

    #[test]
    fn owner_filter_is_exact() {
        let slot_prop = register(
            "TestOwnerSlot",
            OwnerType::Slot,
            PropertyValue::Number(0.0),
            InvalidateReason::empty(),
        );
        let element_prop = register(
            "TestOwnerElement",
            OwnerType::Element,
            PropertyValue::Number(0.0),
            InvalidateReason::empty(),
        );
        let slot_ids = properties_for_owner(OwnerType::Slot);
        assert!(slot_ids.contains(&slot_prop));
        assert!(!slot_ids.contains(&element_prop));
    }

    #[test]
    fn clearing_an_owner_restores_defaults() {
        let slot_prop = register(
            "TestClearSlot",
            OwnerType::Slot,
            PropertyValue::Number(5.0),
            InvalidateReason::empty(),
        );
        let element_prop = register(
            "TestClearElement",
            OwnerType::Element,
            PropertyValue::Number(5.0),
            InvalidateReason::empty(),
        );
        let mut store = PropertyStore::default();
        store.set_value(slot_prop, PropertyValue::Number(9.0));
        store.set_value(element_prop, PropertyValue::Number(9.0));
        store.clear_owner(OwnerType::Slot);
        assert_eq!(store.value(slot_prop), PropertyValue::Number(5.0));
        assert_eq!(store.value(element_prop), PropertyValue::Number(9.0));
    }
}
