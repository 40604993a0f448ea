//! World transform composition and point mapping.
//!
//! An element's world transform is
//! `parent_world * translate(layout_rect.center) * local`, where the
//! local matrix comes from the render transform behavior (identity
//! without one). World matrices are cached and recomputed lazily on
//! read; invalidation eagerly dirties the whole subtree so a stale
//! parent can never hide behind a clean child.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::math::{approx_eq, Ray, Rect, EPSILON};

use super::behavior::BehaviorKind;
use super::{ElementId, ElementTree, Visibility};

impl ElementTree {
    /// The cached render-transform matrix (pivot not applied).
    /// Identity for elements without the behavior.
    ///
    /// Composition order is translate * rotate * shear * scale; the
    /// shear factors skew x by y (`shear.x`) and y by x (`shear.y`).
    pub fn local_matrix(&mut self, id: ElementId) -> Mat4 {
        let Some(node) = self.node(id) else {
            return Mat4::IDENTITY;
        };
        if !node.behaviors.contains(super::behavior::BehaviorFlags::RENDER_TRANSFORM) {
            return Mat4::IDENTITY;
        }
        if !node.local_dirty {
            return node.local_matrix;
        }

        let position = self.position(id);
        let rotation = self.rotation(id);
        let scale = self.scale(id);
        let shear = self.shear(id);

        let local = if !approx_eq(shear.x, 0.0) || !approx_eq(shear.y, 0.0) {
            let shear_matrix = Mat4::from_cols(
                Vec4::new(1.0, shear.y, 0.0, 0.0),
                Vec4::new(shear.x, 1.0, 0.0, 0.0),
                Vec4::Z,
                Vec4::W,
            );
            Mat4::from_rotation_translation(rotation, position)
                * shear_matrix
                * Mat4::from_scale(scale)
        } else {
            Mat4::from_scale_rotation_translation(scale, rotation, position)
        };

        if let Some(node) = self.node_mut(id) {
            node.local_matrix = local;
            node.local_dirty = false;
        }
        local
    }

    /// The element's transform into world space, recomputing cached
    /// matrices up the parent chain as needed. The document origin is
    /// composed in front of the window's transform.
    pub fn world_transform(&mut self, id: ElementId) -> Mat4 {
        let Some(node) = self.node(id) else {
            return Mat4::IDENTITY;
        };
        if !node.world_dirty {
            return node.world_matrix;
        }

        let parent_world = match self.parent(id) {
            Some(parent) => self.world_transform(parent),
            None => Mat4::IDENTITY,
        };
        let rect = self.layout_rect(id);
        let mut local = self.local_matrix(id);

        if self.has_behavior(id, BehaviorKind::RenderTransform) {
            let offset = self.pivot(id) - Vec2::splat(0.5);
            if !approx_eq(offset.x, 0.0) || !approx_eq(offset.y, 0.0) {
                // Conjugate by the pivot offset so rotation and scale
                // spin around the pivot instead of the rect center.
                let pivot_offset =
                    Vec3::new(offset.x * rect.width, offset.y * rect.height, 0.0);
                local = Mat4::from_translation(pivot_offset)
                    * local
                    * Mat4::from_translation(-pivot_offset);
            }
        }

        let mut world =
            parent_world * Mat4::from_translation(rect.center().extend(0.0)) * local;
        if Some(id) == self.window() {
            world = self.origin * world;
        }

        if let Some(node) = self.node_mut(id) {
            node.world_matrix = world;
            node.world_dirty = false;
        }
        world
    }

    /// Map a point from the element's local space (origin at the rect
    /// center) into world space.
    pub fn local_to_world(&mut self, id: ElementId, point: Vec3) -> Vec3 {
        self.world_transform(id).transform_point3(point)
    }

    /// Map a world-space point into the element's local space.
    pub fn world_to_local(&mut self, id: ElementId, point: Vec3) -> Vec3 {
        self.world_transform(id).inverse().transform_point3(point)
    }

    /// Intersect a world-space ray with the element's layout rect on
    /// its local z = 0 plane. Hidden and collapsed elements never hit.
    pub fn hit_test(&mut self, id: ElementId, ray: Ray) -> bool {
        if self.visibility(id) != Visibility::Visible {
            return false;
        }
        let rect = self.layout_rect(id);
        let inverse = self.world_transform(id).inverse();
        let origin = inverse.transform_point3(ray.origin);
        let direction = inverse.transform_vector3(ray.direction);
        if direction.z.abs() <= EPSILON {
            return false;
        }
        let t = -origin.z / direction.z;
        if t < 0.0 {
            return false;
        }
        let hit = origin + direction * t;
        Rect::from_center_size(Vec2::ZERO, rect.size()).contains(Vec2::new(hit.x, hit.y))
    }
}
