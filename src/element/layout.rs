//! Measure and arrange passes over the element tree.
//!
//! Measure computes a desired size bottom-up; arrange hands each child
//! a layout rect top-down. A child's layout rect is expressed relative
//! to its parent rect's center, y-up. Desired sizes exclude the
//! element's own margin; the parent adds margins when measuring and
//! subtracts them when arranging.

use glam::Vec2;

use crate::math::{Rect, Size};

use super::behavior::{HorizontalAlignment, VerticalAlignment};
use super::{ElementId, ElementKind, ElementTree, InvalidateReason, Visibility};

impl ElementTree {
    /// The size the element wants, as of the last measure.
    pub fn desired_size(&self, id: ElementId) -> Size {
        self.node(id).map(|node| node.desired_size).unwrap_or(Size::ZERO)
    }

    /// The rect the element was arranged into, relative to the parent
    /// rect's center.
    pub fn layout_rect(&self, id: ElementId) -> Rect {
        self.node(id).map(|node| node.layout_rect).unwrap_or(Rect::ZERO)
    }

    /// The rect a dirty element should be re-arranged into: the
    /// document viewport for the window, otherwise whatever the parent
    /// handed it last time.
    pub(crate) fn arrange_anchor(&self, id: ElementId) -> Rect {
        if Some(id) == self.window() {
            self.viewport
        } else {
            self.node(id)
                .map(|node| node.previous_arrange)
                .unwrap_or(Rect::ZERO)
        }
    }

    /// Recompute the desired size if the element is measure-dirty.
    /// Children are measured first. A changed result dirties the
    /// parent's measure and arrange.
    pub fn measure(&mut self, id: ElementId) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.measure_dirty {
            return;
        }
        let desired = self.compute_desired_size(id);
        let mut changed = false;
        if let Some(node) = self.node_mut(id) {
            changed = node.desired_size != desired;
            node.desired_size = desired;
            node.measure_dirty = false;
        }
        if changed {
            if let Some(parent) = self.parent(id) {
                self.invalidate(
                    parent,
                    InvalidateReason::MEASURE | InvalidateReason::ARRANGE,
                );
            }
        }
    }

    fn compute_desired_size(&mut self, id: ElementId) -> Size {
        let Some(kind) = self.kind(id) else {
            return Size::ZERO;
        };
        match kind {
            ElementKind::Fixed { size } => size,
            ElementKind::Image { natural, .. } => natural,
            ElementKind::Content { .. } | ElementKind::Window => {
                match self.children(id).first().copied() {
                    Some(child) if self.visibility(child) != Visibility::Collapsed => {
                        self.measure(child);
                        let desired = self.desired_size(child);
                        let margin = self.margin(child);
                        Size::new(
                            desired.width + margin.horizontal(),
                            desired.height + margin.vertical(),
                        )
                    }
                    _ => Size::ZERO,
                }
            }
            ElementKind::Panel { .. } => {
                let mut size = Size::ZERO;
                for child in self.children(id) {
                    if self.visibility(child) == Visibility::Collapsed {
                        continue;
                    }
                    self.measure(child);
                    let desired = self.desired_size(child);
                    let margin = self.margin(child);
                    size.width = size.width.max(desired.width + margin.horizontal());
                    size.height = size.height.max(desired.height + margin.vertical());
                }
                size
            }
            // A canvas takes whatever rect it is handed; children are
            // resolved purely against that rect during arrange.
            ElementKind::Canvas { .. } => Size::ZERO,
        }
    }

    /// Arrange the element into `final_rect` and recurse into its
    /// children. Clean elements handed the same rect as last time are
    /// skipped entirely.
    pub fn arrange(&mut self, id: ElementId, final_rect: Rect) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.arrange_dirty && node.previous_arrange == final_rect {
            return;
        }
        self.arrange_children(id, final_rect.size());
        self.set_layout_rect(id, final_rect);
        if let Some(node) = self.node_mut(id) {
            node.previous_arrange = final_rect;
            node.arrange_dirty = false;
        }
    }

    fn arrange_children(&mut self, id: ElementId, final_size: Size) {
        let anchored = matches!(self.kind(id), Some(ElementKind::Canvas { .. }));
        for child in self.children(id) {
            if self.visibility(child) == Visibility::Collapsed {
                continue;
            }
            // Desired sizes must be fresh before slots are resolved.
            self.measure(child);
            let rect = if anchored {
                self.resolve_anchored_rect(child, final_size)
            } else {
                self.resolve_child_rect(child, final_size)
            };
            self.arrange(child, rect);
        }
    }

    /// Apply the child's slot (alignment + margin) within the parent's
    /// final size. Stretch fills the slot minus margins; the other
    /// alignments keep the desired size and pin the matching edge.
    fn resolve_child_rect(&self, child: ElementId, parent: Size) -> Rect {
        let margin = self.margin(child);
        let desired = self.desired_size(child);

        let (width, cx) = match self.horizontal_alignment(child) {
            HorizontalAlignment::Stretch => (
                parent.width - margin.horizontal(),
                (margin.left - margin.right) / 2.0,
            ),
            HorizontalAlignment::Left => (
                desired.width,
                -parent.width / 2.0 + margin.left + desired.width / 2.0,
            ),
            HorizontalAlignment::Right => (
                desired.width,
                parent.width / 2.0 - margin.right - desired.width / 2.0,
            ),
            HorizontalAlignment::Center => {
                (desired.width, (margin.left - margin.right) / 2.0)
            }
        };
        let (height, cy) = match self.vertical_alignment(child) {
            VerticalAlignment::Stretch => (
                parent.height - margin.vertical(),
                (margin.bottom - margin.top) / 2.0,
            ),
            VerticalAlignment::Top => (
                desired.height,
                parent.height / 2.0 - margin.top - desired.height / 2.0,
            ),
            VerticalAlignment::Bottom => (
                desired.height,
                -parent.height / 2.0 + margin.bottom + desired.height / 2.0,
            ),
            VerticalAlignment::Center => {
                (desired.height, (margin.bottom - margin.top) / 2.0)
            }
        };
        Rect::from_center_size(Vec2::new(cx, cy), Size::new(width, height))
    }

    /// Resolve a canvas child's rect from its anchors and offsets.
    /// Each edge sits at its anchor fraction of the parent dimension
    /// and is pushed inward by the matching offset, so point anchors
    /// with negative offsets still produce a positive extent.
    fn resolve_anchored_rect(&self, child: ElementId, parent: Size) -> Rect {
        let anchors = self.anchors(child);
        let offsets = self.offsets(child);
        let left = (anchors.min.x - 0.5) * parent.width + offsets.left;
        let right = (anchors.max.x - 0.5) * parent.width - offsets.right;
        let bottom = (anchors.min.y - 0.5) * parent.height + offsets.bottom;
        let top = (anchors.max.y - 0.5) * parent.height - offsets.top;
        Rect::new(left, bottom, right - left, top - bottom)
    }

    /// Assign the layout rect directly. A changed rect dirties the
    /// world transform of the subtree; a changed size additionally
    /// requests a repaint.
    pub fn set_layout_rect(&mut self, id: ElementId, rect: Rect) {
        let Some(node) = self.node(id) else {
            return;
        };
        let old = node.layout_rect;
        if old == rect {
            return;
        }
        if let Some(node) = self.node_mut(id) {
            node.layout_rect = rect;
        }
        if old.size() != rect.size() {
            self.invalidate(id, InvalidateReason::PAINT);
        }
        self.invalidate(id, InvalidateReason::TRANSFORM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Thickness;

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

    fn canvas(tree: &mut ElementTree) -> ElementId {
        tree.spawn(ElementKind::Canvas { background: None })
    }

    #[test]
    fn content_desired_size_adds_the_child_margin() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let child = fixed(&mut tree, 100.0, 100.0);
        tree.add_child(parent, child).unwrap();
        tree.set_margin(child, Thickness::new(20.0, 10.0, 10.0, 10.0));
        tree.measure(parent);
        assert_eq!(tree.desired_size(parent), Size::new(130.0, 120.0));
        assert_eq!(tree.desired_size(child), Size::new(100.0, 100.0));
    }

    #[test]
    fn stretch_fills_the_slot_minus_margins() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let child = fixed(&mut tree, 0.0, 0.0);
        tree.add_child(parent, child).unwrap();
        tree.set_horizontal_alignment(child, HorizontalAlignment::Stretch);
        tree.set_vertical_alignment(child, VerticalAlignment::Stretch);
        tree.set_margin(child, Thickness::new(15.0, 15.0, 5.0, 5.0));
        tree.measure(parent);
        tree.arrange(parent, Rect::from_center_size(Vec2::ZERO, Size::new(50.0, 50.0)));
        let rect = tree.layout_rect(child);
        assert_eq!(rect.size(), Size::new(30.0, 30.0));
        assert_eq!(rect.center(), Vec2::new(5.0, -5.0));
    }

    #[test]
    fn edge_alignments_pin_the_matching_edges() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let child = fixed(&mut tree, 20.0, 10.0);
        tree.add_child(parent, child).unwrap();
        tree.set_margin(child, Thickness::new(4.0, 6.0, 2.0, 8.0));
        let slot = Rect::from_center_size(Vec2::ZERO, Size::new(100.0, 60.0));

        tree.set_horizontal_alignment(child, HorizontalAlignment::Left);
        tree.set_vertical_alignment(child, VerticalAlignment::Top);
        tree.measure(parent);
        tree.arrange(parent, slot);
        // cx = -50 + 4 + 10, cy = 30 - 6 - 5
        assert_eq!(tree.layout_rect(child).center(), Vec2::new(-36.0, 19.0));

        tree.set_horizontal_alignment(child, HorizontalAlignment::Right);
        tree.set_vertical_alignment(child, VerticalAlignment::Bottom);
        tree.arrange(parent, slot);
        // cx = 50 - 2 - 10, cy = -30 + 8 + 5
        assert_eq!(tree.layout_rect(child).center(), Vec2::new(38.0, -17.0));

        tree.set_horizontal_alignment(child, HorizontalAlignment::Center);
        tree.set_vertical_alignment(child, VerticalAlignment::Center);
        tree.arrange(parent, slot);
        // cx = (4 - 2) / 2, cy = (8 - 6) / 2
        assert_eq!(tree.layout_rect(child).center(), Vec2::new(1.0, 1.0));
        assert_eq!(tree.layout_rect(child).size(), Size::new(20.0, 10.0));
    }

    #[test]
    fn negative_margins_expand_past_the_slot() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let child = fixed(&mut tree, 0.0, 0.0);
        tree.add_child(parent, child).unwrap();
        tree.set_horizontal_alignment(child, HorizontalAlignment::Stretch);
        tree.set_vertical_alignment(child, VerticalAlignment::Stretch);
        tree.set_margin(child, Thickness::uniform(-10.0));
        tree.measure(parent);
        tree.arrange(parent, Rect::from_center_size(Vec2::ZERO, Size::new(50.0, 50.0)));
        assert_eq!(tree.layout_rect(child).size(), Size::new(70.0, 70.0));
    }

    #[test]
    fn panel_desired_size_is_the_componentwise_max() {
        let mut tree = ElementTree::new();
        let parent = panel(&mut tree);
        let wide = fixed(&mut tree, 120.0, 10.0);
        let tall = fixed(&mut tree, 10.0, 80.0);
        tree.add_child(parent, wide).unwrap();
        tree.add_child(parent, tall).unwrap();
        tree.set_margin(tall, Thickness::new(0.0, 5.0, 0.0, 5.0));
        tree.measure(parent);
        assert_eq!(tree.desired_size(parent), Size::new(120.0, 90.0));
    }

    #[test]
    fn canvas_desires_no_size_of_its_own() {
        let mut tree = ElementTree::new();
        let parent = canvas(&mut tree);
        let child = fixed(&mut tree, 400.0, 300.0);
        tree.add_child(parent, child).unwrap();
        tree.measure(parent);
        assert_eq!(tree.desired_size(parent), Size::ZERO);
    }

    #[test]
    fn spanning_anchors_inset_the_child_from_the_edges() {
        use crate::math::Anchors;

        let mut tree = ElementTree::new();
        let parent = canvas(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, child).unwrap();
        tree.set_anchors(child, Anchors::FILL);
        tree.set_offsets(child, Thickness::new(10.0, 20.0, 30.0, 40.0));
        tree.measure(parent);
        tree.arrange(parent, Rect::from_center_size(Vec2::ZERO, Size::new(200.0, 100.0)));
        // left = -100 + 10, right = 100 - 30, bottom = -50 + 40,
        // top = 50 - 20; the fixed desired size is ignored.
        assert_eq!(tree.layout_rect(child), Rect::new(-90.0, -10.0, 160.0, 40.0));
    }

    #[test]
    fn point_anchors_size_the_child_from_offsets_alone() {
        use crate::math::Anchors;

        let mut tree = ElementTree::new();
        let parent = canvas(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, child).unwrap();
        // Pin to the top-right corner and grow 40x30 back inward.
        tree.set_anchors(child, Anchors::point(Vec2::new(1.0, 1.0)));
        tree.set_offsets(child, Thickness::new(-40.0, 0.0, 0.0, -30.0));
        tree.measure(parent);
        tree.arrange(parent, Rect::from_center_size(Vec2::ZERO, Size::new(200.0, 100.0)));
        assert_eq!(tree.layout_rect(child), Rect::new(60.0, 20.0, 40.0, 30.0));
    }

    #[test]
    fn collapsed_children_are_skipped_by_layout() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let child = fixed(&mut tree, 40.0, 40.0);
        tree.add_child(parent, child).unwrap();
        tree.set_visibility(child, Visibility::Collapsed);
        tree.measure(parent);
        assert_eq!(tree.desired_size(parent), Size::ZERO);
        tree.arrange(parent, Rect::from_center_size(Vec2::ZERO, Size::new(50.0, 50.0)));
        assert_eq!(tree.layout_rect(child), Rect::ZERO);
    }

    #[test]
    fn desired_size_changes_dirty_the_parent() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, child).unwrap();
        tree.measure(parent);
        assert_eq!(tree.desired_size(parent), Size::new(10.0, 10.0));

        tree.set_fixed_size(child, Size::new(30.0, 20.0));
        tree.measure(child);
        // The child's new desired size bubbled a measure request up.
        tree.measure(parent);
        assert_eq!(tree.desired_size(parent), Size::new(30.0, 20.0));
    }

    #[test]
    fn arrange_with_an_unchanged_rect_is_a_no_op() {
        let mut tree = ElementTree::new();
        let parent = content(&mut tree);
        let child = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(parent, child).unwrap();
        let slot = Rect::from_center_size(Vec2::ZERO, Size::new(50.0, 50.0));
        tree.measure(parent);
        tree.arrange(parent, slot);
        let before = tree.layout_rect(child);
        tree.arrange(parent, slot);
        assert_eq!(tree.layout_rect(child), before);
    }

    #[test]
    fn layout_rect_round_trips_exactly() {
        let mut tree = ElementTree::new();
        let element = fixed(&mut tree, 10.0, 10.0);
        let rect = Rect::new(-3.25, 7.125, 41.5, 12.75);
        tree.set_layout_rect(element, rect);
        assert_eq!(tree.layout_rect(element), rect);
    }
}
