//! Document-level tree semantics: mounting, window rules, and layout
//! driven through full updates.

use glam::Vec2;

use trellis::document::{DocumentSettings, UiDocument};
use trellis::element::behavior::{HorizontalAlignment, VerticalAlignment};
use trellis::element::{ElementKind, ElementTree, Visibility};
use trellis::error::UiError;
use trellis::math::{Anchors, Rect, Size, Thickness};

fn document(width: f32, height: f32) -> UiDocument {
    let mut document = UiDocument::new();
    document.set_settings(DocumentSettings {
        width,
        height,
        ..DocumentSettings::default()
    });
    document
}

fn content(tree: &mut ElementTree) -> trellis::ElementId {
    tree.spawn(ElementKind::Content { background: None })
}

fn stretch(tree: &mut ElementTree, id: trellis::ElementId) {
    tree.set_horizontal_alignment(id, HorizontalAlignment::Stretch);
    tree.set_vertical_alignment(id, VerticalAlignment::Stretch);
}

#[test]
fn attaching_to_the_window_mounts_the_subtree() {
    let mut document = document(100.0, 100.0);
    let window = document.window();
    let tree = document.tree_mut();
    let outer = content(tree);
    let inner = content(tree);
    tree.add_child(outer, inner).unwrap();
    assert!(!tree.is_mounted(outer));
    assert!(!tree.is_mounted(inner));

    tree.add_child(window, outer).unwrap();
    assert!(tree.is_mounted(outer));
    assert!(tree.is_mounted(inner));

    tree.remove_child(window, outer).unwrap();
    assert!(!tree.is_mounted(outer));
    assert!(!tree.is_mounted(inner));
}

#[test]
fn the_window_cannot_be_reparented() {
    let mut document = document(100.0, 100.0);
    let window = document.window();
    let tree = document.tree_mut();
    let panel = tree.spawn(ElementKind::Panel { background: None });
    assert_eq!(
        tree.add_child(panel, window),
        Err(UiError::InvalidWindowParent)
    );
    assert_eq!(tree.parent(window), None);
}

#[test]
fn the_window_holds_a_single_child() {
    let mut document = document(100.0, 100.0);
    let window = document.window();
    let tree = document.tree_mut();
    let first = content(tree);
    let second = content(tree);
    tree.add_child(window, first).unwrap();
    assert_eq!(tree.add_child(window, second), Err(UiError::MultipleChild));
}

#[test]
fn hierarchy_levels_count_from_the_window() {
    let mut document = document(100.0, 100.0);
    let window = document.window();
    let tree = document.tree_mut();
    let root = content(tree);
    let leaf = content(tree);
    tree.add_child(window, root).unwrap();
    tree.add_child(root, leaf).unwrap();
    assert_eq!(tree.hierarchy_level(window), 0);
    assert_eq!(tree.hierarchy_level(root), 1);
    assert_eq!(tree.hierarchy_level(leaf), 2);
}

#[test]
fn viewport_changes_rearrange_on_the_next_update() {
    let mut document = document(100.0, 100.0);
    let window = document.window();
    let child = content(document.tree_mut());
    stretch(document.tree_mut(), child);
    document.tree_mut().add_child(window, child).unwrap();
    document.update().unwrap();
    assert_eq!(
        document.tree().layout_rect(child).size(),
        Size::new(100.0, 100.0)
    );

    let mut settings = document.settings();
    settings.width = 300.0;
    settings.height = 200.0;
    document.set_settings(settings);
    document.update().unwrap();
    assert_eq!(
        document.tree().layout_rect(child).size(),
        Size::new(300.0, 200.0)
    );
    assert_eq!(document.viewport(), Rect::new(-150.0, -100.0, 300.0, 200.0));
}

#[test]
fn nested_margins_compose_through_updates() {
    let mut document = document(960.0, 640.0);
    let window = document.window();
    let tree = document.tree_mut();
    let outer = content(tree);
    let inner = content(tree);
    tree.add_child(window, outer).unwrap();
    tree.add_child(outer, inner).unwrap();
    stretch(tree, outer);
    stretch(tree, inner);
    tree.set_margin(outer, Thickness::uniform(10.0));
    tree.set_margin(inner, Thickness::new(20.0, 0.0, 0.0, 40.0));
    document.update().unwrap();

    let tree = document.tree();
    let outer_rect = tree.layout_rect(outer);
    assert_eq!(outer_rect.size(), Size::new(940.0, 620.0));
    let inner_rect = tree.layout_rect(inner);
    assert_eq!(inner_rect.size(), Size::new(920.0, 580.0));
    assert_eq!(inner_rect.center(), Vec2::new(10.0, 20.0));
}

#[test]
fn canvas_children_track_the_viewport_through_anchors() {
    let mut document = document(800.0, 600.0);
    let window = document.window();
    let tree = document.tree_mut();
    let canvas = tree.spawn(ElementKind::Canvas { background: None });
    let hud = tree.spawn(ElementKind::Fixed {
        size: Size::new(10.0, 10.0),
    });
    tree.add_child(window, canvas).unwrap();
    tree.add_child(canvas, hud).unwrap();
    stretch(tree, canvas);
    // Pin to the top-left corner, 120x40 inward with a 10px inset.
    tree.set_anchors(hud, Anchors::point(Vec2::new(0.0, 1.0)));
    tree.set_offsets(hud, Thickness::new(10.0, 10.0, -130.0, -50.0));
    document.update().unwrap();

    let rect = document.tree().layout_rect(hud);
    assert_eq!(rect, Rect::new(-390.0, 250.0, 120.0, 40.0));

    // Offsets reflow on the next update, like any slot property.
    document
        .tree_mut()
        .set_offsets(hud, Thickness::new(20.0, 10.0, -140.0, -50.0));
    document.update().unwrap();
    assert_eq!(
        document.tree().layout_rect(hud),
        Rect::new(-380.0, 250.0, 120.0, 40.0)
    );
}

#[test]
fn collapsing_reflows_the_parent_on_update() {
    let mut document = document(100.0, 100.0);
    let window = document.window();
    let tree = document.tree_mut();
    let holder = content(tree);
    let child = tree.spawn(ElementKind::Fixed {
        size: Size::new(40.0, 40.0),
    });
    tree.add_child(window, holder).unwrap();
    tree.add_child(holder, child).unwrap();
    document.update().unwrap();
    assert_eq!(document.tree().desired_size(holder), Size::new(40.0, 40.0));

    document
        .tree_mut()
        .set_visibility(child, Visibility::Collapsed);
    document.update().unwrap();
    assert_eq!(document.tree().desired_size(holder), Size::ZERO);
}

#[test]
fn repeated_updates_converge_without_work() {
    let mut document = document(100.0, 100.0);
    let window = document.window();
    let child = content(document.tree_mut());
    document.tree_mut().add_child(window, child).unwrap();
    document.update().unwrap();
    let rect = document.tree().layout_rect(child);
    for _ in 0..3 {
        document.update().unwrap();
    }
    assert_eq!(document.tree().layout_rect(child), rect);
}
