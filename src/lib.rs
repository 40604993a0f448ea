//! A retained-mode UI scene graph.
//!
//! `trellis` keeps an element tree, lays it out with an
//! invalidation-driven measure/arrange alternation, composes lazy
//! world transforms, mirrors visible elements into a render-side
//! proxy tree, and builds batched vertex submeshes for the GPU.
//!
//! The frame loop is single-threaded and pull-based: mutations only
//! raise dirty flags, and [`document::UiDocument::update`] runs the
//! subsystems (event, layout, transform, paint) in stage order to
//! bring everything current.
//!
//! ```no_run
//! use trellis::document::{DocumentSettings, UiDocument};
//! use trellis::element::behavior::{HorizontalAlignment, VerticalAlignment};
//! use trellis::element::ElementKind;
//! use trellis::math::Size;
//!
//! let mut document = UiDocument::new();
//! document.set_settings(DocumentSettings {
//!     width: 960.0,
//!     height: 640.0,
//!     ..DocumentSettings::default()
//! });
//! let window = document.window();
//! let panel = document
//!     .tree_mut()
//!     .spawn(ElementKind::Panel { background: None });
//! document.tree_mut().add_child(window, panel).unwrap();
//! document
//!     .tree_mut()
//!     .set_horizontal_alignment(panel, HorizontalAlignment::Stretch);
//! document
//!     .tree_mut()
//!     .set_vertical_alignment(panel, VerticalAlignment::Stretch);
//! document.update().unwrap();
//! assert_eq!(
//!     document.tree().layout_rect(panel).size(),
//!     Size::new(960.0, 640.0)
//! );
//! ```

pub mod document;
pub mod element;
pub mod error;
pub mod math;
pub mod property;
pub mod render;
pub mod subsystem;

pub use document::{DocumentSettings, RenderMode, UiDocument, UiHost};
pub use element::{ElementId, ElementKind, ElementTree, InvalidateReason, Visibility};
pub use error::UiError;
