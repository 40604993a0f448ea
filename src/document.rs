//! The document: a window root, its settings, and the frame loop.
//!
//! `update()` runs the registered subsystems in stage order. Before
//! each stage the tree's pending invalidations are drained and fanned
//! out to every subsystem, so reasons raised by one stage reach the
//! later stages in the same frame. Whatever is still pending after the
//! last stage is delivered at the end and handled next frame.

use glam::{Mat4, Vec2};
use log::trace;

use crate::element::{ElementId, ElementTree, InvalidateReason};
use crate::error::UiError;
use crate::math::{Rect, Size};
use crate::render::device::{NoopDevice, RenderDevice};
use crate::subsystem::event::{PointerEvent, PointerInput};
use crate::subsystem::{self, FrameContext, UiSubsystem};

/// How the document is composed into the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Drawn after the scene in screen space, sized by the camera.
    Overlay,
    /// Projected onto a plane in front of the camera.
    Camera,
    /// A free-standing plane placed by the document origin.
    #[default]
    WorldSpace,
}

/// Camera parameters for the overlay and camera render modes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub width: f32,
    pub height: f32,
    pub world_matrix: Mat4,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DocumentSettings {
    pub render_mode: RenderMode,
    /// Document size used in world-space mode.
    pub width: f32,
    pub height: f32,
    /// Distance of the UI plane in camera mode, for hosts that
    /// project the origin themselves.
    pub plane_distance: f32,
    pub camera: Option<CameraParams>,
    /// Measure/arrange alternation budget per frame.
    pub max_layout_iterations: u32,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::WorldSpace,
            width: 0.0,
            height: 0.0,
            plane_distance: 1000.0,
            camera: None,
            max_layout_iterations: 5,
        }
    }
}

/// One retained UI tree with its own window, settings, and device.
pub struct UiDocument {
    tree: ElementTree,
    window: ElementId,
    subsystems: Vec<Box<dyn UiSubsystem>>,
    device: Box<dyn RenderDevice>,
    settings: DocumentSettings,
    pointer_inputs: Vec<PointerInput>,
    pointer_events: Vec<PointerEvent>,
}

impl UiDocument {
    pub fn new() -> Self {
        Self::with_device(Box::new(NoopDevice::new()))
    }

    pub fn with_device(device: Box<dyn RenderDevice>) -> Self {
        subsystem::ensure_builtins();
        let mut tree = ElementTree::new();
        let window = tree.spawn_window();
        Self {
            tree,
            window,
            subsystems: subsystem::instantiate_all(),
            device,
            settings: DocumentSettings::default(),
            pointer_inputs: Vec::new(),
            pointer_events: Vec::new(),
        }
    }

    pub fn window(&self) -> ElementId {
        self.window
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn settings(&self) -> DocumentSettings {
        self.settings
    }

    /// Replace the settings; viewport and origin are re-derived on the
    /// next update.
    pub fn set_settings(&mut self, settings: DocumentSettings) {
        self.settings = settings;
    }

    /// The rect the window is arranged into.
    pub fn viewport(&self) -> Rect {
        self.tree.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.tree.viewport == viewport {
            return;
        }
        self.tree.viewport = viewport;
        self.tree
            .invalidate(self.window, InvalidateReason::ARRANGE);
    }

    /// The matrix composed in front of the window's world transform.
    pub fn origin(&self) -> Mat4 {
        self.tree.origin
    }

    pub fn set_origin(&mut self, origin: Mat4) {
        if self.tree.origin == origin {
            return;
        }
        self.tree.origin = origin;
        self.tree
            .invalidate(self.window, InvalidateReason::TRANSFORM);
    }

    /// Queue pointer input for the next update.
    pub fn enqueue_pointer(&mut self, input: PointerInput) {
        self.pointer_inputs.push(input);
    }

    /// Events routed by updates since the last take.
    pub fn take_pointer_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pointer_events)
    }

    /// Manually raise invalidation reasons on an element.
    pub fn invalidate(&mut self, element: ElementId, reasons: InvalidateReason) {
        self.tree.invalidate(element, reasons);
    }

    fn apply_settings(&mut self) {
        let derived = match self.settings.render_mode {
            RenderMode::WorldSpace => Some((
                Size::new(self.settings.width, self.settings.height),
                Mat4::IDENTITY,
            )),
            RenderMode::Overlay | RenderMode::Camera => self
                .settings
                .camera
                .map(|camera| (Size::new(camera.width, camera.height), camera.world_matrix)),
        };
        if let Some((size, origin)) = derived {
            self.set_viewport(Rect::from_center_size(Vec2::ZERO, size));
            self.set_origin(origin);
        }
    }

    fn fan_out(
        tree: &mut ElementTree,
        subsystems: &mut [Box<dyn UiSubsystem>],
    ) {
        if !tree.has_pending() {
            return;
        }
        for (element, reasons) in tree.drain_pending() {
            for subsystem in subsystems.iter_mut() {
                subsystem.invalidate(element, reasons);
            }
        }
    }

    /// Run one frame: fan out invalidations and execute every stage.
    /// Layout failure aborts the frame.
    pub fn update(&mut self) -> Result<(), UiError> {
        self.apply_settings();
        let inputs = std::mem::take(&mut self.pointer_inputs);
        trace!("document update: {} pointer inputs", inputs.len());

        for index in 0..self.subsystems.len() {
            Self::fan_out(&mut self.tree, &mut self.subsystems);
            let mut frame = FrameContext {
                device: self.device.as_mut(),
                pointer_inputs: &inputs,
                pointer_events: &mut self.pointer_events,
                max_layout_iterations: self.settings.max_layout_iterations,
            };
            self.subsystems[index].update(&mut self.tree, &mut frame)?;
        }
        // Leftovers (e.g. raised by the paint stage) are delivered now
        // and handled next frame.
        Self::fan_out(&mut self.tree, &mut self.subsystems);
        Ok(())
    }

    /// Access the device, downcast by the caller.
    pub fn device(&self) -> &dyn RenderDevice {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn RenderDevice {
        self.device.as_mut()
    }
}

impl Default for UiDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a set of documents, one update call per frame each.
#[derive(Default)]
pub struct UiHost {
    documents: Vec<UiDocument>,
}

impl UiHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, document: UiDocument) -> usize {
        self.documents.push(document);
        self.documents.len() - 1
    }

    /// Remove and return a document, or `None` if the index is out of
    /// range. Later documents shift down by one.
    pub fn remove_document(&mut self, index: usize) -> Option<UiDocument> {
        if index < self.documents.len() {
            Some(self.documents.remove(index))
        } else {
            None
        }
    }

    pub fn document(&self, index: usize) -> Option<&UiDocument> {
        self.documents.get(index)
    }

    pub fn document_mut(&mut self, index: usize) -> Option<&mut UiDocument> {
        self.documents.get_mut(index)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Update every document. The first failure aborts the tick.
    pub fn tick(&mut self) -> Result<(), UiError> {
        for document in &mut self.documents {
            document.update()?;
        }
        Ok(())
    }
}
