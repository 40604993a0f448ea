//! Single-pass batch building over the visual proxy tree.
//!
//! The walk visits proxies depth-first in paint order, refreshing
//! world vertices and alpha where the proxy is dirty, and merges
//! adjacent commands into one submesh while the material key and
//! content hash match. A mismatch, or running past the vertex budget,
//! flushes the accumulated geometry to the device and starts a new
//! submesh at index zero of the next buffer range.

use glam::Mat4;

use crate::math::EPSILON;

use super::commands::{DrawCommand, MaterialKey, Vertex};
use super::device::RenderDevice;
use super::proxy::{ProxyArena, ProxyId, VisualDirty};

/// A submesh never exceeds this many vertices, keeping u16 indices
/// addressable.
pub const MAX_BATCH_VERTICES: usize = 65535;

pub struct BatchBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    current: Option<(u64, MaterialKey)>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            current: None,
        }
    }

    /// Rebuild the frame's submeshes from the proxy tree rooted at
    /// `root`.
    pub fn build(&mut self, proxies: &mut ProxyArena, root: ProxyId, device: &mut dyn RenderDevice) {
        device.begin_frame();
        self.vertices.clear();
        self.indices.clear();
        self.current = None;
        self.walk(proxies, root, device);
        self.flush(device, None);
        device.end_frame();
    }

    fn walk(&mut self, proxies: &mut ProxyArena, id: ProxyId, device: &mut dyn RenderDevice) {
        let Some(proxy) = proxies.get_mut(id) else {
            return;
        };
        // Invisible or fully transparent proxies drop their whole
        // subtree from the frame.
        if !proxy.visible || proxy.opacity <= EPSILON {
            return;
        }

        let dirty = proxy.dirty;
        let world_matrix = proxy.world_matrix;
        let opacity = proxy.opacity;
        let mut commands = std::mem::take(&mut proxy.commands);
        for command in &mut commands {
            if dirty.contains(VisualDirty::TRANSFORM) {
                project_world(command, &world_matrix);
            }
            if dirty.contains(VisualDirty::OPACITY) {
                apply_opacity(command, opacity);
            }
        }

        for command in &commands {
            let key = (command.hash, command.material);
            let breaks = self.current != Some(key)
                || self.vertices.len() + command.vertex_count() > MAX_BATCH_VERTICES;
            if breaks {
                self.flush(device, Some(key));
            }
            let base = self.vertices.len() as u16;
            self.vertices.extend_from_slice(&command.world);
            self.indices
                .extend(command.indices.iter().map(|&i| i + base));
        }

        if let Some(proxy) = proxies.get_mut(id) {
            proxy.commands = commands;
            proxy.dirty = VisualDirty::empty();
        }

        for child in proxies.children(id) {
            self.walk(proxies, child, device);
        }
    }

    /// Push the accumulated geometry as one submesh and start over
    /// with `next` as the open batch key.
    fn flush(&mut self, device: &mut dyn RenderDevice, next: Option<(u64, MaterialKey)>) {
        if let Some((_, material)) = self.current {
            if !self.vertices.is_empty() {
                device.push_submesh(&self.vertices, &self.indices, material);
            }
        }
        self.vertices.clear();
        self.indices.clear();
        self.current = next;
    }
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-project a command's local vertices through the world matrix,
/// writing the world cache. Uses the reciprocal homogeneous w, with
/// zero mapped to 1 so degenerate matrices stay finite. Colors are
/// left alone; they belong to the opacity pass.
fn project_world(command: &mut DrawCommand, matrix: &Mat4) {
    for (local, world) in command.local.iter().zip(command.world.iter_mut()) {
        let [x, y, _] = local.position;
        let mut rhw = matrix.x_axis.w * x + matrix.y_axis.w * y + matrix.w_axis.w;
        rhw = if rhw == 0.0 { 1.0 } else { (1.0 / rhw).abs() };
        world.position = [
            (matrix.x_axis.x * x + matrix.y_axis.x * y + matrix.w_axis.x) * rhw,
            (matrix.x_axis.y * x + matrix.y_axis.y * y + matrix.w_axis.y) * rhw,
            (matrix.x_axis.z * x + matrix.y_axis.z * y + matrix.w_axis.z) * rhw,
        ];
    }
}

/// Rewrite the alpha byte of the world vertices to `opacity * 255`,
/// keeping the authored color channels.
fn apply_opacity(command: &mut DrawCommand, opacity: f32) {
    let alpha = ((opacity.clamp(0.0, 1.0) * 255.0) as u32) << 24;
    for (local, world) in command.local.iter().zip(command.world.iter_mut()) {
        world.color = (local.color & 0x00ff_ffff) | alpha;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::element::{ElementKind, ElementTree};
    use crate::render::commands::{Color, TextureId, VertexFormat};
    use crate::render::device::NoopDevice;

    fn quad(material: MaterialKey) -> DrawCommand {
        let vertex = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            color: Color::WHITE.pack(),
        };
        DrawCommand::new(
            VertexFormat::PosColor,
            vec![
                vertex(-1.0, -1.0),
                vertex(1.0, -1.0),
                vertex(-1.0, 1.0),
                vertex(1.0, 1.0),
            ],
            vec![0, 1, 2, 1, 3, 2],
            material,
        )
    }

    #[test]
    fn projection_applies_the_world_translation() {
        let mut command = quad(MaterialKey::solid());
        project_world(&mut command, &Mat4::from_translation(Vec3::new(10.0, 5.0, 0.0)));
        assert_eq!(command.world[0].position, [9.0, 4.0, 0.0]);
        assert_eq!(command.world[3].position, [11.0, 6.0, 0.0]);
        // Local geometry stays untouched.
        assert_eq!(command.local[0].position, [-1.0, -1.0, 0.0]);
    }

    #[test]
    fn zero_w_projects_without_dividing() {
        let mut command = quad(MaterialKey::solid());
        let mut matrix = Mat4::IDENTITY;
        matrix.w_axis.w = 0.0;
        project_world(&mut command, &matrix);
        assert_eq!(command.world[1].position, [1.0, -1.0, 0.0]);
    }

    #[test]
    fn build_merges_by_material_and_splits_on_change() {
        let mut tree = ElementTree::new();
        let mut proxies = ProxyArena::new();
        let root = proxies.alloc(tree.spawn(ElementKind::Content { background: None }));
        let child = proxies.alloc(tree.spawn(ElementKind::Content { background: None }));
        proxies.link_children(root, &[child]);
        proxies.get_mut(root).unwrap().commands =
            vec![quad(MaterialKey::solid()), quad(MaterialKey::solid())];
        proxies.get_mut(child).unwrap().commands = vec![quad(MaterialKey::textured(TextureId(3)))];

        let mut device = NoopDevice::new();
        let mut builder = BatchBuilder::new();
        builder.build(&mut proxies, root, &mut device);
        // Two solid quads merge; the textured one forces a second submesh.
        assert_eq!(device.submesh_count(), 2);
        assert_eq!(device.vertex_count(), 12);
    }

    #[test]
    fn opacity_rewrites_only_the_alpha_byte() {
        let mut command = quad(MaterialKey::solid());
        apply_opacity(&mut command, 0.5);
        assert_eq!(command.world[0].color >> 24, 127);
        assert_eq!(command.world[0].color & 0x00ff_ffff, 0x00ff_ffff);
        // The authored alpha is recoverable: full opacity restores it.
        apply_opacity(&mut command, 1.0);
        assert_eq!(command.world[0].color, Color::WHITE.pack());
    }
}
