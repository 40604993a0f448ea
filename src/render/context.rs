//! Drawing context handed to paint hooks.
//!
//! Geometry is authored in the element's local space, origin at the
//! layout rect center, and collected into draw commands the batcher
//! consumes.

use crate::math::Rect;

use super::commands::{Color, DrawCommand, MaterialKey, TextureId, Vertex, VertexFormat};

/// Collects draw commands while one element repaints.
#[derive(Default)]
pub struct DrawingContext {
    commands: Vec<DrawCommand>,
}

impl DrawingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A solid quad. `rect` is in local space.
    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.push_quad(rect, color, MaterialKey::solid());
    }

    /// A textured quad modulated by `color`.
    pub fn draw_image(&mut self, rect: Rect, texture: TextureId, color: Color) {
        self.push_quad(rect, color, MaterialKey::textured(texture));
    }

    fn push_quad(&mut self, rect: Rect, color: Color, material: MaterialKey) {
        let packed = color.pack();
        let vertex = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            color: packed,
        };
        let vertices = vec![
            vertex(rect.x, rect.y),
            vertex(rect.x + rect.width, rect.y),
            vertex(rect.x, rect.y + rect.height),
            vertex(rect.x + rect.width, rect.y + rect.height),
        ];
        let indices = vec![0, 1, 2, 1, 3, 2];
        self.commands.push(DrawCommand::new(
            VertexFormat::PosColor,
            vertices,
            indices,
            material,
        ));
    }

    pub fn take_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_rect_emits_one_quad() {
        let mut ctx = DrawingContext::new();
        ctx.draw_rect(Rect::new(-5.0, -5.0, 10.0, 10.0), Color::WHITE);
        let commands = ctx.take_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].vertex_count(), 4);
        assert_eq!(commands[0].index_count(), 6);
        assert_eq!(commands[0].material, MaterialKey::solid());
        assert_eq!(commands[0].local[3].position, [5.0, 5.0, 0.0]);
    }
}
