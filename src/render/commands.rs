//! Draw command data: colors, material keys, vertices.
//!
//! Each visual proxy owns a list of [`DrawCommand`]s. A command keeps
//! its geometry twice: `local` vertices as authored by the paint hook
//! and `world` vertices, the projected copy the batcher uploads.

/// An RGBA color with components in 0..=1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Pack into ABGR byte order: alpha in the high byte so the
    /// batcher can rewrite it with a mask.
    pub fn pack(self) -> u32 {
        let r = (self.r.clamp(0.0, 1.0) * 255.0) as u32;
        let g = (self.g.clamp(0.0, 1.0) * 255.0) as u32;
        let b = (self.b.clamp(0.0, 1.0) * 255.0) as u32;
        let a = (self.a.clamp(0.0, 1.0) * 255.0) as u32;
        (a << 24) | (b << 16) | (g << 8) | r
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Untextured vertex-color material.
    pub const SOLID: Self = Self(0);
    /// Vertex-color modulated by a sampled texture.
    pub const TEXTURED: Self = Self(1);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SamplerId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Alpha,
    Additive,
    Opaque,
}

/// Everything that must match for two commands to share a draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub material: MaterialId,
    pub texture: Option<TextureId>,
    pub sampler: Option<SamplerId>,
    pub blend: BlendMode,
}

impl MaterialKey {
    pub fn solid() -> Self {
        Self {
            material: MaterialId::SOLID,
            texture: None,
            sampler: None,
            blend: BlendMode::Alpha,
        }
    }

    pub fn textured(texture: TextureId) -> Self {
        Self {
            material: MaterialId::TEXTURED,
            texture: Some(texture),
            sampler: None,
            blend: BlendMode::Alpha,
        }
    }

    /// FNV-1a over the key fields. Equal hashes with equal keys let
    /// adjacent commands merge into one submesh.
    pub fn content_hash(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = OFFSET;
        let mut mix = |value: u64| {
            hash ^= value;
            hash = hash.wrapping_mul(PRIME);
        };
        mix(self.material.0 as u64);
        mix(self.texture.map(|t| t.0 as u64 + 1).unwrap_or(0));
        mix(self.sampler.map(|s| s.0 as u64 + 1).unwrap_or(0));
        mix(match self.blend {
            BlendMode::Alpha => 0,
            BlendMode::Additive => 1,
            BlendMode::Opaque => 2,
        });
        hash
    }
}

/// The vertex layouts draw commands can carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexFormat {
    /// Position (3 x f32) + packed color (u32).
    #[default]
    PosColor,
}

impl VertexFormat {
    /// Bytes per vertex in this layout.
    pub const fn stride(self) -> usize {
        match self {
            Self::PosColor => std::mem::size_of::<Vertex>(),
        }
    }
}

/// One vertex in the [`VertexFormat::PosColor`] layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    /// Packed ABGR color, see [`Color::pack`].
    pub color: u32,
}

/// A batchable unit of geometry owned by a visual proxy.
#[derive(Clone, Debug)]
pub struct DrawCommand {
    pub format: VertexFormat,
    /// Geometry in the element's local space (origin at rect center).
    pub local: Vec<Vertex>,
    /// World-space copy, refreshed when the proxy's transform or
    /// opacity is dirty.
    pub world: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub material: MaterialKey,
    pub hash: u64,
}

impl DrawCommand {
    pub fn new(
        format: VertexFormat,
        local: Vec<Vertex>,
        indices: Vec<u16>,
        material: MaterialKey,
    ) -> Self {
        let world = local.clone();
        let hash = material.content_hash();
        Self {
            format,
            local,
            world,
            indices,
            material,
            hash,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.local.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_puts_alpha_in_the_high_byte() {
        let packed = Color::rgba(1.0, 0.0, 0.0, 0.5).pack();
        assert_eq!(packed >> 24, 127);
        assert_eq!(packed & 0xff, 255);
    }

    #[test]
    fn equal_keys_hash_equal() {
        let a = MaterialKey::textured(TextureId(7));
        let b = MaterialKey::textured(TextureId(7));
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(
            a.content_hash(),
            MaterialKey::textured(TextureId(8)).content_hash()
        );
        assert_ne!(a.content_hash(), MaterialKey::solid().content_hash());
    }

    #[test]
    fn missing_texture_hashes_differently_from_texture_zero() {
        let none = MaterialKey::solid();
        let zero = MaterialKey {
            texture: Some(TextureId(0)),
            ..MaterialKey::solid()
        };
        assert_ne!(none.content_hash(), zero.content_hash());
    }
}
