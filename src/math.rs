//! Small geometric value types shared across layout and rendering.
//!
//! The coordinate system is y-up with rectangles addressed by their
//! center. Layout rects of children are expressed relative to the
//! parent rect's center.

use glam::{Vec2, Vec3};

/// Tolerance used for float comparisons throughout the crate.
pub const EPSILON: f32 = 1e-6;

/// Compare two floats within [`EPSILON`].
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

/// A width/height pair in logical units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle. `x`/`y` address the bottom-left corner
/// in the y-up coordinate system.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rect from its center point and size.
    pub fn from_center_size(center: Vec2, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Normalized attachment points into a parent rect. `min` anchors the
/// left/bottom edges, `max` the right/top, with 0 at the parent's
/// minimum edge and 1 at its maximum. Equal min and max pin both edges
/// to a single point; offsets then carry the whole extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Anchors {
    pub min: Vec2,
    pub max: Vec2,
}

impl Anchors {
    /// Both edges pinned to the parent's bottom-left corner.
    pub const ZERO: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    /// Edges track the parent's edges, spanning the full rect.
    pub const FILL: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Pin both edges to the same normalized point.
    pub const fn point(at: Vec2) -> Self {
        Self { min: at, max: at }
    }
}

/// Per-edge spacing around an element. Negative values are legal and
/// pull the element outward past its allotted edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thickness {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Thickness {
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Total horizontal spacing (left + right).
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical spacing (top + bottom).
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// A ray in world space, used for pointer hit testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// A ray shot straight down the z axis toward the UI plane,
    /// matching a screen-space pointer position.
    pub fn toward_plane(x: f32, y: f32) -> Self {
        Self {
            origin: Vec3::new(x, y, 1000.0),
            direction: Vec3::NEG_Z,
        }
    }
}
