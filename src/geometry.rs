//! Coordinate and colour value types shared by every module.
//!
//! Widget geometry lives in two spaces: [`Logical`] coordinates are
//! DPI-independent and what callers usually think in, [`Pixel`] coordinates
//! are what ends up in vertex buffers. Conversion between the two is always
//! an explicit multiplication or division by the gui root's [`DpiScale`].

use bytemuck::{Pod, Zeroable};

/// Unit tag for DPI-independent coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Logical;

/// Unit tag for physical pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pixel;

pub type Point = euclid::Point2D<f32, Pixel>;
pub type Vector = euclid::Vector2D<f32, Pixel>;
pub type Size = euclid::Size2D<f32, Pixel>;
pub type Rect = euclid::Box2D<f32, Pixel>;

pub type LogicalPoint = euclid::Point2D<f32, Logical>;
pub type LogicalVector = euclid::Vector2D<f32, Logical>;
pub type LogicalSize = euclid::Size2D<f32, Logical>;

/// Multiplier converting logical coordinates into pixels.
pub type DpiScale = euclid::Scale<f32, Logical, Pixel>;

/// Linear RGBA colour with straight (non-premultiplied) alpha.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, Pod, Zeroable)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Per-channel linear interpolation towards `target`.
    ///
    /// `factor` of 0.0 leaves the colour unchanged, 1.0 arrives at the
    /// target in one step.
    pub fn lerp(self, target: Rgba, factor: f32) -> Self {
        Self {
            r: self.r + (target.r - self.r) * factor,
            g: self.g + (target.g - self.g) * factor,
            b: self.b + (target.b - self.b) * factor,
            a: self.a + (target.a - self.a) * factor,
        }
    }
}
