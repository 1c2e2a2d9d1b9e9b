//! Math types and glam re-exports.
//!
//! Sprites are positioned in *internal pixels*: the fixed logical grid the game
//! is authored against, with (0, 0) at the top-left and Y growing downward.
//! Source rectangles are given in texture pixels and converted to normalized
//! UV space with [`UvRect::from_pixels`].

pub use glam::{Mat4, Vec2, Vec3};

/// A rectangle in texture pixels, typically one frame of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl SourceRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// The whole of a `width` x `height` texture.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }
}

/// A normalized rectangle within a texture (UV space, 0.0–1.0).
///
/// `u0`/`v0` is the corner sampled at the quad's top-left vertex, `u1`/`v1` the
/// corner at its bottom-right. Flipping swaps the pair on one axis, so the
/// values are not required to be ordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// The full texture (0,0) to (1,1).
    pub const FULL: Self = Self {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    /// Build from a pixel source rectangle and the texture's dimensions.
    pub fn from_pixels(src: SourceRect, tex_w: u32, tex_h: u32) -> Self {
        let (tw, th) = (tex_w as f32, tex_h as f32);
        Self {
            u0: src.x / tw,
            v0: src.y / th,
            u1: (src.x + src.w) / tw,
            v1: (src.y + src.h) / th,
        }
    }

    /// Mirror horizontally by swapping the left and right U values.
    pub fn flipped_x(self) -> Self {
        Self {
            u0: self.u1,
            u1: self.u0,
            ..self
        }
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_from_sprite_sheet_cell() {
        let uv = UvRect::from_pixels(SourceRect::new(16.0, 32.0, 16.0, 32.0), 64, 128);
        assert_eq!(uv.u0, 0.25);
        assert_eq!(uv.v0, 0.25);
        assert_eq!(uv.u1, 0.5);
        assert_eq!(uv.v1, 0.5);
    }

    #[test]
    fn flip_swaps_only_u() {
        let uv = UvRect::from_pixels(SourceRect::new(0.0, 0.0, 8.0, 8.0), 32, 16);
        let flipped = uv.flipped_x();
        assert_eq!((flipped.u0, flipped.u1), (uv.u1, uv.u0));
        assert_eq!((flipped.v0, flipped.v1), (uv.v0, uv.v1));
    }

    #[test]
    fn full_source_covers_unit_square() {
        assert_eq!(UvRect::from_pixels(SourceRect::full(40, 20), 40, 20), UvRect::FULL);
    }
}
