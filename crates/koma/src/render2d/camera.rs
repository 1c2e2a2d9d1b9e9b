//! # Camera: Internal Pixels to Clip Space
//!
//! The camera is a top-left offset into the world. The visible area is
//! always exactly the internal resolution, so one world unit is one internal
//! pixel regardless of window size; the surface stretches the result.
//!
//! ```text
//!   world (x, y)             ──►  clip
//!   (cx,      cy)      top-left    (-1,  1)
//!   (cx + W,  cy + H)  bottom-right ( 1, -1)
//! ```
//!
//! Y grows downward on screen, so the projection's `bottom` is `cy + H` and
//! its `top` is `cy`.

use crate::math::{Mat4, Vec2};

/// A 2D camera with a fixed viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position of the top-left corner of the view.
    pub offset: Vec2,
    /// Visible width and height in internal pixels.
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport: Vec2::new(width as f32, height as f32),
        }
    }

    /// Orthographic view-projection for the current offset.
    pub fn projection(&self) -> Mat4 {
        let Vec2 { x, y } = self.offset;
        Mat4::orthographic_rh(x, x + self.viewport.x, y + self.viewport.y, y, -1.0, 1.0)
    }
}
