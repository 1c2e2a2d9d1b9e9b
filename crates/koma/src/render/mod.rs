//! GPU plumbing shared by the sprite renderer.
//!
//! [`GraphicsBackend`] is the seam between the CPU-side batching logic in
//! [`render2d`](crate::render2d) and the device that actually draws. The
//! production backend is [`WgpuBackend`](crate::render2d::WgpuBackend); tests
//! swap in a recorder.

pub mod gpu;
pub mod pass;

pub use gpu::GpuContext;
pub use pass::ClearColor;

use glam::Mat4;

use crate::error::RenderError;
use crate::render2d::SpriteVertex;

/// Everything the sprite batch and texture store need from a GPU.
pub trait GraphicsBackend {
    /// Backend-side handle for an uploaded texture.
    type Texture;

    /// Upload tightly packed RGBA8 pixels as a sampled texture.
    fn create_texture(&mut self, label: &str, width: u32, height: u32, rgba: &[u8]) -> Self::Texture;

    /// Replace the view-projection used by subsequent draws.
    fn write_projection(&mut self, view_proj: Mat4);

    /// Largest width or height [`create_texture`](Self::create_texture)
    /// accepts.
    fn max_texture_dimension(&self) -> u32;

    /// Upload `vertices` (whole quads, 4 per quad) and draw them with one
    /// indexed draw call sampling `texture`.
    ///
    /// Returns `false` when there is no frame to draw into and the quads were
    /// dropped.
    fn draw_quads(&mut self, texture: &Self::Texture, vertices: &[SpriteVertex]) -> Result<bool, RenderError>;

    /// Acquire the frame and clear it.
    fn begin_frame(&mut self, clear: ClearColor) -> Result<(), RenderError>;

    /// Show the frame.
    fn present(&mut self) -> Result<(), RenderError>;

    fn set_title(&mut self, title: &str);
}
