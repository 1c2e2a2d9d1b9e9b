//! # Render2d: Batched Sprite Rendering
//!
//! Scripts draw textured rectangles (*quads*) in internal pixel coordinates.
//! Each quad is appended to a CPU-side buffer and the buffer is drawn in bulk,
//! so a frame made of hundreds of sprites from a few sprite sheets costs a
//! handful of draw calls.
//!
//! ## Architecture
//!
//! ```text
//!   _draw() in Lua
//!        │  batch.draw(handle, x, y, w, h, sx, sy, sw, sh, ...)
//!        ▼
//!   ┌────────────┐   texture change / full / end of frame
//!   │ SpriteBatch│ ─────────────────────────────────────┐
//!   └────────────┘                                      ▼
//!        ▲  handle → size            ┌───────────────────────────────┐
//!   ┌────┴────────┐                  │ GraphicsBackend::draw_quads   │
//!   │TextureStore │ ─ backend tex ─► │  upload, bind, draw_indexed   │
//!   └─────────────┘                  └───────────────────────────────┘
//! ```
//!
//! [`Graphics`] ties the pieces together for one backend. The GPU-facing
//! half lives behind [`GraphicsBackend`]: [`WgpuBackend`] in the
//! application, a recorder in tests.
//!
//! ## Design Decisions
//!
//! **Immediate mode.** There are no sprite objects to keep in sync. Whatever
//! `_draw` submits this frame is what appears, in submission order, with
//! alpha blending and no depth buffer.
//!
//! **Positions in internal pixels.** Vertices are never transformed on the
//! CPU. The camera is a single uniform, so scrolling costs one 64-byte write.
//!
//! **Indexed quads.** Four vertices per quad with a static index buffer
//! instead of six duplicated vertices: a third less upload per flush.

pub(crate) mod batch;
pub(crate) mod camera;
pub(crate) mod draw;
pub(crate) mod pipeline;
pub(crate) mod texture;
pub(crate) mod vertex;

pub use batch::{BatchPhase, RenderStats, SpriteBatch};
pub use camera::Camera;
pub use draw::WgpuBackend;
pub use texture::{Texture, TextureHandle, TextureStore};
pub use vertex::SpriteVertex;

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::RenderError;
use crate::math::{SourceRect, Vec2};
use crate::render::{ClearColor, GraphicsBackend};

/// An RGBA color with floating-point components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One sprite submission: where to draw, which part of which texture, and how
/// to tint it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub texture: TextureHandle,
    /// Top-left corner in internal pixels.
    pub position: Vec2,
    /// Width and height in internal pixels.
    pub size: Vec2,
    /// Region of the texture, in texture pixels.
    pub source: SourceRect,
    /// Mirror horizontally.
    pub flip_x: bool,
    pub color: Color,
}

impl SpriteDraw {
    pub fn new(texture: TextureHandle, position: Vec2, size: Vec2, source: SourceRect) -> Self {
        Self {
            texture,
            position,
            size,
            source,
            flip_x: false,
            color: Color::WHITE,
        }
    }

    pub fn flipped(mut self) -> Self {
        self.flip_x = true;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// The sprite renderer for one backend: textures, batch and frame cycle.
pub struct Graphics<B: GraphicsBackend> {
    backend: B,
    textures: TextureStore<B::Texture>,
    batch: SpriteBatch,
    clear_color: ClearColor,
}

impl<B: GraphicsBackend> Graphics<B> {
    /// Create the white texture, the batch, and upload the initial projection
    /// for a camera at (0, 0).
    pub fn new(mut backend: B, config: &EngineConfig) -> Self {
        let textures = TextureStore::new(&mut backend);
        let camera = Camera::new(config.internal_width, config.internal_height);
        backend.write_projection(camera.projection());
        Self {
            backend,
            textures,
            batch: SpriteBatch::new(config.max_sprites, camera),
            clear_color: config.clear_color(),
        }
    }

    /// Acquire and clear the frame, then reset the batch.
    pub fn start_frame(&mut self) -> Result<(), RenderError> {
        self.backend.begin_frame(self.clear_color)?;
        self.batch.begin_frame();
        Ok(())
    }

    /// Flush the remaining quads and present.
    pub fn finish_frame(&mut self) -> Result<(), RenderError> {
        self.batch.end_frame(&mut self.backend, &self.textures)?;
        self.backend.present()
    }

    /// Clear pending quads without touching the GPU.
    pub fn begin(&mut self) {
        self.batch.begin_frame();
    }

    pub fn draw(&mut self, sprite: &SpriteDraw) -> Result<(), RenderError> {
        self.batch.submit(&mut self.backend, &self.textures, sprite)
    }

    pub fn flush(&mut self) -> Result<(), RenderError> {
        self.batch.flush(&mut self.backend, &self.textures)
    }

    pub fn set_camera(&mut self, x: f32, y: f32) {
        self.batch.set_camera(&mut self.backend, x, y);
    }

    /// Load (or fetch from cache) a texture; the white fallback on failure.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Texture {
        self.textures.load(&mut self.backend, path)
    }

    pub fn white_texture(&self) -> Texture {
        self.textures.white()
    }

    pub fn stats(&self) -> RenderStats {
        self.batch.stats()
    }

    pub fn batch(&self) -> &SpriteBatch {
        &self.batch
    }

    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Drop pending quads and refuse further draws.
    pub fn shutdown(&mut self) {
        self.batch.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    fn graphics() -> Graphics<RecordingBackend> {
        Graphics::new(RecordingBackend::default(), &EngineConfig::default())
    }

    #[test]
    fn new_uploads_white_and_initial_projection() {
        let g = graphics();
        assert_eq!(g.backend().textures.len(), 1);
        assert_eq!(g.backend().projections, vec![Camera::new(256, 224).projection()]);
    }

    #[test]
    fn frame_cycle_clears_draws_and_presents() {
        let mut g = graphics();
        let white = g.white_texture().handle;
        g.start_frame().unwrap();
        g.draw(&SpriteDraw::new(white, Vec2::ZERO, Vec2::splat(8.0), SourceRect::full(1, 1)))
            .unwrap();
        g.finish_frame().unwrap();

        let b = g.backend();
        assert_eq!(b.frames_begun, 1);
        assert_eq!(b.clear_colors, vec![ClearColor::default()]);
        assert_eq!(b.draws.len(), 1);
        assert_eq!(b.presents, 1);
        assert_eq!(g.stats().draw_calls, 1);
    }

    #[test]
    fn set_camera_twice_writes_identical_projections() {
        let mut g = graphics();
        g.set_camera(40.0, 16.0);
        g.set_camera(40.0, 16.0);
        let p = &g.backend().projections;
        assert_eq!(p.len(), 3);
        assert_eq!(p[1], p[2]);
        assert_ne!(p[0], p[1]);
    }
}
