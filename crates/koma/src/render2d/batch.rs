//! # Batch: Accumulate Quads, Flush Per Texture
//!
//! [`SpriteBatch`] is the CPU-side heart of the renderer. Scripts submit
//! sprites one at a time in draw order; the batch appends four vertices per
//! quad to a growing buffer and only talks to the GPU when it has to:
//!
//! - the next sprite uses a different texture than the one bound,
//! - the buffer already holds `max_sprites` quads,
//! - the frame ends (or a script calls `batch.flush()`).
//!
//! Each flush is exactly one `draw_indexed` call over one texture.
//!
//! ## Why Batching Matters
//!
//! Every draw call carries CPU overhead: the driver validates state and the
//! GPU may stall between draws. A frame with 500 sprites drawn from one sprite
//! sheet costs a single draw call here instead of 500.
//!
//! ## Submission Order Is Draw Order
//!
//! There is no sorting. A flush happens whenever the texture changes, so
//! interleaving two textures (A, B, A, B) costs one draw call per sprite.
//! Group draws by texture, or pack them into one atlas, to keep batches long.
//!
//! ## Quad Layout
//!
//! ```text
//!  TL(0) ──── TR(3)       indices per quad: 0 1 2  2 3 0
//!   │  ╲        │         (+4 for each following quad)
//!   │    ╲      │
//!  BL(1) ──── BR(2)
//! ```
//!
//! The index buffer never changes, so it is built once at startup (see
//! [`quad_indices`](super::pipeline::quad_indices)).

use crate::error::RenderError;
use crate::math::{UvRect, Vec2};
use crate::render::GraphicsBackend;

use super::SpriteDraw;
use super::camera::Camera;
use super::texture::{TextureHandle, TextureStore};
use super::vertex::SpriteVertex;

/// Vertices emitted per quad.
pub const VERTICES_PER_QUAD: usize = 4;
/// Indices drawn per quad.
pub const INDICES_PER_QUAD: usize = 6;

/// Where the batch is in its frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    /// Empty, waiting for the first submission of the frame.
    Ready,
    /// Holds unflushed geometry.
    Accumulating,
    /// The last operation was a flush; the buffer is empty.
    Flushed,
    /// Shut down; submissions are rejected.
    ShutDown,
}

/// Counters for the current frame, reset by [`SpriteBatch::begin_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Flushes the backend actually drew (not those dropped with a skipped
    /// frame).
    pub draw_calls: u32,
    /// Quads submitted.
    pub quads: u32,
    /// Vertices submitted.
    pub vertices: u32,
}

/// Accumulates sprite quads and flushes them to a [`GraphicsBackend`].
#[derive(Debug)]
pub struct SpriteBatch {
    vertices: Vec<SpriteVertex>,
    max_sprites: usize,
    bound: Option<TextureHandle>,
    camera: Camera,
    stats: RenderStats,
    phase: BatchPhase,
}

impl SpriteBatch {
    /// A batch holding at most `max_sprites` quads between flushes.
    pub fn new(max_sprites: usize, camera: Camera) -> Self {
        let max_sprites = max_sprites.max(1);
        Self {
            vertices: Vec::with_capacity(max_sprites * VERTICES_PER_QUAD),
            max_sprites,
            bound: None,
            camera,
            stats: RenderStats::default(),
            phase: BatchPhase::Ready,
        }
    }

    /// Drop anything left from the previous frame and reset the counters.
    pub fn begin_frame(&mut self) {
        if self.phase == BatchPhase::ShutDown {
            return;
        }
        self.vertices.clear();
        self.stats = RenderStats::default();
        self.phase = BatchPhase::Ready;
    }

    /// Queue one sprite, flushing first if the texture changes or the batch
    /// is full.
    pub fn submit<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        textures: &TextureStore<B::Texture>,
        sprite: &SpriteDraw,
    ) -> Result<(), RenderError> {
        if self.phase == BatchPhase::ShutDown {
            return Err(RenderError::ShutDown);
        }
        let texture = textures
            .get(sprite.texture)
            .ok_or(RenderError::UnknownTexture(sprite.texture.id()))?;

        if self.bound != Some(texture.handle) {
            self.flush(backend, textures)?;
            self.bound = Some(texture.handle);
        }
        if self.pending_quads() >= self.max_sprites {
            self.flush(backend, textures)?;
        }

        let mut uv = UvRect::from_pixels(sprite.source, texture.width, texture.height);
        if sprite.flip_x {
            uv = uv.flipped_x();
        }
        let color = sprite.color.to_array();
        let Vec2 { x, y } = sprite.position;
        let Vec2 { x: w, y: h } = sprite.size;

        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [x, y],
                uv: [uv.u0, uv.v0],
                color,
            },
            SpriteVertex {
                position: [x, y + h],
                uv: [uv.u0, uv.v1],
                color,
            },
            SpriteVertex {
                position: [x + w, y + h],
                uv: [uv.u1, uv.v1],
                color,
            },
            SpriteVertex {
                position: [x + w, y],
                uv: [uv.u1, uv.v0],
                color,
            },
        ]);
        self.stats.quads += 1;
        self.stats.vertices += VERTICES_PER_QUAD as u32;
        self.phase = BatchPhase::Accumulating;
        Ok(())
    }

    /// Send pending quads to the backend as one draw call. Does nothing when
    /// the batch is empty.
    ///
    /// The buffer is cleared even when the backend reports an error, so a
    /// failing draw is not retried by the next flush.
    pub fn flush<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        textures: &TextureStore<B::Texture>,
    ) -> Result<(), RenderError> {
        if self.vertices.is_empty() {
            return Ok(());
        }
        let handle = self.bound.unwrap_or(TextureHandle::WHITE);
        let result = match textures.gpu_texture(handle) {
            Some(texture) => backend.draw_quads(texture, &self.vertices),
            None => Err(RenderError::UnknownTexture(handle.id())),
        };
        self.vertices.clear();
        self.phase = BatchPhase::Flushed;
        if result? {
            self.stats.draw_calls += 1;
        }
        Ok(())
    }

    /// Move the camera and upload the new projection.
    ///
    /// Pending quads are not flushed, so they are drawn with the new
    /// projection when the batch is next flushed.
    pub fn set_camera<B: GraphicsBackend>(&mut self, backend: &mut B, x: f32, y: f32) {
        self.camera.offset = Vec2::new(x, y);
        backend.write_projection(self.camera.projection());
    }

    /// Flush whatever is left at the end of the frame.
    pub fn end_frame<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        textures: &TextureStore<B::Texture>,
    ) -> Result<(), RenderError> {
        self.flush(backend, textures)
    }

    /// Drop pending geometry and reject further submissions.
    pub fn shutdown(&mut self) {
        self.vertices.clear();
        self.bound = None;
        self.phase = BatchPhase::ShutDown;
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// The texture of the quads currently accumulating (or last flushed).
    pub fn bound(&self) -> Option<TextureHandle> {
        self.bound
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Quads waiting for the next flush.
    pub fn pending_quads(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }
}
