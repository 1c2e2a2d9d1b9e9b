//! # Draw: The wgpu Backend
//!
//! [`WgpuBackend`] is the production [`GraphicsBackend`]. It owns the GPU
//! context, the sprite pipeline and the window, and turns each batch flush into
//! one submitted command buffer.
//!
//! ## Per-Frame Flow
//!
//! ```text
//! begin_frame(clear)
//!   ├─ acquire surface texture   (lost/outdated: reconfigure, skip frame)
//!   └─ clear pass, submit
//!
//! draw_quads(texture, vertices)     ◄── once per flush, any number of times
//!   ├─ write vertices at offset 0 of the shared vertex buffer
//!   ├─ render pass with LoadOp::Load on the frame view
//!   │    bind pipeline, camera (group 0), texture (group 1)
//!   │    draw_indexed(0..quads × 6)
//!   └─ submit
//!
//! present()
//! ```
//!
//! ## Why Submit Per Flush
//!
//! Every flush overwrites the same vertex buffer from offset 0. `write_buffer`
//! is staged and applied at the next `submit`, so two flushes recorded into one
//! command buffer would both read the second flush's vertices. Submitting after
//! each flush orders every upload before the draw that reads it.
//!
//! When a frame was skipped, draws and present are dropped until the next
//! `begin_frame`; `draw_quads` reports that by returning `false`.

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use super::batch::{INDICES_PER_QUAD, VERTICES_PER_QUAD};
use super::pipeline::SpriteRenderer;
use super::vertex::{CameraUniform, SpriteVertex};
use crate::error::RenderError;
use crate::render::pass::{FrameTarget, acquire_frame, clear_pass};
use crate::render::{ClearColor, GpuContext, GraphicsBackend};

/// Renders sprite batches to a window surface with wgpu.
pub struct WgpuBackend {
    gpu: GpuContext,
    renderer: SpriteRenderer,
    window: Arc<Window>,
    frame: Option<FrameTarget>,
}

impl WgpuBackend {
    /// Build the sprite pipeline for `max_sprites` quads per batch.
    pub fn new(window: Arc<Window>, gpu: GpuContext, max_sprites: usize) -> Result<Self, RenderError> {
        let renderer = SpriteRenderer::new(&gpu, max_sprites)?;
        Ok(Self {
            gpu,
            renderer,
            window,
            frame: None,
        })
    }

    /// Resize the surface (call when the window is resized).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }
}

impl GraphicsBackend for WgpuBackend {
    type Texture = wgpu::BindGroup;

    fn create_texture(&mut self, label: &str, width: u32, height: u32, rgba: &[u8]) -> wgpu::BindGroup {
        let texture = self.gpu.device.create_texture_with_data(
            &self.gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.texture_bind_group(&self.gpu, label, &view)
    }

    fn write_projection(&mut self, view_proj: glam::Mat4) {
        self.gpu.queue.write_buffer(
            &self.renderer.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::from(view_proj)]),
        );
    }

    fn max_texture_dimension(&self) -> u32 {
        self.gpu.device.limits().max_texture_dimension_2d
    }

    fn draw_quads(&mut self, texture: &wgpu::BindGroup, vertices: &[SpriteVertex]) -> Result<bool, RenderError> {
        let Some(frame) = &self.frame else {
            return Ok(false);
        };
        let quads = (vertices.len() / VERTICES_PER_QUAD).min(self.renderer.capacity);
        if quads == 0 {
            return Ok(false);
        }
        let vertices = &vertices[..quads * VERTICES_PER_QUAD];
        let byte_len = std::mem::size_of_val(vertices) as wgpu::BufferAddress;

        self.gpu
            .queue
            .write_buffer(&self.renderer.vertex_buffer, 0, bytemuck::cast_slice(vertices));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sprite batch encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.renderer.pipeline);
            render_pass.set_bind_group(0, &self.renderer.camera_bind_group, &[]);
            render_pass.set_bind_group(1, texture, &[]);
            render_pass.set_vertex_buffer(0, self.renderer.vertex_buffer.slice(..byte_len));
            render_pass.set_index_buffer(self.renderer.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..(quads * INDICES_PER_QUAD) as u32, 0, 0..1);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(true)
    }

    fn begin_frame(&mut self, clear: ClearColor) -> Result<(), RenderError> {
        self.frame = acquire_frame(&mut self.gpu)?;
        if let Some(frame) = &self.frame {
            clear_pass(&self.gpu, &frame.view, clear);
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if let Some(frame) = self.frame.take() {
            self.window.pre_present_notify();
            frame.output.present();
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}
