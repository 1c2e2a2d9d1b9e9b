//! Frame acquisition and the clear pass.
//!
//! A frame is acquired once per rendered frame and cleared immediately. Sprite
//! flushes then each record their own pass with `LoadOp::Load` on the same
//! view, so any number of flushes composite on top of the clear.

use crate::error::RenderError;
use crate::render::gpu::GpuContext;

/// The background color a frame is cleared to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor(pub [f64; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.1, 0.1, 0.15, 1.0])
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color {
            r: c.0[0],
            g: c.0[1],
            b: c.0[2],
            a: c.0[3],
        }
    }
}

/// The surface texture being rendered this frame and a view onto it.
pub(crate) struct FrameTarget {
    pub output: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

/// Acquire the next surface texture.
///
/// Returns `Ok(None)` when the frame should be skipped: a lost or outdated
/// surface is reconfigured and a timeout is logged. Running out of memory is
/// fatal.
pub(crate) fn acquire_frame(gpu: &mut GpuContext) -> Result<Option<FrameTarget>, RenderError> {
    match gpu.surface.get_current_texture() {
        Ok(output) => {
            let view = output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            Ok(Some(FrameTarget { output, view }))
        }
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::debug!("surface lost or outdated, reconfiguring");
            gpu.reconfigure();
            Ok(None)
        }
        Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
        Err(e) => {
            log::warn!("Surface error: {:?}", e);
            Ok(None)
        }
    }
}

/// Record and submit a pass that clears `view` to `color`.
pub(crate) fn clear_pass(gpu: &GpuContext, view: &wgpu::TextureView, color: ClearColor) {
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("clear encoder"),
        });

    {
        let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    gpu.queue.submit(std::iter::once(encoder.finish()));
}
