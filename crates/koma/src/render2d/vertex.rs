//! # Vertex: Per-Corner Data Sent to the GPU
//!
//! Every sprite quad has four vertices. Each carries a position in internal
//! pixels, a texture coordinate (UV), and a tint color. They are packed into a
//! flat struct and uploaded in bulk on every flush.
//!
//! ## Memory Layout
//!
//! `#[repr(C)]` fixes the field order and padding; `bytemuck`'s `Pod` and
//! `Zeroable` let `&[SpriteVertex]` be cast to `&[u8]` for upload.
//!
//! ```text
//! SpriteVertex (32 bytes per vertex)
//! ┌──────────────┬──────────────┬────────────────────────┐
//! │ position     │ uv           │ color                  │
//! │ [f32; 2]     │ [f32; 2]     │ [f32; 4]               │
//! │ 8 bytes      │ 8 bytes      │ 16 bytes               │
//! │ offset 0     │ offset 8     │ offset 16              │
//! │ location(0)  │ location(1)  │ location(2)            │
//! └──────────────┴──────────────┴────────────────────────┘
//! ```
//!
//! Positions stay in internal pixel space. The camera uniform maps them to
//! clip space in the vertex shader, so scrolling only rewrites 64 bytes.

use bytemuck::{Pod, Zeroable};

/// Per-vertex data for sprite quads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// Camera view-projection matrix uploaded as a uniform buffer.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl From<glam::Mat4> for CameraUniform {
    fn from(m: glam::Mat4) -> Self {
        Self {
            view_proj: m.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 32);
        assert_eq!(std::mem::offset_of!(SpriteVertex, uv), 8);
        assert_eq!(std::mem::offset_of!(SpriteVertex, color), 16);
        assert_eq!(SpriteVertex::LAYOUT.array_stride, 32);
    }
}
