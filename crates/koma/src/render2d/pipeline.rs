//! # Pipeline: The Full GPU Configuration for Drawing
//!
//! A *render pipeline* bundles everything the GPU needs to know about how to
//! draw: which shaders to run, how vertices are laid out, how colors are
//! blended, and what kind of primitives to produce. It is created once at
//! startup, together with the buffers every flush reuses.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ SpriteRenderer                                              │
//! │                                                             │
//! │  Shader module ─── vs_main + fs_main from shader.wgsl       │
//! │  Vertex layout ─── SpriteVertex { pos, uv, color }          │
//! │                                                             │
//! │  Bind group layouts                                         │
//! │    group 0: camera uniform (mat4x4, vertex-only)            │
//! │    group 1: texture + sampler (fragment-only)               │
//! │                                                             │
//! │  Vertex buffer ─── max_sprites × 4 vertices, rewritten      │
//! │                    from offset 0 on every flush             │
//! │  Index buffer ──── max_sprites × 6 indices, static          │
//! │                                                             │
//! │  Blend state ─── ALPHA_BLENDING                             │
//! │  Primitive ───── TriangleList, no culling                   │
//! │  Sampler ─────── nearest, clamp-to-edge (crisp pixel art)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shader Errors
//!
//! wgpu reports validation failures asynchronously through the device's
//! uncaptured-error handler, which panics by default. Shader and pipeline
//! creation run inside a validation error scope instead, and a captured error
//! is returned as [`RenderError::Shader`].

use wgpu::util::DeviceExt;

use super::batch::{INDICES_PER_QUAD, VERTICES_PER_QUAD};
use super::vertex::{CameraUniform, SpriteVertex};
use crate::error::RenderError;
use crate::render::GpuContext;

/// Bytes of vertex buffer `capacity` quads need, if the device allows it and
/// their indices fit in `u32`.
pub(crate) fn vertex_buffer_size(capacity: usize, max_buffer_size: u64) -> Result<u64, RenderError> {
    let bytes = capacity
        .checked_mul(VERTICES_PER_QUAD)
        .filter(|&vertices| u32::try_from(vertices).is_ok())
        .and_then(|vertices| (vertices as u64).checked_mul(std::mem::size_of::<SpriteVertex>() as u64));
    match bytes {
        Some(bytes) if bytes <= max_buffer_size => Ok(bytes),
        _ => Err(RenderError::BatchTooLarge {
            max_sprites: capacity,
            limit: max_buffer_size,
        }),
    }
}

/// GPU resources for the sprite renderer.
pub(crate) struct SpriteRenderer {
    pub pipeline: wgpu::RenderPipeline,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub sampler: wgpu::Sampler,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    /// Quads the vertex buffer can hold.
    pub capacity: usize,
}

impl SpriteRenderer {
    /// Compile the sprite shader and allocate buffers for `max_sprites` quads.
    pub fn new(gpu: &GpuContext, max_sprites: usize) -> Result<Self, RenderError> {
        let device = &gpu.device;
        let capacity = max_sprites.max(1);
        let vertex_bytes = vertex_buffer_size(capacity, device.limits().max_buffer_size)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        // Shader module
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Bind group layout 0: camera uniform
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Bind group layout 1: texture + sampler
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite pipeline layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::Shader(err.to_string()));
        }

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera uniform buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::from(glam::Mat4::IDENTITY)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera bind group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite vertex buffer"),
            size: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite index buffer"),
            contents: bytemuck::cast_slice(&quad_indices(capacity)),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!("sprite renderer ready ({} quads per batch)", capacity);

        Ok(Self {
            pipeline,
            texture_bind_group_layout,
            camera_buffer,
            camera_bind_group,
            sampler,
            vertex_buffer,
            index_buffer,
            capacity,
        })
    }

    /// Create the bind group a flush binds at group 1 for one texture.
    pub fn texture_bind_group(&self, gpu: &GpuContext, label: &str, view: &wgpu::TextureView) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

/// Index list for `quads` quads laid out TL, BL, BR, TR.
pub(crate) fn quad_indices(quads: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(quads * INDICES_PER_QUAD);
    for i in 0..quads as u32 {
        let base = i * VERTICES_PER_QUAD as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}
