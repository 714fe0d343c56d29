//! Skybox pipeline and geometry.
//!
//! The skybox is an inward-facing textured box around the scene origin with a
//! repeating tile texture and a tint colour. It is drawn with front-face
//! culling so only the interior is visible.

use wgpu::util::DeviceExt;

use crate::{
    pipelines::lit::mk_render_pipeline,
    scene::{
        model::Vertex,
        texture::{self, Texture},
    },
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for SkyVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<SkyVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SkyUniform {
    tint: [f32; 4],
}

pub fn sky_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Skybox bind_group_layout"),
    })
}

pub fn mk_sky_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Skybox Pipeline Layout"),
        bind_group_layouts: &[&sky_layout(device), camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Skybox Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sky.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(Texture::DEPTH_FORMAT),
        &[SkyVertex::desc()],
        shader,
        // The camera sits inside the box, so cull the outside
        Some(wgpu::Face::Front),
    )
}

/// The skybox mesh with its texture bind group.
pub struct Skybox {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    num_elements: u32,
}

impl Skybox {
    /// Build a box of `width` units around the origin. The tile texture
    /// repeats `width` times along each face, matching the box dimensions.
    pub fn new(
        device: &wgpu::Device,
        texture: &Texture,
        width: f32,
        tint: [f32; 4],
    ) -> Self {
        let (vertices, indices) = box_geometry(width, width);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Tint Buffer"),
            contents: bytemuck::cast_slice(&[SkyUniform { tint }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let default_sampler = texture::create_default_sampler(device);
        let sampler = texture.sampler.as_ref().unwrap_or(&default_sampler);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &sky_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("Skybox bind_group"),
        });

        Self {
            vertex_buffer,
            index_buffer,
            bind_group,
            num_elements: indices.len() as u32,
        }
    }

    pub fn draw<'a, 'pass>(
        &'a self,
        camera_bind_group: &'a wgpu::BindGroup,
        render_pass: &'pass mut wgpu::RenderPass<'a>,
    ) where
        'a: 'pass,
    {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_bind_group(1, camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_elements, 0, 0..1);
    }
}

fn box_geometry(width: f32, repeat: f32) -> (Vec<SkyVertex>, Vec<u32>) {
    let h = width / 2.0;
    // One quad per face, CCW as seen from outside; the pipeline culls the
    // outside so the interior is what gets drawn.
    let faces: [[[f32; 3]; 4]; 6] = [
        [[h, -h, -h], [h, -h, h], [h, h, h], [h, h, -h]],
        [[-h, -h, h], [-h, -h, -h], [-h, h, -h], [-h, h, h]],
        [[-h, h, -h], [h, h, -h], [h, h, h], [-h, h, h]],
        [[-h, -h, h], [h, -h, h], [h, -h, -h], [-h, -h, -h]],
        [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
    ];
    let uvs: [[f32; 2]; 4] = [[0.0, repeat], [repeat, repeat], [repeat, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face_idx, face) in faces.iter().enumerate() {
        let base = (face_idx * 4) as u32;
        for (corner, position) in face.iter().enumerate() {
            vertices.push(SkyVertex {
                position: *position,
                tex_coords: uvs[corner],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}
