//! Shared surface materials.
//!
//! A [`Material`] describes surface appearance: a base colour, a diffuse map
//! and an optional equirectangular reflection map. Materials are shared via
//! `Arc`: many scene nodes may reference one instance, and propagating a
//! material over a subtree only swaps references (see
//! [`SceneNode::set_material_all`](crate::scene::graph::SceneNode::set_material_all)).
//! A material is immutable while a frame is drawn.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::scene::texture::{self, Texture};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ColorUniform {
    color: [f32; 4],
}

pub struct Material {
    pub name: String,
    pub color: [f32; 4],
    pub env_map: Option<Arc<Texture>>,
    pub(crate) bind_group: Option<wgpu::BindGroup>,
}

impl Material {
    /// A colour-only material with no GPU resources attached.
    ///
    /// Useful before a device exists; drawing skips materials that were never
    /// uploaded.
    pub fn flat(name: &str, color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            color,
            env_map: None,
            bind_group: None,
        }
    }

    /// Build a material with its GPU bind group.
    ///
    /// `env_map: None` binds a 1x1 black fallback so the reflection term
    /// contributes nothing without a pipeline switch.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        color: [f32; 4],
        diffuse: &Texture,
        env_map: Option<Arc<Texture>>,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} colour buffer", name)),
            contents: bytemuck::cast_slice(&[ColorUniform { color }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let black = Texture::create_solid(1, 1, [0, 0, 0, 255], device, queue);
        let env = env_map.as_deref().unwrap_or(&black);

        let default_sampler = texture::create_default_sampler(device);
        let diffuse_sampler = diffuse.sampler.as_ref().unwrap_or(&default_sampler);
        let env_sampler = env.sampler.as_ref().unwrap_or(&default_sampler);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: color_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(diffuse_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&env.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(env_sampler),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            color,
            env_map,
            bind_group: Some(bind_group),
        }
    }
}
