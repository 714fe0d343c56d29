//! Render pipeline definitions.
//!
//! - `lit` is the textured, lit pipeline scene models are drawn with
//! - `sky` draws the inward-facing skybox
//! - `light` holds the lighting rig uniforms and bind groups

pub mod light;
pub mod lit;
pub mod sky;

/// All pipelines the viewer draws with, built once at context creation.
#[derive(Debug)]
pub struct Pipelines {
    pub lit: wgpu::RenderPipeline,
    pub sky: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            lit: lit::mk_lit_pipeline(
                device,
                config,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
            sky: sky::mk_sky_pipeline(device, config, camera_bind_group_layout),
        }
    }
}
