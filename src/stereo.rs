//! Stereo rendering effect.
//!
//! Produces the two offset viewpoints a head-mounted display expects: the
//! surface is split into left/right viewport halves and the scene is drawn
//! once per eye with the camera shifted by half the eye separation. When no
//! display is presenting the effect degrades to a single full-viewport pass,
//! so the same code path drives both desktop and headset output.

use std::iter;

use crate::{context::Context, pipelines::sky::Skybox, scene::graph::SceneNode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One eye's slice of the surface plus its camera offset along the right axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyePass {
    pub viewport: Viewport,
    pub eye_offset: f32,
}

/// Everything one frame draws: scene roots plus the optional skybox.
pub struct Renderables<'a> {
    pub nodes: Vec<&'a dyn SceneNode>,
    pub skybox: Option<&'a Skybox>,
}

impl<'a> Renderables<'a> {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            skybox: None,
        }
    }

    pub fn merge(&mut self, mut other: Renderables<'a>) {
        self.nodes.append(&mut other.nodes);
        if self.skybox.is_none() {
            self.skybox = other.skybox;
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StereoEffect {
    width: u32,
    height: u32,
    /// Distance between the two virtual eyes in scene units.
    pub eye_separation: f32,
    presenting: bool,
}

impl StereoEffect {
    /// Average human interpupillary distance, in meters.
    pub const DEFAULT_EYE_SEPARATION: f32 = 0.064;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            eye_separation: Self::DEFAULT_EYE_SEPARATION,
            presenting: false,
        }
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_presenting(&mut self, presenting: bool) {
        self.presenting = presenting;
    }

    pub fn is_presenting(&self) -> bool {
        self.presenting
    }

    /// The passes one frame consists of: two half-width viewports with
    /// opposite eye offsets while presenting, one full mono pass otherwise.
    pub fn eye_passes(&self) -> Vec<EyePass> {
        let width = self.width as f32;
        let height = self.height as f32;
        if self.presenting {
            let half = width / 2.0;
            let offset = self.eye_separation / 2.0;
            vec![
                EyePass {
                    viewport: Viewport {
                        x: 0.0,
                        y: 0.0,
                        width: half,
                        height,
                    },
                    eye_offset: -offset,
                },
                EyePass {
                    viewport: Viewport {
                        x: half,
                        y: 0.0,
                        width: half,
                        height,
                    },
                    eye_offset: offset,
                },
            ]
        } else {
            vec![EyePass {
                viewport: Viewport {
                    x: 0.0,
                    y: 0.0,
                    width,
                    height,
                },
                eye_offset: 0.0,
            }]
        }
    }

    /// Draw all renderables once per eye pass into `view`.
    ///
    /// Each eye rewrites the camera uniform with its own offset view matrix
    /// and submits its own command buffer; the first pass clears colour and
    /// depth, later passes load them.
    pub fn render(&self, ctx: &mut Context, renderables: &Renderables, view: &wgpu::TextureView) {
        for (pass_idx, eye) in self.eye_passes().into_iter().enumerate() {
            let aspect = eye.viewport.width / eye.viewport.height;
            ctx.camera.uniform.update_eye(
                &ctx.camera.camera,
                &ctx.projection,
                eye.eye_offset,
                aspect,
            );
            ctx.queue.write_buffer(
                &ctx.camera.buffer,
                0,
                bytemuck::cast_slice(&[ctx.camera.uniform]),
            );

            let load_colour = if pass_idx == 0 {
                wgpu::LoadOp::Clear(ctx.clear_colour)
            } else {
                wgpu::LoadOp::Load
            };
            let load_depth = if pass_idx == 0 {
                wgpu::LoadOp::Clear(1.0)
            } else {
                wgpu::LoadOp::Load
            };

            let mut encoder: wgpu::CommandEncoder =
                ctx.device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Eye Render Encoder"),
                    });
            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Eye Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: load_colour,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: load_depth,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });
                render_pass.set_viewport(
                    eye.viewport.x,
                    eye.viewport.y,
                    eye.viewport.width,
                    eye.viewport.height,
                    0.0,
                    1.0,
                );

                if let Some(skybox) = renderables.skybox {
                    render_pass.set_pipeline(&ctx.pipelines.sky);
                    skybox.draw(&ctx.camera.bind_group, &mut render_pass);
                }

                render_pass.set_pipeline(&ctx.pipelines.lit);
                for node in &renderables.nodes {
                    node.draw(&ctx.camera.bind_group, &ctx.lights.bind_group, &mut render_pass);
                }
            }

            ctx.queue.submit(iter::once(encoder.finish()));
        }
    }
}

/// Read a rendered texture back into an image, for golden-image assertions.
///
/// Copy rows are padded to the 256-byte alignment `copy_texture_to_buffer`
/// requires and stripped again on the way out.
#[cfg(feature = "integration-tests")]
pub async fn read_texture_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> anyhow::Result<image::RgbaImage> {
    use instant::Duration;

    let bytes_per_pixel = std::mem::size_of::<u32>() as u32;
    let unpadded_bytes_per_row = bytes_per_pixel * width;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(256) * 256;

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        label: Some("Read-back Buffer"),
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Read-back Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(iter::once(encoder.finish()));

    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: Some(Duration::from_secs(3)),
    })?;
    rx.receive()
        .await
        .ok_or_else(|| anyhow::anyhow!("read-back channel closed"))??;

    let data = buffer_slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
    for row in data.chunks(padded_bytes_per_row as usize) {
        pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
    }
    drop(data);
    output_buffer.unmap();

    image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| anyhow::anyhow!("read-back produced a short pixel buffer"))
}
