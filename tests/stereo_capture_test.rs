#![cfg(feature = "integration-tests")]

use futures::executor::block_on;

// Headless GPU test: requires an adapter, hence behind the
// `integration-tests` feature like the rest of the GPU-dependent suite.
#[test]
fn cleared_texture_reads_back_the_clear_colour() {
    block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .expect("no compatible adapter for the integration test");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to create a test device");

        let (width, height) = (64u32, 32u32);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture test target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 1.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }
        queue.submit(std::iter::once(encoder.finish()));

        let img = stereoscope::stereo::read_texture_rgba(&device, &queue, &texture, width, height)
            .await
            .expect("read-back failed");

        assert_eq!(img.dimensions(), (width, height));
        assert_eq!(img.get_pixel(0, 0), &image::Rgba([0, 255, 0, 255]));
        assert_eq!(
            img.get_pixel(width - 1, height - 1),
            &image::Rgba([0, 255, 0, 255])
        );
    });
}
