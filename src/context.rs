use std::sync::Arc;

use winit::window::Window;

use crate::{
    camera::{self, CameraResources, Projection},
    clock::FrameClock,
    pipelines::{Pipelines, light::LightResources},
    scene::texture,
    stereo::StereoEffect,
    vr::{DisplayRoster, HeadsetControls, Pose, StaticPose},
};

/// Central application state: GPU handles, camera, lights, stereo effect and
/// display/pose tracking. Every operation receives this struct explicitly;
/// there is no module-level state.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub lights: LightResources,
    pub pipelines: Pipelines,
    pub effect: StereoEffect,
    pub head: HeadsetControls,
    pub displays: DisplayRoster,
    pub clock: FrameClock,
    pub clear_colour: wgpu::Color,
}

/// The cloneable subset of [`Context`] handed to async flow constructors for
/// resource loading. Cloning leverages the internal Arcs of Device and Queue.
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
        }
    }
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so when
                // building for the web some have to stay disabled.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        log::info!("surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an Srgb surface texture; anything else comes out
        // darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // Wide headset-style field of view, deep far plane for environment
        // scale scenes
        let projection =
            Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 10000.0);
        let camera = camera::Camera::new((0.0, 0.0, 0.0), cgmath::Deg(0.0), cgmath::Deg(0.0));
        let camera = CameraResources::new(&device, camera, &projection);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let lights = LightResources::new(Default::default(), &device);

        let pipelines = Pipelines::new(
            &device,
            &config,
            &camera.bind_group_layout,
            &lights.bind_group_layout,
        );

        let effect = StereoEffect::new(config.width, config.height);
        let head = HeadsetControls::new(Box::new(StaticPose(Pose::identity())));
        let displays = DisplayRoster::empty();

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            lights,
            pipelines,
            effect,
            head,
            displays,
            clock: FrameClock::new(),
            clear_colour: wgpu::Color::BLACK,
        })
    }
}
