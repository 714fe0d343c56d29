//! A small stereo court scene: two loaded models over a tiled skybox with an
//! equirectangular panorama as reflection environment.
//!
//! Key bindings come from the engine: `F` fullscreen, `V` present on the
//! adopted display, `R` re-origins the head pose, `Escape` leaves
//! presentation.

use stereoscope::{
    DeviceEvent, WindowEvent,
    context::Context,
    resources::{ModelSlot, SkyboxSlot, Stage, StageDescriptor, assemble_stage},
    scene::graph::Spin,
    stereo::Renderables,
    viewer::{FlowConstructor, Out, SceneFlow},
    vr::VrDisplay,
};

#[derive(Default)]
struct State;

enum Event {}

struct Court {
    stage: Stage,
}

impl SceneFlow<State, Event> for Court {
    fn on_init(&mut self, ctx: &mut Context, _: &mut State) -> Out<State, Event> {
        ctx.lights.uniform = self.stage.lights;
        ctx.displays
            .adopt(vec![VrDisplay::emulated("emulated headset")]);
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        _: &mut State,
        dt: std::time::Duration,
    ) -> Out<State, Event> {
        self.stage.advance(dt);
        self.stage.update_world_transforms();
        self.stage.write_to_buffers(&ctx.queue);
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut State, _: &DeviceEvent) -> Out<State, Event> {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut State, _: &WindowEvent) -> Out<State, Event> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut State, event: Event) -> Option<Event> {
        Some(event)
    }

    fn on_render(&self) -> Renderables<'_> {
        Renderables {
            nodes: self.stage.models.iter().map(|model| model.as_ref()).collect(),
            skybox: self.stage.skybox.as_ref(),
        }
    }
}

fn main() {
    let court: FlowConstructor<State, Event> = Box::new(|ctx| {
        Box::pin(async move {
            let descriptor = StageDescriptor {
                models: vec![
                    ModelSlot {
                        path: "models/soccer.glb".to_string(),
                        scale: 0.35,
                        position: [0.0, 0.0, -1.0].into(),
                        spin: Some(Spin::about_y(0.0002)),
                    },
                    ModelSlot {
                        path: "models/stand.glb".to_string(),
                        scale: 0.25,
                        position: [0.0, 0.0, 1.0].into(),
                        spin: None,
                    },
                ],
                skybox: Some(SkyboxSlot {
                    texture: "img/box.png".to_string(),
                    width: 5.0,
                    tint: [0.004, 0.745, 0.0, 1.0],
                }),
                environment: Some("img/field_pano.jpg".to_string()),
                ..Default::default()
            };
            let stage = assemble_stage(&descriptor, &ctx.device, &ctx.queue)
                .await
                .expect("failed to assemble the court stage");
            Box::new(Court { stage }) as Box<dyn SceneFlow<_, _>>
        })
    });

    let _ = stereoscope::viewer::run(vec![court]);
}
