use std::{
    io::{BufReader, Cursor},
    path::Path,
    sync::Arc,
};

use anyhow::anyhow;

use crate::{
    pipelines::{light::LightsUniform, sky::Skybox},
    resources::texture::{color_env_layout, load_binary, load_texture},
    scene::{
        graph::{ContainerNode, MeshNode, SceneNode, Spin, to_scene_node},
        material::Material,
        model,
        texture::Texture,
        transform::Transform,
    },
};

/**
 * This module contains all logic for loading meshes/textures/etc. from external
 * files, plus the stage assembly chain that sequences those loads.
 */
pub mod mesh;
pub mod texture;

/// Await `loads` strictly in order and collect the results.
///
/// The futures are lazy, so the next load is not even started until the
/// previous one resolved; this is what sequences model-to-model loading. A
/// failed load aborts the chain with its error; a load that never resolves
/// stalls the chain forever.
pub async fn chain_loads<T, E, F>(loads: impl IntoIterator<Item = F>) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let mut loaded = Vec::new();
    for load in loads {
        loaded.push(load.await?);
    }
    Ok(loaded)
}

/// Load a model file, dispatching on the file extension.
pub async fn load_model(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some("gltf") | Some("glb") => load_model_gltf(file_name, device, queue).await,
        Some("obj") => load_model_obj(file_name, device, queue).await,
        other => Err(anyhow!(
            "unsupported model format {:?} for {}",
            other,
            file_name
        )),
    }
}

pub async fn load_model_obj(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let bind_group_layout = color_env_layout(device);

    let (materials, models) =
        texture::load_obj(file_name, queue, device, &bind_group_layout).await?;
    let meshes = mesh::load_meshes(&models, file_name, device);

    let model = model::Model { meshes, materials };
    Ok(Box::new(MeshNode::from_model(device, model)))
}

pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_cursor = Cursor::new(gltf_bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.into());
                };
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let layout = color_env_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let color = pbr.base_color_factor();
        let diffuse_texture = match pbr
            .base_color_texture()
            .map(|tex| tex.texture().source().source())
        {
            Some(gltf::image::Source::View { view, mime_type }) => {
                let start = view.offset();
                let end = start + view.length();
                Texture::from_bytes(
                    device,
                    queue,
                    &buffer_data[view.buffer().index()][start..end],
                    file_name,
                    mime_type.split('/').last(),
                )?
            }
            Some(gltf::image::Source::Uri { uri, mime_type }) => {
                load_texture(
                    uri,
                    device,
                    queue,
                    mime_type.and_then(|mt| mt.split('/').last()),
                )
                .await?
            }
            // Untextured materials sample plain white so the colour factor
            // passes through unchanged
            None => Texture::create_solid(1, 1, [255, 255, 255, 255], device, queue),
        };
        materials.push(Arc::new(Material::new(
            device,
            queue,
            material.name().unwrap_or(file_name),
            color,
            &diffuse_texture,
            None,
            &layout,
        )));
    }
    if materials.is_empty() {
        let white = Texture::create_solid(1, 1, [255, 255, 255, 255], device, queue);
        materials.push(Arc::new(Material::new(
            device,
            queue,
            file_name,
            [1.0, 1.0, 1.0, 1.0],
            &white,
            None,
            &layout,
        )));
    }

    // Build the node hierarchy
    let mut roots = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            roots.push(to_scene_node(node, &buffer_data, device, &materials));
        }
    }

    let root_node = if roots.len() == 1 {
        roots.into_iter().next().unwrap()
    } else {
        let mut root_node = ContainerNode::new();
        for root in roots {
            root_node.add_child(root);
        }
        Box::new(root_node)
    };

    Ok(root_node)
}

/// One model file in a stage, with its placement and optional spin.
#[derive(Clone, Debug)]
pub struct ModelSlot {
    pub path: String,
    pub scale: f32,
    pub position: cgmath::Vector3<f32>,
    pub spin: Option<Spin>,
}

impl ModelSlot {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            scale: 1.0,
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            spin: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SkyboxSlot {
    pub texture: String,
    pub width: f32,
    pub tint: [f32; 4],
}

/// Everything a stage needs, declared up front. No globals: the descriptor is
/// handed to [`assemble_stage`] and the result owns all loaded state.
#[derive(Clone, Debug)]
pub struct StageDescriptor {
    pub models: Vec<ModelSlot>,
    pub skybox: Option<SkyboxSlot>,
    /// Equirectangular environment texture, used as the reflection map of the
    /// override material.
    pub environment: Option<String>,
    /// Colour of the material propagated over every loaded model subtree.
    pub override_color: [f32; 4],
    pub lights: LightsUniform,
}

impl Default for StageDescriptor {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            skybox: None,
            environment: None,
            // Warm white, pairs well with the default lighting rig
            override_color: [1.0, 0.973, 0.824, 1.0],
            lights: LightsUniform::default(),
        }
    }
}

/// A fully assembled stage: loaded model roots, skybox and environment map.
pub struct Stage {
    pub models: Vec<Box<dyn SceneNode>>,
    pub skybox: Option<Skybox>,
    pub environment: Option<Arc<Texture>>,
    pub lights: LightsUniform,
}

impl Stage {
    /// Advance all animated nodes by the clamped frame delta.
    pub fn advance(&mut self, dt: instant::Duration) {
        for model in self.models.iter_mut() {
            model.advance(dt);
        }
    }

    pub fn update_world_transforms(&mut self) {
        for model in self.models.iter_mut() {
            model.update_world_transform_all();
        }
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        for model in self.models.iter_mut() {
            model.write_to_buffers(queue);
        }
    }
}

/// Load every asset a [`StageDescriptor`] names and assemble the stage.
///
/// Model loads are sequenced via [`chain_loads`]; the skybox and environment
/// textures load concurrently with the model chain via `try_join3`. Lights,
/// skybox geometry and the propagated override material are only constructed
/// after every load resolved, so initialization never observes a partially
/// loaded scene graph. Any load error aborts the whole assembly.
pub async fn assemble_stage(
    desc: &StageDescriptor,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Stage> {
    let models_fut = chain_loads(desc.models.iter().map(|slot| async move {
        let mut node = load_model(&slot.path, device, queue).await?;
        let mut transform = Transform::new();
        transform.scale = [slot.scale; 3].into();
        transform.position = slot.position;
        node.set_local_transform(transform);
        node.set_spin(slot.spin);
        anyhow::Ok(node)
    }));
    let skybox_fut = async {
        match &desc.skybox {
            Some(slot) => {
                let texture = load_texture(&slot.texture, device, queue, None).await?;
                anyhow::Ok(Some((texture, slot)))
            }
            None => Ok(None),
        }
    };
    let environment_fut = async {
        match &desc.environment {
            Some(path) => anyhow::Ok(Some(load_texture(path, device, queue, None).await?)),
            None => Ok(None),
        }
    };

    let (mut models, skybox, environment) =
        futures::future::try_join3(models_fut, skybox_fut, environment_fut).await?;

    // All loads resolved; one-time scene initialization from here on.
    let environment = environment.map(Arc::new);
    let layout = color_env_layout(device);
    let white = Texture::create_solid(1, 1, [255, 255, 255, 255], device, queue);
    let override_material = Arc::new(Material::new(
        device,
        queue,
        "stage override",
        desc.override_color,
        &white,
        environment.clone(),
        &layout,
    ));
    for model in models.iter_mut() {
        model.set_material_all(override_material.clone());
        model.update_world_transform_all();
        model.write_to_buffers(queue);
    }

    let skybox = skybox.map(|(texture, slot)| Skybox::new(device, &texture, slot.width, slot.tint));

    Ok(Stage {
        models,
        skybox,
        environment,
        lights: desc.lights,
    })
}
