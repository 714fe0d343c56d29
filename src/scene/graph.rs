//! Scene graph and hierarchical scene organization.
//!
//! Provides the [`SceneNode`] trait and its two implementations: a
//! [`ContainerNode`] grouping children without geometry and a [`MeshNode`]
//! carrying a loaded model. Nodes own their children exclusively; transforms
//! compose parent-to-child. Material references are shared (`Arc`) and
//! propagate root-to-leaf via [`SceneNode::set_material_all`].

use std::sync::Arc;

use cgmath::Rotation3;
use instant::Duration;
use wgpu::util::DeviceExt;

use crate::scene::{
    material::Material,
    model::{self, DrawModel},
    transform::Transform,
};

/// Constant-rate rotation about a fixed axis, advanced once per frame.
///
/// `rate` is in radians per millisecond of (clamped) frame delta, e.g. 0.0002.
#[derive(Clone, Copy, Debug)]
pub struct Spin {
    pub axis: cgmath::Vector3<f32>,
    pub rate: f32,
}

impl Spin {
    pub fn about_y(rate: f32) -> Self {
        Self {
            axis: cgmath::Vector3::unit_y(),
            rate,
        }
    }
}

pub trait SceneNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn set_local_transform(&mut self, transform: Transform);

    fn get_local_transform(&self) -> Transform;

    fn get_world_transform(&self) -> Transform;

    /// Recompute this node's world transform from the parent's and recurse
    /// into all children.
    fn update_world_transforms(&mut self, parent_world: &Transform);

    /// Update starting from a root node (identity parent).
    fn update_world_transform_all(&mut self);

    /**
     * Assign `material` to this node and recursively to every transitive
     * descendant, in child-list order.
     *
     * The reference is shared, not cloned per node. Repeated invocation with
     * the same material is idempotent; no descendant keeps an older
     * assignment once its ancestor chain has been walked.
     */
    fn set_material_all(&mut self, material: Arc<Material>);

    fn get_material(&self) -> Option<&Arc<Material>>;

    fn set_spin(&mut self, spin: Option<Spin>);

    /// Accumulated spin rotation in radians.
    fn spin_angle(&self) -> f32;

    /// Advance animation state by the (already clamped) frame delta and
    /// recurse into all children. Nodes without a spin only pass the delta on.
    fn advance(&mut self, dt: Duration);

    /// Upload world transforms to the GPU, recursively.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    fn draw<'a, 'pass>(
        &'a self,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
        render_pass: &'pass mut wgpu::RenderPass<'a>,
    ) where
        'a: 'pass;
}

fn advance_spin(
    spin: &Option<Spin>,
    spin_angle: &mut f32,
    local: &mut Transform,
    dt: Duration,
) {
    if let Some(spin) = spin {
        let step = dt.as_secs_f32() * 1000.0 * spin.rate;
        *spin_angle += step;
        local.rotation =
            cgmath::Quaternion::from_axis_angle(spin.axis, cgmath::Rad(step)) * local.rotation;
    }
}

/// A node without geometry of its own, grouping children under one transform.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Transform,
    material: Option<Arc<Material>>,
    spin: Option<Spin>,
    spin_angle: f32,
}

impl ContainerNode {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            local: Transform::new(),
            world: Transform::new(),
            material: None,
            spin: None,
            spin_angle: 0.0,
        }
    }
}

impl Default for ContainerNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNode for ContainerNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn get_local_transform(&self) -> Transform {
        self.local
    }

    fn get_world_transform(&self) -> Transform {
        self.world
    }

    fn update_world_transforms(&mut self, parent_world: &Transform) {
        self.world = parent_world * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Transform::new());
    }

    fn set_material_all(&mut self, material: Arc<Material>) {
        self.material = Some(material.clone());
        for child in self.children.iter_mut() {
            child.set_material_all(material.clone());
        }
    }

    fn get_material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    fn set_spin(&mut self, spin: Option<Spin>) {
        self.spin = spin;
    }

    fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    fn advance(&mut self, dt: Duration) {
        advance_spin(&self.spin, &mut self.spin_angle, &mut self.local, dt);
        for child in self.children.iter_mut() {
            child.advance(dt);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        for child in self.children.iter_mut() {
            child.write_to_buffers(queue);
        }
    }

    fn draw<'a, 'pass>(
        &'a self,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
        render_pass: &'pass mut wgpu::RenderPass<'a>,
    ) where
        'a: 'pass,
    {
        for child in &self.children {
            child.draw(camera_bind_group, light_bind_group, render_pass);
        }
    }
}

/// A node carrying a loaded model and its GPU transform buffer.
pub struct MeshNode {
    children: Vec<Box<dyn SceneNode>>,
    model: model::Model,
    transform_buffer: wgpu::Buffer,
    local: Transform,
    world: Transform,
    material: Option<Arc<Material>>,
    spin: Option<Spin>,
    spin_angle: f32,
}

impl MeshNode {
    pub fn from_model(device: &wgpu::Device, model: model::Model) -> Self {
        let transform = Transform::new();
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::cast_slice(&[transform.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            children: Vec::new(),
            model,
            transform_buffer,
            local: transform,
            world: transform,
            material: None,
            spin: None,
            spin_angle: 0.0,
        }
    }
}

impl SceneNode for MeshNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn get_local_transform(&self) -> Transform {
        self.local
    }

    fn get_world_transform(&self) -> Transform {
        self.world
    }

    fn update_world_transforms(&mut self, parent_world: &Transform) {
        self.world = parent_world * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Transform::new());
    }

    fn set_material_all(&mut self, material: Arc<Material>) {
        self.material = Some(material.clone());
        for child in self.children.iter_mut() {
            child.set_material_all(material.clone());
        }
    }

    fn get_material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    fn set_spin(&mut self, spin: Option<Spin>) {
        self.spin = spin;
    }

    fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    fn advance(&mut self, dt: Duration) {
        advance_spin(&self.spin, &mut self.spin_angle, &mut self.local, dt);
        for child in self.children.iter_mut() {
            child.advance(dt);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::cast_slice(&[self.world.to_raw()]),
        );
        for child in self.children.iter_mut() {
            child.write_to_buffers(queue);
        }
    }

    fn draw<'a, 'pass>(
        &'a self,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
        render_pass: &'pass mut wgpu::RenderPass<'a>,
    ) where
        'a: 'pass,
    {
        render_pass.set_vertex_buffer(1, self.transform_buffer.slice(..));
        render_pass.draw_model(
            &self.model,
            self.material.as_ref(),
            camera_bind_group,
            light_bind_group,
        );
        for child in &self.children {
            child.draw(camera_bind_group, light_bind_group, render_pass);
        }
    }
}

/// Convert one glTF node (and its subtree) into scene nodes.
pub fn to_scene_node(
    node: gltf::scene::Node,
    buf: &Vec<Vec<u8>>,
    device: &wgpu::Device,
    materials: &Vec<Arc<Material>>,
) -> Box<dyn SceneNode> {
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mut meshes = Vec::new();

            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| Some(&buf[buffer.index()]));

                let mut vertices = Vec::new();
                if let Some(positions) = reader.read_positions() {
                    positions.for_each(|position| {
                        vertices.push(model::ModelVertex {
                            position,
                            tex_coords: Default::default(),
                            normal: Default::default(),
                        })
                    });
                }
                if let Some(normals) = reader.read_normals() {
                    normals.enumerate().for_each(|(i, normal)| {
                        vertices[i].normal = normal;
                    });
                }
                if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                    tex_coords.enumerate().for_each(|(i, tex_coord)| {
                        vertices[i].tex_coords = tex_coord;
                    });
                }

                let mut indices = Vec::new();
                if let Some(indices_raw) = reader.read_indices() {
                    indices.append(&mut indices_raw.into_u32().collect::<Vec<u32>>());
                }

                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Vertex Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Index Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let mat_idx = primitive.material().index().unwrap_or(0);

                meshes.push(model::Mesh {
                    name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                    vertex_buffer,
                    index_buffer,
                    num_elements: indices.len() as u32,
                    material: mat_idx,
                });
            }

            let model = model::Model {
                meshes,
                materials: materials.clone(),
            };
            Box::new(MeshNode::from_model(device, model))
        }
        None => Box::new(ContainerNode::new()),
    };

    let (position, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(Transform {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    });

    for child in node.children() {
        let child_node = to_scene_node(child, buf, device, materials);
        scene_node.add_child(child_node);
    }

    scene_node
}
