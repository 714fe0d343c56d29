//! Camera, projection and view uniforms.
//!
//! The camera stores a position and an orientation quaternion. The head-pose
//! controls (see [`crate::vr`]) overwrite both every frame while a headset is
//! tracked; on desktop they stay at whatever the application configured.
//! Stereo rendering derives per-eye view matrices by shifting the eye along
//! the camera's local right axis.

use cgmath::{
    EuclideanSpace, InnerSpace, Matrix4, Point3, Quaternion, Rad, Rotation, Rotation3, Vector3,
};
use wgpu::util::DeviceExt;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3<f32>,
    pub orientation: Quaternion<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let orientation = Quaternion::from_angle_y(yaw.into()) * Quaternion::from_angle_x(pitch.into());
        Self {
            position: position.into(),
            orientation: orientation.normalize(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.calc_matrix_offset(0.0)
    }

    /// View matrix for an eye shifted `eye_offset` along the local right axis.
    ///
    /// Positive offsets are the right eye, negative the left. Zero is the
    /// mono/cyclops view.
    pub fn calc_matrix_offset(&self, eye_offset: f32) -> Matrix4<f32> {
        let right = self.orientation.rotate_vector(Vector3::unit_x());
        let forward = self.orientation.rotate_vector(-Vector3::unit_z());
        let up = self.orientation.rotate_vector(Vector3::unit_y());
        let eye = self.position + right * eye_offset;
        Matrix4::look_to_rh(eye, forward, up)
    }

    /// World position of an offset eye, for specular/reflection terms.
    pub fn eye_position(&self, eye_offset: f32) -> Point3<f32> {
        let right = self.orientation.rotate_vector(Vector3::unit_x());
        self.position + right * eye_offset
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.matrix_for_aspect(self.aspect)
    }

    /// Projection with an explicit aspect ratio. Stereo viewports are half as
    /// wide as the surface, so each eye needs its own aspect.
    pub fn matrix_for_aspect(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, aspect, self.znear, self.zfar)
    }
}

/// The camera data as stored on the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.update_eye(camera, projection, 0.0, projection.aspect);
    }

    pub fn update_eye(
        &mut self,
        camera: &Camera,
        projection: &Projection,
        eye_offset: f32,
        aspect: f32,
    ) {
        self.view_position = camera.eye_position(eye_offset).to_homogeneous().into();
        self.view_proj =
            (projection.matrix_for_aspect(aspect) * camera.calc_matrix_offset(eye_offset)).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera GPU resources bundled the way render passes consume them.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}
