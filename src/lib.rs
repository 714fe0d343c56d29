//! stereoscope
//!
//! A lightweight, cross-platform stereo scene viewer engine focused on native
//! and WASM compatibility. This crate exposes a small surface for assembling
//! a renderable scene from external assets and presenting it through a stereo
//! rendering effect. The design emphasizes explicit state (no globals),
//! explicit asynchronous load sequencing and a render loop that can actually
//! be stopped.
//!
//! High-level modules
//! - `camera`: camera types, projection and uniforms for view/projection
//! - `clock`: per-frame timing with a clamped delta
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `pipelines`: definitions for the render pipelines (lit, sky, lights)
//! - `resources`: helpers to load textures/models and assemble a stage
//! - `scene`: engine data models (graph, meshes, materials, textures)
//! - `stereo`: the two-viewport stereo rendering effect
//! - `viewer`: high level flow control (scenes / update loop / host bindings)
//! - `vr`: display presentation and head-pose tracking
//!

pub mod camera;
pub mod clock;
pub mod context;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod stereo;
pub mod viewer;
pub mod vr;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
