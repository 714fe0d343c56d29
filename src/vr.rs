//! Display presentation and head-pose tracking.
//!
//! The actual device layer (runtime discovery, pose sampling hardware) is a
//! host capability; this module gives it an explicit surface. A
//! [`DisplayRoster`] is filled from an async enumeration source and guards
//! against an empty result: without a display every presentation request is a
//! logged no-op. [`HeadsetControls`] samples a [`PoseSource`] each frame and
//! writes position/orientation onto the camera, with a re-originable pose so
//! "reset pose" maps the wearer's current posture back to the scene origin.

use std::fmt::Debug;

use cgmath::{EuclideanSpace, One, Point3, Quaternion, Rotation, Vector3};

use crate::camera::Camera;

/// A sampled head pose in tracking-space coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            orientation: Quaternion::one(),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Continuous pose supplier, sampled once per frame.
pub trait PoseSource {
    fn sample(&mut self) -> Pose;
}

/// Fixed pose; the desktop fallback when no headset is tracked.
pub struct StaticPose(pub Pose);

impl PoseSource for StaticPose {
    fn sample(&mut self) -> Pose {
        self.0
    }
}

/// One presentable display as reported by the host.
#[derive(Clone, Debug)]
pub struct VrDisplay {
    name: String,
    presenting: bool,
}

impl VrDisplay {
    /// An emulated display, useful on hosts without a headset runtime.
    pub fn emulated(name: &str) -> Self {
        Self {
            name: name.to_string(),
            presenting: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_presenting(&self) -> bool {
        self.presenting
    }
}

/// The set of known displays, reduced to the one we present on.
///
/// Mirrors the usual host API shape: enumeration is asynchronous and may
/// legitimately come back empty, in which case no display is adopted and the
/// roster stays inert.
#[derive(Debug, Default)]
pub struct DisplayRoster {
    active: Option<VrDisplay>,
}

impl DisplayRoster {
    pub fn empty() -> Self {
        Self { active: None }
    }

    /// Resolve the enumeration source and adopt the first display, if any.
    pub async fn enumerate<F>(source: F) -> Self
    where
        F: Future<Output = Vec<VrDisplay>>,
    {
        let mut roster = Self::empty();
        roster.adopt(source.await);
        roster
    }

    pub fn adopt(&mut self, displays: Vec<VrDisplay>) {
        self.active = displays.into_iter().next();
        match &self.active {
            Some(display) => log::info!("adopted display {}", display.name()),
            None => log::info!("no presentable display found"),
        }
    }

    pub fn active(&self) -> Option<&VrDisplay> {
        self.active.as_ref()
    }

    /// Begin presenting on the active display.
    ///
    /// Returns whether presentation is now on; without a display this is a
    /// logged no-op.
    pub fn request_present(&mut self) -> bool {
        match &mut self.active {
            Some(display) => {
                display.presenting = true;
                true
            }
            None => {
                log::warn!("present requested but no display is connected");
                false
            }
        }
    }

    pub fn exit_present(&mut self) {
        if let Some(display) = &mut self.active {
            display.presenting = false;
        }
    }

    pub fn is_presenting(&self) -> bool {
        self.active
            .as_ref()
            .map(VrDisplay::is_presenting)
            .unwrap_or(false)
    }
}

/// Applies head tracking to the camera, with a re-originable pose.
pub struct HeadsetControls {
    source: Box<dyn PoseSource>,
    origin: Pose,
    last_raw: Pose,
}

impl HeadsetControls {
    pub fn new(source: Box<dyn PoseSource>) -> Self {
        Self {
            source,
            origin: Pose::identity(),
            last_raw: Pose::identity(),
        }
    }

    /// Sample the pose source and overwrite the camera transform.
    pub fn update(&mut self, camera: &mut Camera) {
        self.last_raw = self.source.sample();
        let effective = self.relative(self.last_raw);
        camera.position = Point3::from_vec(effective.position);
        camera.orientation = effective.orientation;
    }

    /// Re-origin tracking so the current raw pose maps to the identity.
    pub fn reset_pose(&mut self) {
        self.origin = self.last_raw;
    }

    /// The last sampled pose, expressed relative to the origin.
    pub fn effective_pose(&self) -> Pose {
        self.relative(self.last_raw)
    }

    fn relative(&self, raw: Pose) -> Pose {
        let inverse = self.origin.orientation.invert();
        Pose {
            position: inverse.rotate_vector(raw.position - self.origin.position),
            orientation: inverse * raw.orientation,
        }
    }
}

impl Debug for HeadsetControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadsetControls")
            .field("origin", &self.origin)
            .field("last_raw", &self.last_raw)
            .finish()
    }
}
