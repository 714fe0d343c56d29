use cgmath::{Deg, EuclideanSpace, InnerSpace, One, Quaternion, Rad, Rotation3, Vector3};
use futures::{executor::block_on, future::ready};

use stereoscope::{
    camera::Camera,
    stereo::StereoEffect,
    vr::{DisplayRoster, HeadsetControls, Pose, VrDisplay},
};

use crate::common::test_utils::ScriptedPose;

mod common;

#[test]
fn empty_roster_leaves_the_display_unset() {
    let mut roster = block_on(DisplayRoster::enumerate(ready(Vec::new())));
    assert!(roster.active().is_none());
    // Presenting without a display is a guarded no-op
    assert!(!roster.request_present());
    assert!(!roster.is_presenting());
}

#[test]
fn first_enumerated_display_is_adopted() {
    let displays = vec![
        VrDisplay::emulated("left headset"),
        VrDisplay::emulated("right headset"),
    ];
    let mut roster = block_on(DisplayRoster::enumerate(ready(displays)));
    assert_eq!(roster.active().unwrap().name(), "left headset");

    assert!(roster.request_present());
    assert!(roster.is_presenting());
    roster.exit_present();
    assert!(!roster.is_presenting());
}

#[test]
fn head_pose_is_applied_to_the_camera() {
    let pose = Pose {
        position: Vector3::new(0.1, 1.6, -0.3),
        orientation: Quaternion::from_angle_y(Deg(90.0)),
    };
    let mut controls = HeadsetControls::new(Box::new(ScriptedPose::new(vec![pose])));
    let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));

    controls.update(&mut camera);

    assert!((camera.position.x - 0.1).abs() < 1e-6);
    assert!((camera.position.y - 1.6).abs() < 1e-6);
    assert!((camera.position.z + 0.3).abs() < 1e-6);
}

#[test]
fn reset_pose_maps_the_current_posture_to_identity() {
    let skewed = Pose {
        position: Vector3::new(0.5, 1.7, 0.2),
        orientation: Quaternion::from_angle_y(Rad(0.8)),
    };
    let mut controls = HeadsetControls::new(Box::new(ScriptedPose::new(vec![skewed])));
    let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));

    controls.update(&mut camera);
    controls.reset_pose();
    controls.update(&mut camera);

    let effective = controls.effective_pose();
    assert!(effective.position.magnitude() < 1e-6);
    let identity = Quaternion::<f32>::one();
    assert!((effective.orientation.s - identity.s).abs() < 1e-6);
    assert!(effective.orientation.v.magnitude() < 1e-6);
    assert!(camera.position.to_vec().magnitude() < 1e-6);
}

#[test]
fn mono_rendering_uses_one_full_viewport() {
    let effect = StereoEffect::new(1280, 720);
    let passes = effect.eye_passes();
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].eye_offset, 0.0);
    assert_eq!(passes[0].viewport.width, 1280.0);
    assert_eq!(passes[0].viewport.height, 720.0);
}

#[test]
fn presenting_splits_the_surface_into_two_offset_eyes() {
    let mut effect = StereoEffect::new(1000, 500);
    effect.set_presenting(true);
    let passes = effect.eye_passes();
    assert_eq!(passes.len(), 2);

    let (left, right) = (passes[0], passes[1]);
    assert_eq!(left.viewport.x, 0.0);
    assert_eq!(left.viewport.width, 500.0);
    assert_eq!(right.viewport.x, 500.0);
    assert_eq!(right.viewport.width, 500.0);

    assert!(left.eye_offset < 0.0);
    assert_eq!(left.eye_offset, -right.eye_offset);
    assert_eq!(
        right.eye_offset - left.eye_offset,
        StereoEffect::DEFAULT_EYE_SEPARATION
    );
}

#[test]
fn resizing_the_effect_resizes_the_eye_passes() {
    let mut effect = StereoEffect::new(800, 600);
    effect.set_presenting(true);
    effect.set_size(1920, 1080);
    let passes = effect.eye_passes();
    assert_eq!(passes[0].viewport.width, 960.0);
    assert_eq!(passes[1].viewport.x, 960.0);
    assert_eq!(passes[0].viewport.height, 1080.0);
}
