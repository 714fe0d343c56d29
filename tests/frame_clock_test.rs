use instant::{Duration, Instant};

use stereoscope::{
    clock::{FrameClock, MAX_FRAME_DELTA},
    scene::graph::{ContainerNode, SceneNode, Spin},
};

#[test]
fn first_advance_yields_zero() {
    let mut clock = FrameClock::new();
    assert_eq!(clock.advance(Instant::now()), Duration::ZERO);
}

#[test]
fn deltas_follow_the_timestamps() {
    let mut clock = FrameClock::new();
    let base = Instant::now();
    clock.advance(base);
    assert_eq!(
        clock.advance(base + Duration::from_millis(16)),
        Duration::from_millis(16)
    );
    assert_eq!(
        clock.advance(base + Duration::from_millis(48)),
        Duration::from_millis(32)
    );
}

#[test]
fn delta_is_clamped_after_a_stall() {
    let mut clock = FrameClock::new();
    let base = Instant::now();
    clock.advance(base);
    // A one second gap (e.g. a backgrounded tab) must not come through as one
    // full second
    assert_eq!(clock.advance(base + Duration::from_secs(1)), MAX_FRAME_DELTA);
}

#[test]
fn previous_timestamp_moves_forward_even_when_clamped() {
    let mut clock = FrameClock::new();
    let base = Instant::now();
    clock.advance(base);
    assert_eq!(clock.advance(base + Duration::from_secs(2)), MAX_FRAME_DELTA);
    // The 2s mark became the new previous timestamp, so the next small step
    // is measured from there
    assert_eq!(
        clock.advance(base + Duration::from_millis(2100)),
        Duration::from_millis(100)
    );
}

#[test]
fn deltas_are_never_negative_or_above_the_ceiling() {
    let mut clock = FrameClock::new();
    let base = Instant::now();
    let steps = [0u64, 5, 5, 700, 12, 3000, 16, 16];
    let mut now = base;
    for step in steps {
        now = now + Duration::from_millis(step);
        let delta = clock.advance(now);
        assert!(delta <= MAX_FRAME_DELTA);
    }
    // Out-of-order timestamps saturate instead of underflowing
    assert_eq!(clock.advance(base), Duration::ZERO);
}

#[test]
fn wider_ceilings_pass_wider_deltas_through() {
    let mut clock = FrameClock::with_max_delta(Duration::from_millis(750));
    let base = Instant::now();
    clock.advance(base);
    assert_eq!(
        clock.advance(base + Duration::from_millis(600)),
        Duration::from_millis(600)
    );
}

#[test]
fn spin_accumulates_rate_times_delta() {
    let mut node = ContainerNode::new();
    node.set_spin(Some(Spin::about_y(0.0002)));

    // 600ms at 0.0002 rad/ms
    node.advance(Duration::from_millis(600));
    assert!((node.spin_angle() - 0.12).abs() < 1e-6);

    node.advance(Duration::from_millis(500));
    assert!((node.spin_angle() - 0.22).abs() < 1e-6);
}

#[test]
fn spin_propagates_to_children() {
    let mut root = ContainerNode::new();
    let mut child = ContainerNode::new();
    child.set_spin(Some(Spin::about_y(0.001)));
    root.add_child(Box::new(child));

    root.advance(Duration::from_millis(100));

    // The unanimated root only passes the delta on
    assert_eq!(root.spin_angle(), 0.0);
    assert!((root.get_children()[0].spin_angle() - 0.1).abs() < 1e-6);
}

#[test]
fn advance_without_spin_is_a_no_op() {
    let mut node = ContainerNode::new();
    let before = node.get_local_transform();
    node.advance(Duration::from_millis(250));
    assert_eq!(node.spin_angle(), 0.0);
    let after = node.get_local_transform();
    assert_eq!(before.rotation, after.rotation);
    assert_eq!(before.position, after.position);
}
