use std::sync::Arc;

use stereoscope::{
    scene::{
        graph::{ContainerNode, SceneNode},
        material::Material,
    },
    vr::{Pose, PoseSource},
};

/// Build a container tree with `fanout` children per node, `depth` levels deep.
pub(crate) fn container_tree(depth: usize, fanout: usize) -> ContainerNode {
    let mut root = ContainerNode::new();
    if depth > 0 {
        for _ in 0..fanout {
            root.add_child(Box::new(container_tree(depth - 1, fanout)));
        }
    }
    root
}

/// Walk the subtree and assert every node references exactly `material`.
/// Returns the number of nodes visited.
pub(crate) fn assert_material_everywhere(node: &dyn SceneNode, material: &Arc<Material>) -> usize {
    let node_material = node
        .get_material()
        .expect("node was skipped by propagation");
    assert!(
        Arc::ptr_eq(node_material, material),
        "node references a different material instance"
    );
    1 + node
        .get_children()
        .iter()
        .map(|child| assert_material_everywhere(child.as_ref(), material))
        .sum::<usize>()
}

pub(crate) fn count_nodes(node: &dyn SceneNode) -> usize {
    1 + node
        .get_children()
        .iter()
        .map(|child| count_nodes(child.as_ref()))
        .sum::<usize>()
}

/// Pose source that replays a scripted sequence, repeating the last entry.
pub(crate) struct ScriptedPose {
    poses: Vec<Pose>,
    cursor: usize,
}

impl ScriptedPose {
    pub(crate) fn new(poses: Vec<Pose>) -> Self {
        Self { poses, cursor: 0 }
    }
}

impl PoseSource for ScriptedPose {
    fn sample(&mut self) -> Pose {
        let pose = self.poses[self.cursor.min(self.poses.len() - 1)];
        self.cursor += 1;
        pose
    }
}
