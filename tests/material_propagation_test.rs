use std::sync::Arc;

use stereoscope::scene::{
    graph::{ContainerNode, SceneNode},
    material::Material,
};

use crate::common::test_utils::{assert_material_everywhere, container_tree, count_nodes};

mod common;

#[test]
fn propagation_reaches_root_and_direct_children() {
    // root with two children and no material anywhere
    let mut root = ContainerNode::new();
    root.add_child(Box::new(ContainerNode::new()));
    root.add_child(Box::new(ContainerNode::new()));
    assert!(root.get_material().is_none());

    let material = Arc::new(Material::flat("lambert", [1.0, 0.973, 0.824, 1.0]));
    root.set_material_all(material.clone());

    assert_eq!(assert_material_everywhere(&root, &material), 3);
}

#[test]
fn propagation_reaches_every_transitive_descendant() {
    let mut root = container_tree(3, 2);
    assert_eq!(count_nodes(&root), 15);

    let material = Arc::new(Material::flat("env", [1.0; 4]));
    root.set_material_all(material.clone());

    assert_eq!(assert_material_everywhere(&root, &material), 15);
}

#[test]
fn propagation_is_idempotent() {
    let mut root = container_tree(2, 3);
    let material = Arc::new(Material::flat("m", [0.5, 0.5, 0.5, 1.0]));

    root.set_material_all(material.clone());
    root.set_material_all(material.clone());

    // Still the same instance everywhere; nothing was duplicated or dropped
    assert_eq!(assert_material_everywhere(&root, &material), count_nodes(&root));
    // The nodes only hold references, the tree itself plus this binding
    // account for all of them
    assert_eq!(Arc::strong_count(&material), count_nodes(&root) + 1);
}

#[test]
fn repropagation_replaces_earlier_assignment() {
    let mut root = container_tree(2, 2);
    let first = Arc::new(Material::flat("first", [1.0, 0.0, 0.0, 1.0]));
    let second = Arc::new(Material::flat("second", [0.0, 1.0, 0.0, 1.0]));

    root.set_material_all(first.clone());
    root.set_material_all(second.clone());

    // No node may retain the earlier material once its ancestor chain was
    // walked again
    assert_material_everywhere(&root, &second);
    assert_eq!(Arc::strong_count(&first), 1);
}

#[test]
fn propagation_on_leaf_terminates_trivially() {
    let mut leaf = ContainerNode::new();
    let material = Arc::new(Material::flat("leaf", [0.0, 0.0, 1.0, 1.0]));
    leaf.set_material_all(material.clone());
    assert_eq!(assert_material_everywhere(&leaf, &material), 1);
}
