//! The built-in scenes: node names, default parameters, initial population,
//! animation, camera and lighting.

pub mod crystal;
pub mod flower;

use clap::ValueEnum;
use log::info;

use crate::animation::AnimationDriver;
use crate::camera::Camera;
use crate::config::ConfigStore;
use crate::error::Result;
use crate::factory::RingItem;
use crate::scene::SceneGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SceneKind {
    /// Faceted core inside a ring of coloured point lights
    #[default]
    Crystal,
    /// Stalk, bud, petals and a spinning ring of leaves
    Flower,
}

/// Everything the frame loop needs for one scene
#[derive(Debug)]
pub struct SceneSetup {
    pub kind: SceneKind,
    pub scene: SceneGraph,
    pub config: ConfigStore,
    pub driver: AnimationDriver,
    pub camera: Camera,
}

impl SceneKind {
    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Crystal => "crystal",
            SceneKind::Flower => "flower",
        }
    }

    pub fn default_config(self) -> ConfigStore {
        match self {
            SceneKind::Crystal => crystal::default_config(),
            SceneKind::Flower => flower::default_config(),
        }
    }

    /// Build every node of the scene from the current parameter values
    pub fn populate(self, scene: &mut SceneGraph, config: &ConfigStore) -> Result<()> {
        match self {
            SceneKind::Crystal => crystal::populate(scene, config),
            SceneKind::Flower => flower::populate(scene, config),
        }
    }

    pub fn animation(self) -> AnimationDriver {
        match self {
            SceneKind::Crystal => crystal::animation(),
            SceneKind::Flower => flower::animation(),
        }
    }

    pub fn camera(self) -> Camera {
        match self {
            SceneKind::Crystal => crystal::camera(),
            SceneKind::Flower => flower::camera(),
        }
    }

    /// Populate a fresh scene graph from `config`. Any failure here is an
    /// initialization error.
    pub fn build(self, config: ConfigStore) -> Result<SceneSetup> {
        let mut scene = SceneGraph::new();
        self.populate(&mut scene, &config)?;
        info!(
            "built {} scene: {} nodes, {} geometries",
            self.name(),
            scene.node_count(),
            scene.live_geometry_count()
        );
        Ok(SceneSetup {
            kind: self,
            scene,
            config,
            driver: self.animation(),
            camera: self.camera(),
        })
    }
}

/// Name of the `index`-th member of a ring, e.g. `petal.3`
pub fn ring_member_name(prefix: &str, index: usize) -> String {
    format!("{prefix}.{index}")
}

/// Attach ring members under `parent` in placement order, naming each one
/// after `prefix`. Returns how many were attached.
pub fn attach_ring(
    scene: &mut SceneGraph,
    parent: &str,
    prefix: &str,
    items: Vec<RingItem>,
) -> Result<usize> {
    let parent = scene.find_group(parent)?.node();
    let count = items.len();
    for (index, item) in items.into_iter().enumerate() {
        scene.add_child_to(parent, item.node.named(ring_member_name(prefix, index)))?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_scenes_build_from_defaults() {
        for kind in [SceneKind::Crystal, SceneKind::Flower] {
            let setup = kind.build(kind.default_config()).unwrap();
            assert!(setup.scene.node_count() > 1);
            assert!(setup.scene.orphaned_names().is_empty());
            assert!(!setup.driver.spins().is_empty());
        }
    }

    #[test]
    fn test_ring_member_name() {
        assert_eq!(ring_member_name("leaf", 4), "leaf.4");
    }
}
