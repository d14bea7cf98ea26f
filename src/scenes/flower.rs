//! Flower scene: a cone stalk topped by a bud with a tilted ring of petals,
//! and a ring of leaves turning around the stalk.

use glam::Vec3;

use super::attach_ring;
use crate::animation::{AnimationDriver, ParamRef, Spin};
use crate::camera::Camera;
use crate::config::{ConfigStore, Effect, Param, ParameterGroup};
use crate::error::Result;
use crate::factory::flower::{
    build_bud, build_leaf_ring, build_petal_ring, build_stalk, leaf_ring_transform,
    petal_ring_transform, BudParams, LeafParams, PetalParams, StalkParams,
};
use crate::math::Rgb;
use crate::scene::{DirectionalLight, Lighting, Node, SceneGraph, ROOT_NAME};

pub const STALK: &str = "stalk";
pub const BUD: &str = "flowerBud";
pub const PETAL_RING: &str = "petalRing";
pub const LEAF_RING: &str = "leafRing";
pub const PETAL_PREFIX: &str = "petal";
pub const LEAF_PREFIX: &str = "leaf";

pub const PETAL_GROUP: &str = "petal";
pub const BUD_GROUP: &str = "bud";
pub const LEAF_GROUP: &str = "leaf";
pub const STALK_GROUP: &str = "stalk";

/// Parameter groups of the flower scene at their default values
pub fn default_config() -> ConfigStore {
    ConfigStore::new()
        .with_group(
            ParameterGroup::new(PETAL_GROUP)
                .with(Param::color("color", 0xf0f700))
                .with(Param::float("radius", 5.0, 1.0, 10.0).step(1.0))
                .with(Param::int("count", 8, 1, 12)),
        )
        .with_group(
            ParameterGroup::new(BUD_GROUP)
                .with(Param::color("color", 0xa760fa))
                .with(Param::float("radius", 6.0, 1.0, 10.0).step(1.0)),
        )
        .with_group(
            ParameterGroup::new(LEAF_GROUP)
                .with(Param::color("color", 0x00ff00))
                .with(Param::float("radius", 6.0, 1.0, 10.0).step(1.0))
                .with(Param::int("count", 5, 1, 8))
                .with(
                    Param::float("speed", 0.01, 0.0, 0.1)
                        .step(0.005)
                        .with_effect(Effect::Motion),
                ),
        )
        .with_group(
            ParameterGroup::new(STALK_GROUP)
                .with(Param::color("color", 0x00702e))
                .with(Param::float("height", 30.0, 10.0, 60.0).step(1.0))
                .with(Param::float("radius", 5.0, 1.0, 10.0).step(1.0)),
        )
}

pub fn stalk_params(config: &ConfigStore) -> Result<StalkParams> {
    Ok(StalkParams {
        color: config.color(STALK_GROUP, "color")?,
        height: config.float(STALK_GROUP, "height")?,
        radius: config.float(STALK_GROUP, "radius")?,
    })
}

pub fn bud_params(config: &ConfigStore) -> Result<BudParams> {
    Ok(BudParams {
        color: config.color(BUD_GROUP, "color")?,
        radius: config.float(BUD_GROUP, "radius")?,
    })
}

pub fn petal_params(config: &ConfigStore) -> Result<PetalParams> {
    Ok(PetalParams {
        color: config.color(PETAL_GROUP, "color")?,
        radius: config.float(PETAL_GROUP, "radius")?,
        count: config.count(PETAL_GROUP, "count")?,
    })
}

pub fn leaf_params(config: &ConfigStore) -> Result<LeafParams> {
    Ok(LeafParams {
        color: config.color(LEAF_GROUP, "color")?,
        radius: config.float(LEAF_GROUP, "radius")?,
        count: config.count(LEAF_GROUP, "count")?,
    })
}

pub fn populate(scene: &mut SceneGraph, config: &ConfigStore) -> Result<()> {
    let stalk = stalk_params(config)?;
    let bud = bud_params(config)?;
    let petal = petal_params(config)?;
    let leaf = leaf_params(config)?;

    let stalk_node = build_stalk(&stalk)?;
    let bud_node = build_bud(&stalk, &bud)?;
    let petals = build_petal_ring(&petal, &bud)?;
    let leaves = build_leaf_ring(&leaf, &stalk)?;

    scene.add_child(ROOT_NAME, stalk_node.named(STALK))?;
    scene.add_child(ROOT_NAME, bud_node.named(BUD))?;
    scene.add_child(
        ROOT_NAME,
        Node::group()
            .named(PETAL_RING)
            .with_transform(petal_ring_transform(&stalk, &bud)),
    )?;
    attach_ring(scene, PETAL_RING, PETAL_PREFIX, petals)?;
    scene.add_child(
        ROOT_NAME,
        Node::group().named(LEAF_RING).with_transform(leaf_ring_transform()),
    )?;
    attach_ring(scene, LEAF_RING, LEAF_PREFIX, leaves)?;
    scene.lighting = lighting();
    Ok(())
}

/// Soft ambient fill plus one key light from the upper front right
pub fn lighting() -> Lighting {
    Lighting {
        ambient: Some(Rgb::WHITE.scaled(0.35)),
        directional: vec![DirectionalLight::from_position(
            Vec3::new(200.0, 200.0, 300.0),
            Rgb::WHITE,
            0.9,
        )],
    }
}

pub fn animation() -> AnimationDriver {
    let speed = ParamRef::new(LEAF_GROUP, "speed");
    AnimationDriver::new(speed.clone()).with_spin(Spin::always(LEAF_RING, Vec3::Z, speed))
}

pub fn camera() -> Camera {
    Camera::looking_from(Vec3::new(3.6, 39.0, 139.0), Vec3::ZERO).with_clip(1.0, 1000.0)
}
