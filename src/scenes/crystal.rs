//! Crystal scene: an icosahedral core, static when idle and tumbling while
//! the pointer moves, inside a ring of coloured point lights that always
//! spins.

use glam::Vec3;

use super::attach_ring;
use crate::animation::{AnimationDriver, ParamRef, Spin};
use crate::camera::Camera;
use crate::config::{ConfigStore, Effect, Param, ParameterGroup};
use crate::error::Result;
use crate::factory::crystal::{build_core, build_light_ring, CoreParams, LightRingParams};
use crate::math::Rgb;
use crate::scene::{DirectionalLight, Lighting, Node, SceneGraph, ROOT_NAME};

pub const CORE: &str = "core";
pub const LIGHTS_RING: &str = "lightsRing";
pub const LIGHT_PREFIX: &str = "light";

pub const CORE_GROUP: &str = "core";
pub const LIGHTS_GROUP: &str = "lights";
pub const MOTION_GROUP: &str = "motion";

/// Parameter groups of the crystal scene at their default values
pub fn default_config() -> ConfigStore {
    ConfigStore::new()
        .with_group(
            ParameterGroup::new(CORE_GROUP)
                .with(Param::float("radius", 0.8, 0.1, 0.8))
                .with(Param::int("detail", 3, 0, 3))
                .with(Param::color("color", 0xffffff)),
        )
        .with_group(
            ParameterGroup::new(LIGHTS_GROUP)
                .with(Param::int("count", 5, 1, 12).with_label("numLights"))
                .with(Param::float("radius", 0.05, 0.01, 0.1).step(0.01))
                .with(Param::float("ring_radius", 1.0, 0.5, 2.0).with_label("ring radius"))
                .with(Param::float("intensity", 0.2, 0.1, 1.0).with_effect(Effect::Intensity)),
        )
        .with_group(
            ParameterGroup::new(MOTION_GROUP).with(
                Param::float("speed", 0.03, 0.0, 0.1)
                    .step(0.005)
                    .with_effect(Effect::Motion),
            ),
        )
}

pub fn core_params(config: &ConfigStore) -> Result<CoreParams> {
    Ok(CoreParams {
        radius: config.float(CORE_GROUP, "radius")?,
        detail: config.count(CORE_GROUP, "detail")?,
        color: config.color(CORE_GROUP, "color")?,
    })
}

pub fn light_ring_params(config: &ConfigStore) -> Result<LightRingParams> {
    Ok(LightRingParams {
        count: config.count(LIGHTS_GROUP, "count")?,
        ring_radius: config.float(LIGHTS_GROUP, "ring_radius")?,
        bulb_radius: config.float(LIGHTS_GROUP, "radius")?,
        intensity: config.float(LIGHTS_GROUP, "intensity")?,
    })
}

pub fn populate(scene: &mut SceneGraph, config: &ConfigStore) -> Result<()> {
    let core = build_core(&core_params(config)?)?;
    let lights = build_light_ring(&light_ring_params(config)?)?;

    scene.add_child(ROOT_NAME, core.named(CORE))?;
    scene.add_child(ROOT_NAME, Node::group().named(LIGHTS_RING))?;
    attach_ring(scene, LIGHTS_RING, LIGHT_PREFIX, lights)?;
    scene.lighting = lighting();
    Ok(())
}

/// Three dim white fill lights
pub fn lighting() -> Lighting {
    let fill = |x, y, z| DirectionalLight::from_position(Vec3::new(x, y, z), Rgb::WHITE, 0.1);
    Lighting {
        ambient: None,
        directional: vec![fill(1.0, 0.0, 0.0), fill(0.75, 1.0, 0.5), fill(-0.75, -1.0, 0.5)],
    }
}

pub fn animation() -> AnimationDriver {
    let speed = ParamRef::new(MOTION_GROUP, "speed");
    AnimationDriver::new(speed.clone())
        .with_spin(Spin::always(LIGHTS_RING, Vec3::ONE, speed.clone()))
        .with_spin(Spin::on_activity(CORE, Vec3::ONE, speed))
}

pub fn camera() -> Camera {
    Camera::looking_from(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO).with_clip(0.1, 1000.0)
}
