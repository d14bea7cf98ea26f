//! Faceted core and the ring of point lights orbiting it.

use super::{for_role, require_finite, ring_angles, ring_position, RingItem, Role};
use crate::error::{Result, SceneError};
use crate::geometry::{icosahedron, uv_sphere, Geometry};
use crate::math::{golden_hue, Rgb};
use crate::scene::{Material, Node, PointLight};

pub const BULB_SEGMENTS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreParams {
    pub radius: f32,
    pub detail: u32,
    pub color: Rgb,
}

impl Default for CoreParams {
    fn default() -> Self {
        Self {
            radius: 0.8,
            detail: 3,
            color: Rgb::WHITE,
        }
    }
}

pub fn core_geometry(params: &CoreParams) -> Result<Geometry> {
    for_role(Role::Core, icosahedron(params.radius, params.detail))
}

pub fn core_material(params: &CoreParams) -> Material {
    Material::flat(params.color)
}

pub fn build_core(params: &CoreParams) -> Result<Node> {
    Ok(Node::mesh(core_geometry(params)?, core_material(params)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRingParams {
    pub count: u32,
    /// Distance of each light from the ring centre
    pub ring_radius: f32,
    /// Radius of the small sphere marking each light
    pub bulb_radius: f32,
    pub intensity: f32,
}

impl Default for LightRingParams {
    fn default() -> Self {
        Self {
            count: 5,
            ring_radius: 1.0,
            bulb_radius: 0.05,
            intensity: 0.2,
        }
    }
}

/// Colour of the n-th light; stable across rebuilds
pub fn light_color(index: u32) -> Rgb {
    Rgb::from_hsv(golden_hue(index), 0.65, 1.0)
}

pub fn bulb_geometry(params: &LightRingParams) -> Result<Geometry> {
    for_role(
        Role::LightBulb,
        uv_sphere(params.bulb_radius, BULB_SEGMENTS, BULB_SEGMENTS),
    )
}

/// Point lights evenly spaced on a circle, each carrying an unlit bulb mesh
/// in its own colour.
pub fn build_light_ring(params: &LightRingParams) -> Result<Vec<RingItem>> {
    let radius = require_finite(Role::LightBulb, "ring_radius", params.ring_radius)?;
    let intensity = require_finite(Role::LightBulb, "intensity", params.intensity)?;
    if intensity < 0.0 {
        return Err(SceneError::invalid(
            "light-bulb.intensity",
            format!("{intensity} is negative"),
        ));
    }

    let angles = for_role(Role::LightBulb, ring_angles(params.count))?;
    angles
        .into_iter()
        .zip(0u32..)
        .map(|(angle, index)| {
            let color = light_color(index);
            let bulb = Node::mesh(bulb_geometry(params)?, Material::unlit(color));
            let node = Node::point_light(PointLight { color, intensity })
                .at(ring_position(angle, radius))
                .with_child(bulb);
            Ok(RingItem { angle, node })
        })
        .collect()
}
