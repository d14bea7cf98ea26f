//! Stalk, bud, petal ring and leaf ring of the flower assembly.
//!
//! Placement radii are sums of component radii so the parts stay visually
//! attached whatever the individual sizes are.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use super::{for_role, require_finite, ring_angles, ring_position, RingItem, Role};
use crate::error::Result;
use crate::geometry::{cone, extruded_fan, uv_sphere, Geometry};
use crate::math::{Rgb, Transform};
use crate::scene::{Material, Node};

pub const STALK_SEGMENTS: u32 = 26;
pub const SPHERE_SEGMENTS: u32 = 32;
/// How far petals sink into the bud
pub const PETAL_OVERLAP: f32 = 2.0;
/// How far the bud sinks into the top of the stalk
pub const BUD_SINK: f32 = 1.0;
pub const LEAF_DEPTH: f32 = 4.0;
pub const LEAF_ARC_DIVISIONS: u32 = 50;
pub const LEAF_RING_HEIGHT: f32 = -4.0;
/// Tilt of the petal ring about X
pub const PETAL_RING_TILT: f32 = PI / 1.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StalkParams {
    pub color: Rgb,
    pub height: f32,
    pub radius: f32,
}

impl Default for StalkParams {
    fn default() -> Self {
        Self {
            color: Rgb::from_hex(0x00702e),
            height: 30.0,
            radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudParams {
    pub color: Rgb,
    pub radius: f32,
}

impl Default for BudParams {
    fn default() -> Self {
        Self {
            color: Rgb::from_hex(0xa760fa),
            radius: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetalParams {
    pub color: Rgb,
    pub radius: f32,
    pub count: u32,
}

impl Default for PetalParams {
    fn default() -> Self {
        Self {
            color: Rgb::from_hex(0xf0f700),
            radius: 5.0,
            count: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafParams {
    pub color: Rgb,
    pub radius: f32,
    pub count: u32,
}

impl Default for LeafParams {
    fn default() -> Self {
        Self {
            color: Rgb::from_hex(0x00ff00),
            radius: 6.0,
            count: 5,
        }
    }
}

pub fn stalk_geometry(stalk: &StalkParams) -> Result<Geometry> {
    for_role(
        Role::Stalk,
        cone(stalk.radius, stalk.height, STALK_SEGMENTS, STALK_SEGMENTS),
    )
}

pub fn build_stalk(stalk: &StalkParams) -> Result<Node> {
    Ok(Node::mesh(stalk_geometry(stalk)?, Material::smooth(stalk.color)))
}

/// Height of the bud centre: on top of the stalk, sunk in by [`BUD_SINK`]
pub fn bud_height(stalk: &StalkParams, bud: &BudParams) -> f32 {
    stalk.height / 2.0 + bud.radius - BUD_SINK
}

pub fn bud_transform(stalk: &StalkParams, bud: &BudParams) -> Transform {
    Transform::from_position(Vec3::new(0.0, bud_height(stalk, bud), 0.0))
        .with_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0))
}

pub fn bud_geometry(bud: &BudParams) -> Result<Geometry> {
    for_role(Role::Bud, uv_sphere(bud.radius, SPHERE_SEGMENTS, SPHERE_SEGMENTS))
}

pub fn build_bud(stalk: &StalkParams, bud: &BudParams) -> Result<Node> {
    Ok(Node::mesh(bud_geometry(bud)?, Material::smooth(bud.color))
        .with_transform(bud_transform(stalk, bud)))
}

/// Transform of the group holding the petals: centred on the bud, tilted
pub fn petal_ring_transform(stalk: &StalkParams, bud: &BudParams) -> Transform {
    Transform::from_position(Vec3::new(0.0, bud_height(stalk, bud), 0.0))
        .with_rotation(Vec3::new(PETAL_RING_TILT, 0.0, 0.0))
}

pub fn petal_placement_radius(petal: &PetalParams, bud: &BudParams) -> f32 {
    petal.radius + bud.radius - PETAL_OVERLAP
}

pub fn build_petal_ring(petal: &PetalParams, bud: &BudParams) -> Result<Vec<RingItem>> {
    let placement = require_finite(Role::Petal, "placement", petal_placement_radius(petal, bud))?;
    let angles = for_role(Role::Petal, ring_angles(petal.count))?;
    angles
        .into_iter()
        .map(|angle| {
            let geometry = for_role(
                Role::Petal,
                uv_sphere(petal.radius, SPHERE_SEGMENTS, SPHERE_SEGMENTS),
            )?;
            let node = Node::mesh(geometry, Material::smooth(petal.color))
                .at(ring_position(angle, placement));
            Ok(RingItem { angle, node })
        })
        .collect()
}

/// Transform of the group holding the leaves; the ring spins about its Z
pub fn leaf_ring_transform() -> Transform {
    Transform::from_position(Vec3::new(0.0, LEAF_RING_HEIGHT, 0.0))
        .with_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0))
}

pub fn leaf_placement_radius(leaf: &LeafParams, stalk: &StalkParams) -> f32 {
    leaf.radius + stalk.radius
}

/// Each leaf is flipped half a turn more than the previous one about Z,
/// then tilted about its own Y
pub fn leaf_orientation(index: u32) -> Quat {
    Quat::from_rotation_z(PI * (index + 1) as f32) * Quat::from_rotation_y(PI / 1.4)
}

pub fn build_leaf_ring(leaf: &LeafParams, stalk: &StalkParams) -> Result<Vec<RingItem>> {
    let placement = require_finite(Role::Leaf, "placement", leaf_placement_radius(leaf, stalk))?;
    let angles = for_role(Role::Leaf, ring_angles(leaf.count))?;
    angles
        .into_iter()
        .zip(0u32..)
        .map(|(angle, index)| {
            let geometry = for_role(
                Role::Leaf,
                extruded_fan(leaf.radius, LEAF_DEPTH, LEAF_ARC_DIVISIONS),
            )?;
            let transform = Transform::from_position(ring_position(angle, placement))
                .with_orientation(leaf_orientation(index));
            let node = Node::mesh(geometry, Material::smooth(leaf.color)).with_transform(transform);
            Ok(RingItem { angle, node })
        })
        .collect()
}
