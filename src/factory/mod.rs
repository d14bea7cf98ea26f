//! Primitive factory: pure functions from parameter snapshots to detached
//! [`Node`]s. Nothing here touches a scene graph.
//!
//! Identical snapshots always produce identical shapes, so a regenerated
//! primitive is indistinguishable from one built cold.

pub mod crystal;
pub mod flower;

use std::f32::consts::TAU;

use glam::Vec3;

use crate::error::{Result, SceneError};
use crate::scene::Node;

/// What a primitive is for; used in logs and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Core,
    LightBulb,
    Petal,
    Leaf,
    Stalk,
    Bud,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Core => "core",
            Role::LightBulb => "light-bulb",
            Role::Petal => "petal",
            Role::Leaf => "leaf",
            Role::Stalk => "stalk",
            Role::Bud => "bud",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One member of a ring, with the angle it was placed at
#[derive(Debug)]
pub struct RingItem {
    pub angle: f32,
    pub node: Node,
}

/// Evenly spaced angles: item `i` of `count` sits at `2π·i/count`
pub fn ring_angles(count: u32) -> Result<Vec<f32>> {
    if count == 0 {
        return Err(SceneError::invalid("count", "a ring needs at least one item"));
    }
    Ok((0..count)
        .map(|i| TAU * i as f32 / count as f32)
        .collect())
}

/// Position on a ring of `radius` in the local XY plane
pub fn ring_position(angle: f32, radius: f32) -> Vec3 {
    Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
}

pub(crate) fn require_finite(role: Role, name: &str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SceneError::invalid(
            format!("{role}.{name}"),
            format!("{value} is not finite"),
        ))
    }
}

/// Re-label geometry validation errors with the role they came from
pub(crate) fn for_role<T>(role: Role, result: Result<T>) -> Result<T> {
    result.map_err(|err| match err {
        SceneError::InvalidParameter { name, reason } => SceneError::InvalidParameter {
            name: format!("{role}.{name}"),
            reason,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_angles_even_spacing() {
        let angles = ring_angles(5).unwrap();
        let degrees: Vec<f32> = angles.iter().map(|a| a.to_degrees().round()).collect();
        assert_eq!(degrees, [0.0, 72.0, 144.0, 216.0, 288.0]);
    }

    #[test]
    fn test_ring_angles_exact_and_increasing() {
        for count in 1..=64u32 {
            let angles = ring_angles(count).unwrap();
            assert_eq!(angles.len(), count as usize);
            for (i, angle) in angles.iter().enumerate() {
                assert_eq!(*angle, TAU * i as f32 / count as f32, "count {count}, item {i}");
            }
            assert_eq!(angles[0], 0.0);
            assert!(angles.windows(2).all(|w| w[0] < w[1]), "count {count}");
            assert!(*angles.last().unwrap() < TAU, "count {count}");
        }
    }

    #[test]
    fn test_ring_angles_zero_count() {
        assert!(ring_angles(0).is_err());
    }

    #[test]
    fn test_single_item_ring() {
        assert_eq!(ring_angles(1).unwrap(), [0.0]);
    }

    #[test]
    fn test_ring_position() {
        let p = ring_position(std::f32::consts::FRAC_PI_2, 2.0);
        assert!((p - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_role_labels_errors() {
        let err = for_role(Role::Petal, crate::geometry::uv_sphere(-1.0, 8, 8)).unwrap_err();
        assert!(err.to_string().contains("petal.radius"));
    }
}
