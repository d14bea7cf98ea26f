use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local transform of a scene node.
///
/// Rotation is stored as XYZ Euler angles in radians so per-frame spins can
/// be accumulated axis by axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the rotation from a quaternion, decomposed into XYZ Euler angles
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        let (x, y, z) = orientation.to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
        self
    }

    /// Add `delta` to the Euler angles
    pub fn rotate_by(&mut self, delta: Vec3) {
        self.rotation += delta;
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut t = Transform::IDENTITY;
        t.rotate_by(Vec3::splat(0.03));
        t.rotate_by(Vec3::splat(0.03));
        assert!((t.rotation - Vec3::splat(0.06)).length() < 1e-6);
    }

    #[test]
    fn test_orientation_round_trip() {
        let q = Quat::from_rotation_z(0.4) * Quat::from_rotation_y(0.7);
        let t = Transform::IDENTITY.with_orientation(q);
        for v in [Vec3::X, Vec3::Y, Vec3::Z] {
            assert!((t.orientation() * v - q * v).length() < 1e-4);
        }
    }

    #[test]
    fn test_matrix_applies_translation_after_rotation() {
        let t = Transform::from_position(Vec3::new(0.0, 2.0, 0.0))
            .with_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0));
        let p = t.matrix().transform_point3(Vec3::Y);
        assert!((p - Vec3::new(0.0, 2.0, 1.0)).length() < 1e-5);
    }
}
