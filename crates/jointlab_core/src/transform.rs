//! Position, rotation, and scale with a derived model matrix

use glam::{Mat4, Quat, Vec3};

/// A world-space transform.
///
/// The model matrix composes scale, then rotation, then translation, in
/// that fixed order. Rotation normalization is delegated to the physics
/// engine that writes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Orientation as a unit quaternion
    pub rotation: Quat,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform (no translation, rotation, or scale change).
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Transform with just a position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Transform with position and scale.
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale,
        }
    }

    /// The model matrix: scale, then rotation, then translation.
    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Transform a point from local space to world space.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-4;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(t.transform_point(p), p));
    }

    #[test]
    fn test_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(vec_approx_eq(
            t.transform_point(Vec3::ZERO),
            Vec3::new(1.0, 2.0, 3.0)
        ));
    }

    #[test]
    fn test_scale() {
        let t = Transform::from_position_scale(Vec3::ZERO, Vec3::splat(2.0));
        assert!(vec_approx_eq(
            t.transform_point(Vec3::ONE),
            Vec3::splat(2.0)
        ));
    }

    #[test]
    fn test_transform_order() {
        // Scale first, then rotate, then translate.
        let mut t = Transform::identity();
        t.scale = Vec3::splat(2.0);
        t.rotation = Quat::from_rotation_z(PI / 2.0);
        t.position = Vec3::new(10.0, 0.0, 0.0);

        // X * 2 = (2, 0, 0), rotated 90 degrees about Z = (0, 2, 0),
        // + (10, 0, 0) = (10, 2, 0).
        let p = t.transform_point(Vec3::X);
        assert!(vec_approx_eq(p, Vec3::new(10.0, 2.0, 0.0)), "got {p:?}");
    }

    #[test]
    fn test_model_matrix_matches_transform_point() {
        let mut t = Transform::from_position(Vec3::new(1.0, -2.0, 0.5));
        t.rotation = Quat::from_rotation_y(0.4);
        t.scale = Vec3::new(2.0, 0.5, 3.0);

        let p = Vec3::new(0.3, 0.7, -0.2);
        let via_matrix = t.model_matrix().transform_point3(p);
        assert!(vec_approx_eq(via_matrix, t.transform_point(p)));
    }

    #[test]
    fn test_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }
}
