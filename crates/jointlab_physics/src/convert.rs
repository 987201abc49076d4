//! Conversions between the public glam types and the engine's nalgebra types

use glam::{Quat, Vec3};
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::Real;

/// Convert a glam vector to an engine vector.
#[inline]
pub fn to_na_vec(v: Vec3) -> Vector3<Real> {
    Vector3::new(v.x, v.y, v.z)
}

/// Convert an engine vector to a glam vector.
#[inline]
pub fn to_vec3(v: &Vector3<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Convert an engine rotation to a glam quaternion.
#[inline]
pub fn to_quat(q: &UnitQuaternion<Real>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Build a full engine pose from glam position and rotation.
#[inline]
pub fn to_iso(position: Vec3, rotation: Quat) -> Isometry3<Real> {
    Isometry3::from_parts(
        Translation3::new(position.x, position.y, position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(
            rotation.w, rotation.x, rotation.y, rotation.z,
        )),
    )
}

/// Pure-translation pose, the anchor-frame form used by joints.
#[inline]
pub fn translation_iso(v: Vec3) -> Isometry3<Real> {
    Isometry3::translation(v.x, v.y, v.z)
}
