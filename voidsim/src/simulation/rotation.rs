//! Rotor math for headings and spins
//!
//! A heading is a unit quaternion giving orientation; a spin is a unit
//! quaternion giving the rotation applied per second. All functions are pure.

use nalgebra::Unit;

use super::geometry::NORTH;
use super::states::{NVec3, Quat};

/// Axes shorter than this are treated as "no rotation"
const AXIS_EPS: f64 = 1e-12;

/// Unit quaternion rotating by `theta` radians about `axis`.
/// A zero axis gives the identity rotor.
pub fn rotor_from_angle_axis(theta: f64, axis: &NVec3) -> Quat {
    match Unit::try_new(*axis, AXIS_EPS) {
        Some(axis) => Quat::from_axis_angle(&axis, theta),
        None => Quat::identity(),
    }
}

/// Break a rotor into `(theta, axis)` with `theta = 2 acos(w)` in `[0, 2pi]`.
///
/// The sign of the quaternion is kept rather than normalized to the short
/// way round, so a spin of more than half a turn per second still scales
/// linearly with time. The identity gives `(0, zero axis)`.
pub fn angle_axis_from_rotor(q: &Quat) -> (f64, NVec3) {
    let w = q.scalar().clamp(-1.0, 1.0);
    let theta = 2.0 * w.acos();
    let half_sin = (theta / 2.0).sin();
    if half_sin.abs() < AXIS_EPS {
        return (0.0, NVec3::zeros());
    }
    (theta, q.imag() / half_sin)
}

/// p' = q p q^-1
pub fn rotate_vector(v: &NVec3, rotor: &Quat) -> NVec3 {
    rotor.transform_vector(v)
}

/// The forward unit vector (north) as turned by `heading`
pub fn facing(heading: &Quat) -> NVec3 {
    rotate_vector(&NORTH, heading)
}

/// Advance `heading` by `dt` seconds of `spin`
pub fn increment_heading(heading: &Quat, spin: &Quat, dt: f64) -> Quat {
    let (theta, axis) = angle_axis_from_rotor(spin);
    rotor_from_angle_axis(theta * dt, &axis) * heading
}
