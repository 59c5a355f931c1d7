//! Impulse response for a pair of colliding point masses
//!
//! J = -(1 + e) (v_a - v_b) . n / (1/m_a + 1/m_b)
//! dv_a = n J / m_a
//! dv_b = -n J / m_b
//!
//! `n` points from body a towards body b. Body a receives the impulse `n J`,
//! body b the opposite one.

use nalgebra::Unit;

use super::states::NVec3;

/// Direction from `pos_a` to `pos_b`. When the centres coincide, falls back
/// to the direction a is travelling relative to b. `None` if that is zero
/// too, in which case no impulse is exchanged.
pub fn contact_normal(
    pos_a: &NVec3,
    pos_b: &NVec3,
    vel_a: &NVec3,
    vel_b: &NVec3,
) -> Option<Unit<NVec3>> {
    Unit::try_new(pos_b - pos_a, f64::EPSILON)
        .or_else(|| Unit::try_new(vel_a - vel_b, f64::EPSILON))
}

/// Impulse received by body a for an impact along `normal`
pub fn impulse(
    restitution: f64,
    normal: &Unit<NVec3>,
    vel_a: &NVec3,
    vel_b: &NVec3,
    mass_a: f64,
    mass_b: f64,
) -> NVec3 {
    let n = normal.as_ref();
    let approach = (vel_a - vel_b).dot(n); // closing speed along n, positive when approaching
    let j = -(1.0 + restitution) * approach / (1.0 / mass_a + 1.0 / mass_b);
    n * j
}

/// Velocity changes `(dv_a, dv_b)` for an impact along `normal`
pub fn delta_v(
    restitution: f64,
    normal: &Unit<NVec3>,
    vel_a: &NVec3,
    vel_b: &NVec3,
    mass_a: f64,
    mass_b: f64,
) -> (NVec3, NVec3) {
    let j = impulse(restitution, normal, vel_a, vel_b, mass_a, mass_b);
    (j / mass_a, -j / mass_b)
}
