//! Fixed coordinate conversions used by the read-only frame views
//!
//! Conventions (navigation style, all angles in degrees):
//! - north is +y, east is +x, zenith is +z
//! - `theta` is a bearing measured east of north in `[0, 360)`
//! - `phi` is the declination from zenith in `[0, 180]`
//! - both angles are 0 when `rho` is 0, so the origin has a defined form

use serde::{Deserialize, Serialize};

use super::states::NVec3;

pub const EAST: NVec3 = NVec3::new(1.0, 0.0, 0.0);
pub const NORTH: NVec3 = NVec3::new(0.0, 1.0, 0.0);
pub const ZENITH: NVec3 = NVec3::new(0.0, 0.0, 1.0);

/// Spherical form (rho, theta, phi)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub rho: f64,   // distance from origin
    pub theta: f64, // bearing east of north
    pub phi: f64,   // declination from zenith
}

/// Cylindrical form (rho, theta, z)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylindrical {
    pub rho: f64,   // distance from the z axis
    pub theta: f64, // bearing east of north
    pub z: f64,     // height above the xy plane
}

/// Bearing of the (x, y) projection, east of north, in `[0, 360)`
fn bearing(x: f64, y: f64) -> f64 {
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    let deg = x.atan2(y).to_degrees().rem_euclid(360.0);
    // rem_euclid can round a tiny negative angle up to exactly 360
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

pub fn to_spherical(v: &NVec3) -> Spherical {
    let rho = v.norm();
    if rho == 0.0 {
        return Spherical { rho: 0.0, theta: 0.0, phi: 0.0 };
    }
    let phi = (v.z / rho).clamp(-1.0, 1.0).acos().to_degrees();
    Spherical {
        rho,
        theta: bearing(v.x, v.y),
        phi,
    }
}

pub fn from_spherical(s: &Spherical) -> NVec3 {
    let theta = s.theta.to_radians();
    let phi = s.phi.to_radians();
    NVec3::new(
        s.rho * phi.sin() * theta.sin(),
        s.rho * phi.sin() * theta.cos(),
        s.rho * phi.cos(),
    )
}

pub fn to_cylindrical(v: &NVec3) -> Cylindrical {
    Cylindrical {
        rho: v.x.hypot(v.y),
        theta: bearing(v.x, v.y),
        z: v.z,
    }
}

pub fn from_cylindrical(c: &Cylindrical) -> NVec3 {
    let theta = c.theta.to_radians();
    NVec3::new(c.rho * theta.sin(), c.rho * theta.cos(), c.z)
}
