//! Core state types for the spacetime kernel.
//!
//! Defines the value types shared by every layer:
//! - `NVec3` / `Quat` aliases over nalgebra
//! - `FrameState`, the plain kinematic row of one body
//! - `DomainId`, `Slot` and `BodyHandle`, the integer handles minted by the allocators

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::geometry::{to_cylindrical, to_spherical, Cylindrical, Spherical};
use super::rotation::facing;

pub type NVec3 = Vector3<f64>;
pub type Quat = UnitQuaternion<f64>;

/// Index of a domain inside a [`Space`](super::space::Space)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainId(pub(crate) usize);

impl DomainId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One row of domain storage: a domain plus the slot index inside it.
/// Only the allocator in `space.rs` mints these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub(crate) domain: DomainId,
    pub(crate) index: usize,
}

impl Slot {
    pub fn domain(self) -> DomainId {
        self.domain
    }

    pub fn index(self) -> usize {
        self.index
    }
}

/// Stable arena handle for a body owned by a [`Spacetime`](super::spacetime::Spacetime).
/// The generation makes handles of destroyed bodies fail lookups instead of
/// aliasing whatever body reuses the arena entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl BodyHandle {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}v{}", self.index, self.generation)
    }
}

/// Kinematic state of one body, detached from any storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub position: NVec3, // position
    pub velocity: NVec3, // change in position per second
    pub heading: Quat,   // orientation
    pub spin: Quat,      // change in orientation per second
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            position: NVec3::zeros(),
            velocity: NVec3::zeros(),
            heading: Quat::identity(),
            spin: Quat::identity(),
        }
    }
}

impl FrameState {
    /// A motionless, unrotated state at `position`
    pub fn at_rest(position: NVec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Where this state would be after drifting for `seconds`
    pub fn pos_after(&self, seconds: f64) -> NVec3 {
        self.position + self.velocity * seconds
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Unit vector the heading points along
    pub fn facing(&self) -> NVec3 {
        facing(&self.heading)
    }

    pub fn position_polar(&self) -> Spherical {
        to_spherical(&self.position)
    }

    pub fn velocity_polar(&self) -> Spherical {
        to_spherical(&self.velocity)
    }

    pub fn position_cylindrical(&self) -> Cylindrical {
        to_cylindrical(&self.position)
    }

    pub fn velocity_cylindrical(&self) -> Cylindrical {
        to_cylindrical(&self.velocity)
    }

    /// This state expressed relative to `pov`: differences of position and
    /// velocity, quotients of heading and spin.
    pub fn relative_to(&self, pov: &FrameState) -> FrameState {
        FrameState {
            position: self.position - pov.position,
            velocity: self.velocity - pov.velocity,
            heading: self.heading / pov.heading,
            spin: self.spin / pov.spin,
        }
    }
}
