//! Bodies: point masses with a contact radius and a frame
//!
//! Bodies are created by [`Spacetime::create_body`](super::spacetime::Spacetime::create_body)
//! from a [`BodyDef`]; the spacetime owns them and hands out [`BodyHandle`]s.
//! A body may carry a [`CollisionEffect`], run once per impact after both
//! bodies' velocities have been updated.

use super::error::{HookError, Result, SimError};
use super::frame::Frame;
use super::serial::Record;
use super::space::Space;
use super::states::{BodyHandle, FrameState, NVec3, Quat};

/// What a collision-effect hook sees about one impact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub body: BodyHandle,       // the body whose hook is running
    pub other: BodyHandle,      // the body it hit
    pub time: f64,              // seconds into the slice
    pub delta_v: NVec3,         // velocity change applied to `body`
    pub relative_velocity: NVec3, // other's velocity minus body's, after the impact
    pub other_mass: f64,
}

/// Special behavior on impact (damage, detonation, pickup).
/// Errors propagate out of the tick that ran the hook.
pub trait CollisionEffect: Send {
    fn on_collide(&mut self, impact: &Impact) -> std::result::Result<(), HookError>;
}

impl<F> CollisionEffect for F
where
    F: FnMut(&Impact) -> std::result::Result<(), HookError> + Send,
{
    fn on_collide(&mut self, impact: &Impact) -> std::result::Result<(), HookError> {
        self(impact)
    }
}

/// Initial values for a new body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    pub mass: f64,
    pub radius: f64,
    pub state: FrameState,
}

impl BodyDef {
    pub fn new(mass: f64, radius: f64) -> Self {
        Self {
            mass,
            radius,
            state: FrameState::default(),
        }
    }

    pub fn with_position(mut self, position: NVec3) -> Self {
        self.state.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: NVec3) -> Self {
        self.state.velocity = velocity;
        self
    }

    pub fn with_heading(mut self, heading: Quat) -> Self {
        self.state.heading = heading;
        self
    }

    pub fn with_spin(mut self, spin: Quat) -> Self {
        self.state.spin = spin;
        self
    }

    /// Reject masses and radii the resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(SimError::invalid_body(format!(
                "mass must be positive and finite, got {}",
                self.mass
            )));
        }
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(SimError::invalid_body(format!(
                "radius must be non-negative and finite, got {}",
                self.radius
            )));
        }
        let s = &self.state;
        if !(s.position.iter().chain(s.velocity.iter()).all(|v| v.is_finite())) {
            return Err(SimError::invalid_body("position and velocity must be finite"));
        }
        Ok(())
    }
}

pub struct Body {
    pub(crate) mass: f64,
    pub(crate) radius: f64,
    pub(crate) frame: Frame,
    pub(crate) effect: Option<Box<dyn CollisionEffect>>,
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("mass", &self.mass)
            .field("radius", &self.radius)
            .field("frame", &self.frame)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

impl Body {
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// p = mv
    pub fn momentum(&self, space: &Space) -> NVec3 {
        self.frame.velocity(space) * self.mass
    }

    pub fn to_record(&self, space: &Space) -> Record {
        Record::new("Body")
            .with_data("mass", [self.mass])
            .with_data("radius", [self.radius])
            .with_sub("frame", self.frame.to_record(space))
    }
}
