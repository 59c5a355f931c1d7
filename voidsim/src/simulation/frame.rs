//! Frames of reference
//!
//! A [`Frame`] is how a body reaches its kinematic row. It is either
//! - bound: a [`Slot`] in a domain of a [`Space`]; reads and writes go through
//!   to the shared arrays
//! - virtual: a self-contained [`FrameState`], registered nowhere
//!
//! Frames are deliberately not `Clone`: a bound frame owns its slot, and the
//! only ways out of that ownership are [`Frame::detach`] and
//! [`Frame::release`].

use super::geometry::{Cylindrical, Spherical};
use super::serial::Record;
use super::space::Space;
use super::states::{DomainId, FrameState, NVec3, Quat, Slot};
use super::error::{Result, SimError};

#[derive(Debug, PartialEq)]
enum Binding {
    Bound(Slot),
    Virtual(FrameState),
}

#[derive(Debug, PartialEq)]
pub struct Frame {
    binding: Binding,
}

impl Frame {
    /// Allocate a slot in `domain` and store `state` in it
    pub fn bind(space: &mut Space, domain: DomainId, state: &FrameState) -> Self {
        let slot = space.allocate_slot(domain);
        space.write(slot, state);
        Self {
            binding: Binding::Bound(slot),
        }
    }

    /// A frame holding its own values
    pub fn detached(state: FrameState) -> Self {
        Self {
            binding: Binding::Virtual(state),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.binding, Binding::Virtual(_))
    }

    pub fn slot(&self) -> Option<Slot> {
        match self.binding {
            Binding::Bound(slot) => Some(slot),
            Binding::Virtual(_) => None,
        }
    }

    /// Domain this frame lives in; `None` for virtual frames
    pub fn domain(&self) -> Option<DomainId> {
        self.slot().map(Slot::domain)
    }

    /// Full kinematic state, copied out
    pub fn state(&self, space: &Space) -> FrameState {
        match &self.binding {
            Binding::Bound(slot) => space.read(*slot),
            Binding::Virtual(state) => *state,
        }
    }

    pub fn position(&self, space: &Space) -> NVec3 {
        match &self.binding {
            Binding::Bound(slot) => space.position(*slot),
            Binding::Virtual(state) => state.position,
        }
    }

    pub fn velocity(&self, space: &Space) -> NVec3 {
        match &self.binding {
            Binding::Bound(slot) => space.velocity(*slot),
            Binding::Virtual(state) => state.velocity,
        }
    }

    pub fn heading(&self, space: &Space) -> Quat {
        self.state(space).heading
    }

    pub fn spin(&self, space: &Space) -> Quat {
        self.state(space).spin
    }

    pub fn set_state(&mut self, space: &mut Space, state: &FrameState) {
        match &mut self.binding {
            Binding::Bound(slot) => space.write(*slot, state),
            Binding::Virtual(own) => *own = *state,
        }
    }

    pub fn set_position(&mut self, space: &mut Space, position: &NVec3) {
        match &mut self.binding {
            Binding::Bound(slot) => space.set_position(*slot, position),
            Binding::Virtual(state) => state.position = *position,
        }
    }

    pub fn set_velocity(&mut self, space: &mut Space, velocity: &NVec3) {
        match &mut self.binding {
            Binding::Bound(slot) => space.set_velocity(*slot, velocity),
            Binding::Virtual(state) => state.velocity = *velocity,
        }
    }

    pub fn add_velocity(&mut self, space: &mut Space, dv: &NVec3) {
        match &mut self.binding {
            Binding::Bound(slot) => space.add_velocity(*slot, dv),
            Binding::Virtual(state) => state.velocity += dv,
        }
    }

    pub fn set_heading(&mut self, space: &mut Space, heading: Quat) {
        match &mut self.binding {
            Binding::Bound(slot) => space.set_heading(*slot, heading),
            Binding::Virtual(state) => state.heading = heading,
        }
    }

    pub fn set_spin(&mut self, space: &mut Space, spin: Quat) {
        match &mut self.binding {
            Binding::Bound(slot) => space.set_spin(*slot, spin),
            Binding::Virtual(state) => state.spin = spin,
        }
    }

    pub fn position_polar(&self, space: &Space) -> Spherical {
        self.state(space).position_polar()
    }

    pub fn velocity_polar(&self, space: &Space) -> Spherical {
        self.state(space).velocity_polar()
    }

    pub fn position_cylindrical(&self, space: &Space) -> Cylindrical {
        self.state(space).position_cylindrical()
    }

    pub fn velocity_cylindrical(&self, space: &Space) -> Cylindrical {
        self.state(space).velocity_cylindrical()
    }

    pub fn speed(&self, space: &Space) -> f64 {
        self.velocity(space).norm()
    }

    pub fn pos_after(&self, space: &Space, seconds: f64) -> NVec3 {
        self.state(space).pos_after(seconds)
    }

    /// A virtual frame describing this one from the perspective of `pov`.
    /// Nothing is written to `space`.
    pub fn as_seen_from(&self, pov: &Frame, space: &Space) -> Frame {
        Frame::detached(self.state(space).relative_to(&pov.state(space)))
    }

    /// A virtual copy of the current values
    pub fn snapshot(&self, space: &Space) -> Frame {
        Frame::detached(self.state(space))
    }

    /// Turn a bound frame into an equivalent virtual one and free its slot.
    /// Virtual frames are left as they are.
    pub fn detach(&mut self, space: &mut Space) {
        if let Binding::Bound(slot) = self.binding {
            let state = space.read(slot);
            space.free_slot(slot);
            self.binding = Binding::Virtual(state);
        }
    }

    /// Move this frame into `domain`, keeping its values. A bound frame gives
    /// up its old slot first.
    pub fn attach(&mut self, space: &mut Space, domain: DomainId) {
        if self.domain() == Some(domain) {
            return;
        }
        self.detach(space);
        let state = self.state(space);
        *self = Frame::bind(space, domain, &state);
    }

    /// Give the slot (if any) back to `space`, consuming the frame
    pub fn release(self, space: &mut Space) {
        if let Binding::Bound(slot) = self.binding {
            space.free_slot(slot);
        }
    }

    pub fn to_record(&self, space: &Space) -> Record {
        let state = self.state(space);
        let heading = state.heading.into_inner();
        let spin = state.spin.into_inner();

        let mut record = Record::new("Frame")
            .with_data("pos", state.position.iter().copied())
            .with_data("vel", state.velocity.iter().copied());
        if let Some(domain) = self.domain() {
            record = record.with_data("domain", [domain.index() as f64]);
        }
        record.with_sub(
            "rotation",
            Record::new("Rotation")
                .with_data("heading", [heading.w, heading.i, heading.j, heading.k])
                .with_data("spin", [spin.w, spin.i, spin.j, spin.k]),
        )
    }

    /// Rebuild a frame from [`Frame::to_record`] output. A recorded domain is
    /// bound again (to a fresh slot); records without one come back virtual.
    pub fn from_record(record: &Record, space: &mut Space) -> Result<Self> {
        record.expect_type("Frame")?;
        let rotation = record.sub("rotation")?;
        rotation.expect_type("Rotation")?;

        let state = FrameState {
            position: record.vector("pos")?,
            velocity: record.vector("vel")?,
            heading: rotation.quaternion("heading")?,
            spin: rotation.quaternion("spin")?,
        };

        match record.data.get("domain") {
            None => Ok(Frame::detached(state)),
            Some(values) => {
                let raw = match values.as_slice() {
                    [raw] if *raw >= 0.0 && raw.fract() == 0.0 => *raw as usize,
                    _ => {
                        return Err(SimError::malformed(
                            "Frame.domain must be one non-negative integer",
                        ))
                    }
                };
                let domain = DomainId(raw);
                if !space.contains_domain(domain) {
                    return Err(SimError::malformed(format!("Frame.domain {raw} does not exist")));
                }
                Ok(Frame::bind(space, domain, &state))
            }
        }
    }
}
