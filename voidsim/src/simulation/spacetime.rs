//! The simulation session: body registry plus the stepper
//!
//! A [`Spacetime`] owns
//! - the [`Space`] holding every domain's kinematic rows
//! - an arena of [`Body`]s addressed by generational [`BodyHandle`]s
//! - the pre- and post-tick callback lists
//!
//! [`Spacetime::progress`] advances time. Each of its `granularity` slices
//! repeatedly finds the earliest same-domain collision in what is left of the
//! slice, drifts everything up to it, resolves it (along with any pair touching
//! at the same instant) and searches again with the new velocities. The rest
//! of the slice is drifted once no collision remains, and headings are turned
//! by the full slice.
//!
//! Bodies whose frame has been detached are kept in the arena but take no part
//! in drift or collisions until attached again.

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use super::body::{Body, BodyDef, CollisionEffect, Impact};
use super::collision::{closing_at, test_pair, Candidate};
use super::error::{HookError, Result, SimError};
use super::frame::Frame;
use super::params::Parameters;
use super::response::{contact_normal, impulse};
use super::serial::Record;
use super::space::Space;
use super::states::{BodyHandle, DomainId, FrameState, NVec3};

/// Zero-argument notification run around every tick
pub type TickCallback = Box<dyn FnMut() -> std::result::Result<(), HookError> + Send>;

/// Where the stepper is inside a `progress` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Idle,
    SeekingCollision,
    Advancing,
    Resolving,
    TickComplete,
}

/// Summary of one `progress` call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub slices: u64,    // slices run
    pub impacts: usize, // collisions resolved
    pub elapsed: f64,   // simulated seconds covered
}

struct Entry {
    generation: u32,
    body: Option<Body>,
}

/// One same-domain participant of the pair scan
#[derive(Debug, Clone, Copy)]
struct Member {
    handle: BodyHandle,
    radius: f64,
    state: FrameState,
}

pub struct Spacetime {
    space: Space,
    entries: Vec<Entry>,
    free: Vec<u32>,
    params: Parameters,
    collisions: bool,
    pre_tick: Vec<TickCallback>,
    post_tick: Vec<TickCallback>,
    state: StepState,
    ticks: u64,
    elapsed: f64,
}

impl Default for Spacetime {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

impl Spacetime {
    pub fn new(params: Parameters) -> Self {
        Self {
            space: Space::new(),
            entries: Vec::new(),
            free: Vec::new(),
            params,
            collisions: true,
            pre_tick: Vec::new(),
            post_tick: Vec::new(),
            state: StepState::Idle,
            ticks: 0,
            elapsed: 0.0,
        }
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn step_state(&self) -> StepState {
        self.state
    }

    /// Number of `progress` calls that have started mutating state
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Total simulated seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Turn collision detection on or off; with it off bodies only drift
    pub fn set_collisions(&mut self, enabled: bool) {
        self.collisions = enabled;
    }

    pub fn collisions_enabled(&self) -> bool {
        self.collisions
    }

    pub fn create_domain(&mut self) -> DomainId {
        let id = self.space.add_domain();
        debug!(domain = id.index(), "domain created");
        id
    }

    // =========================================================================================
    // bodies
    // =========================================================================================

    /// Register a body in `domain`, allocating its slot.
    ///
    /// # Panics
    /// If `domain` was not created by this spacetime.
    pub fn create_body(&mut self, domain: DomainId, def: BodyDef) -> Result<BodyHandle> {
        def.validate()?;
        let frame = Frame::bind(&mut self.space, domain, &def.state);
        let handle = self.insert(Body {
            mass: def.mass,
            radius: def.radius,
            frame,
            effect: None,
        });
        debug!(
            %handle,
            domain = domain.index(),
            mass = def.mass,
            radius = def.radius,
            "body created"
        );
        Ok(handle)
    }

    fn insert(&mut self, body: Body) -> BodyHandle {
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.body = Some(body);
                BodyHandle {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    body: Some(body),
                });
                BodyHandle {
                    index: (self.entries.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    /// Remove a body and give its slot back to its domain
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<()> {
        let entry = self
            .entries
            .get_mut(handle.index())
            .filter(|e| e.generation == handle.generation)
            .ok_or(SimError::UnknownBody(handle))?;
        let body = entry.body.take().ok_or(SimError::UnknownBody(handle))?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.index);
        body.frame.release(&mut self.space);
        debug!(%handle, "body destroyed");
        Ok(())
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_ok()
    }

    pub fn body(&self, handle: BodyHandle) -> Result<&Body> {
        self.entries
            .get(handle.index())
            .filter(|e| e.generation == handle.generation)
            .and_then(|e| e.body.as_ref())
            .ok_or(SimError::UnknownBody(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body> {
        Ok(self.split_mut(handle)?.0)
    }

    /// A live body together with the storage its frame points into
    fn split_mut(&mut self, handle: BodyHandle) -> Result<(&mut Body, &mut Space)> {
        let body = self
            .entries
            .get_mut(handle.index())
            .filter(|e| e.generation == handle.generation)
            .and_then(|e| e.body.as_mut())
            .ok_or(SimError::UnknownBody(handle))?;
        Ok((body, &mut self.space))
    }

    /// Live bodies in handle order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            entry.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: index as u32,
                        generation: entry.generation,
                    },
                    body,
                )
            })
        })
    }

    pub fn body_count(&self) -> usize {
        self.entries.iter().filter(|e| e.body.is_some()).count()
    }

    pub fn state_of(&self, handle: BodyHandle) -> Result<FrameState> {
        Ok(self.body(handle)?.frame.state(&self.space))
    }

    pub fn set_state(&mut self, handle: BodyHandle, state: &FrameState) -> Result<()> {
        let (body, space) = self.split_mut(handle)?;
        body.frame.set_state(space, state);
        Ok(())
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: &NVec3) -> Result<()> {
        let mut state = self.state_of(handle)?;
        state.velocity = *velocity;
        self.set_state(handle, &state)
    }

    /// Change a body's velocity by `impulse / mass`. Collisions go through
    /// here too; thrusters and the like push bodies the same way.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: &NVec3) -> Result<()> {
        if !impulse.iter().all(|c| c.is_finite()) {
            return Err(SimError::invalid_body(format!("impulse {impulse:?} is not finite")));
        }
        let (body, space) = self.split_mut(handle)?;
        let dv = impulse / body.mass;
        body.frame.add_velocity(space, &dv);
        trace!(%handle, ?impulse, ?dv, "impulse applied");
        Ok(())
    }

    /// Install (or replace) the hook run when this body is hit
    pub fn set_effect(
        &mut self,
        handle: BodyHandle,
        effect: impl CollisionEffect + 'static,
    ) -> Result<()> {
        self.body_mut(handle)?.effect = Some(Box::new(effect));
        Ok(())
    }

    pub fn clear_effect(&mut self, handle: BodyHandle) -> Result<()> {
        self.body_mut(handle)?.effect = None;
        Ok(())
    }

    /// Take a body out of its domain; it keeps its values in a virtual frame
    pub fn detach_body(&mut self, handle: BodyHandle) -> Result<()> {
        let (body, space) = self.split_mut(handle)?;
        body.frame.detach(space);
        debug!(%handle, "body detached");
        Ok(())
    }

    /// Bind a body into `domain`, moving it out of its current one if needed
    pub fn attach_body(&mut self, handle: BodyHandle, domain: DomainId) -> Result<()> {
        let (body, space) = self.split_mut(handle)?;
        body.frame.attach(space, domain);
        debug!(%handle, domain = domain.index(), "body attached");
        Ok(())
    }

    /// `target` as seen from `observer`, as a virtual frame
    pub fn as_seen_from(&self, target: BodyHandle, observer: BodyHandle) -> Result<Frame> {
        let target = self.body(target)?;
        let observer = self.body(observer)?;
        Ok(target.frame.as_seen_from(&observer.frame, &self.space))
    }

    pub fn body_record(&self, handle: BodyHandle) -> Result<Record> {
        Ok(self.body(handle)?.to_record(&self.space))
    }

    /// Recreate a body from a [`Body`] record. Collision effects are not part
    /// of the record and start out empty.
    pub fn restore_body(&mut self, record: &Record) -> Result<BodyHandle> {
        record.expect_type("Body")?;
        let mass = record.scalar("mass")?;
        let radius = record.scalar("radius")?;
        BodyDef::new(mass, radius)
            .validate()
            .map_err(|e| SimError::malformed(e.to_string()))?;
        let frame = Frame::from_record(record.sub("frame")?, &mut self.space)?;
        let handle = self.insert(Body {
            mass,
            radius,
            frame,
            effect: None,
        });
        debug!(%handle, "body restored");
        Ok(handle)
    }

    // =========================================================================================
    // callbacks
    // =========================================================================================

    /// Run before every `progress` that advances time
    pub fn on_pre_tick(
        &mut self,
        callback: impl FnMut() -> std::result::Result<(), HookError> + Send + 'static,
    ) {
        self.pre_tick.push(Box::new(callback));
    }

    /// Run after every completed `progress`
    pub fn on_post_tick(
        &mut self,
        callback: impl FnMut() -> std::result::Result<(), HookError> + Send + 'static,
    ) {
        self.post_tick.push(Box::new(callback));
    }

    /// Failures are logged and skipped; the tick stands
    fn notify(callbacks: &mut [TickCallback], phase: &str) {
        for (i, callback) in callbacks.iter_mut().enumerate() {
            if let Err(e) = callback() {
                warn!(phase, callback = i, error = %e, "tick callback failed");
            }
        }
    }

    // =========================================================================================
    // stepping
    // =========================================================================================

    /// Advance simulated time by `seconds`, split into `granularity` equal slices.
    ///
    /// Both arguments are checked before anything is touched. `seconds == 0`
    /// is a no-op. A failing collision effect aborts the call with the impact
    /// already applied; slices before it stay applied too.
    pub fn progress(&mut self, seconds: i64, granularity: i64) -> Result<TickReport> {
        if seconds < 0 {
            return Err(SimError::TimeReversal { seconds });
        }
        if granularity <= 0 {
            return Err(SimError::InvalidGranularity { granularity });
        }
        if seconds == 0 {
            return Ok(TickReport::default());
        }

        Self::notify(&mut self.pre_tick, "pre");
        self.ticks += 1;

        let slices = granularity as u64;
        let window = seconds as f64 / granularity as f64;
        let mut report = TickReport::default();
        for slice in 0..slices {
            match self.run_slice(window) {
                Ok(impacts) => {
                    report.slices += 1;
                    report.impacts += impacts;
                    report.elapsed += window;
                    debug!(slice, impacts, "slice complete");
                }
                Err(e) => {
                    self.state = StepState::Idle;
                    return Err(e);
                }
            }
        }
        self.state = StepState::TickComplete;
        info!(
            tick = self.ticks,
            seconds,
            granularity,
            impacts = report.impacts,
            elapsed = self.elapsed,
            "tick complete"
        );

        Self::notify(&mut self.post_tick, "post");
        Ok(report)
    }

    /// One slice: resolve collisions in time order, then drift the remainder
    fn run_slice(&mut self, window: f64) -> Result<usize> {
        let mut passed = 0.0;
        let mut impacts = 0;

        if self.collisions {
            loop {
                self.state = StepState::SeekingCollision;
                // velocities change with every impact, so search again each time
                let candidates = self.collision_candidates(window - passed);
                let Some(next) = candidates.first().copied() else {
                    break;
                };
                // every pair touching at this instant; once one of them is
                // resolved the others already overlap and would never be found
                let tied: Vec<Candidate> = candidates
                    .iter()
                    .take_while(|c| c.time - next.time <= self.params.tolerance)
                    .copied()
                    .collect();

                self.state = StepState::Advancing;
                self.space.advance_positions(next.time);
                passed += next.time;
                self.elapsed += next.time;

                self.state = StepState::Resolving;
                impacts += self.resolve_group(&tied)?;
            }
        }

        self.state = StepState::Advancing;
        let rest = (window - passed).max(0.0);
        self.space.advance_positions(rest);
        self.elapsed += rest;
        self.space.advance_headings(window);
        Ok(impacts)
    }

    /// Same-domain bound bodies, grouped by domain, in handle order
    fn members(&self) -> BTreeMap<DomainId, Vec<Member>> {
        let mut by_domain: BTreeMap<DomainId, Vec<Member>> = BTreeMap::new();
        for (handle, body) in self.bodies() {
            if let Some(domain) = body.frame.domain() {
                by_domain.entry(domain).or_default().push(Member {
                    handle,
                    radius: body.radius,
                    state: body.frame.state(&self.space),
                });
            }
        }
        by_domain
    }

    /// Every same-domain pair that first touches within `window` seconds from
    /// now, ordered by time then pair.
    pub fn collision_candidates(&self, window: f64) -> Vec<Candidate> {
        if !(window > 0.0) {
            return Vec::new();
        }
        let mut candidates: Vec<Candidate> = self
            .members()
            .values()
            .flat_map(|members| scan_pairs(members, window, &self.params))
            .collect();
        candidates.sort_by(Candidate::order);
        for c in &candidates {
            trace!(a = %c.a, b = %c.b, time = c.time, "collision candidate");
        }
        candidates
    }

    /// Resolve pairs touching at the same instant in candidate order, sweeping
    /// the group again while any of them still approach, for at most `len + 1`
    /// sweeps. Returns the number of impulses applied.
    fn resolve_group(&mut self, group: &[Candidate]) -> Result<usize> {
        let mut resolved = 0;
        for _ in 0..=group.len() {
            let mut any = false;
            for c in group {
                let state_a = self.state_of(c.a)?;
                let state_b = self.state_of(c.b)?;
                if closing_at(&state_a, &state_b, 0.0) {
                    self.resolve(*c)?;
                    resolved += 1;
                    any = true;
                }
            }
            if !any {
                break;
            }
        }
        Ok(resolved)
    }

    /// Apply the impulse for `c`, then run both bodies' effects
    fn resolve(&mut self, c: Candidate) -> Result<()> {
        let (state_a, mass_a) = {
            let body = self.body(c.a)?;
            (body.frame.state(&self.space), body.mass)
        };
        let (state_b, mass_b) = {
            let body = self.body(c.b)?;
            (body.frame.state(&self.space), body.mass)
        };

        let normal = contact_normal(
            &state_a.position,
            &state_b.position,
            &state_a.velocity,
            &state_b.velocity,
        );
        let j = match normal {
            Some(normal) => impulse(
                self.params.restitution,
                &normal,
                &state_a.velocity,
                &state_b.velocity,
                mass_a,
                mass_b,
            ),
            None => NVec3::zeros(),
        };
        let dv_a = j / mass_a;
        let dv_b = -j / mass_b;

        // both velocities first
        self.apply_impulse(c.a, &j)?;
        self.apply_impulse(c.b, &-j)?;
        let vel_a = state_a.velocity + dv_a;
        let vel_b = state_b.velocity + dv_b;
        debug!(a = %c.a, b = %c.b, time = c.time, ?dv_a, ?dv_b, "collision resolved");

        // then the effects, a before b
        let impacts = [
            Impact {
                body: c.a,
                other: c.b,
                time: c.time,
                delta_v: dv_a,
                relative_velocity: vel_b - vel_a,
                other_mass: mass_b,
            },
            Impact {
                body: c.b,
                other: c.a,
                time: c.time,
                delta_v: dv_b,
                relative_velocity: vel_a - vel_b,
                other_mass: mass_a,
            },
        ];
        for impact in &impacts {
            if let Some(effect) = self.body_mut(impact.body)?.effect.as_mut() {
                effect
                    .on_collide(impact)
                    .map_err(|source| SimError::CollisionEffect { body: impact.body, source })?;
            }
        }
        Ok(())
    }
}

#[cfg(not(feature = "parallel"))]
fn scan_pairs(members: &[Member], window: f64, params: &Parameters) -> Vec<Candidate> {
    let mut found = Vec::new();
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            if let Some(time) = test_pair(&a.state, a.radius, &b.state, b.radius, window, params) {
                found.push(Candidate {
                    time,
                    a: a.handle,
                    b: b.handle,
                });
            }
        }
    }
    found
}

#[cfg(feature = "parallel")]
fn scan_pairs(members: &[Member], window: f64, params: &Parameters) -> Vec<Candidate> {
    use rayon::prelude::*;

    (0..members.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let a = members[i];
            members[i + 1..].iter().filter_map(move |b| {
                test_pair(&a.state, a.radius, &b.state, b.radius, window, params).map(|time| {
                    Candidate {
                        time,
                        a: a.handle,
                        b: b.handle,
                    }
                })
            })
        })
        .collect()
}
