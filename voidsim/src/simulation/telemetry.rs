//! Read-only views for reporting collaborators
//!
//! - [`Snapshot`]: an immutable copy of every live body, taken between ticks
//! - [`TelemetryCache`]: hands out the same snapshot until the spacetime
//!   ticks again or the cache is invalidated
//! - [`scan_from`]: every body sharing the observer's domain, as seen from it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::error::{HookError, Result};
use super::frame::Frame;
use super::geometry::{Cylindrical, Spherical};
use super::spacetime::Spacetime;
use super::states::{BodyHandle, DomainId, FrameState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyTelemetry {
    pub handle: BodyHandle,
    pub domain: Option<DomainId>, // None while detached
    pub mass: f64,
    pub radius: f64,
    pub state: FrameState,
    pub position_polar: Spherical,
    pub velocity_polar: Spherical,
    pub position_cylindrical: Cylindrical,
    pub velocity_cylindrical: Cylindrical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed: f64,
    pub bodies: Vec<BodyTelemetry>,
}

impl Snapshot {
    pub fn capture(spacetime: &Spacetime) -> Self {
        let space = spacetime.space();
        let bodies = spacetime
            .bodies()
            .map(|(handle, body)| {
                let state = body.frame().state(space);
                BodyTelemetry {
                    handle,
                    domain: body.frame().domain(),
                    mass: body.mass(),
                    radius: body.radius(),
                    position_polar: state.position_polar(),
                    velocity_polar: state.velocity_polar(),
                    position_cylindrical: state.position_cylindrical(),
                    velocity_cylindrical: state.velocity_cylindrical(),
                    state,
                }
            })
            .collect();
        Self {
            tick: spacetime.ticks(),
            elapsed: spacetime.elapsed(),
            bodies,
        }
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&BodyTelemetry> {
        self.bodies.iter().find(|b| b.handle == handle)
    }
}

/// Snapshot cache keyed on the tick counter.
///
/// Changes made between ticks (new bodies, edited velocities) do not move the
/// counter; call [`TelemetryCache::invalidate`] or register
/// [`TelemetryCache::invalidation_hook`] as a tick callback.
#[derive(Debug, Default)]
pub struct TelemetryCache {
    cached: Option<Arc<Snapshot>>,
    dirty: Arc<AtomicBool>,
}

impl TelemetryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached snapshot, captured again if stale
    pub fn get(&mut self, spacetime: &Spacetime) -> Arc<Snapshot> {
        let dirty = self.dirty.swap(false, Ordering::AcqRel);
        match &self.cached {
            Some(snapshot) if !dirty && snapshot.tick == spacetime.ticks() => Arc::clone(snapshot),
            _ => {
                let snapshot = Arc::new(Snapshot::capture(spacetime));
                self.cached = Some(Arc::clone(&snapshot));
                snapshot
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some() && !self.dirty.load(Ordering::Acquire)
    }

    /// A tick callback that marks this cache stale
    pub fn invalidation_hook(
        &self,
    ) -> impl FnMut() -> std::result::Result<(), HookError> + Send + 'static {
        let dirty = Arc::clone(&self.dirty);
        move || {
            dirty.store(true, Ordering::Release);
            Ok(())
        }
    }
}

/// Every other body in the observer's domain, as seen from the observer.
/// A detached observer sees nothing.
pub fn scan_from(spacetime: &Spacetime, observer: BodyHandle) -> Result<Vec<(BodyHandle, Frame)>> {
    let space = spacetime.space();
    let pov = spacetime.body(observer)?.frame();
    let Some(domain) = pov.domain() else {
        return Ok(Vec::new());
    };
    Ok(spacetime
        .bodies()
        .filter(|(handle, body)| *handle != observer && body.frame().domain() == Some(domain))
        .map(|(handle, body)| (handle, body.frame().as_seen_from(pov, space)))
        .collect())
}
