//! Shared access to one spacetime from several threads
//!
//! The stepper itself is synchronous. A [`Session`] is the gate external
//! schedulers go through: one tick at a time, and a tick request that arrives
//! while another is running is rejected rather than interleaved.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use super::error::{Result, SimError};
use super::spacetime::{Spacetime, TickReport};

#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<Spacetime>>,
}

impl Session {
    pub fn new(spacetime: Spacetime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(spacetime)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Spacetime>> {
        self.inner.lock().map_err(|_| SimError::SessionPoisoned)
    }

    /// Run a tick now, or fail with [`SimError::TickInProgress`] if one is running
    pub fn try_progress(&self, seconds: i64, granularity: i64) -> Result<TickReport> {
        let mut spacetime = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(SimError::TickInProgress),
            Err(TryLockError::Poisoned(_)) => return Err(SimError::SessionPoisoned),
        };
        spacetime.progress(seconds, granularity)
    }

    /// Run a tick once the running one (if any) has finished
    pub fn progress(&self, seconds: i64, granularity: i64) -> Result<TickReport> {
        self.lock()?.progress(seconds, granularity)
    }

    /// Read between ticks
    pub fn read<R>(&self, f: impl FnOnce(&Spacetime) -> R) -> Result<R> {
        Ok(f(&*self.lock()?))
    }

    /// Mutate between ticks (create or destroy bodies, register callbacks)
    pub fn write<R>(&self, f: impl FnOnce(&mut Spacetime) -> R) -> Result<R> {
        Ok(f(&mut *self.lock()?))
    }
}
