//! Error types for the spacetime kernel.
//!
//! Caller mistakes (bad time requests, stale handles, malformed records) and
//! collaborator failures are reported through [`SimError`]. Allocator misuse
//! (out-of-range domain or slot ids) is not an error value: it panics.

use thiserror::Error;

use super::states::BodyHandle;

/// Failure type of collision-effect hooks and tick callbacks
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SimError {
    /// Negative time was requested
    #[error("unfortunately the laws of thermodynamics prohibit time reversal ({seconds} s requested)")]
    TimeReversal { seconds: i64 },

    /// Granularity must be at least one slice
    #[error("progression granularity must be greater than zero, got {granularity}")]
    InvalidGranularity { granularity: i64 },

    /// The handle does not name a live body
    #[error("unknown body {0}")]
    UnknownBody(BodyHandle),

    /// Body parameters out of range
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A body's collision-effect hook failed after the impact was applied
    #[error("collision effect of {body} failed: {source}")]
    CollisionEffect {
        body: BodyHandle,
        #[source]
        source: HookError,
    },

    /// Another tick is running on the same session
    #[error("a tick is already in progress")]
    TickInProgress,

    /// A previous tick panicked while holding the session
    #[error("session poisoned by a panicked tick")]
    SessionPoisoned,

    /// A serialized record could not be reconstructed
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl SimError {
    pub fn invalid_body(reason: impl Into<String>) -> Self {
        Self::InvalidBody(reason.into())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
