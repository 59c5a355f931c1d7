pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{BodyHandle, DomainId, FrameState, NVec3, Quat, Slot};
pub use simulation::error::{HookError, Result, SimError};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::space::{Domain, Space};
pub use simulation::frame::Frame;
pub use simulation::geometry::{Cylindrical, Spherical};
pub use simulation::body::{Body, BodyDef, CollisionEffect, Impact};
pub use simulation::collision::{
    distance_between_segments, find_collision, test_pair, Candidate, SegmentProximity,
};
pub use simulation::response::{contact_normal, delta_v, impulse};
pub use simulation::serial::Record;
pub use simulation::spacetime::{Spacetime, StepState, TickCallback, TickReport};
pub use simulation::session::Session;
pub use simulation::telemetry::{scan_from, BodyTelemetry, Snapshot, TelemetryCache};
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    BodyConfig, DomainConfig, EngineConfig, ParametersConfig, ScenarioConfig,
};

pub use benchmark::benchmark::{bench_collisions, bench_progress_curve};
