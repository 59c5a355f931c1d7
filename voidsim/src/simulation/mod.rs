pub mod states;
pub mod params;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod rotation;
pub mod space;
pub mod frame;
pub mod serial;
pub mod body;
pub mod collision;
pub mod response;
pub mod spacetime;
pub mod session;
pub mod telemetry;
pub mod scenario;
