//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – how long to run, how finely to slice, collisions on/off
//! - [`ParametersConfig`] – restitution and time-of-impact search settings
//! - [`DomainConfig`]     – one locality and the bodies that start in it
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   seconds: 10             # simulated time per run
//!   granularity: 4          # slices per run
//!   collisions: true
//!
//! parameters:
//!   restitution: 0.6        # 1 elastic, 0 perfectly inelastic
//!   tolerance: 1.0e-3       # contact distance error accepted by the bisection
//!   max_bisections: 100
//!
//! domains:
//!   - name: "sol"
//!     bodies:
//!       - x: [ 0.0, 0.0, 0.0 ]
//!         v: [ 1.0, 0.0, 0.0 ]
//!         m: 1.0
//!         radius: 1.0
//!       - x: [ 10.0, 0.0, 0.0 ]
//!         v: [ -1.0, 0.0, 0.0 ]
//!         spin: [ 0.7071, 0.0, 0.0, 0.7071 ]   # [w, i, j, k] per second
//!         m: 1.0
//!         radius: 1.0
//! ```
//!
//! Missing `parameters` fields take the runtime defaults; a missing `heading`
//! or `spin` is the identity rotation.

use serde::Deserialize;

fn default_granularity() -> i64 {
    1
}

fn default_collisions() -> bool {
    true
}

/// High-level engine configuration
/// Controls how the stepper is driven
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub seconds: i64, // simulated seconds per run, must not be negative
    #[serde(default = "default_granularity")]
    pub granularity: i64, // equal slices per run, must be at least 1
    #[serde(default = "default_collisions")]
    pub collisions: bool, // `false` - bodies only drift
}

/// Collision parameters for a scenario
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ParametersConfig {
    pub restitution: Option<f64>,    // energy kept by an impact
    pub tolerance: Option<f64>,      // bisection stops below this contact distance error
    pub max_bisections: Option<u32>, // bisection iteration budget
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 3],               // initial position
    pub v: [f64; 3],               // initial velocity per second
    pub heading: Option<[f64; 4]>, // initial orientation, [w, i, j, k]
    pub spin: Option<[f64; 4]>,    // rotation per second, [w, i, j, k]
    pub m: f64,                    // mass of the body
    pub radius: f64,               // contact radius
}

/// A locality; bodies in different domains never collide
#[derive(Deserialize, Debug, Clone)]
pub struct DomainConfig {
    pub name: String,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // how to step
    #[serde(default)]
    pub parameters: ParametersConfig, // collision parameters
    pub domains: Vec<DomainConfig>, // localities and their initial bodies
}
