//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - engine settings (`Engine`)
//! - collision parameters (`Parameters`)
//! - a `Spacetime` with every configured domain and body created
//! - the domain names, so callers can look domains up again

use nalgebra::Quaternion;
use tracing::info;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::simulation::body::BodyDef;
use crate::simulation::engine::Engine;
use crate::simulation::error::{Result, SimError};
use crate::simulation::params::Parameters;
use crate::simulation::spacetime::{Spacetime, TickReport};
use crate::simulation::states::{DomainId, NVec3, Quat};

/// A fully-initialized scenario
///
/// This is the main "runtime bundle" constructed from a [`ScenarioConfig`]:
/// the engine settings, parameters, and a spacetime holding every body at
/// t = 0
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub spacetime: Spacetime,
    pub domains: Vec<(String, DomainId)>,
}

/// `[w, i, j, k]` from YAML to a unit quaternion; absent means identity
fn rotation(q: Option<[f64; 4]>) -> Result<Quat> {
    let Some([w, i, j, k]) = q else {
        return Ok(Quat::identity());
    };
    let raw = Quaternion::new(w, i, j, k);
    if !(raw.norm() > 0.0 && raw.norm().is_finite()) {
        return Err(SimError::invalid_body(format!(
            "rotation {:?} cannot be normalized",
            [w, i, j, k]
        )));
    }
    Ok(Quat::from_quaternion(raw))
}

fn body_def(bc: &BodyConfig) -> Result<BodyDef> {
    Ok(BodyDef::new(bc.m, bc.radius)
        .with_position(NVec3::from(bc.x))
        .with_velocity(NVec3::from(bc.v))
        .with_heading(rotation(bc.heading)?)
        .with_spin(rotation(bc.spin)?))
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Parameters (runtime) from ParametersConfig, defaults for anything unset
        let defaults = Parameters::default();
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            restitution: p_cfg.restitution.unwrap_or(defaults.restitution),
            tolerance: p_cfg.tolerance.unwrap_or(defaults.tolerance),
            max_bisections: p_cfg.max_bisections.unwrap_or(defaults.max_bisections),
        };

        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        let engine = Engine {
            seconds: e_cfg.seconds,
            granularity: e_cfg.granularity,
            collisions: e_cfg.collisions,
        };

        let mut spacetime = Spacetime::new(parameters);
        spacetime.set_collisions(engine.collisions);

        // Domains and their bodies, in file order
        let mut domains = Vec::with_capacity(cfg.domains.len());
        for d_cfg in &cfg.domains {
            let id = spacetime.create_domain();
            for bc in &d_cfg.bodies {
                spacetime.create_body(id, body_def(bc)?)?;
            }
            domains.push((d_cfg.name.clone(), id));
        }

        info!(
            domains = domains.len(),
            bodies = spacetime.body_count(),
            "scenario built"
        );

        Ok(Self {
            engine,
            parameters,
            spacetime,
            domains,
        })
    }

    pub fn domain(&self, name: &str) -> Option<DomainId> {
        self.domains.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Progress the spacetime by the configured seconds and granularity
    pub fn run(&mut self) -> Result<TickReport> {
        self.spacetime.progress(self.engine.seconds, self.engine.granularity)
    }
}
