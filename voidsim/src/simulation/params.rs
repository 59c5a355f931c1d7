//! Numerical and physical parameters for collision handling
//!
//! `Parameters` holds runtime settings:
//! - restitution coefficient used by the resolver,
//! - bisection budget and contact tolerance used by the detector

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub restitution: f64,    // 1 = elastic, 0 = perfectly inelastic
    pub tolerance: f64,      // accepted contact-distance error of a time of impact
    pub max_bisections: u32, // bisection iteration budget per pair
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            restitution: 0.6,
            tolerance: 1.0e-3,
            max_bisections: 100,
        }
    }
}
