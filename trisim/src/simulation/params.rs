//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - fixed integration step size `h0`,
//! - gravitational constant `g` and softening floor,
//! - radius scale used to derive body radii from mass,
//! - seed for the randomized preset

use crate::error::{EngineError, Result};

#[derive(Debug, Clone)]
pub struct Parameters {
    pub h0: f64,           // fixed step size
    pub g: f64,            // gravitational constant
    pub softening: f64,    // minimum separation in the force law, 0 = diagnostic mode
    pub radius_scale: f64, // radius = mass^(1/3) * radius_scale
    pub seed: u64,         // deterministic seed
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            h0: 0.01,
            g: 1.0,
            softening: 1.0e-3,
            radius_scale: 0.5,
            seed: 42,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.h0.is_finite() && self.h0 > 0.0) {
            return Err(EngineError::InvalidConfiguration(format!("h0 must be > 0, got {}", self.h0)));
        }
        if !(self.g.is_finite() && self.g > 0.0) {
            return Err(EngineError::InvalidConfiguration(format!("G must be > 0, got {}", self.g)));
        }
        if !(self.softening.is_finite() && self.softening >= 0.0) {
            return Err(EngineError::InvalidConfiguration(format!(
                "softening must be >= 0, got {}",
                self.softening
            )));
        }
        if !(self.radius_scale.is_finite() && self.radius_scale > 0.0) {
            return Err(EngineError::InvalidConfiguration(format!(
                "radius_scale must be > 0, got {}",
                self.radius_scale
            )));
        }
        Ok(())
    }
}
