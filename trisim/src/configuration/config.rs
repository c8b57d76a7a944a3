//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation setup. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator choice, speed, catch-up cap, collision policy
//! - [`ParametersConfig`] – step size and physical constants
//! - [`TrailConfig`]      – trajectory history sampling
//! - [`PresetConfig`]     – named initial body sets, shadowing the built-ins
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! Every section has defaults, so an empty document is a valid scenario.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "rk4"        # or "euler" / "verlet"
//!   simulation_speed: 1.0    # clamped to [0.01, 10]
//!   max_steps_per_tick: 120  # catch-up cap
//!   pause_on_collision: false
//!
//! parameters:
//!   h0: 0.01                 # fixed step size
//!   G: 1.0                   # gravitational constant
//!   softening: 1.0e-3        # distance floor, 0 = diagnostic mode
//!   radius_scale: 0.5        # radius = mass^(1/3) * radius_scale
//!   seed: 42                 # seed for the "random" preset
//!
//! trail:
//!   max_length: 500
//!   update_interval: 5
//!   min_distance: 0.01
//!
//! initial_preset: "figure8"
//!
//! presets:
//!   - id: "pair"
//!     bodies:
//!       - { m: 1.0, x: [-1.0, 0.0, 0.0], v: [0.0, -0.5, 0.0] }
//!       - { m: 1.0, x: [ 1.0, 0.0, 0.0], v: [0.0,  0.5, 0.0] }
//! ```
//!
//! The engine maps this configuration into its runtime types
//! (`Parameters`, `SimulationClock`, `TrajectoryRecorder`, ...).

use serde::Deserialize;

use crate::simulation::params::Parameters;
use crate::simulation::trajectory::{DEFAULT_MAX_TRAIL_LENGTH, DEFAULT_TRAIL_MIN_DISTANCE, DEFAULT_TRAIL_UPDATE_INTERVAL};

/// Which integrator method used by the engine
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // Semi-implicit Euler, first order, cheapest per step
    #[default]
    Euler,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta, four force passes per step, not symplectic
    Rk4,

    #[serde(rename = "verlet")] // Velocity Verlet, symplectic, good long-term energy behavior
    Verlet,
}

/// Engine-level options
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // time integrator used for advancing the system state
    pub simulation_speed: f64,        // wall time -> simulation time multiplier
    pub max_steps_per_tick: usize,    // cap on catch-up steps per host tick
    pub pause_on_collision: bool,     // pause the clock when an overlap is flagged
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorConfig::default(),
            simulation_speed: 1.0,
            max_steps_per_tick: 120,
            pause_on_collision: false,
        }
    }
}

/// Global numerical and physical parameters
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub h0: f64, // fixed time step
    #[serde(rename = "G")]
    pub g: f64,            // gravitational constant
    pub softening: f64,    // minimum separation in the force law
    pub radius_scale: f64, // body radius per cube-root of mass
    pub seed: u64,         // deterministic seed to make runs reproducable
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            h0: p.h0,
            g: p.g,
            softening: p.softening,
            radius_scale: p.radius_scale,
            seed: p.seed,
        }
    }
}

impl From<&ParametersConfig> for Parameters {
    fn from(cfg: &ParametersConfig) -> Self {
        Parameters {
            h0: cfg.h0,
            g: cfg.g,
            softening: cfg.softening,
            radius_scale: cfg.radius_scale,
            seed: cfg.seed,
        }
    }
}

/// Trajectory sampling options
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrailConfig {
    pub max_length: usize,    // FIFO bound per body
    pub update_interval: u32, // steps between samples
    pub min_distance: f64,    // points closer than this to the last one are dropped
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_TRAIL_LENGTH,
            update_interval: DEFAULT_TRAIL_UPDATE_INTERVAL,
            min_distance: DEFAULT_TRAIL_MIN_DISTANCE,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BodyConfig {
    pub m: f64,      // mass, must be > 0
    pub x: [f64; 3], // initial position
    pub v: [f64; 3], // initial velocity
}

/// A named initial configuration
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PresetConfig {
    pub id: String,
    pub bodies: Vec<BodyConfig>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub trail: TrailConfig,
    pub initial_preset: String,      // preset loaded when the engine is built
    pub presets: Vec<PresetConfig>,  // extra presets, shadowing built-ins by id
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            parameters: ParametersConfig::default(),
            trail: TrailConfig::default(),
            initial_preset: "figure8".to_string(),
            presets: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}
