pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{EngineError, Result};

pub use simulation::states::{Body, Trail, Snapshot, NVec3};
pub use simulation::params::Parameters;
pub use simulation::forces::{ForceModel, NewtonianGravity};
pub use simulation::integrator::{integrator_for, Integrator, SemiImplicitEuler, Rk4, VelocityVerlet};
pub use simulation::conservation::{
    center_of_mass, total_angular_momentum, total_angular_momentum_about, total_energy, total_momentum,
    ConservationBaseline, ConservationReport,
};
pub use simulation::trajectory::TrajectoryRecorder;
pub use simulation::collision::{flag_collisions, has_collision};
pub use simulation::clock::{RunState, SimulationClock};
pub use simulation::scenario::{build_bodies, BuiltinPresets, PresetLibrary, PresetProvider};
pub use simulation::engine::{Diagnostics, Engine};

pub use configuration::config::{
    BodyConfig, EngineConfig, IntegratorConfig, ParametersConfig, PresetConfig, ScenarioConfig, TrailConfig,
};

pub use benchmark::benchmark::{bench_energy_drift, bench_integrators};
