//! The simulation engine owned by the host
//!
//! `Engine` bundles the body set with everything that acts on it: force model,
//! integrator strategy, clock, trajectory recorder and preset source. The host
//! drives it with `tick(wall_dt)` once per frame and reads bodies back for
//! drawing; UI setters are plain `&mut self` calls and therefore always land
//! between steps.
//!
//! Per executed step:
//! 1. snapshot the start-of-step state
//! 2. integrate (all-or-nothing)
//! 3. freeze any body whose state went non-finite, restoring its last valid state
//! 4. sample trails from the start-of-step positions
//! 5. refresh collision flags

use tracing::{info, warn};

use crate::configuration::config::{IntegratorConfig, ScenarioConfig};
use crate::error::{EngineError, Result};
use crate::simulation::clock::{RunState, SimulationClock};
use crate::simulation::collision::flag_collisions;
use crate::simulation::conservation::{ConservationBaseline, ConservationReport};
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::{integrator_for, Integrator};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::{build_bodies, BuiltinPresets, PresetLibrary, PresetProvider};
use crate::simulation::states::{Body, NVec3, Snapshot};
use crate::simulation::trajectory::TrajectoryRecorder;

/// Non-fatal conditions raised while ticking, for the UI to surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub frozen_bodies: Vec<usize>,                // ids frozen on non-finite state
    pub degenerate_pair: Option<(usize, usize)>,  // last zero-separation pair under zero softening
    pub skipped_steps: u64,                       // steps rejected by the integrator
}

impl Diagnostics {
    pub fn has_frozen_bodies(&self) -> bool {
        !self.frozen_bodies.is_empty()
    }

    pub fn is_clear(&self) -> bool {
        self.frozen_bodies.is_empty() && self.degenerate_pair.is_none() && self.skipped_steps == 0
    }
}

pub struct Engine {
    parameters: Parameters,
    gravity: NewtonianGravity,
    integrator: Box<dyn Integrator>,
    integrator_kind: IntegratorConfig,
    clock: SimulationClock,
    recorder: TrajectoryRecorder,
    presets: Box<dyn PresetProvider>,
    pause_on_collision: bool,

    bodies: Vec<Body>,
    preset_id: String,
    baseline: ConservationBaseline,
    collision: bool,
    diagnostics: Diagnostics,
}

impl Engine {
    /// Build an engine and load `config.initial_preset` from `presets`.
    pub fn new(config: &ScenarioConfig, presets: Box<dyn PresetProvider>) -> Result<Self> {
        let parameters = Parameters::from(&config.parameters);
        parameters.validate()?;

        let e_cfg = &config.engine;
        if e_cfg.max_steps_per_tick == 0 {
            return Err(EngineError::InvalidConfiguration("max_steps_per_tick must be >= 1".to_string()));
        }

        let mut clock = SimulationClock::new(parameters.h0, 1.0, e_cfg.max_steps_per_tick);
        if !clock.set_speed(e_cfg.simulation_speed) {
            return Err(EngineError::InvalidConfiguration(format!(
                "simulation_speed must be >= 0, got {}",
                e_cfg.simulation_speed
            )));
        }

        let t_cfg = &config.trail;
        let recorder = TrajectoryRecorder::new(t_cfg.max_length, t_cfg.update_interval, t_cfg.min_distance);

        let mut engine = Self {
            gravity: NewtonianGravity::new(parameters.g, parameters.softening),
            integrator: integrator_for(&e_cfg.integrator),
            integrator_kind: e_cfg.integrator,
            parameters,
            clock,
            recorder,
            presets,
            pause_on_collision: e_cfg.pause_on_collision,
            bodies: Vec::new(),
            preset_id: String::new(),
            baseline: ConservationBaseline {
                energy: 0.0,
                angular_momentum: NVec3::zeros(),
            },
            collision: false,
            diagnostics: Diagnostics::default(),
        };
        engine.reset(&config.initial_preset)?;
        Ok(engine)
    }

    /// Build an engine whose presets are the config file's, layered over the built-ins.
    pub fn from_config(config: &ScenarioConfig) -> Result<Self> {
        let builtin = BuiltinPresets::new(config.parameters.seed);
        let library = PresetLibrary::new(config.presets.clone(), builtin);
        Self::new(config, Box::new(library))
    }

    // =========================================================================================
    // Driving
    // =========================================================================================

    /// Advance by one host frame of `wall_dt` seconds. Returns the number of
    /// integration steps executed. Never fails; problems land in [`Diagnostics`].
    pub fn tick(&mut self, wall_dt: f64) -> usize {
        let steps = self.clock.budget_steps(wall_dt);
        let mut executed = 0;

        for _ in 0..steps {
            match self.step_once() {
                Ok(collided) => {
                    executed += 1;
                    if collided && self.pause_on_collision {
                        self.clock.pause();
                        self.clock.drop_budget();
                        info!(time = self.clock.time(), "collision flagged, simulation paused");
                        break;
                    }
                }
                Err(err) => {
                    self.diagnostics.skipped_steps += 1;
                    if let EngineError::DegenerateConfiguration { first, second } = err {
                        self.diagnostics.degenerate_pair = Some((first, second));
                    }
                    warn!(%err, time = self.clock.time(), "integration step skipped");
                    // time did not advance for the skipped step; the next tick accrues a fresh budget
                    self.clock.drop_budget();
                    break;
                }
            }
        }
        executed
    }

    /// One fixed step. Returns whether any pair overlaps afterwards.
    fn step_once(&mut self) -> Result<bool> {
        let start = Snapshot::capture(&self.bodies);

        self.integrator.step(&mut self.bodies, self.parameters.h0, &self.gravity)?;
        self.clock.advance_time();

        self.freeze_non_finite(&start);
        self.recorder.observe(&mut self.bodies, &start.x);
        self.collision = flag_collisions(&mut self.bodies);
        Ok(self.collision)
    }

    /// Freeze bodies whose state went NaN/inf, putting them back where they started the step.
    fn freeze_non_finite(&mut self, start: &Snapshot) {
        for (i, b) in self.bodies.iter_mut().enumerate() {
            if !b.is_active || b.is_finite() {
                continue;
            }
            b.position = start.x[i];
            b.velocity = start.v[i];
            b.reset_force();
            b.is_active = false;
            self.diagnostics.frozen_bodies.push(b.id);
            warn!(body = b.id, time = self.clock.time(), "non-finite state, body frozen");
        }
    }

    pub fn start(&mut self) {
        if self.clock.start() {
            info!(preset = %self.preset_id, "simulation running");
        }
    }

    pub fn pause(&mut self) {
        if self.clock.pause() {
            info!(time = self.clock.time(), "simulation paused");
        }
    }

    /// Replace the body set with the preset `preset_id` and stop the clock.
    ///
    /// Unknown ids and invalid presets are rejected with
    /// `InvalidConfiguration`; the current bodies are left untouched.
    pub fn reset(&mut self, preset_id: &str) -> Result<()> {
        let preset = self
            .presets
            .preset(preset_id, self.parameters.g)
            .ok_or_else(|| EngineError::InvalidConfiguration(format!("unknown preset '{preset_id}'")))?;
        let bodies = build_bodies(&preset, self.parameters.radius_scale)?;

        self.bodies = bodies;
        self.preset_id = preset_id.to_string();
        self.restart();

        info!(preset = preset_id, bodies = self.bodies.len(), integrator = self.integrator.name(), "reset");
        Ok(())
    }

    /// Stop, rewind time, clear trails and diagnostics, keep the current bodies.
    pub fn restart(&mut self) {
        self.clock.reset();
        self.recorder.restart();
        for b in self.bodies.iter_mut() {
            b.trail.clear();
            b.reset_force();
        }
        self.collision = flag_collisions(&mut self.bodies);
        self.diagnostics = Diagnostics::default();
        self.recapture_baseline();
    }

    fn recapture_baseline(&mut self) {
        self.baseline = ConservationBaseline::capture(&self.bodies, self.parameters.g);
    }

    // =========================================================================================
    // UI setters, applied between steps
    // =========================================================================================

    /// Change one body's mass (clamped > 0). Returns false for an unknown index.
    pub fn set_body_mass(&mut self, index: usize, mass: f64) -> bool {
        let Some(b) = self.bodies.get_mut(index) else {
            return false;
        };
        b.set_mass(mass);
        self.collision = flag_collisions(&mut self.bodies);
        self.recapture_baseline();
        true
    }

    /// Set the speed multiplier, clamped to [0.01, 10]; 0 holds time still.
    /// Negative or non-finite values are ignored.
    pub fn set_simulation_speed(&mut self, multiplier: f64) -> bool {
        let accepted = self.clock.set_speed(multiplier);
        if !accepted {
            warn!(multiplier, "rejected simulation speed");
        }
        accepted
    }

    pub fn set_max_trail_length(&mut self, n: usize) {
        self.recorder.set_max_trail_length(n, &mut self.bodies);
    }

    pub fn set_gravity_constant(&mut self, g: f64) -> Result<()> {
        if !(g.is_finite() && g > 0.0) {
            return Err(EngineError::InvalidConfiguration(format!("G must be > 0, got {g}")));
        }
        self.parameters.g = g;
        self.gravity.g = g;
        self.recapture_baseline();
        Ok(())
    }

    /// Change the fixed step `h0`. Simulation time already owed is kept and
    /// paid out in steps of the new size.
    pub fn set_time_step(&mut self, h0: f64) -> Result<()> {
        if !(h0.is_finite() && h0 > 0.0) {
            return Err(EngineError::InvalidConfiguration(format!("h0 must be > 0, got {h0}")));
        }
        self.parameters.h0 = h0;
        self.clock.set_fixed_dt(h0);
        info!(h0, "time step changed");
        Ok(())
    }

    pub fn set_integrator(&mut self, kind: IntegratorConfig) {
        self.integrator = integrator_for(&kind);
        self.integrator_kind = kind;
        info!(integrator = self.integrator.name(), "integrator changed");
    }

    // =========================================================================================
    // Readers
    // =========================================================================================

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn run_state(&self) -> RunState {
        self.clock.state()
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn simulation_speed(&self) -> f64 {
        self.clock.speed()
    }

    pub fn max_trail_length(&self) -> usize {
        self.recorder.max_length
    }

    /// Whether any pair overlapped after the last step (or reset).
    pub fn has_collision(&self) -> bool {
        self.collision
    }

    pub fn conservation_report(&self) -> ConservationReport {
        self.baseline.report(&self.bodies, self.parameters.g)
    }

    pub fn baseline(&self) -> &ConservationBaseline {
        &self.baseline
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Hand the accumulated diagnostics to the caller and clear them.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn integrator(&self) -> IntegratorConfig {
        self.integrator_kind
    }

    pub fn preset_id(&self) -> &str {
        &self.preset_id
    }

    pub fn preset_ids(&self) -> Vec<String> {
        self.presets.ids()
    }
}
