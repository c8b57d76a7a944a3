//! Run state and fixed-step time accounting
//!
//! The host calls `tick(wall_dt)` at whatever rate it renders. The clock turns
//! `wall_dt * speed` into a budget of simulation time and pays it out in whole
//! fixed-size steps, carrying the remainder to the next tick. The number of
//! steps per tick is capped so a long stall cannot trigger a catch-up storm.
//!
//! ```text
//! Stopped --start--> Running --pause--> Paused --start--> Running
//!    ^                                                       |
//!    +------------------------- reset -----------------------+
//! ```

use tracing::debug;

pub const MIN_SIMULATION_SPEED: f64 = 0.01;
pub const MAX_SIMULATION_SPEED: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: RunState,
    speed: f64,                // wall -> simulation time multiplier, 0 = hold
    fixed_dt: f64,             // simulation time per step
    max_steps_per_tick: usize, // catch-up cap
    time: f64,                 // simulation time of executed steps
    budget: f64,               // simulation time owed but not yet stepped
}

impl SimulationClock {
    pub fn new(fixed_dt: f64, speed: f64, max_steps_per_tick: usize) -> Self {
        let mut clock = Self {
            state: RunState::Stopped,
            speed: 1.0,
            fixed_dt,
            max_steps_per_tick: max_steps_per_tick.max(1),
            time: 0.0,
            budget: 0.0,
        };
        clock.set_speed(speed);
        clock
    }

    /// Stopped/Paused -> Running. Returns whether the state changed.
    pub fn start(&mut self) -> bool {
        match self.state {
            RunState::Running => false,
            RunState::Stopped | RunState::Paused => {
                self.state = RunState::Running;
                true
            }
        }
    }

    /// Running -> Paused. A stopped clock stays stopped.
    pub fn pause(&mut self) -> bool {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            true
        } else {
            false
        }
    }

    /// Any state -> Stopped, with time and budget cleared.
    pub fn reset(&mut self) {
        self.state = RunState::Stopped;
        self.time = 0.0;
        self.budget = 0.0;
    }

    /// Set the speed multiplier.
    ///
    /// Positive values are clamped to [`MIN_SIMULATION_SPEED`, `MAX_SIMULATION_SPEED`].
    /// Exactly zero holds simulation time still. Negative or non-finite values
    /// are rejected and the previous speed kept; returns false in that case.
    pub fn set_speed(&mut self, multiplier: f64) -> bool {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return false;
        }
        self.speed = if multiplier == 0.0 {
            0.0
        } else {
            multiplier.clamp(MIN_SIMULATION_SPEED, MAX_SIMULATION_SPEED)
        };
        true
    }

    /// Add `wall_dt * speed` to the budget and withdraw as many whole steps
    /// as it covers, up to the per-tick cap. Only a running clock accrues.
    pub fn budget_steps(&mut self, wall_dt: f64) -> usize {
        if self.state != RunState::Running || !wall_dt.is_finite() || wall_dt <= 0.0 {
            return 0;
        }

        self.budget += wall_dt * self.speed;

        let owed = (self.budget / self.fixed_dt).floor() as usize;
        let steps = owed.min(self.max_steps_per_tick);
        self.budget -= steps as f64 * self.fixed_dt;

        if owed > steps {
            // keep only the fractional remainder
            let dropped = owed - steps;
            self.budget %= self.fixed_dt;
            debug!(dropped, cap = self.max_steps_per_tick, "catch-up cap reached, dropping budget");
        }
        steps
    }

    /// Change the step size. The carried budget is simulation time, so it
    /// stays valid; it is paid out in steps of the new size from the next tick.
    pub fn set_fixed_dt(&mut self, fixed_dt: f64) {
        self.fixed_dt = fixed_dt;
    }

    /// Record one executed step.
    pub fn advance_time(&mut self) {
        self.time += self.fixed_dt;
    }

    /// Forget any owed budget (used when a tick stops early).
    pub fn drop_budget(&mut self) {
        self.budget = 0.0;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn max_steps_per_tick(&self) -> usize {
        self.max_steps_per_tick
    }
}
