//! Down-sampled trajectory history
//!
//! The recorder runs once per integration step but only samples every
//! `update_interval` steps. A sample is the position a body held at the
//! *start* of the step, and is dropped when it lies within `min_distance`
//! of the previous point so parked bodies do not flood their trail.

use crate::simulation::states::{Body, NVec3};

pub const DEFAULT_MAX_TRAIL_LENGTH: usize = 500;
pub const DEFAULT_TRAIL_UPDATE_INTERVAL: u32 = 5;
pub const DEFAULT_TRAIL_MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct TrajectoryRecorder {
    pub max_length: usize,
    pub update_interval: u32, // steps between samples, >= 1
    pub min_distance: f64,
    steps_since_sample: u32,
}

impl Default for TrajectoryRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRAIL_LENGTH, DEFAULT_TRAIL_UPDATE_INTERVAL, DEFAULT_TRAIL_MIN_DISTANCE)
    }
}

impl TrajectoryRecorder {
    pub fn new(max_length: usize, update_interval: u32, min_distance: f64) -> Self {
        Self {
            max_length,
            update_interval: update_interval.max(1),
            min_distance: min_distance.max(0.0),
            steps_since_sample: 0,
        }
    }

    /// Called after every step with the positions captured before it.
    /// Returns true on the steps where a sample was taken.
    pub fn observe(&mut self, bodies: &mut [Body], start_positions: &[NVec3]) -> bool {
        self.steps_since_sample += 1;
        if self.steps_since_sample < self.update_interval {
            return false;
        }
        self.steps_since_sample = 0;

        for (b, x) in bodies.iter_mut().zip(start_positions) {
            b.trail.push(*x, self.min_distance, self.max_length);
        }
        true
    }

    /// Change the bound and cut every existing trail down to the newest `n` points.
    pub fn set_max_trail_length(&mut self, n: usize, bodies: &mut [Body]) {
        self.max_length = n;
        for b in bodies.iter_mut() {
            b.trail.truncate_to(n);
        }
    }

    /// Forget the sampling phase, e.g. after a reset.
    pub fn restart(&mut self) {
        self.steps_since_sample = 0;
    }
}
