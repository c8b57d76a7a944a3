//! Core state types for the N-body simulation.
//!
//! - `NVec3`    fixed-shape 3D vector (nalgebra), used for every kinematic quantity
//! - `Body`     one point mass with its force accumulator, trail and status flags
//! - `Trail`    bounded FIFO of past positions, oldest first
//! - `Snapshot` immutable copy of the kinematic state of the whole body set,
//!   consumed by the multi-stage integrators

use std::collections::VecDeque;

use nalgebra::Vector3;

pub type NVec3 = Vector3<f64>;

/// Smallest mass a body may carry. Anything at or below zero is clamped up to this.
pub const MIN_MASS: f64 = 1.0e-9;

#[derive(Debug, Clone)]
pub struct Body {
    pub id: usize,
    pub mass: f64,        // always > 0
    pub position: NVec3,  // x
    pub velocity: NVec3,  // v
    pub force: NVec3,     // accumulated force, zeroed at the start of each step
    pub radius: f64,      // mass^(1/3) * radius_scale
    pub trail: Trail,     // past positions, oldest first
    pub is_active: bool,  // false once frozen on non-finite state
    pub is_colliding: bool,
    radius_scale: f64,
}

impl Body {
    /// Build a body. `mass` is clamped to [`MIN_MASS`] and the radius derived from it.
    pub fn new(id: usize, mass: f64, position: NVec3, velocity: NVec3, radius_scale: f64) -> Self {
        let mass = clamp_mass(mass);
        Self {
            id,
            mass,
            position,
            velocity,
            force: NVec3::zeros(),
            radius: derived_radius(mass, radius_scale),
            trail: Trail::new(),
            is_active: true,
            is_colliding: false,
            radius_scale,
        }
    }

    /// Change the mass and re-derive the radius.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = clamp_mass(mass);
        self.radius = derived_radius(self.mass, self.radius_scale);
    }

    pub fn reset_force(&mut self) {
        self.force = NVec3::zeros();
    }

    pub fn apply_force(&mut self, f: &NVec3) {
        self.force += f;
    }

    /// Current acceleration from the accumulated force, F / m.
    pub fn acceleration(&self) -> NVec3 {
        self.force / self.mass
    }

    pub fn momentum(&self) -> NVec3 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (other.position - self.position).norm()
    }

    /// True when every position and velocity component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
    }
}

fn clamp_mass(mass: f64) -> f64 {
    if mass.is_finite() {
        mass.max(MIN_MASS)
    } else {
        MIN_MASS
    }
}

fn derived_radius(mass: f64, radius_scale: f64) -> f64 {
    mass.cbrt() * radius_scale
}

/// Bounded, time-ordered history of one body's positions.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<NVec3>,
}

impl Trail {
    pub fn new() -> Self {
        Self { points: VecDeque::new() }
    }

    /// Append `point` unless it lies within `min_distance` of the last point.
    /// Oldest points are evicted once `max_len` is exceeded.
    /// Returns whether the point was kept.
    pub fn push(&mut self, point: NVec3, min_distance: f64, max_len: usize) -> bool {
        if let Some(last) = self.points.back() {
            if (point - last).norm() <= min_distance {
                return false;
            }
        }
        self.points.push_back(point);
        self.truncate_to(max_len);
        true
    }

    /// Keep only the `n` most recent points.
    pub fn truncate_to(&mut self, n: usize) {
        while self.points.len() > n {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&NVec3> {
        self.points.back()
    }

    /// Points oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &NVec3> {
        self.points.iter()
    }
}

/// Immutable copy of the whole system's kinematic state.
///
/// Multi-stage integrators build perturbed positions/velocities from this and
/// only write back to the bodies once every stage has been evaluated.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub x: Vec<NVec3>,     // positions
    pub v: Vec<NVec3>,     // velocities
    pub m: Vec<f64>,       // masses
    pub active: Vec<bool>, // participates in forces / integration
}

impl Snapshot {
    pub fn capture(bodies: &[Body]) -> Self {
        Self {
            x: bodies.iter().map(|b| b.position).collect(),
            v: bodies.iter().map(|b| b.velocity).collect(),
            m: bodies.iter().map(|b| b.mass).collect(),
            active: bodies.iter().map(|b| b.is_active).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
