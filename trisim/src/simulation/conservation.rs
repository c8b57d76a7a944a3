//! Conserved-quantity diagnostics
//!
//! Pure, read-only functions over a body set. They are used for on-screen
//! readouts and as test oracles and never feed back into the simulation.
//!
//! Angular momentum is measured about the global origin by default.
//! [`total_angular_momentum_about`] takes an explicit reference point for
//! callers that want to re-center, e.g. on [`center_of_mass`].

use crate::simulation::states::{Body, NVec3};

/// Pairs closer than this are left out of the potential energy sum.
pub const MIN_POTENTIAL_DISTANCE: f64 = 1.0e-3;

/// Σ ½ m |v|²
pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

/// −Σ_{i<j} G m_i m_j / r_ij
pub fn potential_energy(bodies: &[Body], g: f64) -> f64 {
    let mut u = 0.0;
    for (i, bi) in bodies.iter().enumerate() {
        for bj in &bodies[i + 1..] {
            let r = bi.distance_to(bj);
            if r > MIN_POTENTIAL_DISTANCE {
                u -= g * bi.mass * bj.mass / r;
            }
        }
    }
    u
}

pub fn total_energy(bodies: &[Body], g: f64) -> f64 {
    kinetic_energy(bodies) + potential_energy(bodies, g)
}

/// Σ m v
pub fn total_momentum(bodies: &[Body]) -> NVec3 {
    bodies.iter().map(Body::momentum).sum()
}

/// Σ m (r × v) about the origin
pub fn total_angular_momentum(bodies: &[Body]) -> NVec3 {
    total_angular_momentum_about(bodies, &NVec3::zeros())
}

/// Σ m ((r − p) × v) about the reference point `p`
pub fn total_angular_momentum_about(bodies: &[Body], p: &NVec3) -> NVec3 {
    bodies
        .iter()
        .map(|b| (b.position - p).cross(&b.velocity) * b.mass)
        .sum()
}

/// Σ m r / Σ m, or the origin for an empty set
pub fn center_of_mass(bodies: &[Body]) -> NVec3 {
    let total_mass: f64 = bodies.iter().map(|b| b.mass).sum();
    if total_mass <= 0.0 {
        return NVec3::zeros();
    }
    let weighted: NVec3 = bodies.iter().map(|b| b.position * b.mass).sum();
    weighted / total_mass
}

/// Velocity of the center of mass, Σ m v / Σ m
pub fn center_of_mass_velocity(bodies: &[Body]) -> NVec3 {
    let total_mass: f64 = bodies.iter().map(|b| b.mass).sum();
    if total_mass <= 0.0 {
        return NVec3::zeros();
    }
    total_momentum(bodies) / total_mass
}

/// |current − initial| / |initial|, or 0 when the baseline is zero.
fn relative_error(current: f64, initial: f64) -> f64 {
    if initial == 0.0 {
        0.0
    } else {
        ((current - initial) / initial).abs()
    }
}

/// Energy and angular momentum captured when a preset is (re)loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservationBaseline {
    pub energy: f64,
    pub angular_momentum: NVec3,
}

impl ConservationBaseline {
    pub fn capture(bodies: &[Body], g: f64) -> Self {
        Self {
            energy: total_energy(bodies, g),
            angular_momentum: total_angular_momentum(bodies),
        }
    }

    /// Current readouts measured against this baseline.
    pub fn report(&self, bodies: &[Body], g: f64) -> ConservationReport {
        let energy = total_energy(bodies, g);
        let angular_momentum = total_angular_momentum(bodies);
        ConservationReport {
            energy,
            energy_error: relative_error(energy, self.energy),
            momentum: total_momentum(bodies),
            angular_momentum,
            angular_momentum_error: relative_error(angular_momentum.norm(), self.angular_momentum.norm()),
            center_of_mass: center_of_mass(bodies),
        }
    }
}

/// Snapshot of the conserved quantities for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservationReport {
    pub energy: f64,
    pub energy_error: f64, // relative to the baseline
    pub momentum: NVec3,
    pub angular_momentum: NVec3,
    pub angular_momentum_error: f64, // relative, on magnitudes
    pub center_of_mass: NVec3,
}
