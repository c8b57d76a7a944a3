//! Force contributors for the n-body engine
//!
//! Defines the [`ForceModel`] trait and direct-sum Newtonian gravity with a
//! softening floor. Force models are stateless over the body set: they read a
//! configuration (positions, masses, active flags) and write forces into an
//! output buffer, so the same model serves single-pass and multi-stage
//! integrators alike.

use crate::error::{EngineError, Result};
use crate::simulation::states::{Body, NVec3};

/// Separations at or below this count as "on top of each other".
pub const DEGENERATE_SEPARATION: f64 = 1.0e-12;

/// Trait for force sources operating on a whole configuration.
/// Implementations add their contribution into `out[i]` for each body.
pub trait ForceModel {
    fn accumulate_forces(&self, x: &[NVec3], m: &[f64], active: &[bool], out: &mut [NVec3]) -> Result<()>;

    /// Net force on every body of the configuration, starting from zero.
    fn forces(&self, x: &[NVec3], m: &[f64], active: &[bool]) -> Result<Vec<NVec3>> {
        let mut out = vec![NVec3::zeros(); x.len()];
        self.accumulate_forces(x, m, active, &mut out)?;
        Ok(out)
    }

    /// Acceleration F/m for every body of the configuration.
    /// Inactive bodies get zero.
    fn accelerations(&self, x: &[NVec3], m: &[f64], active: &[bool]) -> Result<Vec<NVec3>> {
        let mut out = self.forces(x, m, active)?;
        for ((a, mass), on) in out.iter_mut().zip(m).zip(active) {
            if *on {
                *a /= *mass;
            } else {
                *a = NVec3::zeros();
            }
        }
        Ok(out)
    }

    /// Reset every body's force accumulator and fill it with the net force.
    ///
    /// Only the accumulators are touched; on error they are left as they were.
    fn compute_forces(&self, bodies: &mut [Body]) -> Result<()> {
        let x: Vec<NVec3> = bodies.iter().map(|b| b.position).collect();
        let m: Vec<f64> = bodies.iter().map(|b| b.mass).collect();
        let active: Vec<bool> = bodies.iter().map(|b| b.is_active).collect();

        let forces = self.forces(&x, &m, &active)?;

        for (b, f) in bodies.iter_mut().zip(forces.iter()) {
            b.reset_force();
            b.apply_force(f);
        }
        Ok(())
    }
}

/// Newtonian gravity with a minimum-distance floor
///
/// For every unordered pair the separation is replaced by
/// `max(|d|, softening)` before applying the inverse-square law, so forces
/// stay bounded at close range. A softening of zero turns on a diagnostic
/// mode in which coincident bodies are reported instead of smoothed.
#[derive(Debug, Clone)]
pub struct NewtonianGravity {
    pub g: f64,         // gravitational constant
    pub softening: f64, // distance floor
}

impl NewtonianGravity {
    pub fn new(g: f64, softening: f64) -> Self {
        Self { g, softening }
    }

    /// Force on body i exerted by body j (the force on j is the negation).
    ///
    /// Returns `None` for coincident bodies, where the direction is undefined,
    /// and for non-finite separations, which would otherwise yield inf * 0 = NaN.
    pub fn pair_force(&self, xi: &NVec3, mi: f64, xj: &NVec3, mj: f64) -> Option<NVec3> {
        // d points from i to j, so i is pulled along +d
        let d = xj - xi;
        let dist = d.norm();
        if dist == 0.0 || !dist.is_finite() {
            return None;
        }

        let r = dist.max(self.softening);
        let magnitude = self.g * mi * mj / (r * r);

        // magnitude * d / |d|
        Some(d * (magnitude / dist))
    }
}

impl ForceModel for NewtonianGravity {
    fn accumulate_forces(&self, x: &[NVec3], m: &[f64], active: &[bool], out: &mut [NVec3]) -> Result<()> {
        let n = x.len();
        if n == 0 { // No bodies, return
            return Ok(());
        }

        // A body whose stage position blew up contributes to no pair
        let usable: Vec<bool> = x
            .iter()
            .zip(active)
            .map(|(xi, on)| *on && xi.iter().all(|c| c.is_finite()))
            .collect();

        // Each unordered pair (i, j) with i < j exactly once
        for i in 0..n {
            if !usable[i] {
                continue;
            }
            for j in (i + 1)..n {
                if !usable[j] {
                    continue;
                }

                if self.softening == 0.0 && (x[j] - x[i]).norm() <= DEGENERATE_SEPARATION {
                    return Err(EngineError::DegenerateConfiguration { first: i, second: j });
                }

                // Coincident under a positive floor: normalize(0) = 0, no force
                let Some(f) = self.pair_force(&x[i], m[i], &x[j], m[j]) else {
                    continue;
                };

                // equal and opposite
                out[i] += f;
                out[j] -= f;
            }
        }
        Ok(())
    }
}
