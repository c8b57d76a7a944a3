//! Fixed-step time integrators for the N-body system
//!
//! Every scheme implements [`Integrator`] and is driven by a [`ForceModel`]:
//! - [`SemiImplicitEuler`]: one force pass, velocity first then position
//! - [`Rk4`]: classic fourth-order Runge-Kutta over the whole coupled system
//! - [`VelocityVerlet`]: symplectic kick-drift-kick, two force passes
//!
//! A step is all-or-nothing: a rejected `dt` or a force error leaves the
//! bodies exactly as they were. Frozen bodies (`is_active == false`) are
//! never moved.

use crate::configuration::config::IntegratorConfig;
use crate::error::{EngineError, Result};
use crate::simulation::forces::ForceModel;
use crate::simulation::states::{Body, NVec3, Snapshot};

/// A time integrator for N-body systems
pub trait Integrator {
    /// Short name for logs and benchmark output
    fn name(&self) -> &'static str;

    /// Advance `bodies` by one step `dt`.
    fn step(&self, bodies: &mut [Body], dt: f64, force: &dyn ForceModel) -> Result<()>;
}

/// Build the strategy selected by configuration.
pub fn integrator_for(kind: &IntegratorConfig) -> Box<dyn Integrator> {
    match kind {
        IntegratorConfig::Euler => Box::new(SemiImplicitEuler),
        IntegratorConfig::Rk4 => Box::new(Rk4),
        IntegratorConfig::Verlet => Box::new(VelocityVerlet),
    }
}

fn check_dt(dt: f64) -> Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidTimeStep(dt))
    }
}

/// Semi-implicit (symplectic) Euler, first order
///
/// v_n+1 = v_n + (F/m) dt
/// x_n+1 = x_n + v_n+1 dt
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn step(&self, bodies: &mut [Body], dt: f64, force: &dyn ForceModel) -> Result<()> {
        check_dt(dt)?;
        if bodies.is_empty() {
            return Ok(());
        }

        // Fills every body's force accumulator; nothing else moves yet
        force.compute_forces(bodies)?;

        for b in bodies.iter_mut().filter(|b| b.is_active) {
            let a = b.acceleration();
            b.velocity += a * dt;
            b.position += b.velocity * dt;
        }
        Ok(())
    }
}

/// Classical 4th-order Runge–Kutta over (x, v) for the whole body set
///
/// Each stage evaluates accelerations for a perturbed copy of the entire
/// system built from the start-of-step snapshot, so bodies never see each
/// other's half-finished stages. Bodies are written once, after stage four.
pub struct Rk4;

/// Derivative of the state: (dx/dt, dv/dt) = (v, a(x)).
fn derivative(
    force: &dyn ForceModel,
    s0: &Snapshot,
    x: &[NVec3],
    v: &[NVec3],
) -> Result<(Vec<NVec3>, Vec<NVec3>)> {
    let dv = force.accelerations(x, &s0.m, &s0.active)?;
    let dx = v
        .iter()
        .zip(&s0.active)
        .map(|(v, on)| if *on { *v } else { NVec3::zeros() })
        .collect();
    Ok((dx, dv))
}

/// base + h * k, element-wise
fn offset(base: &[NVec3], k: &[NVec3], h: f64) -> Vec<NVec3> {
    base.iter().zip(k).map(|(b, k)| b + k * h).collect()
}

impl Integrator for Rk4 {
    fn name(&self) -> &'static str {
        "rk4"
    }

    fn step(&self, bodies: &mut [Body], dt: f64, force: &dyn ForceModel) -> Result<()> {
        check_dt(dt)?;
        if bodies.is_empty() {
            return Ok(());
        }

        let half_dt = 0.5 * dt;
        let s0 = Snapshot::capture(bodies);

        // k1 at (x0, v0)
        let (k1x, k1v) = derivative(force, &s0, &s0.x, &s0.v)?;

        // k2 at x0 + k1 dt/2
        let x2 = offset(&s0.x, &k1x, half_dt);
        let v2 = offset(&s0.v, &k1v, half_dt);
        let (k2x, k2v) = derivative(force, &s0, &x2, &v2)?;

        // k3 at x0 + k2 dt/2
        let x3 = offset(&s0.x, &k2x, half_dt);
        let v3 = offset(&s0.v, &k2v, half_dt);
        let (k3x, k3v) = derivative(force, &s0, &x3, &v3)?;

        // k4 at x0 + k3 dt
        let x4 = offset(&s0.x, &k3x, dt);
        let v4 = offset(&s0.v, &k3v, dt);
        let (k4x, k4v) = derivative(force, &s0, &x4, &v4)?;

        // x = x0 + dt/6 (k1 + 2 k2 + 2 k3 + k4), same for v
        let w = dt / 6.0;
        for (i, b) in bodies.iter_mut().enumerate() {
            // force accumulator reports the start-of-step net force
            b.force = k1v[i] * s0.m[i];
            if !s0.active[i] {
                continue;
            }
            b.position = s0.x[i] + (k1x[i] + 2.0 * k2x[i] + 2.0 * k3x[i] + k4x[i]) * w;
            b.velocity = s0.v[i] + (k1v[i] + 2.0 * k2v[i] + 2.0 * k3v[i] + k4v[i]) * w;
        }
        Ok(())
    }
}

/// Velocity–Verlet (kick-drift-kick leapfrog), second order and symplectic
///
/// 1. Kick:  v_n+1/2 = v_n + a_n dt/2
/// 2. Drift: x_n+1   = x_n + v_n+1/2 dt
/// 3. Kick:  v_n+1   = v_n+1/2 + a_n+1 dt/2
pub struct VelocityVerlet;

impl Integrator for VelocityVerlet {
    fn name(&self) -> &'static str {
        "verlet"
    }

    fn step(&self, bodies: &mut [Body], dt: f64, force: &dyn ForceModel) -> Result<()> {
        check_dt(dt)?;
        if bodies.is_empty() {
            return Ok(());
        }

        let half_dt = 0.5 * dt;
        let s0 = Snapshot::capture(bodies);

        // a_n from x_n
        let a_old = force.accelerations(&s0.x, &s0.m, &s0.active)?;

        let v_half = offset(&s0.v, &a_old, half_dt);
        let x_new: Vec<NVec3> = s0
            .x
            .iter()
            .zip(&v_half)
            .zip(&s0.active)
            .map(|((x, v), on)| if *on { x + v * dt } else { *x })
            .collect();

        // a_n+1 from x_n+1
        let a_new = force.accelerations(&x_new, &s0.m, &s0.active)?;

        for (i, b) in bodies.iter_mut().enumerate() {
            b.force = a_old[i] * s0.m[i];
            if !s0.active[i] {
                continue;
            }
            b.position = x_new[i];
            b.velocity = v_half[i] + a_new[i] * half_dt;
        }
        Ok(())
    }
}
