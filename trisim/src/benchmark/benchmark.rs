use std::time::Instant;

use crate::configuration::config::IntegratorConfig;
use crate::simulation::conservation::total_energy;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::integrator_for;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};

const KINDS: [IntegratorConfig; 3] = [IntegratorConfig::Euler, IntegratorConfig::Verlet, IntegratorConfig::Rk4];

/// Helper to build a manual body set of size `n`
fn make_bodies(n: usize, radius_scale: f64) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(i, 1.0, x, NVec3::zeros(), radius_scale)
        })
        .collect()
}

/// Two unit masses on a circular orbit about the origin, separation 2
fn circular_pair(g: f64, radius_scale: f64) -> Vec<Body> {
    let v = 0.5 * g.sqrt();
    vec![
        Body::new(0, 1.0, NVec3::new(-1.0, 0.0, 0.0), NVec3::new(0.0, -v, 0.0), radius_scale),
        Body::new(1, 1.0, NVec3::new(1.0, 0.0, 0.0), NVec3::new(0.0, v, 0.0), radius_scale),
    ]
}

/// Time one step of every integrator for growing N
pub fn bench_integrators() {
    let ns = [3, 10, 50, 100, 200, 400];
    let params = Parameters::default();
    let gravity = NewtonianGravity::new(params.g, params.softening);

    for n in ns {
        // Small n: average over many steps to smooth noise
        let steps = if n <= 50 { 1000 } else { 10 };
        let template = make_bodies(n, params.radius_scale);

        let mut line = format!("N = {n:5}");
        for kind in KINDS {
            let integrator = integrator_for(&kind);
            let mut bodies = template.clone();

            // Warm up
            if let Err(err) = integrator.step(&mut bodies, params.h0, &gravity) {
                println!("{}: {err}", integrator.name());
                continue;
            }

            let t0 = Instant::now();
            for _ in 0..steps {
                if integrator.step(&mut bodies, params.h0, &gravity).is_err() {
                    break;
                }
            }
            let per_step = t0.elapsed().as_secs_f64() / steps as f64;
            line.push_str(&format!(", {} = {:10.3e} s", integrator.name(), per_step));
        }
        println!("{line}");
    }
}

/// Relative energy drift of each integrator on a circular two-body orbit
/// Paste output directly into a spreadsheet to graph
pub fn bench_energy_drift() {
    let params = Parameters::default();
    let gravity = NewtonianGravity::new(params.g, params.softening);
    let checkpoints = [100, 1_000, 10_000, 100_000];

    let template = circular_pair(params.g, params.radius_scale);
    let e0 = total_energy(&template, params.g);

    println!("steps,euler,verlet,rk4");

    let mut systems: Vec<Vec<Body>> = KINDS.iter().map(|_| template.clone()).collect();
    let integrators: Vec<_> = KINDS.iter().map(integrator_for).collect();

    let mut done = 0;
    for target in checkpoints {
        for (bodies, integrator) in systems.iter_mut().zip(&integrators) {
            for _ in done..target {
                if integrator.step(bodies, params.h0, &gravity).is_err() {
                    break;
                }
            }
        }
        done = target;

        let drifts: Vec<String> = systems
            .iter()
            .map(|b| format!("{:.3e}", ((total_energy(b, params.g) - e0) / e0).abs()))
            .collect();
        println!("{},{}", target, drifts.join(","));
    }
}
