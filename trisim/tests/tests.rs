use approx::assert_relative_eq;

use trisim::simulation::conservation::{
    center_of_mass, kinetic_energy, potential_energy, total_angular_momentum, total_angular_momentum_about,
    total_energy, total_momentum, ConservationBaseline,
};
use trisim::simulation::forces::{ForceModel, NewtonianGravity};
use trisim::simulation::integrator::{Integrator, Rk4, SemiImplicitEuler, VelocityVerlet};
use trisim::simulation::scenario::{build_bodies, lagrange_triangle};
use trisim::simulation::states::{Body, NVec3};
use trisim::{has_collision, EngineError};

const RADIUS_SCALE: f64 = 0.5;

/// Build a simple 2-body system separated along x-axis, at rest
fn two_body_system(dist: f64, m1: f64, m2: f64) -> Vec<Body> {
    vec![
        Body::new(0, m1, NVec3::new(-dist / 2.0, 0.0, 0.0), NVec3::zeros(), RADIUS_SCALE),
        Body::new(1, m2, NVec3::new(dist / 2.0, 0.0, 0.0), NVec3::zeros(), RADIUS_SCALE),
    ]
}

/// Two unit masses at x = ±1 moving in opposite directions along y.
/// v = 0.5 is the circular speed for G = 1; anything else gives an ellipse.
fn orbiting_pair(v: f64) -> Vec<Body> {
    vec![
        Body::new(0, 1.0, NVec3::new(-1.0, 0.0, 0.0), NVec3::new(0.0, -v, 0.0), RADIUS_SCALE),
        Body::new(1, 1.0, NVec3::new(1.0, 0.0, 0.0), NVec3::new(0.0, v, 0.0), RADIUS_SCALE),
    ]
}

/// Default gravity for tests
fn gravity() -> NewtonianGravity {
    NewtonianGravity::new(1.0, 1.0e-3)
}

fn positions(bodies: &[Body]) -> Vec<NVec3> {
    bodies.iter().map(|b| b.position).collect()
}

fn velocities(bodies: &[Body]) -> Vec<NVec3> {
    bodies.iter().map(|b| b.velocity).collect()
}

fn relative_drift(current: f64, initial: f64) -> f64 {
    ((current - initial) / initial).abs()
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let mut bodies = two_body_system(1.0, 2.0, 3.0);
    gravity().compute_forces(&mut bodies).unwrap();

    // exact negation, not just approximately
    assert_eq!(bodies[0].force, -bodies[1].force);

    let net = bodies[0].force + bodies[1].force;
    assert!(net.norm() < 1e-12, "Net force not zero: {:?}", net);
}

#[test]
fn gravity_pair_force_is_antisymmetric() {
    let g = gravity();
    let pairs = [
        (NVec3::new(0.3, -1.2, 0.7), 1.3, NVec3::new(-2.1, 0.4, 0.05), 0.6),
        (NVec3::new(5.0, 5.0, 5.0), 2.0, NVec3::new(4.9, 5.2, 4.7), 0.1),
        (NVec3::new(0.0, 0.0, 0.0), 1.0, NVec3::new(0.0, 0.0, 1.0e-2), 1.0),
    ];

    for (xi, mi, xj, mj) in pairs {
        let f_ij = g.pair_force(&xi, mi, &xj, mj).unwrap();
        let f_ji = g.pair_force(&xj, mj, &xi, mi).unwrap();
        assert_eq!(f_ij, -f_ji);
    }
}

#[test]
fn gravity_points_toward_other_body() {
    let mut bodies = two_body_system(2.0, 1.0, 1.0);
    gravity().compute_forces(&mut bodies).unwrap();

    let dx = bodies[1].position - bodies[0].position;
    assert!(bodies[0].force.dot(&dx) > 0.0, "Force is not toward second body");
    assert!(bodies[1].force.dot(&dx) < 0.0, "Force is not toward first body");
}

#[test]
fn gravity_magnitude_matches_newton() {
    let mut bodies = two_body_system(2.0, 2.0, 3.0);
    NewtonianGravity::new(0.5, 1.0e-3).compute_forces(&mut bodies).unwrap();

    // G m1 m2 / r^2 = 0.5 * 6 / 4
    assert_relative_eq!(bodies[0].force.norm(), 0.75, max_relative = 1e-12);
}

#[test]
fn gravity_inverse_square_law() {
    let mut near = two_body_system(1.0, 1.0, 1.0);
    let mut far = two_body_system(2.0, 1.0, 1.0);

    gravity().compute_forces(&mut near).unwrap();
    gravity().compute_forces(&mut far).unwrap();

    let ratio = near[0].force.norm() / far[0].force.norm();
    assert_relative_eq!(ratio, 4.0, max_relative = 1e-12);
}

#[test]
fn gravity_softening_floors_the_distance() {
    let g = NewtonianGravity::new(1.0, 0.1);
    let mut bodies = two_body_system(1e-9, 1.0, 1.0);
    g.compute_forces(&mut bodies).unwrap();

    // r is replaced by the 0.1 floor: |F| = 1 / 0.01
    assert_relative_eq!(bodies[0].force.norm(), 100.0, max_relative = 1e-9);
}

#[test]
fn gravity_coincident_bodies_with_softening_feel_no_force() {
    let mut bodies = two_body_system(0.0, 1.0, 1.0);
    gravity().compute_forces(&mut bodies).unwrap();

    assert_eq!(bodies[0].force, NVec3::zeros());
    assert_eq!(bodies[1].force, NVec3::zeros());
}

#[test]
fn gravity_zero_softening_reports_degenerate_pair() {
    let g = NewtonianGravity::new(1.0, 0.0);
    let mut bodies = vec![
        Body::new(0, 1.0, NVec3::new(5.0, 0.0, 0.0), NVec3::zeros(), RADIUS_SCALE),
        Body::new(1, 1.0, NVec3::new(1.0, 1.0, 1.0), NVec3::zeros(), RADIUS_SCALE),
        Body::new(2, 1.0, NVec3::new(1.0, 1.0, 1.0), NVec3::zeros(), RADIUS_SCALE),
    ];

    let err = g.compute_forces(&mut bodies).unwrap_err();
    assert_eq!(err, EngineError::DegenerateConfiguration { first: 1, second: 2 });

    // accumulators untouched on failure
    assert!(bodies.iter().all(|b| b.force == NVec3::zeros()));
}

#[test]
fn gravity_frozen_body_neither_pulls_nor_is_pulled() {
    let mut bodies = vec![
        Body::new(0, 1.0, NVec3::new(-1.0, 0.0, 0.0), NVec3::zeros(), RADIUS_SCALE),
        Body::new(1, 5.0, NVec3::new(0.0, 1.0, 0.0), NVec3::zeros(), RADIUS_SCALE),
        Body::new(2, 1.0, NVec3::new(1.0, 0.0, 0.0), NVec3::zeros(), RADIUS_SCALE),
    ];
    bodies[1].is_active = false;

    gravity().compute_forces(&mut bodies).unwrap();

    assert_eq!(bodies[1].force, NVec3::zeros());
    assert_eq!(bodies[0].force, -bodies[2].force);
    assert_eq!(bodies[0].force.y, 0.0);
}

#[test]
fn gravity_ignores_bodies_with_non_finite_positions() {
    let g = gravity();
    let x = [
        NVec3::new(-1.0, 0.0, 0.0),
        NVec3::new(f64::INFINITY, 0.0, 0.0),
        NVec3::new(1.0, 0.0, 0.0),
        NVec3::new(f64::NAN, 0.0, 0.0),
    ];
    let m = [1.0; 4];
    let active = [true; 4];

    let forces = g.forces(&x, &m, &active).unwrap();
    assert!(forces.iter().all(|f| f.iter().all(|c| c.is_finite())));
    assert_eq!(forces[1], NVec3::zeros());
    assert_eq!(forces[3], NVec3::zeros());
    assert_relative_eq!(forces[0].x, 0.25, max_relative = 1e-12);
    assert_eq!(forces[0], -forces[2]);

    // finite positions whose separation overflows
    let far = [NVec3::new(-1.7e308, 0.0, 0.0), NVec3::new(1.7e308, 0.0, 0.0)];
    let forces = g.forces(&far, &m[..2], &active[..2]).unwrap();
    assert!(forces.iter().all(|f| *f == NVec3::zeros()));
}

#[test]
fn multi_stage_integrators_keep_overflow_local() {
    let integrators: [&dyn Integrator; 3] = [&SemiImplicitEuler, &Rk4, &VelocityVerlet];

    for integrator in integrators {
        let mut bodies = orbiting_pair(0.5);
        bodies.push(Body::new(
            2,
            1.0,
            NVec3::new(1.79e308, 0.0, 0.0),
            NVec3::new(1.0e308, 0.0, 0.0),
            RADIUS_SCALE,
        ));

        integrator.step(&mut bodies, 0.01, &gravity()).unwrap();

        assert!(!bodies[2].is_finite(), "{}: runaway stayed finite", integrator.name());
        assert!(bodies[0].is_finite(), "{}: overflow leaked into body 0", integrator.name());
        assert!(bodies[1].is_finite(), "{}: overflow leaked into body 1", integrator.name());
        assert_eq!(center_of_mass(&bodies[..2]), NVec3::zeros());
    }
}

#[test]
fn gravity_only_touches_force_accumulators() {
    let mut bodies = orbiting_pair(0.5);
    let x = positions(&bodies);
    let v = velocities(&bodies);

    // stale accumulator from a previous step must be discarded
    bodies[0].force = NVec3::new(100.0, 100.0, 100.0);
    gravity().compute_forces(&mut bodies).unwrap();

    assert_eq!(positions(&bodies), x);
    assert_eq!(velocities(&bodies), v);
    assert_relative_eq!(bodies[0].force.x, 0.25, max_relative = 1e-12);
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn integrators_reject_non_positive_dt_without_mutation() {
    let integrators: [&dyn Integrator; 3] = [&SemiImplicitEuler, &Rk4, &VelocityVerlet];

    for integrator in integrators {
        for dt in [0.0, -0.01, f64::NAN] {
            let mut bodies = orbiting_pair(0.5);
            let x = positions(&bodies);
            let v = velocities(&bodies);

            let result = integrator.step(&mut bodies, dt, &gravity());
            assert!(
                matches!(result, Err(EngineError::InvalidTimeStep(_))),
                "{} accepted dt = {}",
                integrator.name(),
                dt
            );
            assert_eq!(positions(&bodies), x);
            assert_eq!(velocities(&bodies), v);
        }
    }
}

#[test]
fn integrators_leave_state_alone_on_degenerate_configuration() {
    let integrators: [&dyn Integrator; 3] = [&SemiImplicitEuler, &Rk4, &VelocityVerlet];
    let g = NewtonianGravity::new(1.0, 0.0);

    for integrator in integrators {
        let mut bodies = two_body_system(0.0, 1.0, 1.0);
        bodies[0].velocity = NVec3::new(0.0, 1.0, 0.0);
        let x = positions(&bodies);
        let v = velocities(&bodies);

        let result = integrator.step(&mut bodies, 0.01, &g);
        assert!(matches!(result, Err(EngineError::DegenerateConfiguration { .. })));
        assert_eq!(positions(&bodies), x);
        assert_eq!(velocities(&bodies), v);
    }
}

#[test]
fn euler_updates_velocity_before_position() {
    let mut bodies = two_body_system(2.0, 1.0, 1.0);
    let dt = 0.1;
    SemiImplicitEuler.step(&mut bodies, dt, &gravity()).unwrap();

    // a = 1/4 toward the other body; v = a dt; x = x0 + v dt
    assert_relative_eq!(bodies[0].velocity.x, 0.025, max_relative = 1e-12);
    assert_relative_eq!(bodies[0].position.x, -1.0 + 0.0025, max_relative = 1e-12);
}

#[test]
fn rk4_two_body_conserves_energy_and_angular_momentum() {
    let mut bodies = orbiting_pair(0.45);
    let g = gravity();

    let e0 = total_energy(&bodies, 1.0);
    let l0 = total_angular_momentum(&bodies).norm();

    for _ in 0..10_000 {
        Rk4.step(&mut bodies, 0.01, &g).unwrap();
    }

    let e1 = total_energy(&bodies, 1.0);
    let l1 = total_angular_momentum(&bodies).norm();

    assert!(relative_drift(e1, e0) < 1e-3, "energy drift {}", relative_drift(e1, e0));
    assert!(relative_drift(l1, l0) < 1e-3, "angular momentum drift {}", relative_drift(l1, l0));
}

#[test]
fn euler_drifts_more_than_rk4() {
    let g = gravity();
    let mut euler = orbiting_pair(0.45);
    let mut rk4 = orbiting_pair(0.45);
    let e0 = total_energy(&euler, 1.0);

    let mut worst_euler: f64 = 0.0;
    let mut worst_rk4: f64 = 0.0;
    for _ in 0..1_000 {
        SemiImplicitEuler.step(&mut euler, 0.01, &g).unwrap();
        Rk4.step(&mut rk4, 0.01, &g).unwrap();
        worst_euler = worst_euler.max(relative_drift(total_energy(&euler, 1.0), e0));
        worst_rk4 = worst_rk4.max(relative_drift(total_energy(&rk4, 1.0), e0));
    }

    assert!(worst_euler > worst_rk4, "euler {} vs rk4 {}", worst_euler, worst_rk4);
}

#[test]
fn verlet_keeps_energy_bounded() {
    let mut bodies = orbiting_pair(0.45);
    let g = gravity();
    let e0 = total_energy(&bodies, 1.0);

    for _ in 0..10_000 {
        VelocityVerlet.step(&mut bodies, 0.01, &g).unwrap();
        assert!(relative_drift(total_energy(&bodies, 1.0), e0) < 1e-3);
    }
}

#[test]
fn symmetric_pair_keeps_center_of_mass_at_origin() {
    let integrators: [&dyn Integrator; 3] = [&SemiImplicitEuler, &Rk4, &VelocityVerlet];

    for integrator in integrators {
        let mut bodies = orbiting_pair(0.4);
        for step in 0..5_000 {
            integrator.step(&mut bodies, 0.01, &gravity()).unwrap();
            if step % 100 == 0 {
                let com = center_of_mass(&bodies);
                assert!(com.norm() < 1e-12, "{}: com drifted to {:?}", integrator.name(), com);
            }
        }
    }
}

#[test]
fn rk4_is_deterministic() {
    let mut a = orbiting_pair(0.45);
    let mut b = orbiting_pair(0.45);
    for _ in 0..500 {
        Rk4.step(&mut a, 0.01, &gravity()).unwrap();
        Rk4.step(&mut b, 0.01, &gravity()).unwrap();
    }
    assert_eq!(positions(&a), positions(&b));
    assert_eq!(velocities(&a), velocities(&b));
}

#[test]
fn frozen_bodies_do_not_move() {
    let integrators: [&dyn Integrator; 3] = [&SemiImplicitEuler, &Rk4, &VelocityVerlet];

    for integrator in integrators {
        let mut bodies = orbiting_pair(0.5);
        bodies.push(Body::new(2, 1.0, NVec3::new(0.0, 3.0, 0.0), NVec3::new(0.2, 0.0, 0.0), RADIUS_SCALE));
        bodies[2].is_active = false;

        for _ in 0..100 {
            integrator.step(&mut bodies, 0.01, &gravity()).unwrap();
        }

        assert_eq!(bodies[2].position, NVec3::new(0.0, 3.0, 0.0));
        assert_eq!(bodies[2].velocity, NVec3::new(0.2, 0.0, 0.0));
    }
}

#[test]
fn lagrange_triangle_rk4_scenario() {
    let preset = lagrange_triangle("lagrange", 1.0, 1.0, 2.0);
    let mut bodies = build_bodies(&preset, RADIUS_SCALE).unwrap();
    let g = gravity();
    let e0 = total_energy(&bodies, 1.0);

    for _ in 0..1_000 {
        Rk4.step(&mut bodies, 0.001, &g).unwrap();
        assert!(!has_collision(&bodies), "false collision reported");
    }

    let e1 = total_energy(&bodies, 1.0);
    assert!(relative_drift(e1, e0) < 1e-2, "energy drift {}", relative_drift(e1, e0));
}

// ==================================================================================
// Conservation tests
// ==================================================================================

#[test]
fn energy_of_pair_at_rest_is_pure_potential() {
    let bodies = two_body_system(2.0, 2.0, 3.0);

    assert_eq!(kinetic_energy(&bodies), 0.0);
    assert_relative_eq!(potential_energy(&bodies, 0.5), -0.5 * 6.0 / 2.0, max_relative = 1e-12);
    assert_relative_eq!(total_energy(&bodies, 0.5), -1.5, max_relative = 1e-12);
}

#[test]
fn kinetic_energy_and_momentum() {
    let bodies = vec![
        Body::new(0, 2.0, NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), RADIUS_SCALE),
        Body::new(1, 1.0, NVec3::new(10.0, 0.0, 0.0), NVec3::new(0.0, 2.0, 0.0), RADIUS_SCALE),
    ];

    assert_relative_eq!(kinetic_energy(&bodies), 1.0 + 2.0, max_relative = 1e-12);
    assert_relative_eq!(total_momentum(&bodies), NVec3::new(2.0, 2.0, 0.0), epsilon = 1e-12);
}

#[test]
fn angular_momentum_reference_point_matters_with_net_momentum() {
    let bodies = vec![
        Body::new(0, 1.0, NVec3::new(1.0, 0.0, 0.0), NVec3::new(0.0, 1.0, 0.0), RADIUS_SCALE),
        Body::new(1, 1.0, NVec3::new(3.0, 0.0, 0.0), NVec3::new(0.0, 1.0, 0.0), RADIUS_SCALE),
    ];

    // about the origin: 1*1 + 3*1 along z
    assert_relative_eq!(total_angular_momentum(&bodies), NVec3::new(0.0, 0.0, 4.0), epsilon = 1e-12);

    // about the center of mass (2, 0, 0): -1 + 1
    let com = center_of_mass(&bodies);
    assert_relative_eq!(com, NVec3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(total_angular_momentum_about(&bodies, &com), NVec3::zeros(), epsilon = 1e-12);
}

#[test]
fn center_of_mass_is_mass_weighted() {
    let bodies = vec![
        Body::new(0, 3.0, NVec3::new(0.0, 0.0, 0.0), NVec3::zeros(), RADIUS_SCALE),
        Body::new(1, 1.0, NVec3::new(4.0, 8.0, -4.0), NVec3::zeros(), RADIUS_SCALE),
    ];
    assert_relative_eq!(center_of_mass(&bodies), NVec3::new(1.0, 2.0, -1.0), epsilon = 1e-12);
    assert_eq!(center_of_mass(&[]), NVec3::zeros());
}

#[test]
fn baseline_report_measures_relative_error() {
    let mut bodies = orbiting_pair(0.45);
    let baseline = ConservationBaseline::capture(&bodies, 1.0);

    let fresh = baseline.report(&bodies, 1.0);
    assert_eq!(fresh.energy_error, 0.0);
    assert_eq!(fresh.angular_momentum_error, 0.0);

    // double both speeds: |L| doubles
    for b in bodies.iter_mut() {
        b.velocity *= 2.0;
    }
    let later = baseline.report(&bodies, 1.0);
    assert_relative_eq!(later.angular_momentum_error, 1.0, max_relative = 1e-12);
    assert!(later.energy_error > 0.0);
}
