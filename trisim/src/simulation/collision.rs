//! Overlap detection
//!
//! Two bodies collide when their center distance is strictly below the sum
//! of their radii. Detection only flags; nothing is merged or bounced.

use crate::simulation::states::Body;

fn overlapping(a: &Body, b: &Body) -> bool {
    a.distance_to(b) < a.radius + b.radius
}

/// True if any pair overlaps. Stops at the first hit.
pub fn has_collision(bodies: &[Body]) -> bool {
    bodies
        .iter()
        .enumerate()
        .any(|(i, a)| bodies[i + 1..].iter().any(|b| overlapping(a, b)))
}

/// Refresh every body's `is_colliding` flag. Returns whether any pair overlaps.
pub fn flag_collisions(bodies: &mut [Body]) -> bool {
    let n = bodies.len();
    let mut colliding = vec![false; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if overlapping(&bodies[i], &bodies[j]) {
                colliding[i] = true;
                colliding[j] = true;
            }
        }
    }

    for (b, c) in bodies.iter_mut().zip(colliding.iter()) {
        b.is_colliding = *c;
    }
    colliding.contains(&true)
}
