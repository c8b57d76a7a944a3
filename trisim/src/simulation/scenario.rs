//! Named initial configurations and body construction
//!
//! A preset is a list of `BodyConfig`s (mass, position, velocity). The engine
//! asks a [`PresetProvider`] for one by id on `reset` and turns it into runtime
//! `Body`s via [`build_bodies`], which is where presets get validated.
//!
//! Built-in presets:
//! - `figure8`   Chenciner–Montgomery figure-eight choreography
//! - `lagrange`  equilateral triangle on a circular orbit, velocities from G
//! - `chaotic`   three bodies with no special symmetry
//! - `binary`    tight pair plus a distant third body
//! - `collision` trajectories that end in an overlap
//! - `random`    seeded random masses/positions/velocities, zero net momentum

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::configuration::config::{BodyConfig, PresetConfig};
use crate::error::{EngineError, Result};
use crate::simulation::states::{Body, NVec3};

/// Source of named initial configurations.
///
/// `g` is the gravitational constant in force when the preset is loaded;
/// presets that size orbital velocities from it must use this value.
pub trait PresetProvider {
    fn preset(&self, id: &str, g: f64) -> Option<PresetConfig>;

    /// Every id this provider can serve.
    fn ids(&self) -> Vec<String>;
}

pub const BUILTIN_PRESET_IDS: [&str; 6] = ["figure8", "lagrange", "chaotic", "binary", "collision", "random"];

/// Presets compiled into the crate. `seed` drives `random`.
#[derive(Debug, Clone)]
pub struct BuiltinPresets {
    pub seed: u64,
}

impl BuiltinPresets {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

fn body(m: f64, x: [f64; 3], v: [f64; 3]) -> BodyConfig {
    BodyConfig { m, x, v }
}

fn preset(id: &str, bodies: Vec<BodyConfig>) -> PresetConfig {
    PresetConfig {
        id: id.to_string(),
        bodies,
    }
}

impl PresetProvider for BuiltinPresets {
    fn preset(&self, id: &str, g: f64) -> Option<PresetConfig> {
        let p = match id {
            // http://arxiv.org/abs/math/0011268, G = 1
            "figure8" => preset(id, vec![
                body(1.0, [0.97000436, -0.24308753, 0.0], [0.466203685, 0.43236573, 0.0]),
                body(1.0, [-0.97000436, 0.24308753, 0.0], [0.466203685, 0.43236573, 0.0]),
                body(1.0, [0.0, 0.0, 0.0], [-0.93240737, -0.86473146, 0.0]),
            ]),
            "lagrange" => lagrange_triangle(id, g, 1.0, 2.0),
            "chaotic" => preset(id, vec![
                body(1.0, [3.0, 1.0, 0.0], [0.0, 0.3, 0.0]),
                body(1.0, [-2.0, -1.0, 0.0], [0.1, -0.2, 0.0]),
                body(1.0, [-1.0, 2.0, 0.0], [-0.1, -0.1, 0.0]),
            ]),
            "binary" => preset(id, vec![
                body(1.5, [2.0, 0.0, 0.0], [0.0, 0.6, 0.0]),
                body(1.5, [-2.0, 0.0, 0.0], [0.0, -0.6, 0.0]),
                body(0.8, [0.0, 5.0, 0.0], [-0.4, 0.0, 0.1]),
            ]),
            "collision" => preset(id, vec![
                body(1.0, [3.0, 0.0, 0.0], [0.0, 0.2, 0.0]),
                body(1.0, [-3.0, 0.0, 0.0], [0.0, -0.2, 0.0]),
                body(1.0, [0.0, 0.0, 3.0], [-0.1, -0.1, -0.3]),
            ]),
            "random" => random_preset(id, self.seed),
            _ => return None,
        };
        Some(p)
    }

    fn ids(&self) -> Vec<String> {
        BUILTIN_PRESET_IDS.iter().map(|s| s.to_string()).collect()
    }
}

/// Three equal masses at the corners of an equilateral triangle with side
/// `side`, each moving tangentially at the circular-orbit speed sqrt(G m / side).
pub fn lagrange_triangle(id: &str, g: f64, m: f64, side: f64) -> PresetConfig {
    let r = side / 3f64.sqrt(); // circumradius
    let speed = (g * m / side).sqrt();

    let bodies = (0..3)
        .map(|k| {
            let theta = std::f64::consts::TAU * k as f64 / 3.0;
            let (s, c) = theta.sin_cos();
            body(m, [r * c, r * s, 0.0], [-speed * s, speed * c, 0.0])
        })
        .collect();
    preset(id, bodies)
}

fn random_preset(id: &str, seed: u64) -> PresetConfig {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut bodies: Vec<BodyConfig> = (0..3)
        .map(|_| {
            let m = rng.gen_range(0.5..2.0);
            let x = [rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-2.0..2.0)];
            let v = [rng.gen_range(-0.3..0.3), rng.gen_range(-0.3..0.3), rng.gen_range(-0.1..0.1)];
            body(m, x, v)
        })
        .collect();

    remove_net_momentum(&mut bodies);
    preset(id, bodies)
}

/// Shift every velocity by the center-of-mass velocity so Σ m v = 0.
pub fn remove_net_momentum(bodies: &mut [BodyConfig]) {
    let total_mass: f64 = bodies.iter().map(|b| b.m).sum();
    if total_mass <= 0.0 {
        return;
    }
    let p: NVec3 = bodies.iter().map(|b| NVec3::from(b.v) * b.m).sum();
    let v_com = p / total_mass;

    for b in bodies.iter_mut() {
        for (c, dv) in b.v.iter_mut().zip(v_com.iter()) {
            *c -= dv;
        }
    }
}

/// Config-file presets first, falling back to a second provider.
pub struct PresetLibrary<P: PresetProvider> {
    custom: Vec<PresetConfig>,
    fallback: P,
}

impl<P: PresetProvider> PresetLibrary<P> {
    pub fn new(custom: Vec<PresetConfig>, fallback: P) -> Self {
        Self { custom, fallback }
    }
}

impl<P: PresetProvider> PresetProvider for PresetLibrary<P> {
    fn preset(&self, id: &str, g: f64) -> Option<PresetConfig> {
        self.custom
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .or_else(|| self.fallback.preset(id, g))
    }

    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.custom.iter().map(|p| p.id.clone()).collect();
        for id in self.fallback.ids() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Validate a preset and map it to runtime bodies.
///
/// Rejects empty presets, non-positive or non-finite masses and non-finite
/// positions/velocities. Nothing is built unless every body passes.
pub fn build_bodies(preset: &PresetConfig, radius_scale: f64) -> Result<Vec<Body>> {
    if preset.bodies.is_empty() {
        return Err(EngineError::InvalidConfiguration(format!(
            "preset '{}' has no bodies",
            preset.id
        )));
    }

    for (i, bc) in preset.bodies.iter().enumerate() {
        if !(bc.m.is_finite() && bc.m > 0.0) {
            return Err(EngineError::InvalidConfiguration(format!(
                "preset '{}': body {} has non-positive mass {}",
                preset.id, i, bc.m
            )));
        }
        if !bc.x.iter().chain(bc.v.iter()).all(|c| c.is_finite()) {
            return Err(EngineError::InvalidConfiguration(format!(
                "preset '{}': body {} has a non-finite position or velocity",
                preset.id, i
            )));
        }
    }

    let bodies = preset
        .bodies
        .iter()
        .enumerate()
        .map(|(i, bc)| Body::new(i, bc.m, NVec3::from(bc.x), NVec3::from(bc.v), radius_scale))
        .collect();
    Ok(bodies)
}
