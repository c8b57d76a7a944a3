use trisim::{bench_energy_drift, bench_integrators};
use trisim::{Engine, ScenarioConfig};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::fs;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Bench {
    Integrators, // time per step for each integrator
    Drift,       // energy drift table
}

/// Headless driver: ticks the engine like a render loop would and prints readouts
#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, long, default_value = "three_body.yaml")]
    file: String,

    /// Preset to load instead of the scenario's `initial_preset`
    #[arg(short, long)]
    preset: Option<String>,

    /// Number of host frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: usize,

    /// Host frame rate, sets wall_dt = 1 / fps
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Print a readout every n frames
    #[arg(long, default_value_t = 300)]
    report_every: usize,

    /// Run a benchmark instead of a simulation
    #[arg(long, value_enum)]
    bench: Option<Bench>,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read scenario {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_yaml(&text)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn report(engine: &Engine, frame: usize) {
    let r = engine.conservation_report();
    println!(
        "frame {:6}  t = {:9.3}  E = {:+.6e}  dE/E = {:.2e}  |L| = {:.6e}  dL/L = {:.2e}  collision = {}",
        frame,
        engine.time(),
        r.energy,
        r.energy_error,
        r.angular_momentum.norm(),
        r.angular_momentum_error,
        engine.has_collision(),
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.bench {
        Some(Bench::Integrators) => {
            bench_integrators();
            return Ok(());
        }
        Some(Bench::Drift) => {
            bench_energy_drift();
            return Ok(());
        }
        None => {}
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file)?;
    if let Some(preset) = &args.preset {
        scenario_cfg.initial_preset = preset.clone();
    }

    let mut engine = Engine::from_config(&scenario_cfg).context("failed to build engine")?;
    println!(
        "running preset '{}' with {} bodies ({:?}), presets available: {}",
        engine.preset_id(),
        engine.bodies().len(),
        engine.integrator(),
        engine.preset_ids().join(", ")
    );

    let wall_dt = 1.0 / args.fps.max(1.0);
    let report_every = args.report_every.max(1);

    engine.start();
    report(&engine, 0);
    for frame in 1..=args.frames {
        engine.tick(wall_dt);

        let diagnostics = engine.take_diagnostics();
        if !diagnostics.is_clear() {
            println!("frame {frame:6}  diagnostics: {diagnostics:?}");
        }

        if frame % report_every == 0 {
            report(&engine, frame);
        }
        if !engine.is_running() {
            println!("frame {frame:6}  simulation paused");
            break;
        }
    }

    for b in engine.bodies() {
        println!(
            "body {}  m = {:.3}  x = [{:+.4}, {:+.4}, {:+.4}]  trail = {}  active = {}",
            b.id,
            b.mass,
            b.position.x,
            b.position.y,
            b.position.z,
            b.trail.len(),
            b.is_active
        );
    }
    Ok(())
}
