use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use smoke_sim_core::{FluidSimulation, QualityPreset, SimulationConfig, SimulationError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Smoke simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "smoke-sim-demo")]
#[command(about = "Headless 3D smoke simulation", long_about = None)]
struct Args {
    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 200)]
    frames: u64,

    /// Grid resolution preset (low, medium, high)
    #[arg(short, long, default_value = "medium", value_parser = parse_quality)]
    quality: QualityPreset,

    /// JSON config file; overrides the quality preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of Jacobi iterations per frame
    #[arg(short, long)]
    jacobi_iterations: Option<usize>,

    /// Log statistics every N frames
    #[arg(short, long, default_value_t = 20)]
    report_interval: u64,

    /// Pause the simulation once this frame is reached
    #[arg(short, long)]
    pause_after: Option<u64>,

    /// Save the final density field as a half-float snapshot
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

fn parse_quality(name: &str) -> Result<QualityPreset, String> {
    QualityPreset::from_name(name).ok_or_else(|| format!("unknown quality preset '{name}'"))
}

fn build_config(args: &Args) -> Result<SimulationConfig, SimulationError> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::for_quality(args.quality)?,
    };
    if let Some(iterations) = args.jacobi_iterations {
        config.jacobi_iterations = iterations;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), SimulationError> {
    let config = build_config(args)?;
    let mut sim = FluidSimulation::new(config)?;
    let report_interval = args.report_interval.max(1);

    for frame in 0..args.frames {
        if args.pause_after == Some(frame) {
            sim.toggle_pause();
        }
        sim.update();

        if (frame + 1) % report_interval == 0 {
            let stats = sim.stats();
            info!(
                frame = stats.frame,
                total_density = stats.total_density,
                max_density = stats.max_density,
                max_speed = stats.max_speed,
                step_ms = stats.average_step_ms,
                residual = stats.last_jacobi_residual,
                paused = sim.is_paused(),
                "progress"
            );
        }
    }

    let stats = sim.stats();
    println!("\n=== Final Statistics ===");
    println!("Frames simulated: {}", stats.frame);
    println!("Total density: {:.3}", stats.total_density);
    println!("Max density: {:.4}", stats.max_density);
    println!("Max speed: {:.3} cells per unit time", stats.max_speed);
    println!("Average step: {:.2} ms", stats.average_step_ms);
    println!("Final Jacobi residual: {:.3e}", stats.last_jacobi_residual);

    if let Some(path) = &args.snapshot {
        sim.save_density(path)?;
        println!("Density snapshot written to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    println!("=== Smoke Simulation Demo ===\n");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
