// src/main.rs
// Entry point for the simulator demo: loads a YAML configuration, traces the
// three-quarter circle in a kinematic window and reports where the robot ended.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use waypoint_sim::{KinematicSim, PeriodicScheduler, RotateState, SimConfig, StateMachine};

/// Runs the circle-tracing state against a kinematic simulation
#[derive(Parser, Debug)]
#[command(name = "waypoint-sim", about = "Trace three quarters of a circle in a kinematic simulator.")]
struct Cli {
    /// Path to a YAML config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the circle radius from the config
    #[arg(short, long)]
    radius: Option<f64>,

    /// Run without waiting out the tick period
    #[arg(long)]
    fast: bool,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=debug
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(radius) = cli.radius {
        config.controller.radius = radius;
    }
    if cli.fast {
        config.runner.period_ms = 0;
    }
    config.validate().context("invalid configuration")?;
    info!("Starting simulation with {:?}", config);

    let mut sim = KinematicSim::new(config.runner.start);
    let state = RotateState::new(config.controller.radius)?;
    let mut machine = StateMachine::new(Box::new(state));
    let scheduler = PeriodicScheduler::from_config(&config.runner);

    match scheduler.run(&mut machine, &mut sim) {
        Ok(report) => {
            info!(
                "Done in {} ticks ({:.2}s simulated), final pose ({:.2}, {:.2}, {:.1})",
                report.ticks, report.sim_time, report.final_pose.x, report.final_pose.y, report.final_pose.heading
            );
            Ok(())
        }
        Err(e) => {
            error!("Simulation failed: {}", e);
            Err(e.into())
        }
    }
}
