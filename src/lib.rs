//! Waypoint Sim - finite-state robot behaviours for a 2D training simulator
//!
//! This library provides the state lifecycle used by the simulator runner,
//! a kinematic simulation window, and the circle-tracing navigation routine.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Provider interface, state lifecycle, scheduler and kinematic window
pub mod core;
/// Circle geometry and the circle-tracing state
pub mod navigation;

// Re-export commonly used items for easier access
pub use crate::core::{KinematicSim, MachineStatus, PeriodicScheduler, Pose, RunReport, SimWindow, SpeedCommand, State, StateMachine};
pub use navigation::{RotateState, Waypoint};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for a simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Circle routine parameters
    pub controller: ControllerConfig,
    /// Scheduler and simulation parameters
    pub runner: RunnerConfig,
}

/// Parameters of the circle-tracing routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Radius of the traced circle, in simulator distance units
    pub radius: f64,
}

/// Scheduler and simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Wall-clock period between ticks, in milliseconds (0 runs flat out)
    pub period_ms: u64,
    /// Simulated seconds integrated per tick
    pub dt: f64,
    /// Tick budget before the run is abandoned
    pub max_ticks: u64,
    /// Pose the simulated robot starts from
    pub start: Pose,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig { radius: 50.0 }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            period_ms: 20,
            dt: 0.05,
            max_ticks: 20_000,
            start: Pose::default(),
        }
    }
}

impl SimConfig {
    /// Load a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let config_file = std::fs::File::open(path.as_ref())?;
        let config: SimConfig = serde_yaml::from_reader(config_file)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.controller.radius.is_finite() && self.controller.radius > 0.0) {
            return Err(SimError::InvalidRadius(self.controller.radius));
        }
        if !(self.runner.dt.is_finite() && self.runner.dt > 0.0) {
            return Err(SimError::Config(format!(
                "runner.dt must be positive, got {}",
                self.runner.dt
            )));
        }
        if self.runner.max_ticks == 0 {
            return Err(SimError::Config("runner.max_ticks must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Simulator error types
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Circle radius is zero, negative or not a number
    #[error("radius must be a positive finite number, got {0}")]
    InvalidRadius(f64),
    /// Configuration value out of range
    #[error("configuration error: {0}")]
    Config(String),
    /// Failed to read a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The machine was ticked after its last state exited
    #[error("state machine has already finished")]
    MachineFinished,
    /// The run did not finish within the tick budget
    #[error("state machine still running after {0} ticks")]
    TickBudgetExceeded(u64),
}
