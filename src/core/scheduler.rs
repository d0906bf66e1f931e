// core/scheduler.rs

// Fixed-period driver for a state machine. One tick advances the simulation
// by `dt`, runs the current state once, then waits out the period.

use std::time::Duration;

use log::{debug, info, warn};

use super::{KinematicSim, MachineStatus, Pose, SimWindow, StateMachine};
use crate::{RunnerConfig, SimError};

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Ticks executed, including the final one
    pub ticks: u64,
    /// States that exited during the run
    pub transitions: u32,
    /// Simulated seconds elapsed
    pub sim_time: f64,
    /// Pose after the last tick
    pub final_pose: Pose,
}

/// Ticks a state machine at a fixed period until it finishes
#[derive(Debug, Clone)]
pub struct PeriodicScheduler {
    period: Duration,
    dt: f64,
    max_ticks: u64,
}

impl PeriodicScheduler {
    /// Creates a scheduler; a zero `period` runs as fast as possible
    pub fn new(period: Duration, dt: f64, max_ticks: u64) -> Self {
        PeriodicScheduler { period, dt, max_ticks }
    }

    /// Builds a scheduler from the runner section of the configuration
    pub fn from_config(config: &RunnerConfig) -> Self {
        PeriodicScheduler::new(Duration::from_millis(config.period_ms), config.dt, config.max_ticks)
    }

    /// Runs `machine` against `sim` until the last state exits
    pub fn run(&self, machine: &mut StateMachine, sim: &mut KinematicSim) -> Result<RunReport, SimError> {
        info!(
            "Scheduler started: period={:?}, dt={}, budget={} ticks",
            self.period, self.dt, self.max_ticks
        );

        for tick in 1..=self.max_ticks {
            sim.advance(self.dt);

            match machine.tick(sim)? {
                MachineStatus::Finished => {
                    let report = RunReport {
                        ticks: tick,
                        transitions: machine.transitions(),
                        sim_time: sim.elapsed(),
                        final_pose: sim.pose(),
                    };
                    info!("Scheduler finished after {} ticks ({:.2}s simulated)", tick, report.sim_time);
                    return Ok(report);
                }
                MachineStatus::Transitioned => {
                    debug!("Tick {}: now running {:?}", tick, machine.current_state_name());
                }
                MachineStatus::Running => {}
            }

            if !self.period.is_zero() {
                std::thread::sleep(self.period);
            }
        }

        warn!("Tick budget of {} exhausted, stopping robot", self.max_ticks);
        sim.set_robot_speed(0.0, 0.0, 0.0);
        Err(SimError::TickBudgetExceeded(self.max_ticks))
    }
}
