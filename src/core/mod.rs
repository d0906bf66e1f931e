// core/mod.rs

// Declares the simulator brainstem: the pose/velocity provider interface, the
// state lifecycle and runner, the periodic scheduler and a kinematic window.

pub mod scheduler;
pub mod sim;
pub mod state;

pub use scheduler::{PeriodicScheduler, RunReport};
pub use sim::KinematicSim;
pub use state::{MachineStatus, State, StateMachine};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Robot pose as reported by the simulator
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X position (simulator units)
    pub x: f64,
    /// Y position (simulator units)
    pub y: f64,
    /// Heading (degrees)
    #[serde(default)]
    pub heading: f64,
}

impl Pose {
    /// Creates a pose from position and heading
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose { x, y, heading }
    }

    /// Position part of the pose
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Speed command written to the simulator: world-frame linear velocity and
/// angular rate in degrees per second
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpeedCommand {
    /// X velocity
    pub vx: f64,
    /// Y velocity
    pub vy: f64,
    /// Angular velocity (degrees/s)
    pub angular: f64,
}

impl SpeedCommand {
    /// The all-zero command
    pub const STOP: SpeedCommand = SpeedCommand { vx: 0.0, vy: 0.0, angular: 0.0 };
}

/// Pose/velocity provider a state reads from and commands.
///
/// Implemented by the simulation window. States receive it per call, so the
/// runner decides who owns it.
#[cfg_attr(test, mockall::automock)]
pub trait SimWindow {
    /// Current X position
    fn x_pos(&self) -> f64;
    /// Current Y position
    fn y_pos(&self) -> f64;
    /// Current heading in degrees
    fn robot_angle(&self) -> f64;
    /// Commands world-frame velocity and angular rate (degrees/s)
    fn set_robot_speed(&mut self, vx: f64, vy: f64, v_angular: f64);
}

/// Snapshot of the provider's current pose
pub fn read_pose(window: &dyn SimWindow) -> Pose {
    Pose::new(window.x_pos(), window.y_pos(), window.robot_angle())
}
