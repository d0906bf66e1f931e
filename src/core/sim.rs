// core/sim.rs

// Minimal stand-in for the simulator window: a holonomic point robot that
// integrates whatever speed command it was last given.

use log::trace;

use super::{Pose, SimWindow, SpeedCommand};

/// Holonomic kinematic simulation of a single robot
#[derive(Debug, Clone, Default)]
pub struct KinematicSim {
    pose: Pose,
    command: SpeedCommand,
    elapsed: f64,
}

impl KinematicSim {
    /// Creates a stationary robot at `pose`
    pub fn new(pose: Pose) -> Self {
        KinematicSim {
            pose: Pose { heading: normalize_degrees(pose.heading), ..pose },
            command: SpeedCommand::STOP,
            elapsed: 0.0,
        }
    }

    /// Integrates the last speed command over `dt` simulated seconds
    pub fn advance(&mut self, dt: f64) {
        self.pose.x += self.command.vx * dt;
        self.pose.y += self.command.vy * dt;
        self.pose.heading = normalize_degrees(self.pose.heading + self.command.angular * dt);
        self.elapsed += dt;
        trace!(
            "t={:.2}s pose=({:.2}, {:.2}, {:.1})",
            self.elapsed, self.pose.x, self.pose.y, self.pose.heading
        );
    }

    /// Moves the robot instantly, keeping the current command
    pub fn teleport(&mut self, pose: Pose) {
        self.pose = Pose { heading: normalize_degrees(pose.heading), ..pose };
    }

    /// Current pose
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Most recent speed command
    pub fn last_command(&self) -> SpeedCommand {
        self.command
    }

    /// Simulated seconds since creation
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl SimWindow for KinematicSim {
    fn x_pos(&self) -> f64 {
        self.pose.x
    }

    fn y_pos(&self) -> f64 {
        self.pose.y
    }

    fn robot_angle(&self) -> f64 {
        self.pose.heading
    }

    fn set_robot_speed(&mut self, vx: f64, vy: f64, v_angular: f64) {
        self.command = SpeedCommand { vx, vy, angular: v_angular };
    }
}

/// Wraps an angle in degrees into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
