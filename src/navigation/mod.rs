//! Navigation for Waypoint Sim
//!
//! Circle geometry and arc guidance used by the circle-tracing state. The
//! robot starts on the circle and travels clockwise (in the math frame)
//! through three waypoints:
//!
//! ```text
//!            origin
//!        o            o
//!      o                o
//!    Left    center    Right
//!      o                o
//!        o            o
//!            Bottom
//! ```
//!
//! The sketch uses simulator screen coordinates, where y grows downward.

pub mod controller;

pub use controller::RotateState;

use nalgebra::Vector2;

use crate::SimError;

/// Proportional gain from normalized to commanded velocity
pub const KP: f64 = 1.5;

/// Per-axis distance under which a waypoint counts as reached
pub const K_ERROR: f64 = 5.0;

/// Waypoints of the three-quarter circle, in visiting order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waypoint {
    /// (x0 - r, y0 + r)
    Left,
    /// (x0, y0 + 2r)
    Bottom,
    /// (x0 + r, y0 + r)
    Right,
}

impl Waypoint {
    /// The first waypoint after entry
    pub const FIRST: Waypoint = Waypoint::Left;

    /// The waypoint that follows this one, `None` after the last
    pub fn next(self) -> Option<Waypoint> {
        match self {
            Waypoint::Left => Some(Waypoint::Bottom),
            Waypoint::Bottom => Some(Waypoint::Right),
            Waypoint::Right => None,
        }
    }

    /// Offset from the origin in units of the radius
    fn offset(self) -> Vector2<f64> {
        match self {
            Waypoint::Left => Vector2::new(-1.0, 1.0),
            Waypoint::Bottom => Vector2::new(0.0, 2.0),
            Waypoint::Right => Vector2::new(1.0, 1.0),
        }
    }
}

/// Circle through the entry point, centred one radius along +y
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleGeometry {
    origin: Vector2<f64>,
    radius: f64,
}

impl CircleGeometry {
    /// Rejects radii that are not strictly positive and finite
    pub fn new(origin: Vector2<f64>, radius: f64) -> Result<Self, SimError> {
        validate_radius(radius)?;
        Ok(CircleGeometry { origin, radius })
    }

    /// Entry point of the robot
    pub fn origin(&self) -> Vector2<f64> {
        self.origin
    }

    /// Circle radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Centre of the traced circle
    pub fn center(&self) -> Vector2<f64> {
        self.origin + Vector2::new(0.0, self.radius)
    }

    /// World coordinates of `waypoint`
    pub fn waypoint(&self, waypoint: Waypoint) -> Vector2<f64> {
        self.origin + waypoint.offset() * self.radius
    }

    /// Signed angular position of `position` around the centre, in radians
    pub fn angular_position(&self, position: Vector2<f64>) -> f64 {
        let rel = position - self.center();
        rel.y.atan2(rel.x)
    }

    /// Normalized velocity at `position`: the clockwise tangent plus a radial
    /// term pulling the robot back onto the circle. Magnitude stays near 1
    /// while on the circle.
    pub fn raw_velocity(&self, position: Vector2<f64>) -> Vector2<f64> {
        let phi = self.angular_position(position);
        let (sin, cos) = phi.sin_cos();
        let tangent = Vector2::new(sin, -cos);
        let outward = Vector2::new(cos, sin);
        let radial_error = (self.radius - (position - self.center()).norm()) / self.radius;
        tangent + outward * radial_error
    }
}

/// Fails with `InvalidRadius` unless `radius` is positive and finite
pub fn validate_radius(radius: f64) -> Result<(), SimError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidRadius(radius))
    }
}

/// Heading (degrees) the simulator expects for travel along `velocity`.
///
/// Heading 0 faces -y, so this is the direction angle shifted by 90 degrees.
pub fn heading_for(velocity: Vector2<f64>) -> f64 {
    velocity.y.atan2(velocity.x).to_degrees() + 90.0
}

/// Wraps an angle in degrees into [-180, 180)
pub fn wrap_signed_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Per-axis arrival test
pub fn within_tolerance(position: Vector2<f64>, target: Vector2<f64>, tolerance: f64) -> bool {
    (position.x - target.x).abs() < tolerance && (position.y - target.y).abs() < tolerance
}
