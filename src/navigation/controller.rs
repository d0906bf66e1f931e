// src/navigation/controller.rs
// Circle-tracing state: drives the robot three quarters of the way around a
// circle of fixed radius, passing Left, Bottom and Right in that order.

use log::{debug, info, warn};
use nalgebra::Vector2;

use super::{heading_for, validate_radius, within_tolerance, wrap_signed_degrees, CircleGeometry, Waypoint, KP, K_ERROR};
use crate::core::{read_pose, SimWindow, State};
use crate::SimError;

/// Per-entry progress; rebuilt on every `on_enter`
#[derive(Clone, Copy, Debug)]
struct Progress {
    geometry: CircleGeometry,
    waypoint: Waypoint,
}

/// Moves the robot 3/4 of a circle with the given radius, starting from
/// wherever it is when the state is entered.
pub struct RotateState {
    radius: f64,
    progress: Option<Progress>,
    successor: Option<Box<dyn State>>,
}

impl RotateState {
    /// Creates the state; the radius must be positive and finite
    pub fn new(radius: f64) -> Result<Self, SimError> {
        validate_radius(radius)?;
        Ok(RotateState {
            radius,
            progress: None,
            successor: None,
        })
    }

    /// Sets the state handed control once the circle is done
    pub fn then(mut self, successor: Box<dyn State>) -> Self {
        self.successor = Some(successor);
        self
    }

    /// Circle radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Waypoint currently steered toward, `None` outside enter/exit
    pub fn active_waypoint(&self) -> Option<Waypoint> {
        self.progress.map(|p| p.waypoint)
    }

    /// Coordinates of the active waypoint
    pub fn target(&self) -> Option<Vector2<f64>> {
        self.progress.map(|p| p.geometry.waypoint(p.waypoint))
    }

    /// Pose captured on entry
    pub fn origin(&self) -> Option<Vector2<f64>> {
        self.progress.map(|p| p.geometry.origin())
    }
}

impl State for RotateState {
    fn name(&self) -> &str {
        "RotateState"
    }

    fn on_enter(&mut self, window: &mut dyn SimWindow) {
        window.set_robot_speed(0.0, 0.0, 0.0);
        let origin = read_pose(window).position();

        // radius was validated in `new`
        self.progress = Some(Progress {
            geometry: CircleGeometry { origin, radius: self.radius },
            waypoint: Waypoint::FIRST,
        });
        info!(
            "Tracing circle r={} from ({:.2}, {:.2}), first target {:?}",
            self.radius,
            origin.x,
            origin.y,
            self.target()
        );
    }

    fn on_periodic(&mut self, window: &mut dyn SimWindow) -> bool {
        let Some(progress) = self.progress.as_mut() else {
            warn!("RotateState ticked before on_enter; ending state");
            return false;
        };

        let pose = read_pose(window);
        let position = pose.position();
        let velocity = progress.geometry.raw_velocity(position);
        let target_angle = heading_for(velocity);
        let turn = wrap_signed_degrees(target_angle - pose.heading);

        window.set_robot_speed(velocity.x * KP, velocity.y * KP, turn);

        let target = progress.geometry.waypoint(progress.waypoint);
        if within_tolerance(position, target, K_ERROR) {
            match progress.waypoint.next() {
                Some(next) => {
                    info!("Reached {:?}, switching to {:?}", progress.waypoint, next);
                    progress.waypoint = next;
                }
                None => {
                    info!("Reached {:?}, circle done", progress.waypoint);
                    return false;
                }
            }
        } else {
            debug!(
                "Heading for {:?}: pos=({:.2}, {:.2}) cmd=({:.2}, {:.2}, {:.1})",
                progress.waypoint,
                position.x,
                position.y,
                velocity.x * KP,
                velocity.y * KP,
                turn
            );
        }

        true
    }

    fn on_exit(&mut self, window: &mut dyn SimWindow) {
        window.set_robot_speed(0.0, 0.0, 0.0);
        self.progress = None;
    }

    fn next_state(&mut self) -> Option<Box<dyn State>> {
        self.successor.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockSimWindow;
    use approx::assert_abs_diff_eq;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use rstest::rstest;

    fn window_at(x: f64, y: f64, heading: f64) -> MockSimWindow {
        let mut window = MockSimWindow::new();
        window.expect_x_pos().return_const(x);
        window.expect_y_pos().return_const(y);
        window.expect_robot_angle().return_const(heading);
        window
    }

    #[rstest]
    #[case(0.0, 0.0, 10.0)]
    #[case(3.0, -4.0, 2.5)]
    #[case(-120.0, 75.5, 40.0)]
    fn entry_targets_left_waypoint(#[case] x0: f64, #[case] y0: f64, #[case] radius: f64) {
        let mut window = window_at(x0, y0, 0.0);
        window
            .expect_set_robot_speed()
            .with(eq(0.0), eq(0.0), eq(0.0))
            .times(1)
            .return_const(());

        let mut state = RotateState::new(radius).unwrap();
        state.on_enter(&mut window);

        assert_eq!(state.active_waypoint(), Some(Waypoint::Left));
        assert_eq!(state.target(), Some(Vector2::new(x0 - radius, y0 + radius)));
        assert_eq!(state.origin(), Some(Vector2::new(x0, y0)));
    }

    #[test]
    fn enter_stops_before_reading_pose() {
        let mut window = MockSimWindow::new();
        let mut seq = Sequence::new();
        window
            .expect_set_robot_speed()
            .with(eq(0.0), eq(0.0), eq(0.0))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        window.expect_x_pos().times(1).in_sequence(&mut seq).return_const(1.0);
        window.expect_y_pos().times(1).in_sequence(&mut seq).return_const(2.0);
        window.expect_robot_angle().return_const(0.0);

        let mut state = RotateState::new(5.0).unwrap();
        state.on_enter(&mut window);
        assert_eq!(state.origin(), Some(Vector2::new(1.0, 2.0)));
    }

    #[test]
    fn commands_gain_scaled_velocity() {
        let mut window = window_at(0.0, 0.0, 0.0);
        window.expect_set_robot_speed().return_const(());
        let mut state = RotateState::new(10.0).unwrap();
        state.on_enter(&mut window);

        // Part of the way toward Left, slightly inside the circle
        let (x, y, heading) = (-4.0, 1.5, 250.0);
        let geometry = CircleGeometry::new(Vector2::zeros(), 10.0).unwrap();
        let raw = geometry.raw_velocity(Vector2::new(x, y));
        let turn = wrap_signed_degrees(heading_for(raw) - heading);

        let mut window = window_at(x, y, heading);
        window
            .expect_set_robot_speed()
            .withf(move |vx, vy, w| {
                (vx - raw.x * 1.5).abs() < 1e-12 && (vy - raw.y * 1.5).abs() < 1e-12 && (w - turn).abs() < 1e-9
            })
            .times(1)
            .return_const(());

        assert!(state.on_periodic(&mut window));
        assert_eq!(state.active_waypoint(), Some(Waypoint::Left));
    }

    #[test]
    fn turn_command_takes_shortest_direction() {
        let mut window = window_at(0.0, 0.0, 0.0);
        window.expect_set_robot_speed().return_const(());
        let mut state = RotateState::new(10.0).unwrap();
        state.on_enter(&mut window);

        // Travel is leftward (heading 270); from 0 that is a 90 degree turn the short way
        let mut window = window_at(0.0, 0.0, 0.0);
        window
            .expect_set_robot_speed()
            .withf(|vx, _vy, w| (vx + 1.5).abs() < 1e-9 && (w + 90.0).abs() < 1e-9)
            .times(1)
            .return_const(());
        assert!(state.on_periodic(&mut window));
    }

    #[rstest]
    #[case::left(Waypoint::Left, -10.0, 10.0, Some(Waypoint::Bottom))]
    #[case::bottom(Waypoint::Bottom, 0.0, 20.0, Some(Waypoint::Right))]
    fn arrival_advances_waypoint(
        #[case] active: Waypoint,
        #[case] x: f64,
        #[case] y: f64,
        #[case] expected: Option<Waypoint>,
    ) {
        let mut state = RotateState::new(10.0).unwrap();
        state.progress = Some(Progress {
            geometry: CircleGeometry::new(Vector2::zeros(), 10.0).unwrap(),
            waypoint: active,
        });

        let mut window = window_at(x + 2.0, y - 3.0, 0.0);
        window.expect_set_robot_speed().times(1).return_const(());

        assert!(state.on_periodic(&mut window));
        assert_eq!(state.active_waypoint(), expected);
    }

    #[test]
    fn final_arrival_ends_state_and_keeps_target() {
        let mut state = RotateState::new(10.0).unwrap();
        state.progress = Some(Progress {
            geometry: CircleGeometry::new(Vector2::zeros(), 10.0).unwrap(),
            waypoint: Waypoint::Right,
        });

        let mut window = window_at(12.0, 8.0, 0.0);
        window.expect_set_robot_speed().times(1).return_const(());

        assert!(!state.on_periodic(&mut window));
        assert_eq!(state.active_waypoint(), Some(Waypoint::Right));
        let target = state.target().unwrap();
        assert_abs_diff_eq!(target.x, 10.0);
        assert_abs_diff_eq!(target.y, 10.0);
    }

    #[rstest]
    #[case::fresh(false)]
    #[case::mid_circle(true)]
    fn exit_always_stops(#[case] entered: bool) {
        let mut state = RotateState::new(10.0).unwrap();
        if entered {
            let mut window = window_at(0.0, 0.0, 0.0);
            window.expect_set_robot_speed().return_const(());
            state.on_enter(&mut window);
        }

        let mut window = MockSimWindow::new();
        window
            .expect_set_robot_speed()
            .with(eq(0.0), eq(0.0), eq(0.0))
            .times(1)
            .return_const(());
        state.on_exit(&mut window);
        assert_eq!(state.active_waypoint(), None);
    }

    #[test]
    fn periodic_without_enter_ends_quietly() {
        let mut state = RotateState::new(10.0).unwrap();
        let mut window = MockSimWindow::new();
        assert!(!state.on_periodic(&mut window));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn rejects_non_positive_radius(#[case] radius: f64) {
        assert!(matches!(RotateState::new(radius), Err(SimError::InvalidRadius(_))));
    }

    #[test]
    fn successor_handed_over_once() {
        let successor = RotateState::new(3.0).unwrap();
        let mut state = RotateState::new(10.0).unwrap().then(Box::new(successor));

        let next = state.next_state().expect("successor");
        assert_eq!(next.name(), "RotateState");
        assert!(state.next_state().is_none());
    }
}
