// core/state.rs

// Runs robot behaviours as a finite state machine. Each state goes through
// enter, a series of periodic updates, and exit, then hands control to the
// state it names as its successor.

use log::info;

use super::SimWindow;
use crate::SimError;

/// One phase of a robot behaviour.
///
/// The runner calls `on_enter` once, `on_periodic` every tick until it returns
/// `false`, then `on_exit` and finally `next_state`.
pub trait State {
    /// Name used in logs and status queries
    fn name(&self) -> &str;

    /// Called once before the first periodic update
    fn on_enter(&mut self, window: &mut dyn SimWindow);

    /// Called every tick; `false` ends the state
    fn on_periodic(&mut self, window: &mut dyn SimWindow) -> bool;

    /// Called once after the last periodic update
    fn on_exit(&mut self, window: &mut dyn SimWindow);

    /// State to run next, if any
    fn next_state(&mut self) -> Option<Box<dyn State>>;
}

/// Outcome of a single runner tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineStatus {
    /// The current state asked to keep running
    Running,
    /// The current state finished and its successor was installed
    Transitioned,
    /// The last state finished; nothing left to run
    Finished,
}

/// Drives a chain of states through their lifecycle
pub struct StateMachine {
    current: Option<Box<dyn State>>,
    entered: bool,
    transitions: u32,
}

impl StateMachine {
    /// Starts a machine at the given state; `on_enter` runs on the first tick
    pub fn new(initial: Box<dyn State>) -> Self {
        StateMachine {
            current: Some(initial),
            entered: false,
            transitions: 0,
        }
    }

    /// Advances the current state by one tick
    pub fn tick(&mut self, window: &mut dyn SimWindow) -> Result<MachineStatus, SimError> {
        let state = self.current.as_mut().ok_or(SimError::MachineFinished)?;

        if !self.entered {
            info!("Entering state {}", state.name());
            state.on_enter(window);
            self.entered = true;
        }

        if state.on_periodic(window) {
            return Ok(MachineStatus::Running);
        }

        state.on_exit(window);
        let finished = state.name().to_string();
        let next = state.next_state();
        self.entered = false;
        self.transitions += 1;

        match next {
            Some(next) => {
                info!("State {} done, transitioning to {}", finished, next.name());
                self.current = Some(next);
                Ok(MachineStatus::Transitioned)
            }
            None => {
                info!("State {} done, no successor; machine finished", finished);
                self.current = None;
                Ok(MachineStatus::Finished)
            }
        }
    }

    /// Whether every state has run to completion
    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// Name of the state that will receive the next tick
    pub fn current_state_name(&self) -> Option<&str> {
        self.current.as_deref().map(|state| state.name())
    }

    /// Number of states that have exited so far
    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}
