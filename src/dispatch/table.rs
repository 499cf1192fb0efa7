//! Fixed-priority mapping from held buttons to an action
//!
//! Bindings are checked in order and the first whose button is held wins.
//! Lower bindings are ignored for that sample even if their button is
//! held too, and nothing is queued for later.

use crate::drive::Speed;
use crate::remote::{Buttons, InputState};

use super::Action;

/// One entry of the priority table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub button: Buttons,
    pub action: Action,
}

/// Ordered binding table with a fallback for when nothing matches
#[derive(Debug, Clone)]
pub struct Dispatcher {
    bindings: Vec<Binding>,
    idle: Action,
}

impl Dispatcher {
    /// Build a dispatcher from bindings in priority order
    pub fn new(bindings: Vec<Binding>, idle: Action) -> Self {
        Self { bindings, idle }
    }

    /// The robot's bindings: UP > DOWN > LEFT > RIGHT > A, otherwise stop
    pub fn robot(speed: Speed) -> Self {
        Self::new(
            vec![
                Binding {
                    button: Buttons::UP,
                    action: Action::MoveForward(speed),
                },
                Binding {
                    button: Buttons::DOWN,
                    action: Action::MoveBackward(speed),
                },
                Binding {
                    button: Buttons::LEFT,
                    action: Action::TurnLeft(speed),
                },
                Binding {
                    button: Buttons::RIGHT,
                    action: Action::TurnRight(speed),
                },
                Binding {
                    button: Buttons::A,
                    action: Action::CaptureAndAnnounce,
                },
            ],
            Action::Stop,
        )
    }

    /// Bindings in priority order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Select the action for one sample
    pub fn select(&self, input: &InputState) -> Action {
        self.bindings
            .iter()
            .find(|binding| input.buttons.contains(binding.button))
            .map(|binding| binding.action)
            .unwrap_or(self.idle)
    }
}
