//! Actions the dispatch loop can take in one iteration

use std::fmt;

use crate::drive::Speed;

/// The single effect selected for an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward(Speed),
    MoveBackward(Speed),
    /// Spin counter-clockwise in place
    TurnLeft(Speed),
    /// Spin clockwise in place
    TurnRight(Speed),
    /// Announce, photograph, classify and speak the result
    CaptureAndAnnounce,
    /// Release both motors
    Stop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MoveForward(speed) => write!(f, "FORWARD ({})", speed),
            Action::MoveBackward(speed) => write!(f, "BACKWARD ({})", speed),
            Action::TurnLeft(speed) => write!(f, "LEFT ({})", speed),
            Action::TurnRight(speed) => write!(f, "RIGHT ({})", speed),
            Action::CaptureAndAnnounce => write!(f, "CAPTURE_AND_ANNOUNCE"),
            Action::Stop => write!(f, "STOP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Action::MoveForward(Speed(200)).to_string(), "FORWARD (200)");
        assert_eq!(Action::CaptureAndAnnounce.to_string(), "CAPTURE_AND_ANNOUNCE");
        assert_eq!(Action::Stop.to_string(), "STOP");
    }
}
