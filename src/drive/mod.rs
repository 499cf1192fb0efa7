//! Two-wheeled drive: the motor commands issued by the dispatch loop
//!
//! [`Drive`] is what the loop calls through. [`Robot`] implements it on
//! top of any [`MotorBus`], and [`MotorHat`] is the PCA9685 bus used on
//! the real robot.

mod motor_hat;
mod robot;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use motor_hat::MotorHat;
pub use robot::Robot;

/// Motor speed, 0 (stopped) to 255 (full)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Speed(pub u8);

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-motor speed offsets compensating for mechanical imbalance
///
/// If the robot veers left the right motor is faster, so give it a small
/// negative trim (and the other way round).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trim {
    pub left: i16,
    pub right: i16,
}

impl Trim {
    pub fn apply_left(&self, speed: Speed) -> u8 {
        offset(speed, self.left)
    }

    pub fn apply_right(&self, speed: Speed) -> u8 {
        offset(speed, self.right)
    }
}

fn offset(speed: Speed, trim: i16) -> u8 {
    (i16::from(speed.0) + trim).clamp(0, 255) as u8
}

/// Identifier of a DC motor port on the HAT (1 to 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotorId(u8);

impl MotorId {
    pub fn new(id: u8) -> Result<Self, DriveError> {
        if (1..=4).contains(&id) {
            Ok(Self(id))
        } else {
            Err(DriveError::InvalidMotor(id))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Direction a single motor is driven in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    /// Both bridge inputs low, the motor coasts
    Release,
}

/// Low-level access to individual motors
pub trait MotorBus: Send {
    fn set_speed(&mut self, motor: MotorId, speed: u8) -> Result<(), DriveError>;

    fn run(&mut self, motor: MotorId, direction: Direction) -> Result<(), DriveError>;
}

/// Motor commands used by the dispatch loop
///
/// Every movement runs until superseded unless a duration is given, in
/// which case the robot stops once it elapses.
#[async_trait]
pub trait Drive: Send {
    async fn forward(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError>;

    async fn backward(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError>;

    /// Spin counter-clockwise in place
    async fn left(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError>;

    /// Spin clockwise in place
    async fn right(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError>;

    async fn stop(&mut self) -> Result<(), DriveError>;
}

/// Errors that can occur while driving the motors
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("motor id {0} is out of range (expected 1-4)")]
    InvalidMotor(u8),

    #[error("failed to open I2C bus {path}: {message}")]
    Open { path: String, message: String },

    #[error("motor HAT bus error: {0}")]
    Bus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_offsets() {
        let trim = Trim { left: -5, right: 3 };
        assert_eq!(trim.apply_left(Speed(200)), 195);
        assert_eq!(trim.apply_right(Speed(200)), 203);
    }

    #[test]
    fn test_trim_clamps() {
        let trim = Trim { left: -20, right: 20 };
        assert_eq!(trim.apply_left(Speed(10)), 0);
        assert_eq!(trim.apply_right(Speed(250)), 255);
    }

    #[test]
    fn test_motor_id_range() {
        assert!(MotorId::new(1).is_ok());
        assert!(MotorId::new(4).is_ok());
        assert!(matches!(MotorId::new(0), Err(DriveError::InvalidMotor(0))));
        assert!(matches!(MotorId::new(5), Err(DriveError::InvalidMotor(5))));
    }
}
