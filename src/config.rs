//! Configuration loading and management
//!
//! Every field has a default matching the robot as built. A JSON file
//! named by `KILLBOT_CONFIG` can override any subset of them.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::dispatch::FailurePolicy;
use crate::drive::{MotorId, Speed, Trim};

/// Environment variable naming an optional JSON config file
pub const CONFIG_ENV: &str = "KILLBOT_CONFIG";

/// Robot configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Motor trim offsets
    pub trim: Trim,

    /// Speed used for every directional command
    pub speed: Speed,

    pub motor_hat: MotorHatConfig,

    pub remote: RemoteConfig,

    /// Directory the classifier expects to run from
    pub working_dir: PathBuf,

    /// Capture target, relative to `working_dir`
    pub image_path: PathBuf,

    pub speech: ProgramConfig,
    pub camera: ProgramConfig,
    pub classifier: ProgramConfig,

    /// Spoken once the remote is connected
    pub greeting: String,

    /// Pause between loop iterations; zero runs unthrottled
    pub poll_interval_ms: u64,

    /// What a failing external program does to the loop
    pub on_failure: FailurePolicy,
}

/// Motor HAT wiring
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotorHatConfig {
    pub i2c_bus: String,
    pub address: u8,
    pub left_motor: u8,
    pub right_motor: u8,
    pub pwm_frequency_hz: u32,
}

impl Default for MotorHatConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-1".to_string(),
            address: 0x60,
            left_motor: 1,
            right_motor: 2,
            pwm_frequency_hz: 1600,
        }
    }
}

/// Wii remote discovery
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Input device name registered by the kernel driver
    pub device_name: String,
    pub connect_timeout_ms: u64,
    pub accelerometer: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            device_name: "Nintendo Wii Remote".to_string(),
            connect_timeout_ms: 10_000,
            accelerometer: true,
        }
    }
}

/// Path of an external program
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ProgramConfig {
    pub program: String,
}

impl ProgramConfig {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trim: Trim::default(),
            speed: Speed(200),
            motor_hat: MotorHatConfig::default(),
            remote: RemoteConfig::default(),
            working_dir: PathBuf::from("/home/pi/tensorflow"),
            image_path: PathBuf::from("image.jpg"),
            speech: ProgramConfig::new("flite"),
            camera: ProgramConfig::new("raspistill"),
            classifier: ProgramConfig::new(
                "./tensorflow/contrib/pi_examples/label_image/gen/bin/label_image",
            ),
            greeting: "I am here to assist you. What would you like to see?".to_string(),
            poll_interval_ms: 0,
            on_failure: FailurePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults and the optional config file
    pub fn load() -> Result<Self> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_json(&raw)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document, keeping defaults for absent fields
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reject wiring the hardware cannot have
    pub fn validate(&self) -> Result<()> {
        let left = self.left_motor()?;
        let right = self.right_motor()?;
        ensure!(left != right, "left and right motor must be different ports");
        ensure!(self.motor_hat.pwm_frequency_hz > 0, "PWM frequency must be positive");
        Ok(())
    }

    pub fn left_motor(&self) -> Result<MotorId> {
        MotorId::new(self.motor_hat.left_motor).context("invalid left motor")
    }

    pub fn right_motor(&self) -> Result<MotorId> {
        MotorId::new(self.motor_hat.right_motor).context("invalid right motor")
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.remote.connect_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::OnFailure;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.speed, Speed(200));
        assert_eq!(config.trim, Trim { left: 0, right: 0 });
        assert_eq!(config.motor_hat.address, 0x60);
        assert_eq!(config.image_path, PathBuf::from("image.jpg"));
        assert_eq!(config.poll_interval(), Duration::ZERO);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json(
            r#"{"trim": {"right": -5}, "speed": 150, "speech": "espeak",
                "on_failure": {"speech": "continue"}}"#,
        )
        .unwrap();

        assert_eq!(config.trim, Trim { left: 0, right: -5 });
        assert_eq!(config.speed, Speed(150));
        assert_eq!(config.speech.program, "espeak");
        assert_eq!(config.camera.program, "raspistill");
        assert_eq!(config.on_failure.speech, OnFailure::Continue);
        assert_eq!(config.on_failure.classifier, OnFailure::Abort);
    }

    #[test]
    fn test_speed_out_of_range_rejected() {
        assert_err!(Config::from_json(r#"{"speed": 300}"#));
    }

    #[test]
    fn test_same_motor_rejected() {
        let config =
            Config::from_json(r#"{"motor_hat": {"left_motor": 2, "right_motor": 2}}"#).unwrap();
        assert_err!(config.validate());
    }

    #[test]
    fn test_motor_port_range() {
        let config = Config::from_json(r#"{"motor_hat": {"left_motor": 5}}"#).unwrap();
        assert_err!(config.validate());
    }
}
