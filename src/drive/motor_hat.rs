//! DC motor HAT driven through a PCA9685 PWM controller
//!
//! Each motor port uses three PWM channels feeding a TB6612 bridge: one
//! for speed and two digital direction inputs driven fully on or off.

use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;
use pwm_pca9685::{Address, Channel, Pca9685};
use tracing::info;

use super::{Direction, DriveError, MotorBus, MotorId};

/// PCA9685 internal oscillator
const OSCILLATOR_HZ: f32 = 25_000_000.0;

/// PWM counts per period
const RESOLUTION: f32 = 4096.0;

/// Channels wired to one motor port
#[derive(Debug, Clone, Copy)]
struct Port {
    pwm: Channel,
    in1: Channel,
    in2: Channel,
}

fn port(motor: MotorId) -> Port {
    match motor.get() {
        1 => Port {
            pwm: Channel::C8,
            in2: Channel::C9,
            in1: Channel::C10,
        },
        2 => Port {
            pwm: Channel::C13,
            in2: Channel::C12,
            in1: Channel::C11,
        },
        3 => Port {
            pwm: Channel::C2,
            in2: Channel::C3,
            in1: Channel::C4,
        },
        _ => Port {
            pwm: Channel::C7,
            in2: Channel::C6,
            in1: Channel::C5,
        },
    }
}

/// Prescale register value for the requested PWM frequency
fn prescale(frequency_hz: u32) -> u8 {
    let value = (OSCILLATOR_HZ / (RESOLUTION * frequency_hz.max(1) as f32)).round() - 1.0;
    value.clamp(3.0, 255.0) as u8
}

/// Motor HAT on an I2C bus
pub struct MotorHat<I2C> {
    pwm: Pca9685<I2C>,
}

impl MotorHat<I2cdev> {
    /// Open the Linux I2C device at `path`
    pub fn open(path: &str, address: u8, frequency_hz: u32) -> Result<Self, DriveError> {
        let i2c = I2cdev::new(path).map_err(|e| DriveError::Open {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::new(i2c, address, frequency_hz)
    }
}

impl<I2C, E> MotorHat<I2C>
where
    I2C: I2c<Error = E> + Send,
    E: core::fmt::Debug,
{
    /// Configure the controller frequency and wake it up
    pub fn new(i2c: I2C, address: u8, frequency_hz: u32) -> Result<Self, DriveError> {
        let mut pwm = Pca9685::new(i2c, Address::from(address)).map_err(bus_error)?;

        // Prescale only takes effect while the oscillator is asleep.
        pwm.set_prescale(prescale(frequency_hz)).map_err(bus_error)?;
        pwm.enable().map_err(bus_error)?;
        info!(address = format_args!("0x{:02X}", address), frequency_hz, "motor HAT enabled");

        Ok(Self { pwm })
    }

    fn set_pin(&mut self, channel: Channel, high: bool) -> Result<(), DriveError> {
        if high {
            // Full-off wins over full-on, so clear it first.
            self.pwm.set_channel_off(channel, 0).map_err(bus_error)?;
            self.pwm.set_channel_full_on(channel, 0).map_err(bus_error)
        } else {
            self.pwm.set_channel_full_off(channel).map_err(bus_error)
        }
    }
}

impl<I2C, E> MotorBus for MotorHat<I2C>
where
    I2C: I2c<Error = E> + Send,
    E: core::fmt::Debug,
{
    fn set_speed(&mut self, motor: MotorId, speed: u8) -> Result<(), DriveError> {
        let duty = u16::from(speed) * 16;
        self.pwm
            .set_channel_on_off(port(motor).pwm, 0, duty)
            .map_err(bus_error)
    }

    fn run(&mut self, motor: MotorId, direction: Direction) -> Result<(), DriveError> {
        let port = port(motor);
        match direction {
            Direction::Forward => {
                self.set_pin(port.in2, false)?;
                self.set_pin(port.in1, true)
            }
            Direction::Backward => {
                self.set_pin(port.in1, false)?;
                self.set_pin(port.in2, true)
            }
            Direction::Release => {
                self.set_pin(port.in1, false)?;
                self.set_pin(port.in2, false)
            }
        }
    }
}

fn bus_error<E: core::fmt::Debug>(e: pwm_pca9685::Error<E>) -> DriveError {
    DriveError::Bus(format!("{:?}", e))
}
