//! Wii remote backend using the Linux hid-wiimote driver
//!
//! Once paired over Bluetooth the kernel exposes the remote as an evdev
//! input device. Key state is read with an ioctl on every sample, so the
//! result always reflects the buttons held right now and never a queued
//! event.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use evdev::{AbsoluteAxisType, AttributeSet, Device, Key};
use tracing::{debug, info, warn};

use super::buttons::{Acceleration, Buttons, InputState};
use super::{Remote, RemoteError};

/// Interval between device scans while waiting for the remote to pair
const SCAN_INTERVAL: Duration = Duration::from_millis(250);

/// Suffix the driver appends to the accelerometer companion device
const ACCELEROMETER_SUFFIX: &str = " Accelerometer";

/// hid-wiimote key codes mapped onto the report bitmask
const KEY_MAP: [(Key, Buttons); 11] = [
    (Key::KEY_UP, Buttons::UP),
    (Key::KEY_DOWN, Buttons::DOWN),
    (Key::KEY_LEFT, Buttons::LEFT),
    (Key::KEY_RIGHT, Buttons::RIGHT),
    (Key::BTN_SOUTH, Buttons::A),
    (Key::BTN_EAST, Buttons::B),
    (Key::BTN_1, Buttons::ONE),
    (Key::BTN_2, Buttons::TWO),
    (Key::KEY_NEXT, Buttons::PLUS),
    (Key::KEY_PREVIOUS, Buttons::MINUS),
    (Key::BTN_MODE, Buttons::HOME),
];

/// Which reports the remote should deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMode {
    pub buttons: bool,
    pub accelerometer: bool,
}

/// A paired Wii remote
pub struct Wiimote {
    name: String,
    path: PathBuf,
    buttons: Device,
    accelerometer: Option<Device>,
    mode: ReportMode,
}

impl Wiimote {
    /// Wait for a remote named `name` to appear
    ///
    /// The operator pairs the remote by pressing 1+2. Scans repeat until the
    /// device shows up or `timeout` elapses; there is no retry after that.
    pub async fn connect(name: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let started = Instant::now();

        loop {
            if let Some((path, device)) = find_device(name) {
                info!(?path, name, "remote connected");
                return Ok(Self {
                    name: name.to_string(),
                    path,
                    buttons: device,
                    accelerometer: None,
                    mode: ReportMode {
                        buttons: true,
                        accelerometer: false,
                    },
                });
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(RemoteError::NotFound {
                    name: name.to_string(),
                    waited_ms: waited.as_millis() as u64,
                });
            }

            tokio::time::sleep(SCAN_INTERVAL).await;
        }
    }

    /// Select the reports delivered by subsequent samples
    ///
    /// The driver only streams accelerometer data while its companion
    /// device is open, so enabling it opens that device.
    pub fn set_report_mode(&mut self, mode: ReportMode) -> Result<(), RemoteError> {
        if mode.accelerometer && self.accelerometer.is_none() {
            let accel_name = format!("{}{}", self.name, ACCELEROMETER_SUFFIX);
            match find_device(&accel_name) {
                Some((path, device)) => {
                    debug!(?path, "accelerometer reporting enabled");
                    self.accelerometer = Some(device);
                }
                None => {
                    return Err(RemoteError::NotFound {
                        name: accel_name,
                        waited_ms: 0,
                    });
                }
            }
        } else if !mode.accelerometer {
            self.accelerometer = None;
        }

        self.mode = mode;
        info!(?mode, "report mode set");
        Ok(())
    }
}

impl Remote for Wiimote {
    fn sample(&mut self) -> Result<InputState, RemoteError> {
        let buttons = if self.mode.buttons {
            let keys = self
                .buttons
                .get_key_state()
                .map_err(|e| RemoteError::from_io(&self.path, e))?;
            buttons_from_keys(&keys)
        } else {
            Buttons::NONE
        };

        let acceleration = match &self.accelerometer {
            Some(device) => match device.get_abs_state() {
                Ok(axes) => Some(Acceleration {
                    x: axes[AbsoluteAxisType::ABS_RX.0 as usize].value,
                    y: axes[AbsoluteAxisType::ABS_RY.0 as usize].value,
                    z: axes[AbsoluteAxisType::ABS_RZ.0 as usize].value,
                }),
                Err(e) => {
                    warn!(?e, "failed to read accelerometer");
                    None
                }
            },
            None => None,
        };

        Ok(InputState {
            buttons,
            acceleration,
        })
    }
}

/// Translate a kernel key state into the report bitmask
fn buttons_from_keys(keys: &AttributeSet<Key>) -> Buttons {
    let mut held = Buttons::NONE;
    for (key, button) in KEY_MAP {
        if keys.contains(key) {
            held.insert(button);
        }
    }
    held
}

fn find_device(name: &str) -> Option<(PathBuf, Device)> {
    evdev::enumerate().find(|(_, device)| device.name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys() {
        let keys = AttributeSet::<Key>::new();
        assert_eq!(buttons_from_keys(&keys), Buttons::NONE);
    }

    #[test]
    fn test_dpad_and_a() {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::KEY_UP);
        keys.insert(Key::BTN_SOUTH);
        assert_eq!(buttons_from_keys(&keys), Buttons::UP | Buttons::A);
    }

    #[test]
    fn test_b_maps_to_east() {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_EAST);
        assert_eq!(buttons_from_keys(&keys), Buttons::B);
    }

    #[test]
    fn test_unmapped_keys_ignored() {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::KEY_ENTER);
        keys.insert(Key::KEY_RIGHT);
        assert_eq!(buttons_from_keys(&keys), Buttons::RIGHT);
    }

    #[tokio::test]
    async fn test_connect_times_out_without_remote() {
        let result = Wiimote::connect("no such remote", Duration::ZERO).await;
        assert!(matches!(result, Err(RemoteError::NotFound { .. })));
    }
}
