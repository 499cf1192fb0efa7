//! Remote input: button bitmask, sampled state and the Wii remote backend
//!
//! The dispatch loop only sees the [`Remote`] trait; the evdev-backed
//! [`Wiimote`] is wired in by `main`.

mod buttons;
mod wiimote;

use std::path::Path;

#[cfg(test)]
pub use buttons::Acceleration;
pub use buttons::{Buttons, InputState};
pub use wiimote::{ReportMode, Wiimote};

/// A source of instantaneous input state
pub trait Remote: Send {
    /// Read the buttons held right now
    fn sample(&mut self) -> Result<InputState, RemoteError>;
}

/// Errors that can occur while talking to the remote
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("no input device named {name:?} after {waited_ms}ms - press 1+2 on the remote to pair")]
    NotFound { name: String, waited_ms: u64 },

    #[error("remote at {path} disconnected")]
    Disconnected { path: String },

    #[error("failed to read remote state: {0}")]
    Read(#[source] std::io::Error),
}

impl RemoteError {
    /// ENODEV from an evdev ioctl means the device went away
    fn from_io(path: &Path, e: std::io::Error) -> Self {
        const ENODEV: i32 = 19;
        if e.raw_os_error() == Some(ENODEV) {
            RemoteError::Disconnected {
                path: path.display().to_string(),
            }
        } else {
            RemoteError::Read(e)
        }
    }
}
