//! The command dispatch loop
//!
//! Each iteration samples the remote, selects one action from the
//! priority table and executes it to completion before sampling again.
//! The loop runs until the shutdown token is cancelled or a collaborator
//! fails, and releases the motors on the way out in both cases. Cancelling
//! the force token abandons the action in progress; dropping it kills any
//! child process it was waiting on.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::drive::{Drive, DriveError};
use crate::remote::{Remote, RemoteError};

use super::capture::{CaptureError, CaptureSequence};
use super::{Action, Dispatcher};

/// Errors that end the dispatch loop
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("remote input failed")]
    Remote(#[from] RemoteError),

    #[error("drive command failed")]
    Drive(#[from] DriveError),

    #[error("capture and announce failed")]
    Capture(#[from] CaptureError),
}

/// Owns the collaborators for the lifetime of the loop
pub struct Controller {
    dispatcher: Dispatcher,
    drive: Box<dyn Drive>,
    remote: Box<dyn Remote>,
    capture: CaptureSequence,
    poll_interval: Duration,
    shutdown: CancellationToken,
    force: CancellationToken,
    /// Last action logged, so held buttons don't flood the log
    last_logged: Option<Action>,
}

impl Controller {
    pub fn new(
        dispatcher: Dispatcher,
        drive: Box<dyn Drive>,
        remote: Box<dyn Remote>,
        capture: CaptureSequence,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            dispatcher,
            drive,
            remote,
            capture,
            poll_interval: Duration::ZERO,
            shutdown,
            force: CancellationToken::new(),
            last_logged: None,
        }
    }

    /// Pause between iterations (zero for unthrottled)
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Token that interrupts the action in progress
    pub fn with_force_stop(mut self, force: CancellationToken) -> Self {
        self.force = force;
        self
    }

    /// Run until shutdown or the first fatal error
    pub async fn run(&mut self) -> Result<(), ControlError> {
        info!("dispatch loop started");

        let result = self.run_loop().await;

        match self.drive.stop().await {
            Ok(()) => info!("motors released"),
            Err(e) => error!(?e, "failed to release motors on exit"),
        }

        match &result {
            Ok(()) => info!("dispatch loop stopped"),
            Err(e) => error!(error = %e, "dispatch loop failed"),
        }

        result
    }

    async fn run_loop(&mut self) -> Result<(), ControlError> {
        let force = self.force.clone();

        while !self.shutdown.is_cancelled() {
            tokio::select! {
                biased;
                _ = force.cancelled() => {
                    warn!("forced shutdown, abandoning current action");
                    break;
                }
                result = self.step() => {
                    result?;
                }
            }
            self.pace().await;
        }
        Ok(())
    }

    /// Sample once and execute the selected action
    pub async fn step(&mut self) -> Result<Action, ControlError> {
        let input = self.remote.sample()?;
        let action = self.dispatcher.select(&input);

        if let Some(acceleration) = input.acceleration {
            trace!(
                bits = input.buttons.bits(),
                x = acceleration.x,
                y = acceleration.y,
                z = acceleration.z,
                "sample"
            );
        }

        if self.last_logged != Some(action) {
            info!(buttons = ?input.buttons, %action, "action selected");
            self.last_logged = Some(action);
        } else {
            debug!(buttons = ?input.buttons, %action, "action selected");
        }

        self.execute(action).await?;
        Ok(action)
    }

    async fn execute(&mut self, action: Action) -> Result<(), ControlError> {
        match action {
            Action::MoveForward(speed) => self.drive.forward(speed, None).await?,
            Action::MoveBackward(speed) => self.drive.backward(speed, None).await?,
            Action::TurnLeft(speed) => self.drive.left(speed, None).await?,
            Action::TurnRight(speed) => self.drive.right(speed, None).await?,
            Action::CaptureAndAnnounce => {
                self.capture.run().await?;
            }
            Action::Stop => self.drive.stop().await?,
        }
        Ok(())
    }

    async fn pace(&self) {
        if self.poll_interval.is_zero() {
            // Lets the signal task run on a single-threaded runtime.
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.shutdown.cancelled() => {}
            }
        }
    }
}
