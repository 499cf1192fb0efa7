//! killbot: Wii remote teleoperation for a two-wheeled robot
//!
//! Polls a paired Wii remote and maps held buttons to motor commands on a
//! PCA9685 motor HAT:
//! - D-pad: drive forward / backward, spin left / right
//! - A: say what the camera sees (capture, classify, speak)
//! - nothing held: stop
//!
//! One action per sample, chosen by fixed priority. Everything runs on a
//! single thread and every external call is awaited before the next sample.

mod config;
mod dispatch;
mod drive;
mod external;
mod lifecycle;
mod remote;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::dispatch::{CaptureSequence, Controller, Dispatcher};
use crate::drive::{Drive, MotorHat, Robot};
use crate::external::{Flite, LabelImage, Raspistill};
use crate::lifecycle::ShutdownSignal;
use crate::remote::{ReportMode, Wiimote};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "killbot starting");

    // Load configuration
    let config = Config::load()?;
    info!(?config.trim, speed = %config.speed, "configuration loaded");

    let shutdown = ShutdownSignal::new();
    shutdown
        .listen()
        .context("failed to register signal handlers")?;
    let token = shutdown.token();

    // Motor driver
    let hat = MotorHat::open(
        &config.motor_hat.i2c_bus,
        config.motor_hat.address,
        config.motor_hat.pwm_frequency_hz,
    )?;
    let mut robot = Robot::new(hat, config.left_motor()?, config.right_motor()?, config.trim)?;

    // Remote
    info!("press 1 + 2 on the remote to start");
    let mut wiimote = tokio::select! {
        result = Wiimote::connect(&config.remote.device_name, config.connect_timeout()) => {
            result.context("failed to connect to the remote")?
        }
        _ = token.cancelled() => {
            info!("shutdown before the remote connected");
            robot.stop().await?;
            return Ok(());
        }
    };
    info!("connected");

    wiimote.set_report_mode(ReportMode {
        buttons: true,
        accelerometer: config.remote.accelerometer,
    })?;

    std::env::set_current_dir(&config.working_dir).with_context(|| {
        format!(
            "failed to change to working directory {}",
            config.working_dir.display()
        )
    })?;

    let capture = CaptureSequence::new(
        Box::new(Flite::new(config.speech.program.clone())),
        Box::new(Raspistill::new(config.camera.program.clone())),
        Box::new(LabelImage::new(config.classifier.program.clone())),
        config.image_path.clone(),
        config.on_failure,
    );
    capture.announce(&config.greeting).await?;

    let dispatcher = Dispatcher::robot(config.speed);
    for (priority, binding) in dispatcher.bindings().iter().enumerate() {
        debug!(priority, button = ?binding.button, action = %binding.action, "binding");
    }

    let mut controller = Controller::new(
        dispatcher,
        Box::new(robot),
        Box::new(wiimote),
        capture,
        token,
    )
    .with_force_stop(shutdown.force_token())
    .with_poll_interval(config.poll_interval());

    controller.run().await?;

    info!("killbot stopped");

    Ok(())
}
