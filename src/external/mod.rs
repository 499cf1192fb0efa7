//! External programs the robot shells out to
//!
//! Speech, still capture and classification each run as a child process
//! and are awaited to completion. A missing binary and a non-zero exit are
//! both reported as [`ExternalError`]; whether that ends the loop is up to
//! the caller.

mod camera;
mod classifier;
mod speech;

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::debug;

pub use camera::{Camera, Mirror, Raspistill};
pub use classifier::{Classifier, LabelImage};
pub use speech::{Announcer, Flite};

/// Errors that can occur while running an external program
#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Run a program to completion, discarding its output
async fn run_status(program: &str, args: &[String]) -> Result<(), ExternalError> {
    debug!(program, ?args, "running");

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|source| ExternalError::Spawn {
            program: program.to_string(),
            source,
        })?;

    check(program, status)
}

/// Run a program to completion and return its standard output
async fn run_output(program: &str, args: &[String]) -> Result<String, ExternalError> {
    debug!(program, ?args, "running");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ExternalError::Spawn {
            program: program.to_string(),
            source,
        })?;

    check(program, output.status)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn check(program: &str, status: ExitStatus) -> Result<(), ExternalError> {
    if status.success() {
        Ok(())
    } else {
        Err(ExternalError::Failed {
            program: program.to_string(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program() {
        let result = run_status("/nonexistent/killbot-test-binary", &[]).await;
        assert!(matches!(result, Err(ExternalError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let result = run_status("false", &[]).await;
        assert!(matches!(result, Err(ExternalError::Failed { .. })));
    }

    #[tokio::test]
    async fn test_output_is_verbatim() {
        let output = run_output("echo", &["cat".to_string()]).await.unwrap();
        assert_eq!(output, "cat\n");
    }
}
