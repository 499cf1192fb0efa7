//! Signal handling for graceful shutdown

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handles shutdown signals (SIGTERM, SIGINT)
///
/// The first signal cancels [`token`](Self::token), which the dispatch loop
/// checks between iterations so an in-flight action completes. A second
/// signal cancels [`force_token`](Self::force_token), which abandons the
/// in-flight action; the loop still releases the motors before returning.
pub struct ShutdownSignal {
    token: CancellationToken,
    force: CancellationToken,
}

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            force: CancellationToken::new(),
        }
    }

    /// Token cancelled once a shutdown signal arrives
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Token cancelled by a second shutdown signal
    pub fn force_token(&self) -> CancellationToken {
        self.force.clone()
    }

    /// Register the handlers and cancel the token from a background task
    pub fn listen(&self) -> std::io::Result<()> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let token = self.token.clone();
        let force = self.force.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    debug!("received SIGTERM");
                }
                _ = sigint.recv() => {
                    debug!("received SIGINT");
                }
                _ = token.cancelled() => {
                    return;
                }
            }

            info!("shutdown signal received, stopping after current action");
            token.cancel();

            // A second signal means the operator doesn't want to wait.
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
                _ = force.cancelled() => {
                    return;
                }
            }
            warn!("second shutdown signal, abandoning current action");
            force.cancel();
        });

        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_live() {
        let shutdown = ShutdownSignal::new();
        assert!(!shutdown.token().is_cancelled());
        assert!(!shutdown.force_token().is_cancelled());
    }

    #[test]
    fn test_force_token_independent() {
        let shutdown = ShutdownSignal::new();
        shutdown.token().cancel();
        assert!(!shutdown.force_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_token_shared() {
        let shutdown = ShutdownSignal::new();
        shutdown.listen().unwrap();

        let token = shutdown.token();
        shutdown.token().cancel();
        assert!(token.is_cancelled());

        shutdown.force_token().cancel();
        assert!(shutdown.force_token().is_cancelled());
    }
}
