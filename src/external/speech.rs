//! Text-to-speech

use async_trait::async_trait;

use super::{run_status, ExternalError};

/// Speaks text aloud, returning once it has been spoken
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn say(&self, text: &str) -> Result<(), ExternalError>;
}

/// The flite speech synthesizer
#[derive(Debug, Clone)]
pub struct Flite {
    program: String,
}

impl Flite {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Announcer for Flite {
    async fn say(&self, text: &str) -> Result<(), ExternalError> {
        run_status(&self.program, &["-t".to_string(), text.to_string()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_missing_synthesizer() {
        let flite = Flite::new("/nonexistent/flite");
        let result = flite.say("hello").await;
        assert!(matches!(result, Err(ExternalError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_say_succeeds_on_zero_exit() {
        let flite = Flite::new("true");
        assert_ok!(flite.say("hello").await);
    }
}
