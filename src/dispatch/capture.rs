//! The capture-and-announce compound action
//!
//! Runs five steps in order, each awaited before the next starts:
//! announce, capture, announce, classify, announce the result. The loop
//! sees no input while this runs.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{info, warn};

use crate::external::{Announcer, Camera, Classifier, ExternalError, Mirror};

pub const ACQUIRING: &str = "Acquiring image";
pub const ANALYZING: &str = "Analyzing";
pub const RESULT_PREFIX: &str = "I see a ";

/// What to do when an external program fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    /// End the dispatch loop with the error
    #[default]
    Abort,
    /// Log the failure and carry on with the sequence
    Continue,
}

/// Failure handling per external program
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    pub speech: OnFailure,
    pub camera: OnFailure,
    pub classifier: OnFailure,
}

/// Step of the sequence that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    Announce,
    Capture,
    Classify,
}

impl fmt::Display for CaptureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStep::Announce => write!(f, "announce"),
            CaptureStep::Capture => write!(f, "capture"),
            CaptureStep::Classify => write!(f, "classify"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{step} step failed")]
pub struct CaptureError {
    pub step: CaptureStep,
    #[source]
    pub source: ExternalError,
}

/// Collaborators and settings for capture-and-announce
pub struct CaptureSequence {
    announcer: Box<dyn Announcer>,
    camera: Box<dyn Camera>,
    classifier: Box<dyn Classifier>,
    image_path: PathBuf,
    mirror: Mirror,
    policy: FailurePolicy,
}

impl CaptureSequence {
    pub fn new(
        announcer: Box<dyn Announcer>,
        camera: Box<dyn Camera>,
        classifier: Box<dyn Classifier>,
        image_path: PathBuf,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            announcer,
            camera,
            classifier,
            image_path,
            mirror: Mirror::BOTH,
            policy,
        }
    }

    /// Run the whole sequence
    ///
    /// Returns the classifier output when classification ran.
    pub async fn run(&self) -> Result<Option<String>, CaptureError> {
        self.announce(ACQUIRING).await?;

        let captured = self.camera.capture(&self.image_path, self.mirror).await;
        self.settle(CaptureStep::Capture, self.policy.camera, captured)?;

        self.announce(ANALYZING).await?;

        let classified = self.classifier.classify(&self.image_path).await;
        let Some(label) = self.settle(CaptureStep::Classify, self.policy.classifier, classified)?
        else {
            return Ok(None);
        };
        info!(label = label.trim_end(), "image classified");

        self.announce(&format!("{}{}", RESULT_PREFIX, label)).await?;
        Ok(Some(label))
    }

    /// Speak through the announcer, subject to the speech policy
    pub async fn announce(&self, text: &str) -> Result<(), CaptureError> {
        let spoken = self.announcer.say(text).await;
        self.settle(CaptureStep::Announce, self.policy.speech, spoken)?;
        Ok(())
    }

    fn settle<T>(
        &self,
        step: CaptureStep,
        on_failure: OnFailure,
        result: Result<T, ExternalError>,
    ) -> Result<Option<T>, CaptureError> {
        match (result, on_failure) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(source), OnFailure::Abort) => Err(CaptureError { step, source }),
            (Err(e), OnFailure::Continue) => {
                warn!(%step, error = %e, "external program failed, continuing");
                Ok(None)
            }
        }
    }
}
