//! Image classification

use std::path::Path;

use async_trait::async_trait;

use super::{run_output, ExternalError};

/// Labels the contents of an image file
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the image at `path`, returning the raw classifier output
    async fn classify(&self, path: &Path) -> Result<String, ExternalError>;
}

/// TensorFlow's `label_image` example binary
#[derive(Debug, Clone)]
pub struct LabelImage {
    program: String,
}

impl LabelImage {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Classifier for LabelImage {
    async fn classify(&self, path: &Path) -> Result<String, ExternalError> {
        let image = format!("--image={}", path.display());
        run_output(&self.program, &[image]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_image_argument() {
        let classifier = LabelImage::new("echo");
        let output = classifier.classify(Path::new("image.jpg")).await.unwrap();
        assert_eq!(output, "--image=image.jpg\n");
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let classifier = LabelImage::new("false");
        let result = classifier.classify(Path::new("image.jpg")).await;
        assert!(matches!(result, Err(ExternalError::Failed { .. })));
    }
}
