//! Still image capture

use std::path::Path;

use async_trait::async_trait;

use super::{run_status, ExternalError};

/// Mirroring applied to a captured frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mirror {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Mirror {
    /// Flipped both ways, for a camera mounted upside down
    pub const BOTH: Mirror = Mirror {
        horizontal: true,
        vertical: true,
    };
}

/// Captures a single frame to a file, replacing any existing file
#[async_trait]
pub trait Camera: Send + Sync {
    async fn capture(&self, path: &Path, mirror: Mirror) -> Result<(), ExternalError>;
}

/// The Raspberry Pi camera still capture tool
#[derive(Debug, Clone)]
pub struct Raspistill {
    program: String,
}

impl Raspistill {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(path: &Path, mirror: Mirror) -> Vec<String> {
        let mut args = Vec::with_capacity(4);
        if mirror.horizontal {
            args.push("-hf".to_string());
        }
        if mirror.vertical {
            args.push("-vf".to_string());
        }
        args.push("-o".to_string());
        args.push(path.display().to_string());
        args
    }
}

#[async_trait]
impl Camera for Raspistill {
    async fn capture(&self, path: &Path, mirror: Mirror) -> Result<(), ExternalError> {
        run_status(&self.program, &Self::args(path, mirror)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_mirrored() {
        let args = Raspistill::args(Path::new("image.jpg"), Mirror::BOTH);
        assert_eq!(args, vec!["-hf", "-vf", "-o", "image.jpg"]);
    }

    #[test]
    fn test_args_unmirrored() {
        let args = Raspistill::args(Path::new("/tmp/shot.jpg"), Mirror::default());
        assert_eq!(args, vec!["-o", "/tmp/shot.jpg"]);
    }

    #[tokio::test]
    async fn test_capture_failure() {
        let camera = Raspistill::new("false");
        let result = camera.capture(Path::new("image.jpg"), Mirror::BOTH).await;
        assert!(matches!(result, Err(ExternalError::Failed { .. })));
    }
}
