//! Error types for visionhelper-eye

use thiserror::Error;
use visionhelper_core::Error as CoreError;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl From<VisionError> for CoreError {
    fn from(err: VisionError) -> Self {
        CoreError::Pipeline(format!("Vision error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_error_display() {
        let err = VisionError::Detector("model load failure".to_string());
        assert!(err.to_string().contains("Detector error"));
        assert!(err.to_string().contains("model load failure"));
    }

    #[test]
    fn test_vision_error_to_core_error() {
        let core_err: CoreError = VisionError::Processing("Test".to_string()).into();
        match core_err {
            CoreError::Pipeline(msg) => {
                assert!(msg.contains("Vision error"));
                assert!(msg.contains("Test"));
            }
            _ => panic!("Expected Pipeline error"),
        }
    }
}
