//! Error types for visionhelper-fb

use thiserror::Error;
use visionhelper_core::Error as CoreError;

/// Feedback errors
#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Haptic error: {0}")]
    Haptic(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Feedback table error: {0}")]
    Table(String),
}

impl From<FeedbackError> for CoreError {
    fn from(err: FeedbackError) -> Self {
        CoreError::Pipeline(format!("Feedback error: {}", err))
    }
}

impl From<serde_json::Error> for FeedbackError {
    fn from(err: serde_json::Error) -> Self {
        FeedbackError::Table(err.to_string())
    }
}
