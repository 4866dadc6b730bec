//! Detection data model

pub mod detection;

pub use detection::{Detection, DetectionSet, InvalidDetection};
