//! Frame processing stages

pub mod admission;
pub mod detection;

pub use admission::FrameAdmissionController;
pub use detection::{Detector, DetectorLoader, DetectionPipeline, StaticDetectorLoader};
