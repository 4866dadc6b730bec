//! visionhelper-eye: real-time detection-to-feedback pipeline
//!
//! Gates camera frames by the configured analysis rate, validates detector
//! output, renders it as a localized overlay and hands the detected classes
//! to the combo feedback engine. One analysis worker owns the whole cycle
//! for a frame before it looks at the next one.

pub mod error;
pub mod frame;
pub mod models;
pub mod processing;
pub mod overlay;
pub mod pipeline;
pub mod worker;

pub use error::VisionError;
pub use frame::Frame;
pub use models::{Detection, DetectionSet, InvalidDetection};
pub use processing::{Detector, DetectorLoader, DetectionPipeline, FrameAdmissionController, StaticDetectorLoader};
pub use overlay::{BoxColor, Overlay, OverlayElement, OverlayRenderer, OverlaySink, OverlayStyle, PixelRect, Viewport, WatchOverlaySink};
pub use pipeline::{AnalysisPipeline, CycleOutcome};
pub use worker::{AnalysisWorker, FrameSender, WorkerHandle, WorkerStats};
