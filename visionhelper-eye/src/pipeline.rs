//! Per-frame analysis cycle

use crate::error::VisionError;
use crate::frame::Frame;
use crate::overlay::{OverlayRenderer, OverlaySink, Viewport};
use crate::processing::{DetectionPipeline, DetectorLoader, FrameAdmissionController};
use std::sync::Arc;
use tracing::{debug, error};
use visionhelper_core::{snapshot_or_default, ConfigProvider, LabelCatalog};
use visionhelper_fb::{ComboFeedbackEngine, FeedbackOutcome};

/// Result of offering one frame to the pipeline
#[derive(Debug)]
pub enum CycleOutcome {
    /// Arrived before the minimum analysis interval elapsed
    Throttled,
    /// The detector could not produce a result; nothing was presented
    DetectorFailed(VisionError),
    Completed {
        /// Valid detections, one overlay element each
        detections: usize,
        /// Boxes rejected as malformed
        dropped: usize,
        feedback: FeedbackOutcome,
    },
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed { .. })
    }
}

/// Admission, detection, overlay and feedback for one frame at a time
pub struct AnalysisPipeline {
    config: Arc<dyn ConfigProvider>,
    admission: FrameAdmissionController,
    detection: DetectionPipeline,
    renderer: OverlayRenderer,
    feedback: ComboFeedbackEngine,
    display: Arc<dyn OverlaySink>,
    labels: Option<Arc<LabelCatalog>>,
    viewport: Option<Viewport>,
}

impl AnalysisPipeline {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        loader: Arc<dyn DetectorLoader>,
        feedback: ComboFeedbackEngine,
        display: Arc<dyn OverlaySink>,
    ) -> Self {
        Self {
            admission: FrameAdmissionController::new(config.clone()),
            config,
            detection: DetectionPipeline::new(loader),
            renderer: OverlayRenderer::default(),
            feedback,
            display,
            labels: None,
            viewport: None,
        }
    }

    /// Localize captions from `catalog` using the configured language
    pub fn with_labels(mut self, catalog: Arc<LabelCatalog>) -> Self {
        self.labels = Some(catalog);
        self
    }

    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Update the drawing surface size, e.g. after a layout change
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    pub fn feedback(&self) -> &ComboFeedbackEngine {
        &self.feedback
    }

    /// Run one full cycle for `frame`.
    ///
    /// Detector failures are reported in the outcome and leave the pipeline
    /// ready for the next frame.
    pub async fn process_frame(&mut self, frame: Arc<Frame>) -> CycleOutcome {
        let now_ms = frame.timestamp_ms;
        if !self.admission.admit(now_ms) {
            debug!("Frame {} throttled", now_ms);
            return CycleOutcome::Throttled;
        }

        let snapshot = snapshot_or_default(self.config.as_ref());
        let detections = match self.detection.detect(frame, snapshot.model_quality).await {
            Ok(detections) => detections,
            Err(e) => {
                error!("Frame processing error: {}", e);
                return CycleOutcome::DetectorFailed(e);
            }
        };

        let labels = self
            .labels
            .as_ref()
            .and_then(|catalog| catalog.labels_for(&snapshot.locale));
        let overlay = self.renderer.render(&detections, self.viewport, labels);
        self.display.present(overlay);

        let feedback = self.feedback.evaluate(detections.class_names(), now_ms);

        CycleOutcome::Completed {
            detections: detections.len(),
            dropped: detections.dropped(),
            feedback,
        }
    }
}
