//! Object detection pipeline

use crate::error::VisionError;
use crate::frame::Frame;
use crate::models::{Detection, DetectionSet};
use std::sync::Arc;
use tracing::{debug, info};
use visionhelper_core::ModelQuality;

/// Object detector over a single frame. Implementations may block.
#[cfg_attr(test, mockall::automock)]
pub trait Detector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, VisionError>;
}

/// Builds a detector for the requested model variant
#[cfg_attr(test, mockall::automock)]
pub trait DetectorLoader: Send + Sync {
    fn load(&self, quality: ModelQuality) -> Result<Arc<dyn Detector>, VisionError>;
}

/// Loader that hands out the same detector for every model variant
pub struct StaticDetectorLoader {
    detector: Arc<dyn Detector>,
}

impl StaticDetectorLoader {
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }
}

impl DetectorLoader for StaticDetectorLoader {
    fn load(&self, _quality: ModelQuality) -> Result<Arc<dyn Detector>, VisionError> {
        Ok(self.detector.clone())
    }
}

/// Object detection pipeline
///
/// Owns the loaded detector and swaps it out when the configured model
/// variant changes.
pub struct DetectionPipeline {
    loader: Arc<dyn DetectorLoader>,
    loaded: Option<(ModelQuality, Arc<dyn Detector>)>,
}

impl DetectionPipeline {
    /// Create a new detection pipeline. Nothing is loaded until the first frame.
    pub fn new(loader: Arc<dyn DetectorLoader>) -> Self {
        Self { loader, loaded: None }
    }

    /// Model variant currently loaded, if any
    pub fn loaded_quality(&self) -> Option<ModelQuality> {
        self.loaded.as_ref().map(|(quality, _)| *quality)
    }

    fn ensure_loaded(&mut self, quality: ModelQuality) -> Result<Arc<dyn Detector>, VisionError> {
        if let Some((current, detector)) = &self.loaded {
            if *current == quality {
                return Ok(detector.clone());
            }
            info!("Model variant changed from {:?} to {:?}, reloading", current, quality);
        }

        // Release the old model before building the new one
        self.loaded = None;
        let detector = self.loader.load(quality)?;
        info!("Detector loaded from {}", quality.model_file());
        self.loaded = Some((quality, detector.clone()));
        Ok(detector)
    }

    /// Run detection on `frame` with the requested model variant and
    /// validate the output
    pub async fn detect(&mut self, frame: Arc<Frame>, quality: ModelQuality) -> Result<DetectionSet, VisionError> {
        let detector = self.ensure_loaded(quality)?;

        debug!("Running object detection on frame {}", frame.timestamp_ms);
        let raw = tokio::task::spawn_blocking(move || detector.detect(&frame))
            .await
            .map_err(|e| VisionError::Processing(format!("Detector task failed: {}", e)))??;

        let detections = DetectionSet::from_raw(raw);
        debug!("Detected {} objects ({} dropped)", detections.len(), detections.dropped());
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn boxed(name: &str) -> Detection {
        Detection {
            class_id: 0,
            class_name: name.to_string(),
            confidence: 0.5,
            x1: 0.1,
            y1: 0.1,
            x2: 0.2,
            y2: 0.2,
        }
    }

    fn frame() -> Arc<Frame> {
        Arc::new(Frame::new(0, 4, 4, Vec::new()))
    }

    #[tokio::test]
    async fn test_detect_validates_output() {
        let mut detector = MockDetector::new();
        detector.expect_detect().returning(|_| {
            let mut broken = boxed("broken");
            broken.x2 = 2.0;
            Ok(vec![boxed("Crossing sign"), broken])
        });
        let loader = StaticDetectorLoader::new(Arc::new(detector));
        let mut pipeline = DetectionPipeline::new(Arc::new(loader));

        let set = pipeline.detect(frame(), ModelQuality::Float16).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.dropped(), 1);
    }

    #[tokio::test]
    async fn test_detector_loaded_once_per_variant() {
        let mut loader = MockDetectorLoader::new();
        loader.expect_load().with(eq(ModelQuality::Float16)).times(1).returning(|_| {
            let mut detector = MockDetector::new();
            detector.expect_detect().returning(|_| Ok(Vec::new()));
            Ok(Arc::new(detector) as Arc<dyn Detector>)
        });
        loader.expect_load().with(eq(ModelQuality::Float32)).times(1).returning(|_| {
            let mut detector = MockDetector::new();
            detector.expect_detect().returning(|_| Ok(vec![boxed("Car")]));
            Ok(Arc::new(detector) as Arc<dyn Detector>)
        });
        let mut pipeline = DetectionPipeline::new(Arc::new(loader));

        assert!(pipeline.detect(frame(), ModelQuality::Float16).await.unwrap().is_empty());
        assert!(pipeline.detect(frame(), ModelQuality::Float16).await.unwrap().is_empty());
        assert_eq!(pipeline.detect(frame(), ModelQuality::Float32).await.unwrap().len(), 1);
        assert_eq!(pipeline.loaded_quality(), Some(ModelQuality::Float32));
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let mut loader = MockDetectorLoader::new();
        let mut seq = mockall::Sequence::new();
        loader
            .expect_load()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(VisionError::ModelLoad("missing model.tflite".to_string())));
        loader.expect_load().times(1).in_sequence(&mut seq).returning(|_| {
            let mut detector = MockDetector::new();
            detector.expect_detect().returning(|_| Ok(Vec::new()));
            Ok(Arc::new(detector) as Arc<dyn Detector>)
        });
        let mut pipeline = DetectionPipeline::new(Arc::new(loader));

        assert!(matches!(
            pipeline.detect(frame(), ModelQuality::Float16).await,
            Err(VisionError::ModelLoad(_))
        ));
        assert_eq!(pipeline.loaded_quality(), None);
        assert!(pipeline.detect(frame(), ModelQuality::Float16).await.is_ok());
    }

    #[tokio::test]
    async fn test_detector_error_propagates() {
        let mut detector = MockDetector::new();
        detector
            .expect_detect()
            .returning(|_| Err(VisionError::Detector("inference failed".to_string())));
        let mut pipeline = DetectionPipeline::new(Arc::new(StaticDetectorLoader::new(Arc::new(detector))));

        let err = pipeline.detect(frame(), ModelQuality::Float16).await.unwrap_err();
        assert!(err.to_string().contains("inference failed"));
    }
}
