// Scripted replay of detector output

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use visionhelper_core::{ConfigSnapshot, LabelCatalog, SharedConfig};
use visionhelper_eye::{
    AnalysisPipeline, CycleOutcome, Detection, Detector, Frame, Overlay, OverlaySink, StaticDetectorLoader,
    VisionError, Viewport,
};
use visionhelper_fb::{ComboFeedbackEngine, FeedbackOutcome, FeedbackTable, LoggingHaptics, LoggingTonePlayer};

/// One recorded frame: what the detector reported at time `t`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptFrame {
    pub t: u64,
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// Simulated detector failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Script {
    frames: Vec<ScriptFrame>,
}

impl Script {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let frames: Vec<ScriptFrame> = serde_json::from_str(content).context("Invalid replay script")?;
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Detector that decodes the scripted result carried in the frame payload
struct ReplayDetector;

impl Detector for ReplayDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, VisionError> {
        let scripted: ScriptFrame = serde_json::from_slice(&frame.data)
            .map_err(|e| VisionError::Processing(format!("Undecodable replay frame: {}", e)))?;
        match scripted.error {
            Some(message) => Err(VisionError::Detector(message)),
            None => Ok(scripted.detections),
        }
    }
}

/// Display that only logs what would be drawn
struct LogOverlaySink;

impl OverlaySink for LogOverlaySink {
    fn present(&self, overlay: Overlay) {
        debug!("overlay {}x{} with {} elements", overlay.width, overlay.height, overlay.len());
        for element in &overlay.elements {
            debug!("  {:?} {:?} '{}'", element.color, element.rect, element.caption);
        }
    }
}

pub struct ReplayOptions {
    pub snapshot: ConfigSnapshot,
    pub table: Arc<FeedbackTable>,
    pub catalog: Option<Arc<LabelCatalog>>,
    pub width: u32,
    pub height: u32,
}

fn describe(t: u64, outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::Throttled => format!("t={} throttled", t),
        CycleOutcome::DetectorFailed(e) => format!("t={} detector failed: {}", t, e),
        CycleOutcome::Completed {
            detections,
            dropped,
            feedback,
        } => {
            let feedback = match feedback {
                FeedbackOutcome::NoObjects => "none".to_string(),
                FeedbackOutcome::Suppressed { key, remaining_ms } => {
                    format!("suppressed [{}] {}ms left", key, remaining_ms)
                }
                FeedbackOutcome::Dispatched(dispatch) => format!(
                    "[{}] vibration={:?}{} tone={}{}",
                    dispatch.key,
                    dispatch.pattern.vibration,
                    if dispatch.vibrated { "" } else { " (off)" },
                    dispatch.pattern.tone,
                    if dispatch.toned { "" } else { " (off)" },
                ),
            };
            format!(
                "t={} detections={} dropped={} feedback={}",
                t, detections, dropped, feedback
            )
        }
    }
}

/// Run every scripted frame through the pipeline in order and describe
/// each cycle
pub async fn run(script: Script, options: ReplayOptions) -> anyhow::Result<Vec<String>> {
    let config = Arc::new(SharedConfig::new(options.snapshot));
    let feedback = ComboFeedbackEngine::new(
        config.clone(),
        options.table,
        Arc::new(LoggingHaptics),
        Arc::new(LoggingTonePlayer),
    );
    let loader = Arc::new(StaticDetectorLoader::new(Arc::new(ReplayDetector)));
    let mut pipeline = AnalysisPipeline::new(config, loader, feedback, Arc::new(LogOverlaySink))
        .with_viewport(Viewport::new(options.width, options.height));
    if let Some(catalog) = options.catalog {
        pipeline = pipeline.with_labels(catalog);
    }

    let mut lines = Vec::with_capacity(script.len());
    for scripted in script.frames {
        let payload = serde_json::to_vec(&scripted)?;
        let frame = Frame::new(scripted.t, options.width, options.height, payload);
        let outcome = pipeline.process_frame(Arc::new(frame)).await;
        lines.push(describe(scripted.t, &outcome));
    }
    Ok(lines)
}
