//! Analysis rate limiting

use std::sync::Arc;
use tracing::debug;
use visionhelper_core::{snapshot_or_default, ConfigProvider};

/// Decides whether a frame gets analyzed, based on the configured rate
pub struct FrameAdmissionController {
    config: Arc<dyn ConfigProvider>,
    last_admitted_ms: Option<u64>,
}

impl FrameAdmissionController {
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            config,
            last_admitted_ms: None,
        }
    }

    /// Admit the frame captured at `now_ms` if the minimum interval has
    /// elapsed since the last admitted one. The rate is re-read every call.
    pub fn admit(&mut self, now_ms: u64) -> bool {
        let interval = snapshot_or_default(self.config.as_ref()).min_analysis_interval_ms();

        let admitted = match self.last_admitted_ms {
            None => true,
            Some(last) if now_ms < last => {
                debug!("Clock moved back from {} to {}, re-anchoring", last, now_ms);
                true
            }
            Some(last) => now_ms - last >= interval,
        };

        if admitted {
            self.last_admitted_ms = Some(now_ms);
        }
        admitted
    }

    pub fn last_admitted_ms(&self) -> Option<u64> {
        self.last_admitted_ms
    }
}
