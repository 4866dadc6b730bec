//! Captured camera frame

use bytes::Bytes;

/// One decoded camera frame. The pipeline never looks inside `data`; only
/// the detector does.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

impl Frame {
    /// Create a frame captured at `timestamp_ms`
    pub fn new(timestamp_ms: u64, width: u32, height: u32, data: impl Into<Bytes>) -> Self {
        Self {
            timestamp_ms,
            width,
            height,
            data: data.into(),
        }
    }

    /// Create a frame stamped with the current wall-clock time
    pub fn captured_now(width: u32, height: u32, data: impl Into<Bytes>) -> Self {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self::new(now, width, height, data)
    }
}
