//! Combo feedback engine
//!
//! One frame's detected class names collapse into a canonical combo key.
//! The engine is either Idle or Cooling; a dispatch moves it to Cooling and
//! it returns to Idle once `feedback_cooldown` has elapsed. Requests made
//! while Cooling are dropped, not queued.

use crate::driver::{HapticDriver, TonePlayer};
use crate::table::{FeedbackPattern, FeedbackTable};
use crate::tone::TONE_DURATION_MS;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};
use visionhelper_core::{snapshot_or_default, ConfigProvider};

/// Canonical key for a set of class names: distinct names, sorted by byte
/// order, joined with `+`. `None` when there are no names.
pub fn combo_key<I, S>(names: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let distinct: BTreeSet<String> = names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect();

    if distinct.is_empty() {
        return None;
    }

    Some(distinct.into_iter().collect::<Vec<_>>().join("+"))
}

/// Debounce state at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    Idle,
    Cooling { remaining_ms: u64 },
}

/// A feedback event that was handed to the drivers
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub key: String,
    pub pattern: FeedbackPattern,
    /// Vibration was requested and the driver accepted it
    pub vibrated: bool,
    /// Tone was requested and the driver accepted it
    pub toned: bool,
}

/// Result of evaluating one frame's detections
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    /// Nothing detected, no request made
    NoObjects,
    /// Dropped because the engine was cooling down
    Suppressed { key: String, remaining_ms: u64 },
    Dispatched(Dispatch),
}

/// Turns per-frame class sets into debounced vibration/tone requests
pub struct ComboFeedbackEngine {
    config: Arc<dyn ConfigProvider>,
    table: Arc<FeedbackTable>,
    haptics: Arc<dyn HapticDriver>,
    audio: Arc<dyn TonePlayer>,
    last_feedback_ms: Option<u64>,
}

impl ComboFeedbackEngine {
    /// Create a new engine in the Idle state
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        table: Arc<FeedbackTable>,
        haptics: Arc<dyn HapticDriver>,
        audio: Arc<dyn TonePlayer>,
    ) -> Self {
        Self {
            config,
            table,
            haptics,
            audio,
            last_feedback_ms: None,
        }
    }

    /// Create an engine backed by the built-in table
    pub fn with_builtin_table(
        config: Arc<dyn ConfigProvider>,
        haptics: Arc<dyn HapticDriver>,
        audio: Arc<dyn TonePlayer>,
    ) -> Self {
        Self::new(config, Arc::new(FeedbackTable::builtin().clone()), haptics, audio)
    }

    pub fn table(&self) -> &FeedbackTable {
        &self.table
    }

    /// Time of the last dispatch, if any
    pub fn last_feedback_ms(&self) -> Option<u64> {
        self.last_feedback_ms
    }

    /// Idle or Cooling as of `now_ms`, using the current cooldown setting
    pub fn state(&self, now_ms: u64) -> FeedbackState {
        let cooldown_ms = snapshot_or_default(self.config.as_ref()).feedback_cooldown_ms;
        match self.cooling_remaining(now_ms, cooldown_ms) {
            Some(remaining_ms) => FeedbackState::Cooling { remaining_ms },
            None => FeedbackState::Idle,
        }
    }

    /// Evaluate one frame's class names at `now_ms`
    pub fn evaluate<I, S>(&mut self, names: I, now_ms: u64) -> FeedbackOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = match combo_key(names) {
            Some(key) => key,
            None => return FeedbackOutcome::NoObjects,
        };
        debug!("Combo key: {}", key);

        let config = snapshot_or_default(self.config.as_ref());
        if let Some(remaining_ms) = self.cooling_remaining(now_ms, config.feedback_cooldown_ms) {
            debug!("Feedback cooling for another {}ms, dropping '{}'", remaining_ms, key);
            return FeedbackOutcome::Suppressed { key, remaining_ms };
        }

        let pattern = self.table.resolve(&key).clone();

        // Recorded before the drivers run so a driver failure cannot leave
        // the engine Idle and re-fire on every frame
        self.last_feedback_ms = Some(now_ms);

        let mut vibrated = false;
        if config.vibration_enabled {
            match self.haptics.vibrate(&pattern.vibration) {
                Ok(()) => vibrated = true,
                Err(e) => warn!("Vibration request for '{}' failed: {}", key, e),
            }
        }

        let mut toned = false;
        if config.sound_enabled {
            match self.audio.play_tone(pattern.tone, TONE_DURATION_MS) {
                Ok(()) => toned = true,
                Err(e) => warn!("Tone request for '{}' failed: {}", key, e),
            }
        }

        FeedbackOutcome::Dispatched(Dispatch {
            key,
            pattern,
            vibrated,
            toned,
        })
    }

    /// Remaining cooldown, or `None` when Idle. A timestamp before the last
    /// dispatch means the clock stepped back and counts as elapsed.
    fn cooling_remaining(&self, now_ms: u64, cooldown_ms: u64) -> Option<u64> {
        let last = self.last_feedback_ms?;
        if now_ms < last {
            return None;
        }

        let elapsed = now_ms - last;
        if elapsed >= cooldown_ms {
            None
        } else {
            Some(cooldown_ms - elapsed)
        }
    }
}
