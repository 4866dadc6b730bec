//! Haptic and audio collaborator seams

use crate::error::FeedbackError;
use crate::tone::Tone;
use tracing::info;

/// Vibration motor driver
#[cfg_attr(test, mockall::automock)]
pub trait HapticDriver: Send + Sync {
    /// Play a one-shot waveform of alternating off/on durations in milliseconds
    fn vibrate(&self, pattern: &[u64]) -> Result<(), FeedbackError>;
}

/// Tone generator driver
#[cfg_attr(test, mockall::automock)]
pub trait TonePlayer: Send + Sync {
    /// Start `tone` for `duration_ms`
    fn play_tone(&self, tone: Tone, duration_ms: u64) -> Result<(), FeedbackError>;
}

/// Haptic driver that only logs requests, for hosts without a motor
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHaptics;

impl HapticDriver for LoggingHaptics {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), FeedbackError> {
        info!("vibrate {:?}", pattern);
        Ok(())
    }
}

/// Tone player that only logs requests, for hosts without audio output
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTonePlayer;

impl TonePlayer for LoggingTonePlayer {
    fn play_tone(&self, tone: Tone, duration_ms: u64) -> Result<(), FeedbackError> {
        info!("play_tone {} for {}ms", tone, duration_ms);
        Ok(())
    }
}
