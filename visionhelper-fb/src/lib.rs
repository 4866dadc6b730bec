//! visionhelper-fb: audio and haptic feedback for detected traffic objects
//!
//! Turns the set of classes seen in one frame into a single combo key,
//! debounces it against the configured cooldown and resolves it through a
//! static table to a vibration waveform and a tone.

pub mod error;
pub mod tone;
pub mod table;
pub mod driver;
pub mod engine;

pub use error::FeedbackError;
pub use tone::{Tone, TONE_DURATION_MS};
pub use table::{FeedbackPattern, FeedbackTable, DEFAULT_KEY};
pub use driver::{HapticDriver, TonePlayer, LoggingHaptics, LoggingTonePlayer};
pub use engine::{combo_key, ComboFeedbackEngine, Dispatch, FeedbackOutcome, FeedbackState};
