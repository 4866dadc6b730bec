//! Tone identifiers understood by the audio collaborator

use serde::{Deserialize, Serialize};
use std::fmt;

/// How long each tone is requested for
pub const TONE_DURATION_MS: u64 = 200;

/// Tones the feedback table can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tone {
    /// Positive acknowledgement
    PropAck,
    /// Negative acknowledgement
    PropNack,
    /// Plain beep, used by the fallback entry
    PropBeep,
    SupBusy,
    SupRadioAck,
    SupError,
    SupCongestion,
    CdmaAlertCallGuard,
}

impl Tone {
    pub const ALL: [Tone; 8] = [
        Tone::PropAck,
        Tone::PropNack,
        Tone::PropBeep,
        Tone::SupBusy,
        Tone::SupRadioAck,
        Tone::SupError,
        Tone::SupCongestion,
        Tone::CdmaAlertCallGuard,
    ];

    /// Identifier in the form audio drivers log and match on
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::PropAck => "TONE_PROP_ACK",
            Tone::PropNack => "TONE_PROP_NACK",
            Tone::PropBeep => "TONE_PROP_BEEP",
            Tone::SupBusy => "TONE_SUP_BUSY",
            Tone::SupRadioAck => "TONE_SUP_RADIO_ACK",
            Tone::SupError => "TONE_SUP_ERROR",
            Tone::SupCongestion => "TONE_SUP_CONGESTION",
            Tone::CdmaAlertCallGuard => "TONE_CDMA_ALERT_CALL_GUARD",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
