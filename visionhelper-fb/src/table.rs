//! Static combo-key to feedback pattern table

use crate::engine::combo_key;
use crate::error::FeedbackError;
use crate::tone::Tone;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Reserved key every table must carry
pub const DEFAULT_KEY: &str = "default";

/// Version of the built-in table
pub const BUILTIN_VERSION: u32 = 1;

/// Vibration waveform and tone for one combo key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPattern {
    /// Alternating off/on durations in milliseconds, starting with off
    pub vibration: Vec<u64>,
    pub tone: Tone,
}

impl FeedbackPattern {
    pub fn new(vibration: &[u64], tone: Tone) -> Self {
        Self {
            vibration: vibration.to_vec(),
            tone,
        }
    }

    /// Total waveform length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.vibration.iter().sum()
    }
}

const DEFAULT_VIBRATION: &[u64] = &[0, 150];
const DEFAULT_TONE: Tone = Tone::PropBeep;

/// Hand-authored entries, looked up by exact key. Keys not in sorted
/// combo-key form can never match a detection and resolve to the fallback.
const BUILTIN_ENTRIES: &[(&str, &[u64], Tone)] = &[
    // Solo detections
    ("Green light for car", &[0, 100, 100, 100], Tone::PropAck),
    ("Red light for car", &[0, 150, 100, 150], Tone::PropNack),
    ("Traffic light (green)", &[0, 80, 80, 80], Tone::PropAck),
    ("Traffic light (red)", &[0, 300], Tone::PropNack),
    ("Pedestrian crossing", &[0, 100, 70, 100, 70, 100], Tone::SupBusy),
    ("Crossing sign", &[0, 200, 200, 300], Tone::SupBusy),

    // Confirmed danger
    ("Green light for car+Traffic light (red)", &[0, 300, 100, 300], Tone::CdmaAlertCallGuard),
    ("Green light for car+Pedestrian crossing", &[0, 300, 80, 300], Tone::CdmaAlertCallGuard),
    ("Traffic light (green)+Red light for car", &[0, 300, 80, 300], Tone::CdmaAlertCallGuard),

    // Alert combos
    ("Pedestrian crossing+Crossing sign", &[0, 100, 70, 100, 70, 200], Tone::SupBusy),
    ("Traffic light (red)+Pedestrian crossing", &[0, 250, 100, 250], Tone::SupBusy),
    ("Green light for car+Crossing sign", &[0, 80, 80, 150], Tone::SupBusy),
    ("Crossing sign+Traffic light (red)", &[0, 200, 100, 300], Tone::SupRadioAck),

    // Extended stop conditions
    ("Traffic light (red)+Red light for car", &[0, 400], Tone::PropNack),
    ("Red light for car+Pedestrian crossing", &[0, 250, 150, 250], Tone::PropNack),

    // Clear to go
    ("Traffic light (green)+Green light for car", &[0, 100, 100, 100], Tone::PropAck),
    ("Green light for car+Traffic light (green)", &[0, 90, 90, 90], Tone::PropAck),

    // Large mixed combos
    ("Crossing sign+Pedestrian crossing+Traffic light (red)", &[0, 150, 80, 150, 80, 250], Tone::SupError),
    ("Green light for car+Traffic light (red)+Crossing sign", &[0, 350, 200, 350], Tone::SupCongestion),

    // Additional combos
    ("Green light for car+Red light for car", &[0, 228, 211], Tone::CdmaAlertCallGuard),
    ("Crossing sign+Green light for car", &[0, 133, 192], Tone::SupRadioAck),
    ("Red light for car+Traffic light (green)", &[0, 166, 273, 225, 144, 168], Tone::SupError),
    ("Red light for car+Traffic light (red)", &[0, 101, 229, 144], Tone::PropAck),
    ("Pedestrian crossing+Red light for car", &[0, 146, 82, 200, 260, 197], Tone::PropAck),
    ("Crossing sign+Red light for car", &[0, 145, 92, 164, 127, 254], Tone::PropNack),
    ("Traffic light (green)+Traffic light (red)", &[0, 119, 201, 135], Tone::SupError),
    ("Pedestrian crossing+Traffic light (green)", &[0, 214, 133, 124, 105], Tone::CdmaAlertCallGuard),
    ("Crossing sign+Traffic light (green)", &[0, 222, 214], Tone::SupCongestion),
    ("Pedestrian crossing+Traffic light (red)", &[0, 220, 274], Tone::SupCongestion),
    ("Red light for car+Crossing sign+Traffic light (red)", &[0, 250, 250, 300], Tone::SupCongestion),
    ("Green light for car+Traffic light (red)+Pedestrian crossing", &[0, 300, 100, 100, 300], Tone::CdmaAlertCallGuard),
    ("Traffic light (green)+Pedestrian crossing+Crossing sign", &[0, 100, 80, 100, 250], Tone::SupCongestion),
    ("Green light for car+Crossing sign+Pedestrian crossing", &[0, 100, 80, 200], Tone::CdmaAlertCallGuard),

    // Fallback
    (DEFAULT_KEY, DEFAULT_VIBRATION, DEFAULT_TONE),
];

/// On-disk form of a feedback table
#[derive(Debug, Deserialize)]
struct TableFile {
    version: u32,
    entries: HashMap<String, FeedbackPattern>,
}

/// Immutable combo-key lookup with a `"default"` fallback
#[derive(Debug, Clone)]
pub struct FeedbackTable {
    version: u32,
    entries: HashMap<String, FeedbackPattern>,
    fallback: FeedbackPattern,
}

impl FeedbackTable {
    /// The table shipped with the application, built once per process
    pub fn builtin() -> &'static FeedbackTable {
        static BUILTIN: OnceLock<FeedbackTable> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let entries = collect_entries(
                BUILTIN_ENTRIES
                    .iter()
                    .map(|(key, vibration, tone)| (key.to_string(), FeedbackPattern::new(vibration, *tone))),
            );
            info!("Built-in feedback table v{} loaded with {} entries", BUILTIN_VERSION, entries.len());
            FeedbackTable {
                version: BUILTIN_VERSION,
                entries,
                fallback: FeedbackPattern::new(DEFAULT_VIBRATION, DEFAULT_TONE),
            }
        })
    }

    /// Build a table from authored entries.
    ///
    /// Keys are kept exactly as authored. A key that is not in combo-key form
    /// (distinct names, sorted, `+`-joined) is logged as unreachable.
    pub fn from_entries<I>(version: u32, entries: I) -> Result<Self, FeedbackError>
    where
        I: IntoIterator<Item = (String, FeedbackPattern)>,
    {
        let entries: Vec<(String, FeedbackPattern)> = entries.into_iter().collect();

        if let Some((key, _)) = entries.iter().find(|(_, pattern)| pattern.vibration.is_empty()) {
            return Err(FeedbackError::Table(format!("Entry '{}' has an empty vibration pattern", key)));
        }

        let entries = collect_entries(entries);
        let fallback = entries
            .get(DEFAULT_KEY)
            .cloned()
            .ok_or_else(|| FeedbackError::Table(format!("Table is missing the '{}' entry", DEFAULT_KEY)))?;

        Ok(Self {
            version,
            entries,
            fallback,
        })
    }

    /// Parse a versioned table from JSON
    pub fn from_json(content: &str) -> Result<Self, FeedbackError> {
        let file: TableFile = serde_json::from_str(content)?;
        Self::from_entries(file.version, file.entries)
    }

    /// Load a versioned table from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FeedbackError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FeedbackError::Table(format!("Failed to read table: {}", e)))?;
        Self::from_json(&content)
    }

    /// Pattern for `key`, or the `"default"` pattern when the key is absent
    pub fn resolve(&self, key: &str) -> &FeedbackPattern {
        match self.entries.get(key) {
            Some(pattern) => pattern,
            None => {
                debug!("No feedback entry for '{}', using default", key);
                &self.fallback
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FeedbackPattern> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries sorted by key
    pub fn entries(&self) -> Vec<(&str, &FeedbackPattern)> {
        let mut entries: Vec<(&str, &FeedbackPattern)> = self
            .entries
            .iter()
            .map(|(key, pattern)| (key.as_str(), pattern))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Collect authored entries by exact key, warning about keys no detection
/// set can produce
fn collect_entries<I>(entries: I) -> HashMap<String, FeedbackPattern>
where
    I: IntoIterator<Item = (String, FeedbackPattern)>,
{
    let mut collected = HashMap::new();
    for (key, pattern) in entries {
        if !is_reachable(&key) {
            warn!("Feedback entry '{}' is not a sorted combo key and will never match", key);
        }
        collected.insert(key, pattern);
    }
    collected
}

/// Whether `key` can be produced by `combo_key`
fn is_reachable(key: &str) -> bool {
    key == DEFAULT_KEY || combo_key(key.split('+')).as_deref() == Some(key)
}
