//! Configuration snapshot and the provider seam the pipeline reads it through

use crate::error::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Languages whose speakers get the Russian catalog on first boot
const RUSSIAN_FAMILY: &[&str] = &["ru", "uk", "be", "kk", "uz", "ky", "tg", "tk", "az", "hy", "mo"];

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "VISIONHELPER_";

/// Detector model precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelQuality {
    /// Half precision, faster
    Float16,
    /// Full precision, higher quality
    Float32,
}

impl ModelQuality {
    /// File name of the model for this precision
    pub fn model_file(&self) -> &'static str {
        match self {
            ModelQuality::Float16 => "model.tflite",
            ModelQuality::Float32 => "modelHQ.tflite",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "float16" => Some(ModelQuality::Float16),
            "float32" => Some(ModelQuality::Float32),
            _ => None,
        }
    }
}

/// Read-only view of the persisted settings at one point in time.
///
/// Field names on the wire match the persisted keys, so a settings file
/// written by the settings owner deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    /// Maximum frames per second forwarded to the detector
    #[serde(rename = "fps_limit")]
    pub analysis_rate_fps: u32,
    /// Minimum time between two dispatched feedback events
    #[serde(rename = "feedback_cooldown")]
    pub feedback_cooldown_ms: u64,
    #[serde(rename = "sound")]
    pub sound_enabled: bool,
    #[serde(rename = "vibration")]
    pub vibration_enabled: bool,
    /// Locale code used to pick overlay labels
    #[serde(rename = "language")]
    pub locale: String,
    #[serde(rename = "model_type")]
    pub model_quality: ModelQuality,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            analysis_rate_fps: 2,
            feedback_cooldown_ms: 500,
            sound_enabled: true,
            vibration_enabled: true,
            locale: "en".to_string(),
            model_quality: ModelQuality::Float16,
        }
    }
}

impl ConfigSnapshot {
    /// Minimum spacing between admitted frames, in milliseconds
    pub fn min_analysis_interval_ms(&self) -> u64 {
        1000 / u64::from(self.analysis_rate_fps.max(1))
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.analysis_rate_fps == 0 || self.analysis_rate_fps > 120 {
            return Err("fps_limit must be between 1 and 120".to_string());
        }

        if self.feedback_cooldown_ms > 60_000 {
            return Err("feedback_cooldown too large (max 60000 ms)".to_string());
        }

        if self.locale.is_empty() {
            return Err("language cannot be empty".to_string());
        }

        if self.locale.len() > 32 {
            return Err("language code too long (max 32 chars)".to_string());
        }

        if !self.locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("language code contains invalid characters (only alphanumeric and '-' allowed)".to_string());
        }

        Ok(())
    }

    /// Load a snapshot from a settings file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a snapshot from JSON, TOML or YAML
    pub fn from_str(content: &str) -> Result<Self> {
        let snapshot = if let Ok(snapshot) = serde_json::from_str::<ConfigSnapshot>(content) {
            snapshot
        } else if let Ok(snapshot) = toml::from_str::<ConfigSnapshot>(content) {
            snapshot
        } else if let Ok(snapshot) = serde_yaml::from_str::<ConfigSnapshot>(content) {
            snapshot
        } else {
            return Err(Error::Configuration("Unknown settings format".to_string()));
        };

        snapshot.validate().map_err(Error::Configuration)?;
        Ok(snapshot)
    }

    /// Defaults for a device with no persisted settings yet; the language
    /// follows the system `LANG`
    pub fn first_boot() -> Self {
        let mut snapshot = Self::default();
        if let Ok(lang) = std::env::var("LANG") {
            snapshot.locale = default_language_for(&lang).to_string();
        }
        snapshot
    }

    /// Apply `VISIONHELPER_*` environment overrides on top of `self`
    pub fn from_env(self) -> Self {
        self.with_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable values are
    /// ignored with a warning.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("FPS_LIMIT") {
            match value.trim().parse::<u32>() {
                Ok(fps) => self.analysis_rate_fps = fps,
                Err(_) => warn!("Ignoring invalid FPS_LIMIT override: {}", value),
            }
        }

        if let Some(value) = lookup("FEEDBACK_COOLDOWN") {
            match value.trim().parse::<u64>() {
                Ok(ms) => self.feedback_cooldown_ms = ms,
                Err(_) => warn!("Ignoring invalid FEEDBACK_COOLDOWN override: {}", value),
            }
        }

        if let Some(value) = lookup("SOUND") {
            match parse_flag(&value) {
                Some(flag) => self.sound_enabled = flag,
                None => warn!("Ignoring invalid SOUND override: {}", value),
            }
        }

        if let Some(value) = lookup("VIBRATION") {
            match parse_flag(&value) {
                Some(flag) => self.vibration_enabled = flag,
                None => warn!("Ignoring invalid VIBRATION override: {}", value),
            }
        }

        if let Some(value) = lookup("LANGUAGE") {
            if !value.trim().is_empty() {
                self.locale = value.trim().to_string();
            }
        }

        if let Some(value) = lookup("MODEL_TYPE") {
            match ModelQuality::parse(&value) {
                Some(quality) => self.model_quality = quality,
                None => warn!("Ignoring invalid MODEL_TYPE override: {}", value),
            }
        }

        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Pick the first-boot language from a system locale such as `uk_UA.UTF-8`
pub fn default_language_for(system_locale: &str) -> &'static str {
    let language = system_locale
        .split(|c: char| c == '_' || c == '-' || c == '.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    if RUSSIAN_FAMILY.contains(&language.as_str()) {
        "ru"
    } else {
        "en"
    }
}

/// Source of configuration snapshots. Owned by whoever persists settings;
/// the pipeline only reads.
pub trait ConfigProvider: Send + Sync {
    /// Current settings. Called on every decision, so it must be cheap.
    fn snapshot(&self) -> Result<ConfigSnapshot>;
}

/// Read a snapshot, falling back to the documented defaults on failure
pub fn snapshot_or_default(provider: &dyn ConfigProvider) -> ConfigSnapshot {
    match provider.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Configuration read failed: {}, using defaults", e);
            ConfigSnapshot::default()
        }
    }
}

/// In-process configuration shared between the settings owner and the
/// analysis worker
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<ConfigSnapshot>>,
}

impl SharedConfig {
    /// Create a shared configuration holding `snapshot`
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Replace the whole snapshot
    pub fn replace(&self, snapshot: ConfigSnapshot) {
        *self.inner.write() = snapshot;
    }

    /// Mutate the current snapshot in place
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ConfigSnapshot),
    {
        f(&mut self.inner.write());
    }
}

impl ConfigProvider for SharedConfig {
    fn snapshot(&self) -> Result<ConfigSnapshot> {
        Ok(self.inner.read().clone())
    }
}
