//! Localized class labels for the overlay

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// Display label per detector class id for one language
pub type LocaleLabels = HashMap<u32, String>;

/// Key holding the flag emoji shown next to a language
const FLAG_KEY: &str = "Flag";

#[derive(Debug, Clone)]
struct LanguageEntry {
    flag: String,
    labels: LocaleLabels,
}

/// Label catalog keyed by language code.
///
/// Each language object maps numeric class ids (as strings) to labels.
/// Non-numeric keys other than `Flag` are UI strings and are skipped.
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    languages: BTreeMap<String, LanguageEntry>,
}

impl LabelCatalog {
    /// Load a catalog from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a catalog from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content)?;
        let object = root
            .as_object()
            .ok_or_else(|| Error::Localization("Catalog root must be an object".to_string()))?;

        let mut languages = BTreeMap::new();
        for (code, entry) in object {
            let fields = entry.as_object().ok_or_else(|| {
                Error::Localization(format!("Language '{}' must be an object", code))
            })?;

            let mut flag = String::new();
            let mut labels = LocaleLabels::new();
            for (key, value) in fields {
                if key == FLAG_KEY {
                    flag = value.as_str().unwrap_or_default().to_string();
                    continue;
                }

                if let Ok(class_id) = key.parse::<u32>() {
                    let label = value.as_str().ok_or_else(|| {
                        Error::Localization(format!("Label {} for '{}' must be a string", key, code))
                    })?;
                    labels.insert(class_id, label.to_string());
                }
            }

            debug!("Loaded {} labels for language '{}'", labels.len(), code);
            languages.insert(code.clone(), LanguageEntry { flag, labels });
        }

        Ok(Self { languages })
    }

    /// Labels for `locale`, or `None` when the catalog has no such language
    pub fn labels_for(&self, locale: &str) -> Option<&LocaleLabels> {
        self.languages.get(locale).map(|entry| &entry.labels)
    }

    /// Language codes with their flags, sorted by code
    pub fn available_languages(&self) -> Vec<(String, String)> {
        self.languages
            .iter()
            .map(|(code, entry)| (code.clone(), entry.flag.clone()))
            .collect()
    }

    /// Entries for a language picker, formatted as `"{flag} {code}"`
    pub fn language_menu(&self) -> Vec<String> {
        self.languages
            .iter()
            .map(|(code, entry)| format!("{} {}", entry.flag, code).trim_start().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
