//! visionhelper-core: shared types for the detection-to-feedback pipeline
//!
//! Holds the error type every other crate converts into, the configuration
//! snapshot read on each decision, and the locale label catalog used by the
//! overlay.

pub mod error;
pub mod config;
pub mod localization;

pub use error::{Error, Result};
pub use config::{ConfigProvider, ConfigSnapshot, ModelQuality, SharedConfig, snapshot_or_default};
pub use localization::{LabelCatalog, LocaleLabels};
