//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//! - Fixed thresholds and templates (see [`reference`])
//!
//! # Example
//!
//! ```
//! use neuroscan_explain::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.negative_label, "notumor");
//! let labels = config.label_set().expect("default labels are valid");
//! assert_eq!(labels.len(), 4);
//! ```

pub mod reference;
mod validation;

pub use validation::{labels_without_reference, validate_config, LOG_LEVELS, MIN_LABELS};

use crate::error::ConfigError;
use crate::report::LabelSet;
use reference::{DEFAULT_CLASS_LABELS, DEFAULT_NEGATIVE_LABEL};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default model version recorded in report metadata.
pub const DEFAULT_MODEL_VERSION: &str = "1.0";

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Class labels in classifier output order.
    ///
    /// Custom sets rename or regroup the classes of a brain-tumor MRI
    /// classifier. Report wording stays tumor-specific and the backbone stays
    /// VGG16; only the head width in the metadata follows the label count.
    pub class_labels: Vec<String>,
    /// Label meaning "no finding".
    pub negative_label: String,
    /// Whether saliency generation should be attempted.
    pub saliency_enabled: bool,
    /// Directory reports are exported to, if any.
    pub export_directory: Option<String>,
    /// Model version recorded in report metadata.
    pub model_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.into(),
            class_labels: DEFAULT_CLASS_LABELS.iter().map(|l| (*l).to_string()).collect(),
            negative_label: DEFAULT_NEGATIVE_LABEL.into(),
            saliency_enabled: true,
            export_directory: None,
            model_version: DEFAULT_MODEL_VERSION.into(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `CLASS_LABELS`: Comma-separated labels (default: `pituitary,glioma,notumor,meningioma`)
    /// - `NEGATIVE_LABEL`: Label meaning no finding (default: `notumor`)
    /// - `SALIENCY_ENABLED`: `true`/`false` (default: `true`)
    /// - `EXPORT_DIRECTORY`: Where reports are exported (default: unset)
    /// - `MODEL_VERSION`: Version recorded in reports (default: `1.0`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value cannot be parsed or fails
    /// validation (see [`validate_config`]).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let log_level = std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        let class_labels = std::env::var("CLASS_LABELS").map_or(defaults.class_labels, |raw| {
            raw.split(',').map(|l| l.trim().to_string()).collect()
        });

        let negative_label = std::env::var("NEGATIVE_LABEL").unwrap_or(defaults.negative_label);

        let saliency_enabled = parse_env_bool("SALIENCY_ENABLED", defaults.saliency_enabled)?;

        let export_directory = std::env::var("EXPORT_DIRECTORY")
            .ok()
            .filter(|d| !d.trim().is_empty());

        let model_version = std::env::var("MODEL_VERSION").unwrap_or(defaults.model_version);

        let config = Self {
            log_level,
            class_labels,
            negative_label,
            saliency_enabled,
            export_directory,
            model_version,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Build the label set described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the labels are invalid.
    pub fn label_set(&self) -> Result<LabelSet, ConfigError> {
        LabelSet::new(self.class_labels.clone(), &self.negative_label).map_err(|e| {
            ConfigError::InvalidValue {
                var: "CLASS_LABELS".into(),
                reason: e.to_string(),
            }
        })
    }
}

/// Parse an environment variable as bool, using a default if not set.
fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        match val.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                var: name.into(),
                reason: "must be true or false".into(),
            }),
        }
    })
}
