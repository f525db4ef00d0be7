//! Configuration validation.
//!
//! This module provides validation logic for configuration values.

use std::collections::HashSet;

use tracing::warn;

use super::reference::reference_for;
use super::Config;
use crate::error::ConfigError;

/// Minimum number of class labels (margin needs a runner-up).
pub const MIN_LABELS: usize = 2;

/// Accepted log levels.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if:
/// - `CLASS_LABELS` has fewer than 2 entries, an empty entry or a duplicate
/// - `NEGATIVE_LABEL` is not one of the class labels
/// - `LOG_LEVEL` is not a known level
///
/// Labels without built-in reference facts are accepted with a warning;
/// their domain reference entries report "not available".
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.class_labels.len() < MIN_LABELS {
        return Err(ConfigError::InvalidValue {
            var: "CLASS_LABELS".into(),
            reason: format!("must contain at least {MIN_LABELS} labels"),
        });
    }

    if config.class_labels.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            var: "CLASS_LABELS".into(),
            reason: "labels must not be empty".into(),
        });
    }

    let mut seen = HashSet::new();
    if let Some(dup) = config.class_labels.iter().find(|l| !seen.insert(l.as_str())) {
        return Err(ConfigError::InvalidValue {
            var: "CLASS_LABELS".into(),
            reason: format!("duplicate label: {dup}"),
        });
    }

    if !config.class_labels.contains(&config.negative_label) {
        return Err(ConfigError::InvalidValue {
            var: "NEGATIVE_LABEL".into(),
            reason: format!("{} is not a class label", config.negative_label),
        });
    }

    if !LOG_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
        return Err(ConfigError::InvalidValue {
            var: "LOG_LEVEL".into(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }

    let unknown = labels_without_reference(config);
    if !unknown.is_empty() {
        warn!(
            labels = %unknown.join(", "),
            "Class labels have no built-in reference facts"
        );
    }

    Ok(())
}

/// Configured labels with no entry in the brain-tumor reference table.
#[must_use]
pub fn labels_without_reference(config: &Config) -> Vec<&str> {
    config
        .class_labels
        .iter()
        .map(String::as_str)
        .filter(|label| reference_for(label).is_none())
        .collect()
}
