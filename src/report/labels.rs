//! The closed label set a classifier predicts over.

use crate::config::reference::{DEFAULT_CLASS_LABELS, DEFAULT_NEGATIVE_LABEL};
use crate::error::AnalysisError;

/// Ordered class labels plus the index of the "no finding" label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
    negative: usize,
}

impl LabelSet {
    /// Create a label set.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] if there are fewer than 2
    /// labels, a label is empty or duplicated, or `negative` is not one of
    /// the labels.
    pub fn new(labels: Vec<String>, negative: &str) -> Result<Self, AnalysisError> {
        if labels.len() < 2 {
            return Err(AnalysisError::InvalidInput {
                reason: format!("need at least 2 labels, got {}", labels.len()),
            });
        }
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(AnalysisError::InvalidInput {
                reason: "labels must not be empty".into(),
            });
        }
        for (idx, label) in labels.iter().enumerate() {
            if labels[..idx].contains(label) {
                return Err(AnalysisError::InvalidInput {
                    reason: format!("duplicate label '{label}'"),
                });
            }
        }
        let negative = labels
            .iter()
            .position(|l| l == negative)
            .ok_or_else(|| AnalysisError::InvalidInput {
                reason: format!("negative label '{negative}' is not in the label set"),
            })?;

        Ok(Self { labels, negative })
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed set; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in classifier output order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Index of `label`.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// The "no finding" label.
    #[must_use]
    pub fn negative(&self) -> &str {
        &self.labels[self.negative]
    }

    /// Whether `label` is the "no finding" label.
    #[must_use]
    pub fn is_negative(&self, label: &str) -> bool {
        self.negative() == label
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            labels: DEFAULT_CLASS_LABELS.iter().map(|l| (*l).to_string()).collect(),
            negative: DEFAULT_CLASS_LABELS
                .iter()
                .position(|l| *l == DEFAULT_NEGATIVE_LABEL)
                .unwrap_or_default(),
        }
    }
}
