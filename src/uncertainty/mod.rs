//! Uncertainty analysis over a probability vector.
//!
//! Pure functions: entropy, top-2 margin, a qualitative level and a fixed
//! interpretation text. All thresholds come from [`crate::config::reference`].
//!
//! # Example
//!
//! ```
//! use neuroscan_explain::uncertainty::{analyze, UncertaintyLevel};
//!
//! let metrics = analyze(&[0.97, 0.01, 0.01, 0.01]).unwrap();
//! assert_eq!(metrics.level, UncertaintyLevel::Low);
//! assert!(metrics.entropy >= 0.0);
//! ```

use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::reference::{
    ENTROPY_EPSILON, ENTROPY_LOW, ENTROPY_MODERATE, INTERPRETATION_FAIR, INTERPRETATION_STRONG,
    INTERPRETATION_WEAK, INTERPRET_MAX_PROB_FAIR, INTERPRET_MAX_PROB_STRONG, MARGIN_HIGH,
    MARGIN_MODERATE, SUM_TOLERANCE,
};
use crate::error::AnalysisError;

/// Decimal places kept for entropy and margin.
pub const METRIC_PRECISION: i32 = 4;

/// Qualitative uncertainty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyLevel {
    /// Low entropy and a wide margin.
    Low,
    /// Fairly confident.
    Moderate,
    /// Ambiguous case.
    High,
}

impl UncertaintyLevel {
    /// Human-readable summary of the level.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Low => "low uncertainty - confident prediction",
            Self::Moderate => "moderate uncertainty - fairly confident",
            Self::High => "high uncertainty - ambiguous case",
        }
    }

    /// Returns the level name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for UncertaintyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uncertainty metrics for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct UncertaintyMetrics {
    /// Shannon entropy in nats, 4 decimals.
    pub entropy: f64,
    /// Top-1 minus top-2 probability, 4 decimals.
    pub margin: f64,
    /// Qualitative level.
    pub level: UncertaintyLevel,
    /// Fixed interpretation text.
    pub interpretation: &'static str,
}

/// Validate a probability vector.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] when the vector has fewer than 2
/// entries, contains a non-finite or negative value, or does not sum to 1
/// within [`SUM_TOLERANCE`].
pub fn validate_probabilities(probabilities: &[f64]) -> Result<(), AnalysisError> {
    if probabilities.len() < 2 {
        return Err(AnalysisError::InvalidInput {
            reason: format!(
                "need at least 2 probabilities, got {}",
                probabilities.len()
            ),
        });
    }

    if let Some((idx, value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(AnalysisError::InvalidInput {
            reason: format!("probability at index {idx} is invalid: {value}"),
        });
    }

    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(AnalysisError::InvalidInput {
            reason: format!("probabilities sum to {sum:.4}, expected 1"),
        });
    }

    Ok(())
}

/// Analyze a probability vector.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if the vector fails
/// [`validate_probabilities`].
pub fn analyze(probabilities: &[f64]) -> Result<UncertaintyMetrics, AnalysisError> {
    validate_probabilities(probabilities)?;

    let entropy = entropy(probabilities);
    let margin = margin(probabilities);
    let max_prob = probabilities.iter().copied().fold(0.0_f64, f64::max);

    Ok(UncertaintyMetrics {
        entropy,
        margin,
        level: classify_level(entropy, margin),
        interpretation: interpret(max_prob, entropy),
    })
}

/// Entropy `-Σ p·ln(p + ε)`, rounded to 4 decimals.
///
/// Assumes a validated vector.
#[must_use]
pub fn entropy(probabilities: &[f64]) -> f64 {
    let raw: f64 = -probabilities
        .iter()
        .map(|p| p * (p + ENTROPY_EPSILON).ln())
        .sum::<f64>();
    // p·ln(p + ε) is slightly positive for p close to 1
    round_to(raw.max(0.0), METRIC_PRECISION)
}

/// Difference between the two largest probabilities, rounded to 4 decimals.
///
/// Assumes a validated vector with at least 2 entries.
#[must_use]
pub fn margin(probabilities: &[f64]) -> f64 {
    let mut sorted = probabilities.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    match sorted.as_slice() {
        [first, second, ..] => round_to(first - second, METRIC_PRECISION),
        _ => 0.0,
    }
}

/// Map entropy and margin to a qualitative level.
#[must_use]
pub fn classify_level(entropy: f64, margin: f64) -> UncertaintyLevel {
    if entropy < ENTROPY_LOW && margin > MARGIN_HIGH {
        UncertaintyLevel::Low
    } else if entropy < ENTROPY_MODERATE && margin > MARGIN_MODERATE {
        UncertaintyLevel::Moderate
    } else {
        UncertaintyLevel::High
    }
}

/// Pick the interpretation text for a max probability and entropy.
#[must_use]
pub fn interpret(max_probability: f64, entropy: f64) -> &'static str {
    if max_probability > INTERPRET_MAX_PROB_STRONG && entropy < ENTROPY_LOW {
        INTERPRETATION_STRONG
    } else if max_probability > INTERPRET_MAX_PROB_FAIR && entropy < ENTROPY_MODERATE {
        INTERPRETATION_FAIR
    } else {
        INTERPRETATION_WEAK
    }
}

/// Round to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}
