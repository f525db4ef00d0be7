//! Test utilities and mock factories.
//!
//! This module provides shared testing infrastructure:
//! - Mock collaborators for [`crate::traits`]
//! - Report fixtures built with a frozen clock
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{ClassifierError, SaliencyError};
use crate::report::{
    ActivationSummary, ExplanationReport, ImageTensor, LabelSet, ReportBuilder, ReportInput,
    SaliencyResult, SaliencySummary,
};
use crate::traits::{FixedTimeProvider, MockClassifier, MockSaliencyGenerator};

/// Classifier output for the reference glioma case, in default label order
/// (pituitary, glioma, notumor, meningioma).
pub const GLIOMA_PROBABILITIES: [f64; 4] = [0.041, 0.85, 0.022, 0.082];

/// Instant every fixture report is stamped with.
#[must_use]
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
}

/// Clock frozen at [`fixed_instant`].
#[must_use]
pub fn fixed_clock() -> FixedTimeProvider {
    FixedTimeProvider::new(fixed_instant())
}

/// Builder over the default labels with a frozen clock.
#[must_use]
pub fn fixed_builder() -> ReportBuilder<FixedTimeProvider> {
    ReportBuilder::new(LabelSet::default()).with_clock(fixed_clock())
}

/// A 4x4 mid-gray tensor with enough contrast to pass quality checks.
#[must_use]
pub fn test_tensor() -> ImageTensor {
    let values = (0..16).map(|i| f64::from(i) / 15.0).collect();
    ImageTensor::new(values, vec![4, 4]).unwrap()
}

/// Saliency summary pointing at the upper-left region.
#[must_use]
pub fn upper_left_saliency() -> SaliencySummary {
    SaliencySummary {
        regions_description: "Highest activation concentrated in the upper left region".into(),
        activation: ActivationSummary {
            heatmap_rows: 8,
            heatmap_cols: 8,
            max_activation: 1.0,
            mean_activation: 0.1875,
        },
    }
}

/// The reference glioma report with saliency available.
#[must_use]
pub fn glioma_report() -> ExplanationReport {
    let input = ReportInput::new(GLIOMA_PROBABILITIES.to_vec(), test_tensor())
        .with_saliency(SaliencyResult::Available(upper_left_saliency()))
        .with_image_path("uploads/scan_001.png");
    fixed_builder().build(&input).unwrap()
}

/// The reference glioma report with saliency unavailable.
#[must_use]
pub fn glioma_report_without_saliency() -> ExplanationReport {
    let input = ReportInput::new(GLIOMA_PROBABILITIES.to_vec(), test_tensor())
        .with_saliency(SaliencyResult::unavailable("No suitable layer found for saliency"));
    fixed_builder().build(&input).unwrap()
}

/// Classifier mock returning `probabilities` for every call.
#[must_use]
pub fn mock_classifier(probabilities: Vec<f64>) -> MockClassifier {
    let mut mock = MockClassifier::new();
    mock.expect_classify()
        .returning(move |_tensor| Ok(probabilities.clone()));
    mock
}

/// Classifier mock that always fails.
#[must_use]
pub fn mock_classifier_error(message: &str) -> MockClassifier {
    let message = message.to_string();
    let mut mock = MockClassifier::new();
    mock.expect_classify()
        .returning(move |_tensor| {
            Err(ClassifierError::InferenceFailed {
                message: message.clone(),
            })
        });
    mock
}

/// Saliency mock returning [`upper_left_saliency`].
#[must_use]
pub fn mock_saliency_success() -> MockSaliencyGenerator {
    let mut mock = MockSaliencyGenerator::new();
    mock.expect_saliency()
        .returning(|_tensor, _idx| Ok(upper_left_saliency()));
    mock
}

/// Saliency mock that always fails with `error`.
#[must_use]
pub fn mock_saliency_error(error: SaliencyError) -> MockSaliencyGenerator {
    let mut mock = MockSaliencyGenerator::new();
    mock.expect_saliency()
        .returning(move |_tensor, _idx| Err(error.clone()));
    mock
}
