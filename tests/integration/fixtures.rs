//! Shared fixtures.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};
use neuroscan_explain::report::{
    summarize_heatmap, ExplanationReport, ImageTensor, LabelSet, ReportBuilder, ReportInput,
    SaliencyResult,
};
use neuroscan_explain::traits::FixedTimeProvider;

/// Classifier output for the glioma case (pituitary, glioma, notumor, meningioma).
pub const GLIOMA: [f64; 4] = [0.041, 0.85, 0.022, 0.082];

pub fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 2, 8, 15, 0).unwrap()
}

pub fn builder() -> ReportBuilder<FixedTimeProvider> {
    ReportBuilder::new(LabelSet::default()).with_clock(FixedTimeProvider::new(instant()))
}

pub fn tensor() -> ImageTensor {
    let values = (0..64).map(|i| f64::from(i % 16) / 15.0).collect();
    ImageTensor::new(values, vec![8, 8]).unwrap()
}

/// Heatmap peaking in the lower-right cell.
pub fn heatmap() -> Vec<Vec<f64>> {
    let mut rows = vec![vec![0.0; 6]; 6];
    rows[5][5] = 2.0;
    rows[4][5] = 0.5;
    rows
}

pub fn input(probabilities: &[f64]) -> ReportInput {
    let saliency = SaliencyResult::from(summarize_heatmap(&heatmap()));
    ReportInput::new(probabilities.to_vec(), tensor())
        .with_saliency(saliency)
        .with_image_path("uploads/case_17.png")
}

pub fn glioma_report() -> ExplanationReport {
    builder().build(&input(&GLIOMA)).unwrap()
}
