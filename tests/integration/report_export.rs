//! Report contract tests: idempotence, JSON round trip, export, schema.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use neuroscan_explain::report::{
    report_schema, ExplanationReport, ReportOutcome, ReportStatus, SaliencyResult,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::fixtures::{builder, glioma_report, input, GLIOMA};

#[test]
fn test_build_is_idempotent_with_frozen_clock() {
    let first = builder().build(&input(&GLIOMA)).unwrap();
    let second = builder().build(&input(&GLIOMA)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_json_round_trip() {
    let report = glioma_report();
    let parsed = ExplanationReport::from_json(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed, report);

    let parsed = ExplanationReport::from_json(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_sentinels_serialize_as_not_available() {
    let input = input(&GLIOMA).with_saliency(SaliencyResult::unavailable("layer missing"));
    let report = builder().build(&input).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    let features = &value["feature_contributions"];
    assert_eq!(features["saliency_available"], false);
    assert_eq!(features["top_contributing_regions"], "not available");
    assert_eq!(features["unavailable_reason"], "layer missing");
    assert_eq!(value["model_metadata"]["training_date"], "not available");
    assert_eq!(
        value["ensemble_information"]["ensemble_weights"],
        "not available"
    );

    let parsed = ExplanationReport::from_json(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_report_has_all_sections() {
    let value: serde_json::Value =
        serde_json::from_str(&glioma_report().to_json().unwrap()).unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    for key in [
        "status",
        "timestamp",
        "image_path",
        "pipeline_summary",
        "decision_explanation",
        "feature_contributions",
        "probability_table",
        "alternative_candidates",
        "uncertainty_analysis",
        "ensemble_information",
        "data_quality",
        "domain_reference",
        "recommendation",
        "model_metadata",
    ] {
        assert!(keys.contains(&key), "missing {key}");
    }
    assert_eq!(keys.len(), 14);
}

#[test]
fn test_export_to_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let report = glioma_report();

    let path = report.export_to_file(&dir.path().join("nested")).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "explanation_20250302_081500_000.json"
    );

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(ExplanationReport::from_json(&written).unwrap(), report);
}

#[test]
fn test_failed_outcome_shape() {
    let outcome = builder().build_outcome(&input(&[0.2, 0.3, 0.5]));
    let ReportOutcome::Failed(failed) = &outcome else {
        panic!("expected failure");
    };
    assert_eq!(failed.status, ReportStatus::Failed);

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["status"], "failed");
    assert!(value["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to generate explanation"));
    assert_eq!(value.as_object().unwrap().len(), 3);
}

#[test]
fn test_schema_describes_report() {
    let schema = serde_json::to_value(report_schema()).unwrap();
    let text = schema.to_string();
    assert!(text.contains("decision_explanation"));
    assert!(text.contains("not available"));
}
