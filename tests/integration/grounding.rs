//! Grounding tests.
//!
//! Every answer must be traceable to report sections, and anything the
//! report does not model must come back as the Not-Available response.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use neuroscan_explain::chat::{answer, route, AnswerConfidence, Topic};
use neuroscan_explain::report::{
    AlternativeEntry, AlternativeQualifier, ConfidenceTier, Field, ReportSection,
};
use neuroscan_explain::uncertainty::UncertaintyLevel;
use pretty_assertions::assert_eq;

use super::fixtures::{glioma_report, GLIOMA};

#[test]
fn test_glioma_report_sections() {
    let report = glioma_report();
    let decision = &report.decision_explanation;

    assert_eq!(decision.predicted_label, Field::Present("glioma".into()));
    assert_eq!(decision.confidence, Field::Present(85.0));
    assert_eq!(decision.confidence_tier, Field::Present(ConfidenceTier::High));
    assert_eq!(decision.is_finding_positive, Field::Present(true));

    let table = report.probability_table.require("probability_table").unwrap();
    assert_eq!(table.len(), GLIOMA.len());
    let ranks: Vec<(String, usize)> = table.iter().map(|e| (e.label.clone(), e.rank)).collect();
    assert_eq!(
        ranks,
        vec![
            ("pituitary".to_string(), 3),
            ("glioma".to_string(), 1),
            ("notumor".to_string(), 4),
            ("meningioma".to_string(), 2),
        ]
    );

    let alternatives = report
        .alternative_candidates
        .require("alternative_candidates")
        .unwrap();
    assert_eq!(alternatives.len(), 1);
    let AlternativeEntry::Candidate(candidate) = &alternatives[0] else {
        panic!("expected a candidate, got {alternatives:?}");
    };
    assert_eq!(candidate.label, "meningioma");
    assert_eq!(candidate.rank, 2);
    assert_eq!(candidate.qualifier, AlternativeQualifier::LowProbability);

    assert_eq!(
        report.uncertainty_analysis.uncertainty_level,
        Field::Present(UncertaintyLevel::Moderate)
    );
    assert_eq!(report.uncertainty_analysis.margin, Field::Present(0.768));
    assert_eq!(
        report.feature_contributions.top_contributing_regions,
        Field::Present("Highest activation concentrated in the lower right region".into())
    );
}

#[test]
fn test_diagnosis_question_is_grounded() {
    let report = glioma_report();
    let question = "What is the diagnosis?";
    let result = answer(question, route(question), &report);

    assert!(result.grounded);
    assert_eq!(result.topic, Topic::Diagnosis);
    assert_eq!(result.cited_sections, vec![ReportSection::DecisionExplanation]);
    assert!(result.answer.contains("glioma"));
    assert!(result.answer.contains("85.00"));
}

#[test]
fn test_unmodeled_questions_are_not_available() {
    let report = glioma_report();
    for question in [
        "What is the patient's age?",
        "Is the patient male or female?",
        "Which medication should be given?",
        "What is the tumor size in mm?",
        "When was the scan dated?",
        "Any family history?",
    ] {
        let result = answer(question, route(question), &report);
        assert!(!result.grounded, "{question}");
        assert!(result.cited_sections.is_empty(), "{question}");
        assert_eq!(result.confidence_label, AnswerConfidence::NotApplicable);
        assert!(
            result
                .answer
                .contains("This information is not available in the model output"),
            "{question}"
        );
    }
}

#[test]
fn test_image_wording_is_not_mistaken_for_patient_data() {
    let report = glioma_report();
    for question in [
        "Who should review these findings?",
        "What image size does the model use?",
        "Is the scan too old to trust?",
        "Why was the age of the image flagged?",
    ] {
        let result = answer(question, route(question), &report);
        assert!(result.grounded, "{question}");
        assert!(!result.cited_sections.is_empty(), "{question}");
    }
}

#[test]
fn test_router_priority_with_overlapping_keywords() {
    // "what" (diagnosis) outranks "confidence" and "glioma"
    assert_eq!(route("What confidence is there in the glioma?"), Topic::Diagnosis);
    // "sure" outranks "why"
    assert_eq!(route("Why are you sure?"), Topic::Confidence);
    // "uncertain" contains "certain"
    assert_eq!(route("Is the result uncertain?"), Topic::Diagnosis);
    assert_eq!(route("Seems uncertain"), Topic::Confidence);
    assert_eq!(route("Ambiguous"), Topic::Uncertainty);
    assert_eq!(route("hello"), Topic::General);
}

#[test]
fn test_every_topic_cites_sections() {
    let report = glioma_report();
    for topic in Topic::all() {
        let result = answer("tell me about it", *topic, &report);
        assert!(result.grounded, "{topic}");
        assert!(!result.cited_sections.is_empty(), "{topic}");
    }
}

#[test]
fn test_missing_decision_section_degrades_to_not_available() {
    let mut report = glioma_report();
    report.decision_explanation.predicted_label = Field::NotAvailable;

    let result = answer("What is the diagnosis?", Topic::Diagnosis, &report);
    assert!(!result.grounded);
    assert!(result.answer.contains("decision_explanation.predicted_label"));
}

#[test]
fn test_answers_are_deterministic() {
    let report = glioma_report();
    for question in ["What is the diagnosis?", "How confident?", "Where is it?"] {
        let first = answer(question, route(question), &report);
        let second = answer(question, route(question), &glioma_report());
        assert_eq!(first, second);
    }
}
