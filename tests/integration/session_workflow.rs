//! Session lifecycle tests.
//!
//! load → ask → replace report → ask → reset, with failures in between.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use neuroscan_explain::chat::{ConversationSession, Topic};
use neuroscan_explain::error::QueryError;
use neuroscan_explain::report::{Field, ReportStatus};
use neuroscan_explain::traits::FixedTimeProvider;
use pretty_assertions::assert_eq;

use super::fixtures::{builder, glioma_report, input, instant};

fn session() -> ConversationSession<FixedTimeProvider> {
    ConversationSession::with_clock(FixedTimeProvider::new(instant()))
}

#[test]
fn test_ask_requires_loaded_report() {
    let mut session = session();
    assert_eq!(
        session.ask("What is the diagnosis?"),
        Err(QueryError::NoReportLoaded)
    );
    assert!(session.history().is_empty());
}

#[test]
fn test_full_conversation() {
    let mut session = session();
    let snapshot = session.load(glioma_report());

    let questions = [
        ("What is the diagnosis?", Topic::Diagnosis, true),
        ("Is it reliable?", Topic::Confidence, true),
        ("Where is the activation?", Topic::Location, true),
        ("Any alternatives?", Topic::Alternatives, true),
        ("What is the patient's age?", Topic::Diagnosis, false),
    ];
    for (question, topic, grounded) in questions {
        let result = session.ask(question).unwrap();
        assert_eq!(result.topic, topic, "{question}");
        assert_eq!(result.grounded, grounded, "{question}");
    }

    let history = session.history();
    assert_eq!(history.len(), questions.len());
    for (i, turn) in history.iter().enumerate() {
        assert_eq!(turn.ordinal, i as u64 + 1);
        assert_eq!(turn.report_reference.snapshot_id, snapshot);
        assert_eq!(turn.report_reference.report_timestamp, instant());
        assert_eq!(turn.asked_at, instant());
    }

    let summary = session.summary();
    assert_eq!(summary.total_questions, questions.len());
    assert!(summary.report_loaded);
    assert_eq!(summary.current_snapshot, Some(snapshot));
}

#[test]
fn test_replacing_report_rebinds_later_turns() {
    let mut session = session();
    let first = session.load(glioma_report());
    session.ask("What is the diagnosis?").unwrap();

    let pituitary = builder()
        .build(&input(&[0.91, 0.04, 0.03, 0.02]))
        .unwrap();
    let second = session.load(Arc::new(pituitary));
    assert_ne!(first, second);

    let result = session.ask("What is the diagnosis?").unwrap();
    assert!(result.answer.contains("pituitary"));

    let history = session.history();
    assert_eq!(history[0].report_reference.snapshot_id, first);
    assert_eq!(history[1].report_reference.snapshot_id, second);
    assert!(history[0].answer.answer.contains("glioma"));
}

#[test]
fn test_failed_build_clears_report() {
    let mut session = session();
    session.load(glioma_report());

    let outcome = builder().build_outcome(&input(&[0.5, 0.5]));
    assert_eq!(outcome.status(), ReportStatus::Failed);
    assert_eq!(session.apply_outcome(outcome), None);

    assert!(session.current_report().is_none());
    let failure = session.last_failure().unwrap();
    assert!(failure.error.starts_with("Failed to generate explanation"));
    assert_eq!(
        session.ask("What is the diagnosis?"),
        Err(QueryError::NoReportLoaded)
    );

    let completed = builder().build_outcome(&input(&[0.041, 0.85, 0.022, 0.082]));
    assert!(session.apply_outcome(completed).is_some());
    assert!(session.ask("What is the diagnosis?").is_ok());
}

#[test]
fn test_reset_keeps_report_and_ordinals() {
    let mut session = session();
    session.load(glioma_report());
    session.ask("What is the diagnosis?").unwrap();
    session.ask("Why?").unwrap();

    session.reset();
    assert!(session.history().is_empty());
    assert!(session.current_report().is_some());

    session.ask("What is the diagnosis?").unwrap();
    assert_eq!(session.history()[0].ordinal, 3);
}

#[test]
fn test_empty_question_appends_nothing() {
    let mut session = session();
    session.load(glioma_report());
    assert_eq!(session.ask("  \n "), Err(QueryError::EmptyQuestion));
    assert!(session.history().is_empty());
}

#[test]
fn test_shared_report_is_not_copied() {
    let mut session = session();
    let report = Arc::new(glioma_report());
    session.load(Arc::clone(&report));

    let current = session.current_report().unwrap();
    assert!(Arc::ptr_eq(&current, &report));
    assert_eq!(
        current.decision_explanation.predicted_label,
        Field::Present("glioma".into())
    );
}
