//! JSON-lines protocol tests driven through the transport.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use neuroscan_explain::server::{ErrorKind, ExplainService, Response, StdioTransport};
use pretty_assertions::assert_eq;
use tokio::io::BufReader;

use super::fixtures::builder;

async fn run(lines: &[&str]) -> Vec<Response> {
    let mut service = ExplainService::new(builder());
    let input = lines.join("\n");
    let mut output = Vec::new();

    StdioTransport::new()
        .serve(&mut service, BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn result(response: &Response) -> &serde_json::Value {
    match response {
        Response::Ok { result } => result,
        Response::Error { kind, message } => panic!("unexpected {kind:?}: {message}"),
    }
}

const EXPLAIN: &str = r#"{"method":"explain","params":{"probabilities":[0.041,0.85,0.022,0.082],"pixels":[0.0,0.25,0.5,0.75,1.0,0.5],"shape":[2,3],"heatmap":[[0.0,0.0,0.0],[0.0,0.0,0.0],[0.0,0.1,0.9]]}}"#;

#[tokio::test]
async fn test_explain_then_ask() {
    let responses = run(&[
        EXPLAIN,
        r#"{"method":"ask","params":{"question":"What is the diagnosis?"}}"#,
        r#"{"method":"ask","params":{"question":"What is the patient's age?"}}"#,
        r#"{"method":"history"}"#,
    ])
    .await;
    assert_eq!(responses.len(), 4);

    let explained = result(&responses[0]);
    assert_eq!(explained["status"], "completed");
    assert_eq!(
        explained["outcome"]["feature_contributions"]["top_contributing_regions"],
        "Highest activation concentrated in the lower right region"
    );

    let diagnosis = result(&responses[1]);
    assert_eq!(diagnosis["grounded"], true);
    assert_eq!(diagnosis["cited_sections"][0], "decision_explanation");
    assert!(diagnosis["answer"].as_str().unwrap().contains("85.00"));

    let age = result(&responses[2]);
    assert_eq!(age["grounded"], false);
    assert_eq!(age["confidence_label"], "N/A");

    let history = result(&responses[3]).as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["ordinal"], 2);
}

#[tokio::test]
async fn test_errors_are_reported_in_band() {
    let responses = run(&[
        r#"{"method":"ask","params":{"question":"What is the diagnosis?"}}"#,
        r#"{"method":"report"}"#,
        r#"{"method":"explain","params":{"probabilities":[0.5,0.5],"pixels":[]}}"#,
        r#"{"method":"nope"}"#,
    ])
    .await;

    let kinds: Vec<ErrorKind> = responses
        .iter()
        .map(|r| match r {
            Response::Error { kind, .. } => *kind,
            Response::Ok { .. } => panic!("expected error, got {r:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::NoReportLoaded,
            ErrorKind::NoReportLoaded,
            ErrorKind::InvalidInput,
            ErrorKind::InvalidRequest,
        ]
    );
}

#[tokio::test]
async fn test_summary_after_reset() {
    let responses = run(&[
        EXPLAIN,
        r#"{"method":"ask","params":{"question":"Why?"}}"#,
        r#"{"method":"reset"}"#,
        r#"{"method":"summary"}"#,
    ])
    .await;

    assert_eq!(result(&responses[2])["cleared"], 1);
    let summary = result(&responses[3]);
    assert_eq!(summary["total_questions"], 0);
    assert_eq!(summary["report_loaded"], true);
    assert!(summary["current_snapshot"].is_string());
}
