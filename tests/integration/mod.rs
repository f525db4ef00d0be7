//! Integration tests for the explanation engine.
//!
//! These tests verify end-to-end workflows including:
//! - Report construction from classifier output
//! - Grounded answering and the Not-Available response
//! - Session lifecycle across report replacement
//! - Report export and the JSON contract
//! - The JSON-lines protocol

mod fixtures;
mod grounding;
mod report_export;
mod session_workflow;
mod stdio_protocol;
