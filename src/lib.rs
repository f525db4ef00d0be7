//! Grounded explanations for MRI tumor classifier outputs.
//!
//! Turns a classifier's probability vector (plus an optional saliency
//! summary) into a structured explanation report, then answers free-text
//! questions strictly from that report.
//!
//! # Features
//!
//! - Entropy/margin uncertainty analysis with fixed thresholds
//! - 14-section explanation report with explicit "not available" values
//! - Keyword routing to ten question topics with section citations
//! - Append-only conversation log bound to report snapshots
//! - JSON export and a JSON Schema for the report
//! - Newline-delimited JSON service over stdio
//!
//! # Quick Start
//!
//! ```bash
//! echo '{"method":"explain","params":{"probabilities":[0.041,0.85,0.022,0.082],"pixels":[0.2,0.5,0.8]}}' \
//!   | ./neuroscan-explain
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  probabilities  ┌──────────────┐   report   ┌──────────────┐
//! │ Classifier │────────────────▶│ ReportBuilder │──────────▶│ Conversation │◀── questions
//! │ + saliency │                 │ + uncertainty │           │   session    │──▶ answers
//! └────────────┘                 └──────────────┘            └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod chat;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod traits;
pub mod uncertainty;

#[cfg(test)]
mod test_utils;
