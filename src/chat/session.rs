//! Conversation session.
//!
//! A session owns one current report (shared as `Arc`, replaced
//! last-write-wins) and an append-only log of question/answer turns. It is
//! a plain object owned by its caller; writes take `&mut self`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::answer::{answer, AnswerResult};
use super::router::{route, Topic};
use crate::error::QueryError;
use crate::report::{ExplanationReport, FailedReport, ReportOutcome};
use crate::traits::{RealTimeProvider, TimeProvider};

/// Identifies the report snapshot an answer was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReference {
    /// Assigned when the report was loaded into the session.
    pub snapshot_id: Uuid,
    /// Capture time of the report.
    pub report_timestamp: DateTime<Utc>,
}

/// One exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Position in the session, starting at 1; keeps counting across resets.
    pub ordinal: u64,
    /// Question as asked.
    pub question: String,
    /// Routed topic.
    pub topic: Topic,
    /// Report the answer was read from.
    pub report_reference: ReportReference,
    /// The answer.
    pub answer: AnswerResult,
    /// When the question was asked.
    pub asked_at: DateTime<Utc>,
}

/// A report as loaded into a session.
#[derive(Debug, Clone)]
pub struct ReportSnapshot {
    /// Snapshot id.
    pub id: Uuid,
    /// The report.
    pub report: Arc<ExplanationReport>,
    /// Load time.
    pub loaded_at: DateTime<Utc>,
}

impl ReportSnapshot {
    /// Reference recorded in turns answered from this snapshot.
    #[must_use]
    pub fn reference(&self) -> ReportReference {
        ReportReference {
            snapshot_id: self.id,
            report_timestamp: self.report.timestamp,
        }
    }
}

/// Session overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Session id.
    pub session_id: Uuid,
    /// Turns in the log.
    pub total_questions: usize,
    /// Whether a report is loaded.
    pub report_loaded: bool,
    /// Snapshot currently loaded.
    pub current_snapshot: Option<Uuid>,
    /// Most recent failed build, if it replaced the report.
    pub last_failure: Option<FailedReport>,
    /// The log.
    pub turns: Vec<ConversationTurn>,
}

/// Question-answer session bound to the current report.
#[derive(Debug)]
pub struct ConversationSession<T: TimeProvider = RealTimeProvider> {
    id: Uuid,
    current: Option<ReportSnapshot>,
    history: Vec<ConversationTurn>,
    next_ordinal: u64,
    last_failure: Option<FailedReport>,
    clock: T,
}

impl ConversationSession<RealTimeProvider> {
    /// Create a session using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(RealTimeProvider)
    }
}

impl Default for ConversationSession<RealTimeProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeProvider> ConversationSession<T> {
    /// Create a session using `clock` for turn timestamps.
    #[must_use]
    pub fn with_clock(clock: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            current: None,
            history: Vec::new(),
            next_ordinal: 1,
            last_failure: None,
            clock,
        }
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Replace the current report. Returns the new snapshot id.
    pub fn load(&mut self, report: impl Into<Arc<ExplanationReport>>) -> Uuid {
        let snapshot = ReportSnapshot {
            id: Uuid::new_v4(),
            report: report.into(),
            loaded_at: self.clock.now(),
        };
        let id = snapshot.id;
        info!(
            session_id = %self.id,
            snapshot_id = %id,
            report_timestamp = %snapshot.report.timestamp,
            "Report loaded into session"
        );
        self.current = Some(snapshot);
        self.last_failure = None;
        id
    }

    /// Apply a build outcome.
    ///
    /// A completed report is loaded. A failure clears the current report so
    /// no answer is read from a superseded prediction, and is kept as
    /// [`ConversationSession::last_failure`].
    pub fn apply_outcome(&mut self, outcome: ReportOutcome) -> Option<Uuid> {
        match outcome {
            ReportOutcome::Completed(report) => Some(self.load(Arc::new(*report))),
            ReportOutcome::Failed(failed) => {
                warn!(session_id = %self.id, error = %failed.error, "Failed report replaced current report");
                self.current = None;
                self.last_failure = Some(failed);
                None
            }
        }
    }

    /// Ask a question about the current report.
    ///
    /// Appends exactly one turn on success, including Not-Available answers.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyQuestion`] for blank input and
    /// [`QueryError::NoReportLoaded`] when no report is loaded; neither
    /// appends a turn.
    pub fn ask(&mut self, question: &str) -> Result<AnswerResult, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        let snapshot = self.current.as_ref().ok_or(QueryError::NoReportLoaded)?;

        let topic = route(question);
        let result = answer(question, topic, &snapshot.report);
        let turn = ConversationTurn {
            ordinal: self.next_ordinal,
            question: question.to_string(),
            topic,
            report_reference: snapshot.reference(),
            answer: result.clone(),
            asked_at: self.clock.now(),
        };

        info!(
            session_id = %self.id,
            ordinal = turn.ordinal,
            topic = %topic,
            grounded = result.grounded,
            "Question answered"
        );

        self.next_ordinal += 1;
        self.history.push(turn);
        Ok(result)
    }

    /// Turns in insertion order.
    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Clear the log. The current report stays loaded.
    pub fn reset(&mut self) {
        info!(session_id = %self.id, cleared = self.history.len(), "Conversation reset");
        self.history.clear();
    }

    /// The current report, if any.
    #[must_use]
    pub fn current_report(&self) -> Option<Arc<ExplanationReport>> {
        self.current.as_ref().map(|s| Arc::clone(&s.report))
    }

    /// The current snapshot, if any.
    #[must_use]
    pub const fn current_snapshot(&self) -> Option<&ReportSnapshot> {
        self.current.as_ref()
    }

    /// Most recent failed build since the last successful load.
    #[must_use]
    pub const fn last_failure(&self) -> Option<&FailedReport> {
        self.last_failure.as_ref()
    }

    /// Session overview including the full log.
    #[must_use]
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            session_id: self.id,
            total_questions: self.history.len(),
            report_loaded: self.current.is_some(),
            current_snapshot: self.current.as_ref().map(|s| s.id),
            last_failure: self.last_failure.clone(),
            turns: self.history.clone(),
        }
    }
}
