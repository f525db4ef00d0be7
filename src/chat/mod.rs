//! Grounded question answering over an explanation report.
//!
//! - [`route`]: keyword routing of free text to a [`Topic`]
//! - [`answer`]: grounded answers with section citations
//! - [`ConversationSession`]: current report plus the append-only turn log
//!
//! # Example
//!
//! ```
//! use neuroscan_explain::chat::ConversationSession;
//! use neuroscan_explain::report::{ImageTensor, LabelSet, ReportBuilder, ReportInput};
//!
//! let tensor = ImageTensor::from_flat(vec![0.2, 0.5, 0.8]).unwrap();
//! let input = ReportInput::new(vec![0.041, 0.85, 0.022, 0.082], tensor);
//! let report = ReportBuilder::new(LabelSet::default()).build(&input).unwrap();
//!
//! let mut session = ConversationSession::new();
//! session.load(report);
//! let result = session.ask("What is the diagnosis?").unwrap();
//! assert!(result.grounded);
//! assert!(result.answer.contains("glioma"));
//! ```

mod answer;
mod router;
mod session;

pub use answer::{answer, AnswerConfidence, AnswerResult};
pub use router::{route, unmodeled_subject, Topic, UnmodeledSubject, ROUTING_TABLE};
pub use session::{
    ConversationSession, ConversationSummary, ConversationTurn, ReportReference, ReportSnapshot,
};
