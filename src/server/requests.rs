//! Wire types of the JSON-lines protocol.
//!
//! One request per line, one response per line:
//!
//! ```text
//! {"method":"explain","params":{"probabilities":[0.041,0.85,0.022,0.082],"pixels":[0.2,0.5,0.8]}}
//! {"status":"ok","result":{...}}
//! {"method":"ask","params":{"question":"What is the diagnosis?"}}
//! {"method":"history"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, QueryError, ReportError, ServerError};
use crate::report::Details;

/// Parameters of an `explain` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainParams {
    /// Classifier output in label-set order.
    pub probabilities: Vec<f64>,
    /// Preprocessed image values.
    pub pixels: Vec<f64>,
    /// Tensor shape; defaults to `[pixels.len()]`.
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
    /// Source image path.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Image metadata.
    #[serde(default)]
    pub metadata: Option<Details>,
    /// Preprocessing trace.
    #[serde(default)]
    pub preprocessing: Option<Details>,
    /// Raw saliency heatmap for the predicted class.
    #[serde(default)]
    pub heatmap: Option<Vec<Vec<f64>>>,
    /// Upstream saliency failure message.
    #[serde(default)]
    pub saliency_failure: Option<String>,
}

/// Parameters of an `ask` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskParams {
    /// Free-text question.
    pub question: String,
}

/// A protocol request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Request {
    /// Build a report from classifier output and load it.
    Explain(ExplainParams),
    /// Ask about the loaded report.
    Ask(AskParams),
    /// Conversation log.
    History,
    /// Clear the conversation log.
    Reset,
    /// The loaded report.
    Report,
    /// JSON Schema of the report.
    Schema,
    /// Session summary.
    Summary,
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The line is not a valid request.
    InvalidRequest,
    /// Request values were rejected.
    InvalidInput,
    /// No report is loaded.
    NoReportLoaded,
    /// The question was blank.
    EmptyQuestion,
    /// Writing the export file failed.
    ExportFailed,
    /// Unexpected internal failure.
    Internal,
}

/// A protocol response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// Success.
    Ok {
        /// Method-specific payload.
        result: serde_json::Value,
    },
    /// Failure.
    Error {
        /// Category.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}

impl Response {
    /// Success with a serializable payload.
    pub fn ok(result: &impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Self::Ok { result },
            Err(e) => Self::error(ErrorKind::Internal, e.to_string()),
        }
    }

    /// Failure.
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    /// Whether this is a success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

impl From<QueryError> for Response {
    fn from(err: QueryError) -> Self {
        let kind = match err {
            QueryError::NoReportLoaded => ErrorKind::NoReportLoaded,
            QueryError::EmptyQuestion => ErrorKind::EmptyQuestion,
        };
        Self::error(kind, err.to_string())
    }
}

impl From<AnalysisError> for Response {
    fn from(err: AnalysisError) -> Self {
        Self::error(ErrorKind::InvalidInput, err.to_string())
    }
}

impl From<ReportError> for Response {
    fn from(err: ReportError) -> Self {
        let kind = match err {
            ReportError::MalformedPrediction { .. } => ErrorKind::InvalidInput,
            ReportError::Export { .. } => ErrorKind::ExportFailed,
            ReportError::Serialization { .. } => ErrorKind::Internal,
        };
        Self::error(kind, err.to_string())
    }
}

impl From<ServerError> for Response {
    fn from(err: ServerError) -> Self {
        let kind = match err {
            ServerError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ServerError::Transport { .. } => ErrorKind::Internal,
        };
        Self::error(kind, err.to_string())
    }
}
