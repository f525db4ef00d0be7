//! Error types for the explanation engine.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`AnalysisError`]: Invalid probability vectors or image tensors
//! - [`ReportError`]: Report construction and export failures
//! - [`SaliencyError`]: Saliency generation failures (non-fatal for reports)
//! - [`ClassifierError`]: External classifier failures
//! - [`QueryError`]: Question answering preconditions
//! - [`ConfigError`]: Configuration errors
//! - [`ServerError`]: Stdio protocol errors
//!
//! A question the report cannot answer is *not* an error: it yields the
//! Not-Available answer (see [`crate::chat::AnswerResult::not_available`]).
//!
//! All errors implement `Send + Sync`.

use thiserror::Error;

/// Top-level application error.
///
/// Wraps all subsystem errors for unified handling at the binary boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Analysis input error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Report error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Classifier error.
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Query error.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server protocol error.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Input validation errors for the uncertainty analyzer and image tensors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The input did not have the expected shape or values.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Why the input was rejected.
        reason: String,
    },
}

/// Report construction and export errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The classifier output could not be turned into a report.
    #[error("Malformed prediction: {reason}")]
    MalformedPrediction {
        /// Why the prediction is unusable.
        reason: String,
    },

    /// Serializing or parsing the report failed.
    #[error("Serialization failed: {message}")]
    Serialization {
        /// Description of the serde failure.
        message: String,
    },

    /// Writing the report to disk failed.
    #[error("Export to {path} failed: {message}")]
    Export {
        /// Target path.
        path: String,
        /// Description of the I/O failure.
        message: String,
    },
}

impl From<AnalysisError> for ReportError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidInput { reason } => Self::MalformedPrediction { reason },
        }
    }
}

/// Saliency generation errors.
///
/// These never abort report construction; they are recorded in the report
/// as the reason saliency is unavailable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaliencyError {
    /// The model exposes no layer suitable for attribution.
    #[error("No suitable layer found for saliency")]
    NoSuitableLayer,

    /// Saliency computation failed.
    #[error("Saliency generation failed: {message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },
}

/// External classifier errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// The classifier could not run inference.
    #[error("Inference failed: {message}")]
    InferenceFailed {
        /// Description of the failure.
        message: String,
    },
}

/// Question answering errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A question was asked before any report was loaded.
    #[error("No report loaded: run a prediction first")]
    NoReportLoaded,

    /// The question text was empty after trimming.
    #[error("No question provided")]
    EmptyQuestion,
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// Stdio protocol errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// The request line could not be parsed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what's invalid.
        message: String,
    },

    /// Reading or writing the transport failed.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the I/O failure.
        message: String,
    },
}
