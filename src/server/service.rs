//! Request dispatch over one conversation session.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::requests::{ExplainParams, Request, Response};
use crate::chat::ConversationSession;
use crate::config::Config;
use crate::error::{ClassifierError, ConfigError, QueryError, SaliencyError, ServerError};
use crate::pipeline::{ExplanationPipeline, PredictionContext};
use crate::report::{
    report_schema, summarize_heatmap, ImageTensor, ReportBuilder, ReportOutcome, ReportStatus,
    SaliencySummary,
};
use crate::traits::{Classifier, RealTimeProvider, SaliencyGenerator, TimeProvider};

/// Reason recorded when an `explain` request carries no heatmap.
pub const NO_HEATMAP: &str = "no heatmap supplied with the request";

/// Classifier whose output was computed upstream and sent with the request.
#[derive(Debug, Clone)]
struct PrecomputedClassifier {
    probabilities: Vec<f64>,
}

impl Classifier for PrecomputedClassifier {
    fn classify(&self, _tensor: &ImageTensor) -> Result<Vec<f64>, ClassifierError> {
        Ok(self.probabilities.clone())
    }
}

/// Saliency taken from the request's heatmap or failure message.
#[derive(Debug, Clone)]
struct RequestSaliency {
    heatmap: Option<Vec<Vec<f64>>>,
    failure: Option<String>,
}

impl SaliencyGenerator for RequestSaliency {
    fn saliency(
        &self,
        _tensor: &ImageTensor,
        _class_index: usize,
    ) -> Result<SaliencySummary, SaliencyError> {
        if let Some(message) = &self.failure {
            return Err(SaliencyError::Failed {
                message: message.clone(),
            });
        }
        self.heatmap.as_deref().map_or_else(
            || {
                Err(SaliencyError::Failed {
                    message: NO_HEATMAP.into(),
                })
            },
            summarize_heatmap,
        )
    }
}

/// Result payload of an `explain` request.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainResult {
    /// Build status.
    pub status: ReportStatus,
    /// Snapshot id when the report was loaded.
    pub snapshot_id: Option<Uuid>,
    /// Export file, when exporting is configured.
    pub export_path: Option<PathBuf>,
    /// The report or failure record.
    pub outcome: ReportOutcome,
}

/// Owns the report builder and the conversation session.
#[derive(Debug)]
pub struct ExplainService<T: TimeProvider + Clone = RealTimeProvider> {
    builder: ReportBuilder<T>,
    session: ConversationSession<T>,
    saliency_enabled: bool,
    export_directory: Option<PathBuf>,
}

impl ExplainService<RealTimeProvider> {
    /// Create a service from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the configured labels are invalid.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let builder =
            ReportBuilder::new(config.label_set()?).with_model_version(&config.model_version);
        Ok(Self::new(builder)
            .with_saliency_enabled(config.saliency_enabled)
            .with_export_directory(config.export_directory.as_ref().map(PathBuf::from)))
    }
}

impl<T: TimeProvider + Clone> ExplainService<T> {
    /// Create a service; the session shares the builder's clock.
    #[must_use]
    pub fn new(builder: ReportBuilder<T>) -> Self {
        let session = ConversationSession::with_clock(builder.clock().clone());
        Self {
            builder,
            session,
            saliency_enabled: true,
            export_directory: None,
        }
    }

    /// Switch saliency generation on or off.
    #[must_use]
    pub fn with_saliency_enabled(mut self, enabled: bool) -> Self {
        self.saliency_enabled = enabled;
        self
    }

    /// Export completed reports to `directory`.
    #[must_use]
    pub fn with_export_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.export_directory = directory;
        self
    }

    /// The conversation session.
    #[must_use]
    pub const fn session(&self) -> &ConversationSession<T> {
        &self.session
    }

    /// Parse and handle one request line.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "Rejected request line");
                Response::from(ServerError::InvalidRequest {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Handle one request.
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Explain(params) => self.explain(params),
            Request::Ask(params) => match self.session.ask(&params.question) {
                Ok(answer) => Response::ok(&answer),
                Err(e) => Response::from(e),
            },
            Request::History => Response::ok(&self.session.history()),
            Request::Reset => {
                let cleared = self.session.history().len();
                self.session.reset();
                Response::ok(&serde_json::json!({ "cleared": cleared }))
            }
            Request::Report => match self.session.current_report() {
                Some(report) => Response::ok(&*report),
                None => Response::from(QueryError::NoReportLoaded),
            },
            Request::Schema => Response::ok(&report_schema()),
            Request::Summary => Response::ok(&self.session.summary()),
        }
    }

    fn explain(&mut self, params: ExplainParams) -> Response {
        let ExplainParams {
            probabilities,
            pixels,
            shape,
            image_path,
            metadata,
            preprocessing,
            heatmap,
            saliency_failure,
        } = params;

        let shape = shape.unwrap_or_else(|| vec![pixels.len()]);
        let tensor = match ImageTensor::new(pixels, shape) {
            Ok(tensor) => tensor,
            Err(e) => return Response::from(e),
        };
        debug!(classes = probabilities.len(), "Explaining prediction");

        let pipeline = ExplanationPipeline::new(
            PrecomputedClassifier { probabilities },
            RequestSaliency {
                heatmap,
                failure: saliency_failure,
            },
            self.builder.clone(),
        )
        .with_saliency_enabled(self.saliency_enabled);

        let outcome = pipeline.run(
            tensor,
            PredictionContext {
                image_path,
                metadata,
                preprocessing,
            },
        );

        let exported = match (&self.export_directory, outcome.report()) {
            (Some(directory), Some(report)) => report.export_to_file(directory).map(Some),
            _ => Ok(None),
        };
        // the report stays loaded when the export fails
        let export_path = match exported {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Report export failed");
                self.session.apply_outcome(outcome);
                return Response::from(e);
            }
        };

        let status = outcome.status();
        let snapshot_id = self.session.apply_outcome(outcome.clone());
        info!(status = ?status, snapshot_id = ?snapshot_id, "Explain request handled");

        Response::ok(&ExplainResult {
            status,
            snapshot_id,
            export_path,
            outcome,
        })
    }
}
