//! Prediction-to-report orchestration.
//!
//! [`ExplanationPipeline`] runs the classifier, asks the saliency generator
//! for the predicted class, and builds the report. Saliency failures are
//! recorded in the report and never retried; classifier failures and
//! malformed outputs become a [`crate::report::FailedReport`].

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::report::{
    descending_order, Details, ImageTensor, ReportBuilder, ReportInput, ReportOutcome,
    SaliencyResult,
};
use crate::traits::{Classifier, RealTimeProvider, SaliencyGenerator, TimeProvider};
use crate::uncertainty::validate_probabilities;

/// Reason recorded when saliency is switched off.
pub const SALIENCY_DISABLED: &str = "Saliency generation disabled by configuration";

/// Caller-supplied context for one prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionContext {
    /// Source image path.
    pub image_path: Option<String>,
    /// Image metadata.
    pub metadata: Option<Details>,
    /// Preprocessing trace.
    pub preprocessing: Option<Details>,
}

/// Classifier, saliency generator and report builder wired together.
#[derive(Debug)]
pub struct ExplanationPipeline<C, S, T = RealTimeProvider>
where
    C: Classifier,
    S: SaliencyGenerator,
    T: TimeProvider,
{
    classifier: C,
    saliency: S,
    builder: ReportBuilder<T>,
    saliency_enabled: bool,
}

impl<C: Classifier, S: SaliencyGenerator> ExplanationPipeline<C, S, RealTimeProvider> {
    /// Create a pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the configured labels are invalid.
    pub fn from_config(classifier: C, saliency: S, config: &Config) -> Result<Self, ConfigError> {
        let builder =
            ReportBuilder::new(config.label_set()?).with_model_version(&config.model_version);
        Ok(Self::new(classifier, saliency, builder).with_saliency_enabled(config.saliency_enabled))
    }
}

impl<C: Classifier, S: SaliencyGenerator, T: TimeProvider> ExplanationPipeline<C, S, T> {
    /// Create a pipeline with saliency enabled.
    #[must_use]
    pub fn new(classifier: C, saliency: S, builder: ReportBuilder<T>) -> Self {
        Self {
            classifier,
            saliency,
            builder,
            saliency_enabled: true,
        }
    }

    /// Switch saliency generation on or off.
    #[must_use]
    pub fn with_saliency_enabled(mut self, enabled: bool) -> Self {
        self.saliency_enabled = enabled;
        self
    }

    /// Classify, explain and build. Never returns a partial report.
    pub fn run(&self, tensor: ImageTensor, context: PredictionContext) -> ReportOutcome {
        let probabilities = match self.classifier.classify(&tensor) {
            Ok(probabilities) => probabilities,
            Err(err) => {
                warn!(error = %err, "Classifier failed");
                return ReportOutcome::Failed(self.builder.failed(&err));
            }
        };

        let saliency = self.saliency_for(&tensor, &probabilities);

        let mut input = ReportInput::new(probabilities, tensor).with_saliency(saliency);
        if let Some(path) = context.image_path {
            input = input.with_image_path(path);
        }
        if let Some(metadata) = context.metadata {
            input = input.with_metadata(metadata);
        }
        if let Some(trace) = context.preprocessing {
            input = input.with_preprocessing(trace);
        }

        self.builder.build_outcome(&input)
    }

    fn saliency_for(&self, tensor: &ImageTensor, probabilities: &[f64]) -> SaliencyResult {
        if !self.saliency_enabled {
            return SaliencyResult::unavailable(SALIENCY_DISABLED);
        }
        // a malformed vector fails the build anyway
        if probabilities.len() != self.builder.labels().len()
            || validate_probabilities(probabilities).is_err()
        {
            return SaliencyResult::unavailable("Prediction was malformed");
        }

        let class_index = descending_order(probabilities)[0];
        debug!(class_index, "Requesting saliency");
        let result = SaliencyResult::from(self.saliency.saliency(tensor, class_index));
        if let SaliencyResult::Unavailable { reason } = &result {
            warn!(reason = %reason, "Saliency unavailable, continuing without it");
        }
        result
    }
}
