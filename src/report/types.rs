//! Report section types.
//!
//! The JSON key names of every section are a stable contract consumed by
//! the answer engine and by external clients.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::field::Field;
use super::saliency::ActivationSummary;
use crate::uncertainty::UncertaintyLevel;

/// Free-form key/value details such as image metadata or a preprocessing trace.
pub type Details = BTreeMap<String, String>;

// ============================================================================
// Enums
// ============================================================================

/// Completion status of a report or a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Finished successfully.
    Completed,
    /// Could not be produced.
    Failed,
}

/// Confidence tier of the top prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ConfidenceTier {
    /// At least 0.90.
    #[serde(rename = "very high")]
    VeryHigh,
    /// At least 0.70.
    #[serde(rename = "high")]
    High,
    /// At least 0.50.
    #[serde(rename = "moderate")]
    Moderate,
    /// Below 0.50.
    #[serde(rename = "low")]
    Low,
}

impl ConfidenceTier {
    /// Returns the tier name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VeryHigh => "very high",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How seriously an alternative should be considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AlternativeQualifier {
    /// Probability above 0.20.
    #[serde(rename = "meaningful alternative")]
    Meaningful,
    /// Probability above the floor but at most 0.20.
    #[serde(rename = "low-probability alternative")]
    LowProbability,
}

impl AlternativeQualifier {
    /// Returns the qualifier text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Meaningful => "meaningful alternative",
            Self::LowProbability => "low-probability alternative",
        }
    }
}

/// Overall image quality verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum OverallQuality {
    /// No issue was flagged.
    #[serde(rename = "acceptable")]
    Acceptable,
    /// At least one issue was flagged.
    #[serde(rename = "potential issues detected")]
    PotentialIssues,
}

impl OverallQuality {
    /// Returns the verdict text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Acceptable => "acceptable",
            Self::PotentialIssues => "potential issues detected",
        }
    }
}

/// Top-level report sections, named by their JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    /// `pipeline_summary`
    PipelineSummary,
    /// `decision_explanation`
    DecisionExplanation,
    /// `feature_contributions`
    FeatureContributions,
    /// `probability_table`
    ProbabilityTable,
    /// `alternative_candidates`
    AlternativeCandidates,
    /// `uncertainty_analysis`
    UncertaintyAnalysis,
    /// `ensemble_information`
    EnsembleInformation,
    /// `data_quality`
    DataQuality,
    /// `domain_reference`
    DomainReference,
    /// `recommendation`
    Recommendation,
    /// `model_metadata`
    ModelMetadata,
}

impl ReportSection {
    /// Returns the JSON key of the section.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PipelineSummary => "pipeline_summary",
            Self::DecisionExplanation => "decision_explanation",
            Self::FeatureContributions => "feature_contributions",
            Self::ProbabilityTable => "probability_table",
            Self::AlternativeCandidates => "alternative_candidates",
            Self::UncertaintyAnalysis => "uncertainty_analysis",
            Self::EnsembleInformation => "ensemble_information",
            Self::DataQuality => "data_quality",
            Self::DomainReference => "domain_reference",
            Self::Recommendation => "recommendation",
            Self::ModelMetadata => "model_metadata",
        }
    }

    /// Returns all sections in report order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PipelineSummary,
            Self::DecisionExplanation,
            Self::FeatureContributions,
            Self::ProbabilityTable,
            Self::AlternativeCandidates,
            Self::UncertaintyAnalysis,
            Self::EnsembleInformation,
            Self::DataQuality,
            Self::DomainReference,
            Self::Recommendation,
            Self::ModelMetadata,
        ]
    }
}

impl std::fmt::Display for ReportSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Pipeline summary
// ============================================================================

/// Step 1: input loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputStep {
    /// What the step did.
    pub description: String,
    /// Step status.
    pub status: ReportStatus,
    /// Image metadata supplied by the caller.
    pub details: Field<Details>,
}

/// Step 2: preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PreprocessingStep {
    /// What the step did.
    pub description: String,
    /// Step status.
    pub status: ReportStatus,
    /// Preprocessing trace, or the assumed defaults.
    pub details: Details,
}

/// Step 3: model inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InferenceStep {
    /// What the step did.
    pub description: String,
    /// Step status.
    pub status: ReportStatus,
    /// Model architecture.
    pub model_architecture: String,
    /// Fine-tuned layers.
    pub trainable_layers: String,
}

/// Step 4: postprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PostprocessingStep {
    /// What the step did.
    pub description: String,
    /// Step status.
    pub status: ReportStatus,
}

/// Four-step trace of how the prediction was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineSummary {
    /// Input loading.
    pub step_1_input: InputStep,
    /// Preprocessing.
    pub step_2_preprocessing: PreprocessingStep,
    /// Inference.
    pub step_3_model_inference: InferenceStep,
    /// Postprocessing.
    pub step_4_postprocessing: PostprocessingStep,
}

// ============================================================================
// Decision and features
// ============================================================================

/// The decision and why it was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DecisionExplanation {
    /// Argmax label.
    pub predicted_label: Field<String>,
    /// Top probability as a percentage, 2 decimals.
    pub confidence: Field<f64>,
    /// Confidence tier.
    pub confidence_tier: Field<ConfidenceTier>,
    /// Templated reasoning text.
    pub reasoning: Field<String>,
    /// True unless the predicted label is the negative label.
    pub is_finding_positive: Field<bool>,
}

/// Saliency-derived feature contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeatureContributions {
    /// Whether saliency was produced.
    pub saliency_available: bool,
    /// What the heatmap shows.
    pub saliency_description: Field<String>,
    /// Most influential regions.
    pub top_contributing_regions: Field<String>,
    /// Heatmap statistics.
    pub activation_summary: Field<ActivationSummary>,
    /// Why saliency is missing.
    pub unavailable_reason: Field<String>,
    /// What the backbone responds to.
    pub visual_features: Field<Details>,
}

// ============================================================================
// Probabilities and alternatives
// ============================================================================

/// One row of the probability table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProbabilityEntry {
    /// Class label.
    pub label: String,
    /// Probability as a percentage, 2 decimals.
    pub probability: f64,
    /// 1-based rank, 1 = most probable.
    pub rank: usize,
}

/// A next-ranked label worth considering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AlternativeCandidate {
    /// Class label.
    pub label: String,
    /// Probability as a percentage, 2 decimals.
    pub probability: f64,
    /// Rank in the probability table.
    pub rank: usize,
    /// How seriously to consider it.
    pub qualifier: AlternativeQualifier,
}

/// Entry of the alternatives list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AlternativeEntry {
    /// A candidate label.
    Candidate(AlternativeCandidate),
    /// Sole entry when no candidate survives.
    Note {
        /// Explanation.
        note: String,
    },
}

// ============================================================================
// Uncertainty, ensemble, quality
// ============================================================================

/// Uncertainty metrics as stored in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UncertaintyAnalysis {
    /// Entropy in nats, 4 decimals.
    pub entropy: Field<f64>,
    /// Top-2 margin, 4 decimals.
    pub margin: Field<f64>,
    /// Qualitative level.
    pub uncertainty_level: Field<UncertaintyLevel>,
    /// Human-readable level summary.
    pub level_summary: Field<String>,
    /// Interpretation text.
    pub interpretation: Field<String>,
}

/// Deployment facts. A single model is deployed, so ensemble facts are unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnsembleInformation {
    /// Always false.
    pub ensemble_used: bool,
    /// Deployment type.
    pub model_type: String,
    /// Per-member weights.
    pub ensemble_weights: Field<Vec<f64>>,
    /// Member disagreement.
    pub ensemble_disagreement: Field<f64>,
    /// Explanatory note.
    pub note: String,
}

/// Intensity statistics of the input tensor, 4 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageStatistics {
    /// Mean intensity.
    pub mean_intensity: f64,
    /// Standard deviation.
    pub std_intensity: f64,
    /// Smallest value.
    pub min_value: f64,
    /// Largest value.
    pub max_value: f64,
}

/// Input quality assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataQuality {
    /// Intensity statistics.
    pub image_statistics: Field<ImageStatistics>,
    /// Flagged issues, or the single "no issues" entry.
    pub quality_issues: Field<Vec<String>>,
    /// Overall verdict.
    pub overall_quality: Field<OverallQuality>,
    /// Whether the caller supplied image metadata.
    pub metadata_available: bool,
}

// ============================================================================
// Reference, recommendation, model
// ============================================================================

/// Reference facts for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DomainReferenceEntry {
    /// Class label.
    pub label: String,
    /// Short description.
    pub description: Field<String>,
    /// Typical severity.
    pub severity: Field<String>,
    /// Typical treatment.
    pub common_treatment: Field<String>,
    /// Typical prognosis.
    pub prognosis: Field<String>,
}

/// Reference facts for every label in the label set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DomainReference {
    /// One entry per label, in label-set order.
    pub entries: Field<Vec<DomainReferenceEntry>>,
}

/// Suggested next step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    /// Templated action text.
    pub recommended_action: Field<String>,
}

/// Facts about the deployed model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelMetadata {
    /// Deployed version.
    pub model_version: String,
    /// Training date.
    pub training_date: Field<String>,
    /// Backbone.
    pub base_architecture: String,
    /// Classifier head.
    pub custom_layers: String,
    /// Training optimizer.
    pub optimizer: String,
    /// Training loss.
    pub loss_function: String,
}

// ============================================================================
// Report and outcome
// ============================================================================

/// Structured, self-describing explanation of one prediction.
///
/// Built once by [`super::ReportBuilder`] and never mutated afterwards;
/// a later prediction produces a new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExplanationReport {
    /// Always [`ReportStatus::Completed`].
    pub status: ReportStatus,
    /// Capture time.
    pub timestamp: DateTime<Utc>,
    /// Source image path.
    pub image_path: Field<String>,
    /// Pipeline trace.
    pub pipeline_summary: PipelineSummary,
    /// Decision section.
    pub decision_explanation: DecisionExplanation,
    /// Saliency section.
    pub feature_contributions: FeatureContributions,
    /// Every label in label-set order.
    pub probability_table: Field<Vec<ProbabilityEntry>>,
    /// Alternatives or a single note.
    pub alternative_candidates: Field<Vec<AlternativeEntry>>,
    /// Uncertainty section.
    pub uncertainty_analysis: UncertaintyAnalysis,
    /// Ensemble section.
    pub ensemble_information: EnsembleInformation,
    /// Quality section.
    pub data_quality: DataQuality,
    /// Reference section.
    pub domain_reference: DomainReference,
    /// Recommendation section.
    pub recommendation: Recommendation,
    /// Model section.
    pub model_metadata: ModelMetadata,
}

/// Replaces a report when construction fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailedReport {
    /// What went wrong.
    pub error: String,
    /// When it failed.
    pub timestamp: DateTime<Utc>,
    /// Always [`ReportStatus::Failed`].
    pub status: ReportStatus,
}

/// Result of a build: a complete report or a failure record, never partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ReportOutcome {
    /// Complete report.
    Completed(Box<ExplanationReport>),
    /// Failure record.
    Failed(FailedReport),
}

impl ReportOutcome {
    /// Returns the report if the build completed.
    #[must_use]
    pub fn report(&self) -> Option<&ExplanationReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Failed(_) => None,
        }
    }

    /// Returns the status of the outcome.
    #[must_use]
    pub const fn status(&self) -> ReportStatus {
        match self {
            Self::Completed(_) => ReportStatus::Completed,
            Self::Failed(_) => ReportStatus::Failed,
        }
    }
}
