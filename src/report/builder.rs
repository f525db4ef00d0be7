//! Deterministic report construction.
//!
//! [`ReportBuilder`] turns one classifier output plus its context into an
//! [`ExplanationReport`]. With a frozen clock the same input always yields
//! an identical report.

use std::cmp::Ordering;

use tracing::{info, warn};

use super::field::Field;
use super::labels::LabelSet;
use super::saliency::SaliencyResult;
use super::tensor::ImageTensor;
use super::types::{
    AlternativeCandidate, AlternativeEntry, AlternativeQualifier, ConfidenceTier, DataQuality,
    DecisionExplanation, Details, DomainReference, DomainReferenceEntry, EnsembleInformation,
    ExplanationReport, FailedReport, FeatureContributions, ImageStatistics, InferenceStep,
    InputStep, ModelMetadata, OverallQuality, PipelineSummary, PostprocessingStep,
    PreprocessingStep, ProbabilityEntry, Recommendation, ReportOutcome, ReportStatus,
    UncertaintyAnalysis,
};
use crate::config::reference::{
    reference_for, render_head, render_template, template_for, TemplateKey, ALTERNATIVE_FLOOR,
    BASE_ARCHITECTURE, CONFIDENCE_HIGH, CONFIDENCE_MODERATE, CONFIDENCE_VERY_HIGH, CUSTOM_LAYERS,
    DEFAULT_PREPROCESSING, ISSUE_LOW_CONTRAST, ISSUE_VERY_BRIGHT, ISSUE_VERY_DARK, LOSS_FUNCTION,
    MAX_ALTERNATIVES, MEANINGFUL_ALTERNATIVE, MODEL_ARCHITECTURE, MODEL_TYPE,
    NO_ALTERNATIVES_NOTE, NO_QUALITY_ISSUES, OPTIMIZER, QUALITY_BRIGHT_MEAN, QUALITY_DARK_MEAN,
    QUALITY_LOW_CONTRAST_STD, REASONING_TEMPLATES, RECOMMENDATION_TEMPLATES,
    SALIENCY_DESCRIPTION, TRAINABLE_LAYERS, VISUAL_FEATURES,
};
use crate::config::DEFAULT_MODEL_VERSION;
use crate::error::ReportError;
use crate::traits::{RealTimeProvider, TimeProvider};
use crate::uncertainty::{analyze, round_to};

/// Reason recorded when no saliency was supplied.
pub const SALIENCY_NOT_REQUESTED: &str = "Saliency was not requested for this prediction";

/// Everything known about one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInput {
    probabilities: Vec<f64>,
    tensor: ImageTensor,
    predicted_label: Option<String>,
    saliency: SaliencyResult,
    metadata: Option<Details>,
    preprocessing: Option<Details>,
    image_path: Option<String>,
}

impl ReportInput {
    /// Create an input from a probability vector (label-set order) and the
    /// tensor the classifier saw.
    #[must_use]
    pub fn new(probabilities: Vec<f64>, tensor: ImageTensor) -> Self {
        Self {
            probabilities,
            tensor,
            predicted_label: None,
            saliency: SaliencyResult::unavailable(SALIENCY_NOT_REQUESTED),
            metadata: None,
            preprocessing: None,
            image_path: None,
        }
    }

    /// Assert the predicted label; the build fails if it is not the argmax.
    #[must_use]
    pub fn with_predicted_label(mut self, label: impl Into<String>) -> Self {
        self.predicted_label = Some(label.into());
        self
    }

    /// Attach the saliency outcome.
    #[must_use]
    pub fn with_saliency(mut self, saliency: SaliencyResult) -> Self {
        self.saliency = saliency;
        self
    }

    /// Attach image metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Details) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach the preprocessing trace.
    #[must_use]
    pub fn with_preprocessing(mut self, trace: Details) -> Self {
        self.preprocessing = Some(trace);
        self
    }

    /// Attach the source image path.
    #[must_use]
    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// The probability vector.
    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

/// Builds explanation reports for a fixed label set.
#[derive(Debug, Clone)]
pub struct ReportBuilder<T: TimeProvider = RealTimeProvider> {
    labels: LabelSet,
    model_version: String,
    clock: T,
}

impl ReportBuilder<RealTimeProvider> {
    /// Create a builder stamping reports with the system clock.
    #[must_use]
    pub fn new(labels: LabelSet) -> Self {
        Self {
            labels,
            model_version: DEFAULT_MODEL_VERSION.into(),
            clock: RealTimeProvider,
        }
    }
}

impl<T: TimeProvider> ReportBuilder<T> {
    /// Replace the clock.
    #[must_use]
    pub fn with_clock<U: TimeProvider>(self, clock: U) -> ReportBuilder<U> {
        ReportBuilder {
            labels: self.labels,
            model_version: self.model_version,
            clock,
        }
    }

    /// Set the model version recorded in `model_metadata`.
    #[must_use]
    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    /// The label set reports are built over.
    #[must_use]
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// The clock stamping reports.
    #[must_use]
    pub const fn clock(&self) -> &T {
        &self.clock
    }

    /// Build a report or a failure record.
    pub fn build_outcome(&self, input: &ReportInput) -> ReportOutcome {
        match self.build(input) {
            Ok(report) => ReportOutcome::Completed(Box::new(report)),
            Err(err) => {
                warn!(error = %err, "Report construction failed");
                ReportOutcome::Failed(self.failed(&err))
            }
        }
    }

    /// Failure record for `err`, stamped with the builder's clock.
    pub fn failed(&self, err: &impl std::fmt::Display) -> FailedReport {
        FailedReport {
            error: format!("Failed to generate explanation: {err}"),
            timestamp: self.clock.now(),
            status: ReportStatus::Failed,
        }
    }

    /// Build a report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MalformedPrediction`] if the probability vector
    /// has the wrong length, fails validation, or the asserted predicted label
    /// is unknown or not the argmax.
    pub fn build(&self, input: &ReportInput) -> Result<ExplanationReport, ReportError> {
        let probs = &input.probabilities;
        if probs.len() != self.labels.len() {
            return Err(ReportError::MalformedPrediction {
                reason: format!(
                    "expected {} probabilities, got {}",
                    self.labels.len(),
                    probs.len()
                ),
            });
        }

        let metrics = analyze(probs)?;
        let order = descending_order(probs);
        let predicted = order[0];
        self.check_predicted_label(input.predicted_label.as_deref(), predicted)?;

        let label = self.labels.labels()[predicted].clone();
        let confidence = probs[predicted];
        let tier = confidence_tier(confidence);
        let key = template_key(self.labels.is_negative(&label), tier);

        let report = ExplanationReport {
            status: ReportStatus::Completed,
            timestamp: self.clock.now(),
            image_path: input.image_path.clone().into(),
            pipeline_summary: pipeline_summary(input, self.labels.len()),
            decision_explanation: DecisionExplanation {
                predicted_label: Field::Present(label.clone()),
                confidence: Field::Present(percent(confidence)),
                confidence_tier: Field::Present(tier),
                reasoning: Field::Present(render_template(
                    template_for(&REASONING_TEMPLATES, key),
                    &label,
                )),
                is_finding_positive: Field::Present(!self.labels.is_negative(&label)),
            },
            feature_contributions: feature_contributions(&input.saliency),
            probability_table: Field::Present(self.probability_table(probs, &order)),
            alternative_candidates: Field::Present(self.alternatives(probs, &order)),
            uncertainty_analysis: UncertaintyAnalysis {
                entropy: Field::Present(metrics.entropy),
                margin: Field::Present(metrics.margin),
                uncertainty_level: Field::Present(metrics.level),
                level_summary: Field::Present(metrics.level.summary().into()),
                interpretation: Field::Present(metrics.interpretation.into()),
            },
            ensemble_information: EnsembleInformation {
                ensemble_used: false,
                model_type: MODEL_TYPE.into(),
                ensemble_weights: Field::NotAvailable,
                ensemble_disagreement: Field::NotAvailable,
                note: "Single model deployment - ensemble features not applicable".into(),
            },
            data_quality: data_quality(&input.tensor, input.metadata.is_some()),
            domain_reference: self.domain_reference(),
            recommendation: Recommendation {
                recommended_action: Field::Present(render_template(
                    template_for(&RECOMMENDATION_TEMPLATES, key),
                    &label,
                )),
            },
            model_metadata: ModelMetadata {
                model_version: self.model_version.clone(),
                training_date: Field::NotAvailable,
                base_architecture: BASE_ARCHITECTURE.into(),
                custom_layers: render_head(CUSTOM_LAYERS, self.labels.len()),
                optimizer: OPTIMIZER.into(),
                loss_function: LOSS_FUNCTION.into(),
            },
        };

        info!(
            predicted_label = %label,
            confidence = percent(confidence),
            uncertainty = %metrics.level,
            saliency_available = input.saliency.is_available(),
            "Explanation report built"
        );

        Ok(report)
    }

    fn check_predicted_label(
        &self,
        asserted: Option<&str>,
        argmax: usize,
    ) -> Result<(), ReportError> {
        let Some(label) = asserted else {
            return Ok(());
        };
        match self.labels.index_of(label) {
            None => Err(ReportError::MalformedPrediction {
                reason: format!("unknown predicted label '{label}'"),
            }),
            Some(idx) if idx != argmax => Err(ReportError::MalformedPrediction {
                reason: format!(
                    "predicted label '{label}' is not the most probable class '{}'",
                    self.labels.labels()[argmax]
                ),
            }),
            Some(_) => Ok(()),
        }
    }

    fn probability_table(&self, probs: &[f64], order: &[usize]) -> Vec<ProbabilityEntry> {
        let mut ranks = vec![0; probs.len()];
        for (position, idx) in order.iter().enumerate() {
            ranks[*idx] = position + 1;
        }
        self.labels
            .labels()
            .iter()
            .zip(probs)
            .zip(ranks)
            .map(|((label, p), rank)| ProbabilityEntry {
                label: label.clone(),
                probability: percent(*p),
                rank,
            })
            .collect()
    }

    fn alternatives(&self, probs: &[f64], order: &[usize]) -> Vec<AlternativeEntry> {
        let candidates: Vec<AlternativeEntry> = order
            .iter()
            .enumerate()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .filter(|(_, idx)| probs[**idx] > ALTERNATIVE_FLOOR)
            .map(|(position, idx)| {
                let p = probs[*idx];
                AlternativeEntry::Candidate(AlternativeCandidate {
                    label: self.labels.labels()[*idx].clone(),
                    probability: percent(p),
                    rank: position + 1,
                    qualifier: if p > MEANINGFUL_ALTERNATIVE {
                        AlternativeQualifier::Meaningful
                    } else {
                        AlternativeQualifier::LowProbability
                    },
                })
            })
            .collect();

        if candidates.is_empty() {
            vec![AlternativeEntry::Note {
                note: NO_ALTERNATIVES_NOTE.into(),
            }]
        } else {
            candidates
        }
    }

    fn domain_reference(&self) -> DomainReference {
        let entries = self
            .labels
            .labels()
            .iter()
            .map(|label| {
                let info = reference_for(label);
                DomainReferenceEntry {
                    label: label.clone(),
                    description: info.map(|i| i.description.to_string()).into(),
                    severity: info.map(|i| i.severity.to_string()).into(),
                    common_treatment: info.map(|i| i.common_treatment.to_string()).into(),
                    prognosis: info.map(|i| i.prognosis.to_string()).into(),
                }
            })
            .collect();
        DomainReference {
            entries: Field::Present(entries),
        }
    }
}

/// Indices sorted by descending probability; ties keep label order.
#[must_use]
pub fn descending_order(probabilities: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|a, b| {
        probabilities[*b]
            .partial_cmp(&probabilities[*a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Tier for a top probability in `[0, 1]`.
#[must_use]
pub fn confidence_tier(confidence: f64) -> ConfidenceTier {
    if confidence >= CONFIDENCE_VERY_HIGH {
        ConfidenceTier::VeryHigh
    } else if confidence >= CONFIDENCE_HIGH {
        ConfidenceTier::High
    } else if confidence >= CONFIDENCE_MODERATE {
        ConfidenceTier::Moderate
    } else {
        ConfidenceTier::Low
    }
}

const fn template_key(negative: bool, tier: ConfidenceTier) -> TemplateKey {
    match (negative, tier) {
        (true, ConfidenceTier::VeryHigh) => TemplateKey::NegativeVeryHigh,
        (true, _) => TemplateKey::NegativeOther,
        (false, ConfidenceTier::VeryHigh) => TemplateKey::PositiveVeryHigh,
        (false, ConfidenceTier::High) => TemplateKey::PositiveHigh,
        (false, _) => TemplateKey::PositiveLow,
    }
}

fn percent(probability: f64) -> f64 {
    round_to(probability * 100.0, 2)
}

fn pipeline_summary(input: &ReportInput, classes: usize) -> PipelineSummary {
    let preprocessing = input.preprocessing.clone().unwrap_or_else(|| {
        DEFAULT_PREPROCESSING
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    });
    PipelineSummary {
        step_1_input: InputStep {
            description: "MRI image loaded and validated".into(),
            status: ReportStatus::Completed,
            details: input.metadata.clone().into(),
        },
        step_2_preprocessing: PreprocessingStep {
            description: "Image resized to 128x128, normalized to [0,1]".into(),
            status: ReportStatus::Completed,
            details: preprocessing,
        },
        step_3_model_inference: InferenceStep {
            description: "VGG16-based transfer learning model inference".into(),
            status: ReportStatus::Completed,
            model_architecture: render_head(MODEL_ARCHITECTURE, classes),
            trainable_layers: TRAINABLE_LAYERS.into(),
        },
        step_4_postprocessing: PostprocessingStep {
            description: "Softmax probabilities computed for all classes".into(),
            status: ReportStatus::Completed,
        },
    }
}

fn feature_contributions(saliency: &SaliencyResult) -> FeatureContributions {
    let visual_features: Details = VISUAL_FEATURES
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();

    match saliency {
        SaliencyResult::Available(summary) => FeatureContributions {
            saliency_available: true,
            saliency_description: Field::Present(SALIENCY_DESCRIPTION.into()),
            top_contributing_regions: Field::Present(summary.regions_description.clone()),
            activation_summary: Field::Present(summary.activation.clone()),
            unavailable_reason: Field::NotAvailable,
            visual_features: Field::Present(visual_features),
        },
        SaliencyResult::Unavailable { reason } => FeatureContributions {
            saliency_available: false,
            saliency_description: Field::NotAvailable,
            top_contributing_regions: Field::NotAvailable,
            activation_summary: Field::NotAvailable,
            unavailable_reason: Field::Present(reason.clone()),
            visual_features: Field::Present(visual_features),
        },
    }
}

fn data_quality(tensor: &ImageTensor, metadata_available: bool) -> DataQuality {
    let stats = tensor.statistics();
    let mut issues = Vec::new();
    if stats.mean < QUALITY_DARK_MEAN {
        issues.push(ISSUE_VERY_DARK.to_string());
    } else if stats.mean > QUALITY_BRIGHT_MEAN {
        issues.push(ISSUE_VERY_BRIGHT.to_string());
    }
    if stats.std < QUALITY_LOW_CONTRAST_STD {
        issues.push(ISSUE_LOW_CONTRAST.to_string());
    }

    let overall = if issues.is_empty() {
        issues.push(NO_QUALITY_ISSUES.to_string());
        OverallQuality::Acceptable
    } else {
        OverallQuality::PotentialIssues
    };

    DataQuality {
        image_statistics: Field::Present(ImageStatistics {
            mean_intensity: round_to(stats.mean, 4),
            std_intensity: round_to(stats.std, 4),
            min_value: round_to(stats.min, 4),
            max_value: round_to(stats.max, 4),
        }),
        quality_issues: Field::Present(issues),
        overall_quality: Field::Present(overall),
        metadata_available,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::report::saliency::{ActivationSummary, SaliencySummary};
    use crate::traits::FixedTimeProvider;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    // pituitary, glioma, notumor, meningioma
    const GLIOMA_CASE: [f64; 4] = [0.041, 0.85, 0.022, 0.082];

    fn builder() -> ReportBuilder<FixedTimeProvider> {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        ReportBuilder::new(LabelSet::default()).with_clock(FixedTimeProvider::new(instant))
    }

    fn tensor() -> ImageTensor {
        ImageTensor::new(vec![0.2, 0.4, 0.6, 0.8], vec![2, 2]).unwrap()
    }

    fn input(probs: &[f64]) -> ReportInput {
        ReportInput::new(probs.to_vec(), tensor())
    }

    fn saliency() -> SaliencyResult {
        SaliencyResult::Available(SaliencySummary {
            regions_description: "Highest activation concentrated in the upper left region".into(),
            activation: ActivationSummary {
                heatmap_rows: 8,
                heatmap_cols: 8,
                max_activation: 1.0,
                mean_activation: 0.21,
            },
        })
    }

    #[test]
    fn test_glioma_decision() {
        let report = builder().build(&input(&GLIOMA_CASE)).unwrap();
        let decision = &report.decision_explanation;

        assert_eq!(decision.predicted_label, Field::Present("glioma".into()));
        assert_eq!(decision.confidence, Field::Present(85.0));
        assert_eq!(decision.confidence_tier, Field::Present(ConfidenceTier::High));
        assert_eq!(decision.is_finding_positive, Field::Present(true));
        assert_eq!(
            decision.reasoning,
            Field::Present(
                "Model identified glioma features with high confidence based on spatial and textural patterns"
                    .into()
            )
        );
        assert_eq!(report.status, ReportStatus::Completed);
    }

    #[test]
    fn test_glioma_alternatives_single_low_probability_entry() {
        let report = builder().build(&input(&GLIOMA_CASE)).unwrap();
        let alternatives = report.alternative_candidates.require("x").unwrap();

        assert_eq!(
            alternatives,
            &vec![AlternativeEntry::Candidate(AlternativeCandidate {
                label: "meningioma".into(),
                probability: 8.2,
                rank: 2,
                qualifier: AlternativeQualifier::LowProbability,
            })]
        );
    }

    #[test]
    fn test_probability_table_in_label_order_with_ranks() {
        let report = builder().build(&input(&GLIOMA_CASE)).unwrap();
        let table = report.probability_table.require("x").unwrap();

        let rows: Vec<(&str, f64, usize)> = table
            .iter()
            .map(|e| (e.label.as_str(), e.probability, e.rank))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("pituitary", 4.1, 3),
                ("glioma", 85.0, 1),
                ("notumor", 2.2, 4),
                ("meningioma", 8.2, 2),
            ]
        );
    }

    #[test]
    fn test_ties_rank_in_label_order() {
        let report = builder().build(&input(&[0.25, 0.25, 0.25, 0.25])).unwrap();
        let ranks: Vec<usize> = report
            .probability_table
            .require("x")
            .unwrap()
            .iter()
            .map(|e| e.rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(
            report.decision_explanation.predicted_label,
            Field::Present("pituitary".into())
        );
    }

    #[test]
    fn test_meaningful_alternatives() {
        let report = builder().build(&input(&[0.1, 0.45, 0.05, 0.4])).unwrap();
        let alternatives = report.alternative_candidates.require("x").unwrap();
        assert_eq!(alternatives.len(), 2);
        match &alternatives[0] {
            AlternativeEntry::Candidate(c) => {
                assert_eq!(c.label, "meningioma");
                assert_eq!(c.qualifier, AlternativeQualifier::Meaningful);
            }
            AlternativeEntry::Note { .. } => panic!("expected candidate"),
        }
    }

    #[test]
    fn test_no_alternatives_note() {
        let report = builder().build(&input(&[0.01, 0.97, 0.01, 0.01])).unwrap();
        assert_eq!(
            report.alternative_candidates,
            Field::Present(vec![AlternativeEntry::Note {
                note: NO_ALTERNATIVES_NOTE.into()
            }])
        );
    }

    #[test_case(0.95, ConfidenceTier::VeryHigh)]
    #[test_case(0.90, ConfidenceTier::VeryHigh)]
    #[test_case(0.70, ConfidenceTier::High)]
    #[test_case(0.69, ConfidenceTier::Moderate)]
    #[test_case(0.50, ConfidenceTier::Moderate)]
    #[test_case(0.49, ConfidenceTier::Low)]
    fn test_confidence_tier(confidence: f64, expected: ConfidenceTier) {
        assert_eq!(confidence_tier(confidence), expected);
    }

    #[test]
    fn test_negative_prediction_templates() {
        let report = builder().build(&input(&[0.02, 0.02, 0.94, 0.02])).unwrap();
        assert_eq!(
            report.decision_explanation.is_finding_positive,
            Field::Present(false)
        );
        assert_eq!(
            report.recommendation.recommended_action,
            Field::Present(
                "No tumor detected with high confidence. Routine follow-up recommended.".into()
            )
        );
    }

    #[test]
    fn test_low_confidence_positive_recommendation() {
        let report = builder().build(&input(&[0.4, 0.3, 0.2, 0.1])).unwrap();
        assert_eq!(
            report.recommendation.recommended_action,
            Field::Present(
                "Possible pituitary tumor but with lower confidence. Recommend expert radiologist review and additional diagnostic procedures."
                    .into()
            )
        );
    }

    #[test]
    fn test_saliency_unavailable_marks_dependent_fields() {
        let report = builder()
            .build(&input(&GLIOMA_CASE).with_saliency(SaliencyResult::unavailable("no layer")))
            .unwrap();
        let features = &report.feature_contributions;

        assert!(!features.saliency_available);
        assert_eq!(features.saliency_description, Field::NotAvailable);
        assert_eq!(features.top_contributing_regions, Field::NotAvailable);
        assert_eq!(features.activation_summary, Field::NotAvailable);
        assert_eq!(features.unavailable_reason, Field::Present("no layer".into()));
    }

    #[test]
    fn test_saliency_available_populates_fields() {
        let report = builder()
            .build(&input(&GLIOMA_CASE).with_saliency(saliency()))
            .unwrap();
        let features = &report.feature_contributions;

        assert!(features.saliency_available);
        assert!(features.top_contributing_regions.is_present());
        assert_eq!(features.unavailable_reason, Field::NotAvailable);
    }

    #[test]
    fn test_data_quality_flags() {
        let dark = ReportInput::new(GLIOMA_CASE.to_vec(), ImageTensor::from_flat(vec![0.02; 9]).unwrap());
        let report = builder().build(&dark).unwrap();
        let issues = report.data_quality.quality_issues.require("x").unwrap();
        assert_eq!(issues, &vec![ISSUE_VERY_DARK.to_string(), ISSUE_LOW_CONTRAST.to_string()]);
        assert_eq!(
            report.data_quality.overall_quality,
            Field::Present(OverallQuality::PotentialIssues)
        );

        let report = builder().build(&input(&GLIOMA_CASE)).unwrap();
        assert_eq!(
            report.data_quality.quality_issues,
            Field::Present(vec![NO_QUALITY_ISSUES.to_string()])
        );
        assert_eq!(
            report.data_quality.overall_quality,
            Field::Present(OverallQuality::Acceptable)
        );
    }

    #[test]
    fn test_pipeline_defaults_and_metadata() {
        let report = builder().build(&input(&GLIOMA_CASE)).unwrap();
        assert_eq!(report.pipeline_summary.step_1_input.details, Field::NotAvailable);
        assert_eq!(
            report.pipeline_summary.step_2_preprocessing.details.get("resize"),
            Some(&"128x128".to_string())
        );
        assert!(!report.data_quality.metadata_available);

        let mut metadata = Details::new();
        metadata.insert("modality".into(), "T1".into());
        let report = builder()
            .build(&input(&GLIOMA_CASE).with_metadata(metadata.clone()))
            .unwrap();
        assert_eq!(report.pipeline_summary.step_1_input.details, Field::Present(metadata));
        assert!(report.data_quality.metadata_available);
    }

    #[test]
    fn test_domain_reference_unknown_label_is_not_available() {
        let labels = LabelSet::new(vec!["glioma".into(), "astrocytoma".into(), "notumor".into()], "notumor").unwrap();
        let report = ReportBuilder::new(labels)
            .build(&input(&[0.2, 0.7, 0.1]))
            .unwrap();
        let entries = report.domain_reference.entries.require("x").unwrap();
        assert!(entries[0].description.is_present());
        assert_eq!(entries[1].description, Field::NotAvailable);
    }

    #[test]
    fn test_head_width_follows_label_count() {
        let report = builder().build(&input(&GLIOMA_CASE)).unwrap();
        assert_eq!(
            report.pipeline_summary.step_3_model_inference.model_architecture,
            "VGG16 + Dense(128) + Dense(4)"
        );

        let labels = LabelSet::new(vec!["glioma".into(), "healthy".into()], "healthy").unwrap();
        let report = ReportBuilder::new(labels)
            .build(&input(&[0.8, 0.2]))
            .unwrap();
        assert_eq!(
            report.pipeline_summary.step_3_model_inference.model_architecture,
            "VGG16 + Dense(128) + Dense(2)"
        );
        assert!(report.model_metadata.custom_layers.ends_with("Dense(2)"));
        let entries = report.domain_reference.entries.require("x").unwrap();
        assert_eq!(entries[1].label, "healthy");
        assert_eq!(entries[1].prognosis, Field::NotAvailable);
    }

    #[test]
    fn test_wrong_length_is_malformed() {
        let err = builder().build(&input(&[0.5, 0.5])).unwrap_err();
        assert_eq!(
            err,
            ReportError::MalformedPrediction {
                reason: "expected 4 probabilities, got 2".into()
            }
        );
    }

    #[test]
    fn test_non_finite_is_malformed() {
        let err = builder()
            .build(&input(&[f64::NAN, 0.5, 0.25, 0.25]))
            .unwrap_err();
        assert!(matches!(err, ReportError::MalformedPrediction { .. }));
    }

    #[test]
    fn test_predicted_label_must_be_argmax() {
        let err = builder()
            .build(&input(&GLIOMA_CASE).with_predicted_label("meningioma"))
            .unwrap_err();
        assert!(err.to_string().contains("not the most probable"));

        let err = builder()
            .build(&input(&GLIOMA_CASE).with_predicted_label("astrocytoma"))
            .unwrap_err();
        assert!(err.to_string().contains("unknown predicted label"));

        assert!(builder()
            .build(&input(&GLIOMA_CASE).with_predicted_label("glioma"))
            .is_ok());
    }

    #[test]
    fn test_build_outcome_failed_carries_only_error() {
        let outcome = builder().build_outcome(&input(&[0.9, 0.9, 0.1, 0.1]));
        let ReportOutcome::Failed(failed) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failed.status, ReportStatus::Failed);
        assert!(failed.error.contains("sum"));
        assert_eq!(
            failed.timestamp,
            Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_build_is_idempotent_with_frozen_clock() {
        let builder = builder();
        let input = input(&GLIOMA_CASE).with_saliency(saliency()).with_image_path("scan.png");
        assert_eq!(builder.build(&input).unwrap(), builder.build(&input).unwrap());
    }

    fn probability_vector() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0_u8..20, 4).prop_filter_map("non-zero mass", |raw| {
            let total: u32 = raw.iter().map(|v| u32::from(*v)).sum();
            (total > 0).then(|| {
                raw.iter()
                    .map(|v| f64::from(*v) / f64::from(total))
                    .collect()
            })
        })
    }

    proptest! {
        #[test]
        fn prop_ranks_are_a_bijection_with_stable_ties(probs in probability_vector()) {
            let report = builder().build(&input(&probs)).unwrap();
            let table = report.probability_table.require("x").unwrap();

            let mut ranks: Vec<usize> = table.iter().map(|e| e.rank).collect();
            ranks.sort_unstable();
            prop_assert_eq!(ranks, vec![1, 2, 3, 4]);

            for a in 0..4 {
                for b in (a + 1)..4 {
                    if probs[a] == probs[b] {
                        prop_assert!(table[a].rank < table[b].rank);
                    }
                }
            }
        }

        #[test]
        fn prop_alternatives_exclude_prediction(probs in probability_vector()) {
            let report = builder().build(&input(&probs)).unwrap();
            let predicted = report.decision_explanation.predicted_label.require("x").unwrap().clone();
            for entry in report.alternative_candidates.require("x").unwrap() {
                if let AlternativeEntry::Candidate(c) = entry {
                    prop_assert_ne!(&c.label, &predicted);
                    prop_assert!(c.probability > 5.0);
                    prop_assert!(c.rank == 2 || c.rank == 3);
                }
            }
        }
    }
}
