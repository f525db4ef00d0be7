//! Explanation reports.
//!
//! This module provides:
//! - [`Field`]: report leaves with an explicit "not available" sentinel
//! - [`LabelSet`] and [`ImageTensor`]: classifier inputs and outputs
//! - [`SaliencySummary`] and [`summarize_heatmap`]: saliency handling
//! - [`ReportBuilder`]: deterministic report construction
//! - [`ExplanationReport`] and its sections, plus JSON export
//!
//! # Example
//!
//! ```
//! use neuroscan_explain::report::{Field, ImageTensor, LabelSet, ReportBuilder, ReportInput};
//!
//! let tensor = ImageTensor::from_flat(vec![0.3, 0.5, 0.7]).unwrap();
//! let input = ReportInput::new(vec![0.041, 0.85, 0.022, 0.082], tensor);
//! let report = ReportBuilder::new(LabelSet::default()).build(&input).unwrap();
//!
//! assert_eq!(
//!     report.decision_explanation.predicted_label,
//!     Field::Present("glioma".to_string())
//! );
//! ```

mod builder;
mod export;
mod field;
mod labels;
mod saliency;
mod tensor;
mod types;

pub use builder::{
    confidence_tier, descending_order, ReportBuilder, ReportInput, SALIENCY_NOT_REQUESTED,
};
pub use export::report_schema;
pub use field::{Field, Missing};
pub use labels::LabelSet;
pub use saliency::{summarize_heatmap, ActivationSummary, SaliencyResult, SaliencySummary};
pub use tensor::{ImageTensor, PixelStatistics};
pub use types::{
    AlternativeCandidate, AlternativeEntry, AlternativeQualifier, ConfidenceTier, DataQuality,
    DecisionExplanation, Details, DomainReference, DomainReferenceEntry, EnsembleInformation,
    ExplanationReport, FailedReport, FeatureContributions, ImageStatistics, InferenceStep,
    InputStep, ModelMetadata, OverallQuality, PipelineSummary, PostprocessingStep,
    PreprocessingStep, ProbabilityEntry, Recommendation, ReportOutcome, ReportSection,
    ReportStatus, UncertaintyAnalysis,
};
