//! Grounded answer engine.
//!
//! Every value an answer mentions is read from a report field. When a
//! required field holds the sentinel, or the question asks about something
//! the report never models, the engine returns the Not-Available response
//! instead of composing text.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::router::{unmodeled_subject, Topic};
use crate::config::reference::{capitalize, CLINICAL_DISCLAIMER, CLINICAL_SIGNIFICANCE};
use crate::report::{AlternativeEntry, ExplanationReport, Field, Missing, ReportSection};

/// How much weight an answer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerConfidence {
    /// Read directly from computed fields.
    #[serde(rename = "high")]
    High,
    /// Partial or digest answer.
    #[serde(rename = "medium")]
    Medium,
    /// The relevant evidence was not produced.
    #[serde(rename = "low")]
    Low,
    /// Not-Available response.
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl AnswerConfidence {
    /// Returns the label as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::NotApplicable => "N/A",
        }
    }
}

/// An answer and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Topic the question was routed to.
    pub topic: Topic,
    /// Answer text.
    pub answer: String,
    /// Report sections the answer was read from.
    pub cited_sections: Vec<ReportSection>,
    /// False only for the Not-Available response.
    pub grounded: bool,
    /// Answer confidence.
    pub confidence_label: AnswerConfidence,
}

impl AnswerResult {
    fn grounded(
        topic: Topic,
        answer: String,
        cited_sections: Vec<ReportSection>,
        confidence_label: AnswerConfidence,
    ) -> Self {
        Self {
            topic,
            answer,
            cited_sections,
            grounded: true,
            confidence_label,
        }
    }

    /// The Not-Available response for `topic`, naming the missing context.
    #[must_use]
    pub fn not_available(topic: Topic, context: &str) -> Self {
        Self {
            topic,
            answer: format!(
                "**This information is not available in the model output.**\n\n\
                 Context: {context}\n\n\
                 Answers are limited to what was generated during prediction and \
                 explanation. This specific information was not included in the analysis."
            ),
            cited_sections: Vec::new(),
            grounded: false,
            confidence_label: AnswerConfidence::NotApplicable,
        }
    }

    /// Plain-text rendering with data sources and the grounding flag.
    #[must_use]
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();
        if !self.cited_sections.is_empty() {
            let sources: Vec<&str> = self.cited_sections.iter().map(ReportSection::as_str).collect();
            let _ = write!(output, "\n\n**Data Sources:** {}", sources.join(", "));
        }
        let _ = write!(
            output,
            "\n\n**Grounded in Evidence:** {}",
            if self.grounded { "Yes" } else { "No" }
        );
        output
    }
}

/// Answer `question`, already routed to `topic`, from `report`.
#[must_use]
pub fn answer(question: &str, topic: Topic, report: &ExplanationReport) -> AnswerResult {
    if let Some(subject) = unmodeled_subject(question) {
        return AnswerResult::not_available(
            topic,
            &format!("{} is not part of the explanation report", subject.as_str()),
        );
    }

    let result = match topic {
        Topic::Diagnosis => diagnosis(report),
        Topic::Confidence => confidence(report),
        Topic::Reasoning => reasoning(report),
        Topic::Location => location(report),
        Topic::Alternatives => alternatives(report),
        Topic::Quality => quality(report),
        Topic::Recommendation => recommendation(report),
        Topic::Uncertainty => uncertainty(report),
        Topic::TumorType => tumor_type(question, report),
        Topic::General => general(report),
    };

    result.unwrap_or_else(|missing| AnswerResult::not_available(topic, &missing.to_string()))
}

fn pct(value: f64) -> String {
    format!("{value:.2}%")
}

fn diagnosis(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let decision = &report.decision_explanation;
    let label = decision
        .predicted_label
        .require("decision_explanation.predicted_label")?;
    let confidence = decision.confidence.require("decision_explanation.confidence")?;
    let positive = decision
        .is_finding_positive
        .require("decision_explanation.is_finding_positive")?;
    let reasoning = decision.reasoning.require("decision_explanation.reasoning")?;

    let mut text = if *positive {
        format!(
            "The model detected a **{label}** tumor with {} confidence.",
            pct(*confidence)
        )
    } else {
        format!(
            "The model detected **no tumor** ({label}) with {} confidence.",
            pct(*confidence)
        )
    };
    let _ = write!(text, "\n\n**Clinical Interpretation:** {reasoning}");

    Ok(AnswerResult::grounded(
        Topic::Diagnosis,
        text,
        vec![ReportSection::DecisionExplanation],
        AnswerConfidence::High,
    ))
}

fn confidence(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let decision = &report.decision_explanation;
    let uncertainty = &report.uncertainty_analysis;
    let confidence = decision.confidence.require("decision_explanation.confidence")?;
    let tier = decision
        .confidence_tier
        .require("decision_explanation.confidence_tier")?;
    let level = uncertainty
        .level_summary
        .require("uncertainty_analysis.level_summary")?;
    let interpretation = uncertainty
        .interpretation
        .require("uncertainty_analysis.interpretation")?;
    let entropy = uncertainty.entropy.require("uncertainty_analysis.entropy")?;
    let margin = uncertainty.margin.require("uncertainty_analysis.margin")?;

    let text = format!(
        "**Confidence Score:** {}\n\n\
         **Confidence Level:** {tier}\n\n\
         **Uncertainty Assessment:** {level}\n\n\
         **Interpretation:** {interpretation}\n\n\
         **Technical Metrics:**\n\
         - Prediction Entropy: {entropy:.4} (lower is more confident)\n\
         - Margin (top 2 classes): {margin:.4} (higher is more confident)",
        pct(*confidence)
    );

    Ok(AnswerResult::grounded(
        Topic::Confidence,
        text,
        vec![
            ReportSection::DecisionExplanation,
            ReportSection::UncertaintyAnalysis,
        ],
        AnswerConfidence::High,
    ))
}

fn reasoning(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let reasoning = report
        .decision_explanation
        .reasoning
        .require("decision_explanation.reasoning")?;
    let features = &report.feature_contributions;
    let visual = features
        .visual_features
        .require("feature_contributions.visual_features")?;

    let mut text = format!("**Model Reasoning:** {reasoning}\n\n**Feature Analysis:**\n");
    for (name, description) in visual {
        let _ = writeln!(text, "- {}: {description}", title_case(name));
    }

    text.push_str("\n**Visual Explanation (Saliency):** ");
    if features.saliency_available {
        let description = features
            .saliency_description
            .require("feature_contributions.saliency_description")?;
        let regions = features
            .top_contributing_regions
            .require("feature_contributions.top_contributing_regions")?;
        let _ = write!(text, "Available. {description}. {regions}.");
    } else {
        text.push_str("Not available");
        if let Field::Present(reason) = &features.unavailable_reason {
            let _ = write!(text, " ({reason})");
        }
    }

    Ok(AnswerResult::grounded(
        Topic::Reasoning,
        text,
        vec![
            ReportSection::DecisionExplanation,
            ReportSection::FeatureContributions,
        ],
        AnswerConfidence::High,
    ))
}

fn location(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let features = &report.feature_contributions;

    if !features.saliency_available {
        let mut text = String::from(
            "**Regional information not available.** Saliency was not generated for this prediction",
        );
        if let Field::Present(reason) = &features.unavailable_reason {
            let _ = write!(text, " ({reason})");
        }
        text.push_str(". Spatial localization requires saliency data.");
        return Ok(AnswerResult::grounded(
            Topic::Location,
            text,
            vec![ReportSection::FeatureContributions],
            AnswerConfidence::Low,
        ));
    }

    let regions = features
        .top_contributing_regions
        .require("feature_contributions.top_contributing_regions")?;
    let description = features
        .saliency_description
        .require("feature_contributions.saliency_description")?;
    let activation = features
        .activation_summary
        .require("feature_contributions.activation_summary")?;

    let text = format!(
        "**Regional Analysis:**\n\n{regions}\n\n\
         **Saliency Map:** {description} ({}x{} heatmap, peak activation {:.4}, \
         mean activation {:.4})\n\n\
         **Note:** Saliency highlights the areas that contributed most to the model's decision.",
        activation.heatmap_rows,
        activation.heatmap_cols,
        activation.max_activation,
        activation.mean_activation
    );

    Ok(AnswerResult::grounded(
        Topic::Location,
        text,
        vec![ReportSection::FeatureContributions],
        AnswerConfidence::Medium,
    ))
}

fn alternatives(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let alternatives = report
        .alternative_candidates
        .require("alternative_candidates")?;
    let table = report.probability_table.require("probability_table")?;

    let mut text = String::from("**Differential Diagnosis Considerations:**\n\n");
    for entry in alternatives {
        match entry {
            AlternativeEntry::Candidate(candidate) => {
                let _ = writeln!(
                    text,
                    "- **{}**: {} ({}, rank {})",
                    capitalize(&candidate.label),
                    pct(candidate.probability),
                    candidate.qualifier.as_str(),
                    candidate.rank
                );
            }
            AlternativeEntry::Note { note } => {
                let _ = writeln!(text, "{note}");
            }
        }
    }

    text.push_str("\n**All Class Probabilities:**\n");
    for row in table {
        let _ = writeln!(
            text,
            "- {}: {} (Rank: {})",
            capitalize(&row.label),
            pct(row.probability),
            row.rank
        );
    }

    Ok(AnswerResult::grounded(
        Topic::Alternatives,
        text,
        vec![
            ReportSection::AlternativeCandidates,
            ReportSection::ProbabilityTable,
        ],
        AnswerConfidence::High,
    ))
}

fn quality(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let quality = &report.data_quality;
    let overall = quality
        .overall_quality
        .require("data_quality.overall_quality")?;
    let issues = quality
        .quality_issues
        .require("data_quality.quality_issues")?;
    let stats = quality
        .image_statistics
        .require("data_quality.image_statistics")?;

    let mut text = format!(
        "**Image Quality Assessment:**\n\n**Overall Quality:** {}\n\n**Quality Issues:**\n",
        overall.as_str()
    );
    for issue in issues {
        let _ = writeln!(text, "- {issue}");
    }
    let _ = write!(
        text,
        "\n**Image Statistics:**\n\
         - Mean Intensity: {:.4}\n\
         - Standard Deviation: {:.4}\n\
         - Value Range: [{:.4}, {:.4}]",
        stats.mean_intensity, stats.std_intensity, stats.min_value, stats.max_value
    );

    Ok(AnswerResult::grounded(
        Topic::Quality,
        text,
        vec![ReportSection::DataQuality],
        AnswerConfidence::High,
    ))
}

fn recommendation(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let action = report
        .recommendation
        .recommended_action
        .require("recommendation.recommended_action")?;
    let decision = &report.decision_explanation;
    let label = decision
        .predicted_label
        .require("decision_explanation.predicted_label")?;
    let confidence = decision.confidence.require("decision_explanation.confidence")?;

    let text = format!(
        "**Clinical Recommendation:**\n\n{action}\n\n\
         **Basis:** Prediction of '{label}' with {} confidence.\n\n\
         **Important Note:** {CLINICAL_DISCLAIMER}",
        pct(*confidence)
    );

    Ok(AnswerResult::grounded(
        Topic::Recommendation,
        text,
        vec![
            ReportSection::Recommendation,
            ReportSection::DecisionExplanation,
        ],
        AnswerConfidence::High,
    ))
}

fn uncertainty(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let uncertainty = &report.uncertainty_analysis;
    let level = uncertainty
        .level_summary
        .require("uncertainty_analysis.level_summary")?;
    let interpretation = uncertainty
        .interpretation
        .require("uncertainty_analysis.interpretation")?;
    let entropy = uncertainty.entropy.require("uncertainty_analysis.entropy")?;
    let margin = uncertainty.margin.require("uncertainty_analysis.margin")?;

    let text = format!(
        "**Uncertainty Analysis:**\n\n\
         **Level:** {level}\n\n\
         **Interpretation:** {interpretation}\n\n\
         **Metrics:**\n\
         - Entropy: {entropy:.4} (measures overall prediction uncertainty)\n\
         - Margin: {margin:.4} (difference between top 2 predictions)\n\n\
         **Clinical Significance:** {CLINICAL_SIGNIFICANCE}"
    );

    Ok(AnswerResult::grounded(
        Topic::Uncertainty,
        text,
        vec![ReportSection::UncertaintyAnalysis],
        AnswerConfidence::High,
    ))
}

fn tumor_type(question: &str, report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let entries = report
        .domain_reference
        .entries
        .require("domain_reference.entries")?;
    let predicted = report
        .decision_explanation
        .predicted_label
        .require("decision_explanation.predicted_label")?;
    let question = question.to_lowercase();

    let mut text = String::from("**Tumor Type Information:**\n\n");
    if let Some(entry) = entries
        .iter()
        .find(|e| question.contains(&e.label.to_lowercase()))
    {
        let description = entry
            .description
            .require("domain_reference.entries.description")?;
        let severity = entry.severity.require("domain_reference.entries.severity")?;
        let treatment = entry
            .common_treatment
            .require("domain_reference.entries.common_treatment")?;
        let prognosis = entry.prognosis.require("domain_reference.entries.prognosis")?;

        let _ = write!(
            text,
            "**{}:** {description}\n\
             - Severity: {severity}\n\
             - Common Treatment: {treatment}\n\
             - Prognosis: {prognosis}\n\n",
            capitalize(&entry.label)
        );
        if entry.label == *predicted {
            text.push_str("This is the **currently predicted** type for this scan.");
        } else {
            let _ = write!(text, "The current scan prediction is: **{predicted}**");
        }
    } else {
        let mut listed = 0;
        for entry in entries {
            let Field::Present(description) = &entry.description else {
                continue;
            };
            let marker = if entry.label == *predicted {
                " <- **DETECTED**"
            } else {
                ""
            };
            let _ = write!(
                text,
                "**{}:** {description}{marker}\n\n",
                capitalize(&entry.label)
            );
            listed += 1;
        }
        if listed == 0 {
            return Err(Missing {
                path: "domain_reference.entries.description",
            });
        }
    }

    Ok(AnswerResult::grounded(
        Topic::TumorType,
        text,
        vec![
            ReportSection::DomainReference,
            ReportSection::DecisionExplanation,
        ],
        AnswerConfidence::High,
    ))
}

fn general(report: &ExplanationReport) -> Result<AnswerResult, Missing> {
    let decision = &report.decision_explanation;
    let label = decision
        .predicted_label
        .require("decision_explanation.predicted_label")?;
    let confidence = decision.confidence.require("decision_explanation.confidence")?;
    let reasoning = decision.reasoning.require("decision_explanation.reasoning")?;

    let text = format!(
        "**Based on available model output:**\n\n\
         - Prediction: {label}\n\
         - Confidence: {}\n\
         - Reasoning: {reasoning}\n\n\
         For more specific information, please ask about:\n\
         - Diagnosis/prediction results\n\
         - Confidence and uncertainty\n\
         - Reasoning and features\n\
         - Location of influential regions\n\
         - Alternative diagnoses\n\
         - Image quality\n\
         - Clinical recommendations\n\
         - Tumor types",
        pct(*confidence)
    );

    Ok(AnswerResult::grounded(
        Topic::General,
        text,
        vec![ReportSection::DecisionExplanation],
        AnswerConfidence::Medium,
    ))
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}
