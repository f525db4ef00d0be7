//! Fixed thresholds, templates and reference texts.
//!
//! Everything here is configuration by constant: the thresholds are not
//! derived from data and the template sets are closed.

/// Confidence at or above which the tier is "very high".
pub const CONFIDENCE_VERY_HIGH: f64 = 0.90;
/// Confidence at or above which the tier is "high".
pub const CONFIDENCE_HIGH: f64 = 0.70;
/// Confidence at or above which the tier is "moderate".
pub const CONFIDENCE_MODERATE: f64 = 0.50;

/// Entropy below which uncertainty can be "low".
pub const ENTROPY_LOW: f64 = 0.5;
/// Entropy below which uncertainty can be "moderate".
pub const ENTROPY_MODERATE: f64 = 1.0;
/// Margin above which uncertainty can be "low".
pub const MARGIN_HIGH: f64 = 0.5;
/// Margin above which uncertainty can be "moderate".
pub const MARGIN_MODERATE: f64 = 0.3;

/// Max probability above which the interpretation is the most confident tier.
pub const INTERPRET_MAX_PROB_STRONG: f64 = 0.9;
/// Max probability above which the interpretation is the middle tier.
pub const INTERPRET_MAX_PROB_FAIR: f64 = 0.7;

/// Added inside `ln` so that zero probabilities stay finite.
pub const ENTROPY_EPSILON: f64 = 1e-10;
/// Allowed deviation of a probability vector's sum from 1.
pub const SUM_TOLERANCE: f64 = 1e-2;

/// Alternatives at or below this probability are dropped.
pub const ALTERNATIVE_FLOOR: f64 = 0.05;
/// Alternatives above this probability are "meaningful".
pub const MEANINGFUL_ALTERNATIVE: f64 = 0.2;
/// How many next-ranked labels are considered as alternatives.
pub const MAX_ALTERNATIVES: usize = 2;

/// Mean intensity below which an image is flagged as very dark.
pub const QUALITY_DARK_MEAN: f64 = 0.1;
/// Mean intensity above which an image is flagged as very bright.
pub const QUALITY_BRIGHT_MEAN: f64 = 0.9;
/// Standard deviation below which an image is flagged as low contrast.
pub const QUALITY_LOW_CONTRAST_STD: f64 = 0.05;

/// Sentinel text used for every value the report does not have.
pub const NOT_AVAILABLE: &str = "not available";

/// Default class labels in classifier output order.
pub const DEFAULT_CLASS_LABELS: [&str; 4] = ["pituitary", "glioma", "notumor", "meningioma"];
/// Default label meaning "no finding".
pub const DEFAULT_NEGATIVE_LABEL: &str = "notumor";

/// Note used when no alternative survives the floor.
pub const NO_ALTERNATIVES_NOTE: &str =
    "No significant alternatives - prediction is highly confident";
/// The single quality entry when nothing was flagged.
pub const NO_QUALITY_ISSUES: &str = "No significant issues detected";
/// Very dark image flag.
pub const ISSUE_VERY_DARK: &str = "Very dark image - may affect prediction accuracy";
/// Very bright image flag.
pub const ISSUE_VERY_BRIGHT: &str = "Very bright image - may affect prediction accuracy";
/// Low contrast flag.
pub const ISSUE_LOW_CONTRAST: &str = "Low contrast image - features may be less visible";

/// Appended verbatim to every recommendation answer.
pub const CLINICAL_DISCLAIMER: &str =
    "Findings should be reviewed by a qualified clinician before action.";
/// Appended verbatim to every uncertainty answer.
pub const CLINICAL_SIGNIFICANCE: &str = "Higher entropy and lower margin indicate more \
ambiguous cases that may benefit from expert review or additional imaging.";

/// Interpretation for confident, well-separated predictions.
pub const INTERPRETATION_STRONG: &str =
    "Very confident prediction with clear distinction from other classes";
/// Interpretation for confident predictions with some spread.
pub const INTERPRETATION_FAIR: &str = "Confident prediction, though some uncertainty exists";
/// Interpretation for uncertain predictions.
pub const INTERPRETATION_WEAK: &str =
    "Prediction uncertain - consider additional imaging or expert review";

/// Description used when saliency is available.
pub const SALIENCY_DESCRIPTION: &str = "Saliency heatmap shows the most influential regions";

/// Fixed descriptions of what the convolutional backbone responds to.
pub const VISUAL_FEATURES: [(&str, &str); 3] = [
    ("texture_patterns", "detected by VGG16 convolutional layers"),
    ("spatial_structure", "captured by multiple filter banks"),
    ("edge_detection", "early VGG16 layers"),
];

/// Preprocessing steps assumed when the caller supplies no trace.
pub const DEFAULT_PREPROCESSING: [(&str, &str); 3] = [
    ("resize", "128x128"),
    ("normalization", "pixel values / 255.0"),
    ("color_space", "RGB"),
];

/// Model inference description. `{classes}` is the label count.
pub const MODEL_ARCHITECTURE: &str = "VGG16 + Dense(128) + Dense({classes})";
/// Layers that were fine-tuned.
pub const TRAINABLE_LAYERS: &str = "Last 3 VGG16 layers + custom head";
/// Backbone.
pub const BASE_ARCHITECTURE: &str = "VGG16 (ImageNet pretrained)";
/// Classifier head. `{classes}` is the label count.
pub const CUSTOM_LAYERS: &str =
    "Flatten + Dropout(0.3) + Dense(128) + Dropout(0.2) + Dense({classes})";
/// Training optimizer.
pub const OPTIMIZER: &str = "Adam (lr=0.0001)";
/// Training loss.
pub const LOSS_FUNCTION: &str = "sparse_categorical_crossentropy";
/// Deployment type.
pub const MODEL_TYPE: &str = "Single VGG16-based transfer learning model";

/// Selects one of the five reasoning/recommendation templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    /// No finding, very high confidence.
    NegativeVeryHigh,
    /// No finding, anything below very high.
    NegativeOther,
    /// Finding, very high confidence.
    PositiveVeryHigh,
    /// Finding, high confidence.
    PositiveHigh,
    /// Finding, moderate or low confidence.
    PositiveLow,
}

/// Reasoning templates. `{label}` is replaced by the predicted label.
pub const REASONING_TEMPLATES: [(TemplateKey, &str); 5] = [
    (
        TemplateKey::NegativeVeryHigh,
        "Model detected no abnormal tissue patterns characteristic of tumors with very high confidence",
    ),
    (
        TemplateKey::NegativeOther,
        "Model suggests no tumor present, but moderate confidence indicates some ambiguous features",
    ),
    (
        TemplateKey::PositiveVeryHigh,
        "Model detected distinct {label} characteristics with very high confidence based on learned tissue patterns",
    ),
    (
        TemplateKey::PositiveHigh,
        "Model identified {label} features with high confidence based on spatial and textural patterns",
    ),
    (
        TemplateKey::PositiveLow,
        "Model suggests {label} but with lower confidence - image may have ambiguous features",
    ),
];

/// Recommendation templates. `{Label}` is the capitalized label.
pub const RECOMMENDATION_TEMPLATES: [(TemplateKey, &str); 5] = [
    (
        TemplateKey::NegativeVeryHigh,
        "No tumor detected with high confidence. Routine follow-up recommended.",
    ),
    (
        TemplateKey::NegativeOther,
        "No tumor indicated but with moderate confidence. Consider additional imaging if symptoms persist.",
    ),
    (
        TemplateKey::PositiveVeryHigh,
        "{Label} tumor detected with high confidence. Recommend immediate specialist consultation and treatment planning.",
    ),
    (
        TemplateKey::PositiveHigh,
        "{Label} tumor indicated. Recommend specialist review and potentially additional imaging for confirmation.",
    ),
    (
        TemplateKey::PositiveLow,
        "Possible {label} tumor but with lower confidence. Recommend expert radiologist review and additional diagnostic procedures.",
    ),
];

/// Reference facts for one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceInfo {
    /// Label the facts belong to.
    pub label: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Typical severity.
    pub severity: &'static str,
    /// Typical treatment.
    pub common_treatment: &'static str,
    /// Typical prognosis.
    pub prognosis: &'static str,
}

/// Reference facts for the default label set.
pub const DOMAIN_REFERENCE: [ReferenceInfo; 4] = [
    ReferenceInfo {
        label: "glioma",
        description: "Most common malignant brain tumor, arises from glial cells",
        severity: "high",
        common_treatment: "Surgery, radiation, chemotherapy",
        prognosis: "Variable depending on grade",
    },
    ReferenceInfo {
        label: "meningioma",
        description: "Usually benign tumor arising from meninges",
        severity: "low to moderate",
        common_treatment: "Observation or surgery",
        prognosis: "Generally good for benign cases",
    },
    ReferenceInfo {
        label: "pituitary",
        description: "Tumor in pituitary gland, often benign but can affect hormones",
        severity: "moderate",
        common_treatment: "Medication or surgery",
        prognosis: "Good with appropriate treatment",
    },
    ReferenceInfo {
        label: "notumor",
        description: "No tumor detected in the scan",
        severity: "none",
        common_treatment: "None required",
        prognosis: "Excellent",
    },
];

/// Look up the template text for a key.
#[must_use]
pub fn template_for(templates: &[(TemplateKey, &'static str)], key: TemplateKey) -> &'static str {
    templates
        .iter()
        .find(|(k, _)| *k == key)
        .map_or("", |(_, text)| *text)
}

/// Look up reference facts for a label.
#[must_use]
pub fn reference_for(label: &str) -> Option<&'static ReferenceInfo> {
    DOMAIN_REFERENCE.iter().find(|info| info.label == label)
}

/// Fill `{label}` and `{Label}` placeholders.
#[must_use]
pub fn render_template(template: &str, label: &str) -> String {
    template
        .replace("{Label}", &capitalize(label))
        .replace("{label}", label)
}

/// Fill the `{classes}` placeholder of an architecture description.
#[must_use]
pub fn render_head(template: &str, classes: usize) -> String {
    template.replace("{classes}", &classes.to_string())
}

/// Upper-case the first character.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
