//! Keyword question router.
//!
//! Routing is a lookup in [`ROUTING_TABLE`]: the first row whose keyword
//! occurs as a substring of the lower-cased, trimmed question wins. Keyword
//! sets overlap, so row order decides.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Question categories, each tied to the report sections it may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Predicted label.
    Diagnosis,
    /// Confidence and uncertainty metrics.
    Confidence,
    /// Why the model decided.
    Reasoning,
    /// Saliency regions.
    Location,
    /// Other candidate labels.
    Alternatives,
    /// Input quality.
    Quality,
    /// Suggested action.
    Recommendation,
    /// Uncertainty analysis.
    Uncertainty,
    /// Reference facts per label.
    TumorType,
    /// Fallback digest.
    General,
}

impl Topic {
    /// Returns the topic name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Confidence => "confidence",
            Self::Reasoning => "reasoning",
            Self::Location => "location",
            Self::Alternatives => "alternatives",
            Self::Quality => "quality",
            Self::Recommendation => "recommendation",
            Self::Uncertainty => "uncertainty",
            Self::TumorType => "tumor_type",
            Self::General => "general",
        }
    }

    /// Returns all topics in routing priority order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Diagnosis,
            Self::Confidence,
            Self::Reasoning,
            Self::Location,
            Self::Alternatives,
            Self::Quality,
            Self::Recommendation,
            Self::Uncertainty,
            Self::TumorType,
            Self::General,
        ]
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered routing rows. [`Topic::General`] has no row; it is the fallback.
pub const ROUTING_TABLE: &[(&[&str], Topic)] = &[
    (
        &["what", "which", "diagnosis", "detected", "found", "result"],
        Topic::Diagnosis,
    ),
    (
        &["confidence", "sure", "certain", "reliable", "accuracy"],
        Topic::Confidence,
    ),
    (&["why", "how", "reason", "explain", "cause"], Topic::Reasoning),
    (
        &["region", "area", "location", "where", "part"],
        Topic::Location,
    ),
    (
        &["alternative", "other", "differential", "else"],
        Topic::Alternatives,
    ),
    (&["quality", "image", "scan", "artifact"], Topic::Quality),
    (
        &["recommend", "next", "action", "do", "should"],
        Topic::Recommendation,
    ),
    (
        &["uncertain", "ambiguous", "doubt", "unclear"],
        Topic::Uncertainty,
    ),
    (
        &["tumor type", "glioma", "meningioma", "pituitary"],
        Topic::TumorType,
    ),
];

/// Route a question to a topic.
#[must_use]
pub fn route(question: &str) -> Topic {
    let text = question.trim().to_lowercase();
    let topic = ROUTING_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map_or(Topic::General, |(_, topic)| *topic);
    debug!(topic = %topic, "Question routed");
    topic
}

/// Subjects no report ever models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnmodeledSubject {
    /// Patient age.
    PatientAge,
    /// Patient sex.
    PatientSex,
    /// Patient identity.
    PatientIdentity,
    /// Medication.
    Medication,
    /// Tumor size.
    TumorSize,
    /// Scan date.
    ScanDate,
    /// Medical history.
    MedicalHistory,
}

impl UnmodeledSubject {
    /// Returns the subject as shown in answers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PatientAge => "patient age",
            Self::PatientSex => "patient sex",
            Self::PatientIdentity => "patient identity",
            Self::Medication => "medication",
            Self::TumorSize => "tumor size",
            Self::ScanDate => "scan date",
            Self::MedicalHistory => "medical history",
        }
    }
}

/// One way of asking about an unmodeled subject.
///
/// Fires when the question contains one of `words` and, unless `anchors`
/// is empty, one of `anchors` as well. Words like "age" or "size" also
/// describe the image, so they only count next to a patient or tumor anchor.
struct UnmodeledRule {
    words: &'static [&'static str],
    anchors: &'static [&'static str],
    subject: UnmodeledSubject,
}

const PATIENT: &[&str] = &["patient", "patients", "he", "she", "him", "her", "person"];
const TUMOR: &[&str] = &["tumor", "tumour", "lesion", "mass", "growth"];
const ACQUISITION: &[&str] = &["scan", "mri", "acquired", "taken", "performed", "imaged"];

/// Ordered; the first rule that fires names the subject.
const UNMODELED_RULES: &[UnmodeledRule] = &[
    UnmodeledRule {
        words: &["born", "birthday", "birthdate"],
        anchors: &[],
        subject: UnmodeledSubject::PatientAge,
    },
    UnmodeledRule {
        words: &["age", "aged", "old", "years"],
        anchors: PATIENT,
        subject: UnmodeledSubject::PatientAge,
    },
    UnmodeledRule {
        words: &["sex", "gender", "male", "female"],
        anchors: &[],
        subject: UnmodeledSubject::PatientSex,
    },
    UnmodeledRule {
        words: &["mrn"],
        anchors: &[],
        subject: UnmodeledSubject::PatientIdentity,
    },
    UnmodeledRule {
        words: &["who", "identity", "identifier", "name"],
        anchors: PATIENT,
        subject: UnmodeledSubject::PatientIdentity,
    },
    UnmodeledRule {
        words: &[
            "medication",
            "medications",
            "medicine",
            "drug",
            "drugs",
            "prescribe",
            "prescribed",
            "prescription",
            "dose",
            "dosage",
        ],
        anchors: &[],
        subject: UnmodeledSubject::Medication,
    },
    UnmodeledRule {
        words: &["diameter", "cm", "mm", "centimeters", "millimeters"],
        anchors: &[],
        subject: UnmodeledSubject::TumorSize,
    },
    UnmodeledRule {
        words: &["size", "dimension", "dimensions", "volume", "big", "large"],
        anchors: TUMOR,
        subject: UnmodeledSubject::TumorSize,
    },
    UnmodeledRule {
        words: &["date", "dated", "when"],
        anchors: ACQUISITION,
        subject: UnmodeledSubject::ScanDate,
    },
    UnmodeledRule {
        words: &["symptom", "symptoms"],
        anchors: &[],
        subject: UnmodeledSubject::MedicalHistory,
    },
    UnmodeledRule {
        words: &["history"],
        anchors: &["patient", "patients", "medical", "family", "clinical", "prior"],
        subject: UnmodeledSubject::MedicalHistory,
    },
];

impl UnmodeledRule {
    fn fires(&self, words: &[&str]) -> bool {
        let has = |list: &[&str]| words.iter().any(|w| list.contains(w));
        has(self.words) && (self.anchors.is_empty() || has(self.anchors))
    }
}

/// Detect a question about something no report contains.
#[must_use]
pub fn unmodeled_subject(question: &str) -> Option<UnmodeledSubject> {
    let text = question.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    UNMODELED_RULES
        .iter()
        .find(|rule| rule.fires(&words))
        .map(|rule| rule.subject)
}
