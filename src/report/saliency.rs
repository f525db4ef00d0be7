//! Saliency summaries and heatmap reduction.
//!
//! A saliency generator hands back a [`SaliencySummary`]; when all it has is
//! a raw 2-D heatmap, [`summarize_heatmap`] produces one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SaliencyError;
use crate::uncertainty::round_to;

/// Added to the heatmap maximum before normalizing.
const NORMALIZE_EPSILON: f64 = 1e-10;

/// Grid used to name the dominant region.
const GRID: usize = 3;
const VERTICAL: [&str; GRID] = ["upper", "middle", "lower"];
const HORIZONTAL: [&str; GRID] = ["left", "center", "right"];

/// Numeric description of a normalized heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivationSummary {
    /// Heatmap height.
    pub heatmap_rows: usize,
    /// Heatmap width.
    pub heatmap_cols: usize,
    /// Largest normalized activation.
    pub max_activation: f64,
    /// Mean normalized activation.
    pub mean_activation: f64,
}

/// What the saliency generator reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SaliencySummary {
    /// Plain-language description of the most influential regions.
    pub regions_description: String,
    /// Heatmap statistics.
    pub activation: ActivationSummary,
}

/// Saliency outcome as seen by the report builder.
#[derive(Debug, Clone, PartialEq)]
pub enum SaliencyResult {
    /// Saliency was produced.
    Available(SaliencySummary),
    /// Saliency was skipped or failed.
    Unavailable {
        /// Why it is missing.
        reason: String,
    },
}

impl SaliencyResult {
    /// Unavailable with the given reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether a summary is present.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl From<Result<SaliencySummary, SaliencyError>> for SaliencyResult {
    fn from(result: Result<SaliencySummary, SaliencyError>) -> Self {
        match result {
            Ok(summary) => Self::Available(summary),
            Err(err) => Self::unavailable(err.to_string()),
        }
    }
}

/// Reduce a raw heatmap to a [`SaliencySummary`].
///
/// Negative activations are clipped to zero, the map is normalized by its
/// maximum and the dominant cell of a 3x3 grid names the region.
///
/// # Errors
///
/// Returns [`SaliencyError::Failed`] if the heatmap is empty, ragged,
/// contains non-finite values or has no positive activation.
#[allow(clippy::cast_precision_loss)]
pub fn summarize_heatmap(heatmap: &[Vec<f64>]) -> Result<SaliencySummary, SaliencyError> {
    let rows = heatmap.len();
    let cols = heatmap.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Err(failed("heatmap is empty"));
    }
    if heatmap.iter().any(|row| row.len() != cols) {
        return Err(failed("heatmap rows have different lengths"));
    }
    if heatmap.iter().flatten().any(|v| !v.is_finite()) {
        return Err(failed("heatmap contains non-finite values"));
    }

    let max = heatmap
        .iter()
        .flatten()
        .map(|v| v.max(0.0))
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Err(failed("heatmap has no positive activation"));
    }
    let scale = max + NORMALIZE_EPSILON;

    let mut cells = [[0.0_f64; GRID]; GRID];
    let mut total = 0.0;
    let mut peak = 0.0_f64;
    for (r, row) in heatmap.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let normalized = value.max(0.0) / scale;
            cells[r * GRID / rows][c * GRID / cols] += normalized;
            total += normalized;
            peak = peak.max(normalized);
        }
    }

    let (mut best_r, mut best_c) = (0, 0);
    for (r, cell_row) in cells.iter().enumerate() {
        for (c, sum) in cell_row.iter().enumerate() {
            if *sum > cells[best_r][best_c] {
                best_r = r;
                best_c = c;
            }
        }
    }

    Ok(SaliencySummary {
        regions_description: format!(
            "Highest activation concentrated in the {} region",
            region_name(best_r, best_c)
        ),
        activation: ActivationSummary {
            heatmap_rows: rows,
            heatmap_cols: cols,
            max_activation: round_to(peak, 4),
            mean_activation: round_to(total / (rows * cols) as f64, 4),
        },
    })
}

fn region_name(row: usize, col: usize) -> String {
    if row == 1 && col == 1 {
        return "central".into();
    }
    format!("{} {}", VERTICAL[row], HORIZONTAL[col])
}

fn failed(message: &str) -> SaliencyError {
    SaliencyError::Failed {
        message: message.into(),
    }
}
