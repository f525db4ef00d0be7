//! Preprocessed image tensor and its intensity statistics.

use crate::error::AnalysisError;

/// A preprocessed image as a flat buffer plus its shape.
///
/// Values are expected in `[0, 1]` but only finiteness is enforced;
/// normalization is the caller's responsibility. Statistics are computed
/// once on construction and must be finite too.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    values: Vec<f64>,
    shape: Vec<usize>,
    statistics: PixelStatistics,
}

/// Summary statistics over every tensor value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStatistics {
    /// Mean intensity.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl ImageTensor {
    /// Create a tensor with an explicit shape.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] if `values` is empty,
    /// contains a non-finite value, has a length that differs from the
    /// product of `shape`, or has a mean or standard deviation that
    /// overflows to infinity.
    pub fn new(values: Vec<f64>, shape: Vec<usize>) -> Result<Self, AnalysisError> {
        if values.is_empty() {
            return Err(AnalysisError::InvalidInput {
                reason: "image tensor is empty".into(),
            });
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidInput {
                reason: format!("image tensor value at index {idx} is not finite"),
            });
        }
        let expected: usize = shape.iter().product();
        if shape.is_empty() || expected != values.len() {
            return Err(AnalysisError::InvalidInput {
                reason: format!(
                    "shape {shape:?} does not match {} values",
                    values.len()
                ),
            });
        }
        let statistics = PixelStatistics::compute(&values);
        if !(statistics.mean.is_finite() && statistics.std.is_finite()) {
            return Err(AnalysisError::InvalidInput {
                reason: "image tensor statistics overflow; values must be normalized".into(),
            });
        }
        Ok(Self {
            values,
            shape,
            statistics,
        })
    }

    /// Create a one-dimensional tensor.
    ///
    /// # Errors
    ///
    /// Same as [`ImageTensor::new`].
    pub fn from_flat(values: Vec<f64>) -> Result<Self, AnalysisError> {
        let len = values.len();
        Self::new(values, vec![len])
    }

    /// Flat values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Tensor shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Mean, population std, min and max over all values.
    #[must_use]
    pub const fn statistics(&self) -> PixelStatistics {
        self.statistics
    }
}

impl PixelStatistics {
    #[allow(clippy::cast_precision_loss)]
    fn compute(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
        }
    }
}
