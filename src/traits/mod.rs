//! Trait definitions for mockable collaborators.
//!
//! This module defines traits for:
//! - [`Classifier`]: the external image classifier
//! - [`SaliencyGenerator`]: the external visual-attention generator
//! - [`TimeProvider`]: time abstraction for deterministic reports
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use neuroscan_explain::traits::{FixedTimeProvider, TimeProvider};
//! use chrono::{TimeZone, Utc};
//!
//! let instant = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
//! let clock = FixedTimeProvider::new(instant);
//! assert_eq!(clock.now(), instant);
//! ```

use chrono::{DateTime, Utc};

use crate::error::{ClassifierError, SaliencyError};
use crate::report::{ImageTensor, SaliencySummary};

/// Image classifier boundary.
///
/// Produces a probability vector over the fixed label set, in label-set
/// order. Tensor shape and normalization are the caller's responsibility.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    /// Classify a preprocessed image tensor.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] if inference cannot run.
    fn classify(&self, tensor: &ImageTensor) -> Result<Vec<f64>, ClassifierError>;
}

/// Saliency boundary.
///
/// May fail independently of classification; failures are recorded in the
/// report, never retried.
#[cfg_attr(test, mockall::automock)]
pub trait SaliencyGenerator: Send + Sync {
    /// Produce a heatmap-derived summary for `class_index`.
    ///
    /// # Errors
    ///
    /// Returns [`SaliencyError`] if no summary can be produced.
    fn saliency(
        &self,
        tensor: &ImageTensor,
        class_index: usize,
    ) -> Result<SaliencySummary, SaliencyError>;
}

/// Time provider trait for mocking.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock returning the same instant on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTimeProvider {
    instant: DateTime<Utc>,
}

impl FixedTimeProvider {
    /// Create a clock frozen at `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
