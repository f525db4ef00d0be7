//! JSON export of reports and the report schema.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use schemars::Schema;
use tracing::info;

use super::types::{ExplanationReport, ReportOutcome};
use crate::error::ReportError;

/// Highest counter suffix tried before an export gives up.
const MAX_NAME_SUFFIX: u32 = 999;

impl ExplanationReport {
    /// Compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string(self).map_err(serialization)
    }

    /// Indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(serialization)
    }

    /// Parse a report produced by [`ExplanationReport::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if the text is not a complete report.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(serialization)
    }

    /// File name used by [`ExplanationReport::export_to_file`].
    #[must_use]
    pub fn export_file_name(&self) -> String {
        format!("explanation_{}.json", self.timestamp_stem())
    }

    fn timestamp_stem(&self) -> String {
        self.timestamp.format("%Y%m%d_%H%M%S_%3f").to_string()
    }

    /// Write indented JSON into `directory`, creating it if needed.
    ///
    /// Existing files are never replaced: when [`export_file_name`] is
    /// taken, a counter suffix (`_1`, `_2`, ...) is appended to the stem.
    /// Returns the path of the written file.
    ///
    /// [`export_file_name`]: ExplanationReport::export_file_name
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Export`] if the directory or file cannot be
    /// written, or if every candidate name is taken.
    pub fn export_to_file(&self, directory: &Path) -> Result<PathBuf, ReportError> {
        let export_error = |path: &Path, e: &std::io::Error| ReportError::Export {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        std::fs::create_dir_all(directory).map_err(|e| export_error(directory, &e))?;
        let json = self.to_json_pretty()?;
        let stem = self.timestamp_stem();

        for attempt in 0..=MAX_NAME_SUFFIX {
            let path = if attempt == 0 {
                directory.join(self.export_file_name())
            } else {
                directory.join(format!("explanation_{stem}_{attempt}.json"))
            };

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(export_error(&path, &e)),
            };
            file.write_all(json.as_bytes())
                .map_err(|e| export_error(&path, &e))?;

            info!(path = %path.display(), "Explanation report exported");
            return Ok(path);
        }

        Err(ReportError::Export {
            path: directory.join(self.export_file_name()).display().to_string(),
            message: format!("every name up to suffix _{MAX_NAME_SUFFIX} is taken"),
        })
    }
}

/// JSON Schema of a build outcome: a completed report or a failure record.
#[must_use]
pub fn report_schema() -> Schema {
    schemars::schema_for!(ReportOutcome)
}

fn serialization(err: serde_json::Error) -> ReportError {
    ReportError::Serialization {
        message: err.to_string(),
    }
}
