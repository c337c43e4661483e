//! # Report Error Types

use std::path::PathBuf;

use thiserror::Error;

/// Errors while building or writing export files.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing the file failed.
    ///
    /// ## When This Occurs
    /// - Output directory can't be created
    /// - No write permission, disk full
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding the JSON document failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A report without pages was asked to render.
    #[error("Report has no pages")]
    EmptyDocument,
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
