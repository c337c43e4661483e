//! # Application Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  command fn ── AppResult<T>                                             │
//! │       │                                                                 │
//! │       ├── CoreError   (validation, unknown field/truck type)           │
//! │       ├── DbError     (storage)                                         │
//! │       ├── ReportError (export files)                                    │
//! │       └── Config      (TOML read/parse/write)                           │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  main() ── user errors: "error: ..." on stderr, exit 2                  │
//! │         └─ anything else: anyhow::Result<()>, exit 1                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use tco_core::{CoreError, FieldErrors};
use tco_db::DbError;
use tco_report::ReportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// Config file exists but could not be read or written.
    #[error("config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A value in the config (file or environment) is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No platform directory could be determined for config or data files.
    #[error("could not determine the {0} directory")]
    NoProjectDir(&'static str),

    #[error("cannot save: {0}")]
    SaveRejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Core(CoreError::Validation(errors))
    }
}

impl AppError {
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by what the user typed rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::Core(_) | AppError::InvalidConfig(_) | AppError::SaveRejected(_)
        ) || matches!(self, AppError::Db(DbError::NotFound { .. }))
    }
}

pub type AppResult<T> = Result<T, AppError>;
