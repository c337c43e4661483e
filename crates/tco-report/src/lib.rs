//! # tco-report: Export Documents for Fleet TCO
//!
//! Builds the two files a user can download for a calculation:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  (InputRecord, TcoResult)                                              │
//! │       │                                                                 │
//! │       ├──► ReportDocument::build ──► pages ──► render_text ──► .txt    │
//! │       │        (A4, mm layout)                                          │
//! │       │                                                                 │
//! │       └──► ExportDocument::new ───► to_json_pretty ──────────► .json   │
//! │                                                                         │
//! │  File names: TCO_<customer>_<timestampMillis>.<ext>                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`report`] - Paginated report layout and text rendering
//! - [`json`] - JSON export document
//! - [`filename`] - Deterministic export file names
//! - [`error`] - Report error types

pub mod error;
pub mod filename;
pub mod json;
pub mod report;

pub use error::{ReportError, ReportResult};
pub use filename::export_filename;
pub use json::{ExportDocument, ExportMetadata, EXPORT_VERSION};
pub use report::{ReportDocument, ReportOptions};
