//! # JSON Export
//!
//! One self-describing document per calculation:
//!
//! ```json
//! {
//!   "timestamp": "2024-03-01T12:00:00Z",
//!   "version": "2.0.0",
//!   "customer": { "customerName": "...", "truckType": "medium", ... },
//!   "results":  { "totalAnnualCost": 810000.0, ... },
//!   "metadata": { "generatedBy": "Fleet TCO Calculator", "exportType": "JSON" }
//! }
//! ```
//!
//! Numbers are written with the shortest representation that parses back to
//! the same `f64`, so a parsed export reproduces every result field exactly.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tco_core::{InputRecord, TcoResult};
use tracing::info;
use ts_rs::TS;

use crate::error::ReportResult;
use crate::filename::{export_filename_at, write_file};

/// Format version written into every export.
pub const EXPORT_VERSION: &str = "2.0.0";

/// Default `metadata.generatedBy`.
pub const DEFAULT_GENERATOR: &str = "Fleet TCO Calculator";

const EXPORT_TYPE: &str = "JSON";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub generated_by: String,
    pub export_type: String,
}

/// The exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub customer: InputRecord,
    pub results: TcoResult,
    pub metadata: ExportMetadata,
}

impl ExportDocument {
    /// Creates an export stamped with the current time.
    pub fn new(customer: InputRecord, results: TcoResult) -> Self {
        Self::at(customer, results, Utc::now())
    }

    /// Creates an export with an explicit timestamp.
    pub fn at(customer: InputRecord, results: TcoResult, timestamp: DateTime<Utc>) -> Self {
        ExportDocument {
            timestamp,
            version: EXPORT_VERSION.to_string(),
            customer,
            results,
            metadata: ExportMetadata {
                generated_by: DEFAULT_GENERATOR.to_string(),
                export_type: EXPORT_TYPE.to_string(),
            },
        }
    }

    /// Overrides `metadata.generatedBy` (company branding).
    pub fn generated_by(mut self, generator: impl Into<String>) -> Self {
        self.metadata.generated_by = generator.into();
        self
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn to_json_pretty(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ReportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `TCO_<customer>_<millis>.json`
    pub fn file_name(&self) -> String {
        export_filename_at(&self.customer.customer_name, self.timestamp, "json")
    }

    /// Writes the export into `dir` and returns the file path.
    pub fn write_to(&self, dir: &Path) -> ReportResult<PathBuf> {
        let path = write_file(dir, &self.file_name(), &self.to_json_pretty()?)?;
        info!(path = %path.display(), "Wrote JSON export");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tco_core::compute_tco;

    fn export() -> ExportDocument {
        let mut input = InputRecord::form_defaults();
        input.customer_name = "Transportes González".to_string();
        input.has_financing = true;
        input.custom_fuel_efficiency = Some(5.7);
        let result = compute_tco(&input.validated().unwrap()).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        ExportDocument::at(input, result, at)
    }

    #[test]
    fn test_document_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&export().to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["version"], "2.0.0");
        assert_eq!(json["metadata"]["exportType"], "JSON");
        assert_eq!(json["metadata"]["generatedBy"], DEFAULT_GENERATOR);
        assert_eq!(json["customer"]["customerName"], "Transportes González");
        assert_eq!(json["results"]["costBreakdown"].as_array().unwrap().len(), 9);
        assert!(json["timestamp"].as_str().unwrap().starts_with("2024-03-01T12:00:00"));
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let original = export();
        let parsed = ExportDocument::from_json(&original.to_json_pretty().unwrap()).unwrap();

        // Bit-for-bit, not approximately.
        assert_eq!(parsed.results, original.results);
        assert_eq!(
            parsed.results.cost_per_day.to_bits(),
            original.results.cost_per_day.to_bits()
        );
        for (a, b) in parsed
            .results
            .cost_breakdown
            .iter()
            .zip(&original.results.cost_breakdown)
        {
            assert_eq!(
                a.percentage_of_annual_total.to_bits(),
                b.percentage_of_annual_total.to_bits()
            );
        }
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_file_name_and_branding() {
        let doc = export().generated_by("Acme Trucks");
        assert_eq!(doc.metadata.generated_by, "Acme Trucks");
        assert_eq!(
            doc.file_name(),
            format!("TCO_Transportes_González_{}.json", doc.timestamp.timestamp_millis())
        );
    }

    #[test]
    fn test_write_to_directory() {
        let dir = std::env::temp_dir().join(format!("tco-json-{}", std::process::id()));
        let doc = export();
        let path = doc.write_to(&dir).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(ExportDocument::from_json(&contents).unwrap(), doc);
        assert!(contents.contains("\n  \"version\": \"2.0.0\""));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
