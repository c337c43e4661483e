//! # Export File Names
//!
//! `TCO_<customer>_<timestampMillis>.<ext>`, where every whitespace run in the
//! customer name becomes one `_`. Characters that are not allowed in file
//! names on common platforms are replaced too.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{ReportError, ReportResult};

/// Prefix of every exported file.
pub const FILE_PREFIX: &str = "TCO";

/// Builds the file name for an export.
///
/// ```rust
/// use tco_report::filename::export_filename;
///
/// assert_eq!(
///     export_filename("Transportes  del Norte", 1_700_000_000_000, "json"),
///     "TCO_Transportes_del_Norte_1700000000000.json"
/// );
/// ```
pub fn export_filename(customer_name: &str, timestamp_millis: i64, extension: &str) -> String {
    format!(
        "{FILE_PREFIX}_{}_{timestamp_millis}.{extension}",
        sanitize_customer_name(customer_name)
    )
}

/// Same as [`export_filename`] with the millis of `at`.
pub fn export_filename_at(customer_name: &str, at: DateTime<Utc>, extension: &str) -> String {
    export_filename(customer_name, at.timestamp_millis(), extension)
}

/// Collapses whitespace runs to `_` and replaces path-unsafe characters.
pub fn sanitize_customer_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        out.push(match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        });
    }
    out
}

/// Writes `contents` to `dir/file_name`, creating `dir` when missing.
pub(crate) fn write_file(dir: &Path, file_name: &str, contents: &str) -> ReportResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
    let path = dir.join(file_name);
    fs::write(&path, contents).map_err(|e| ReportError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(sanitize_customer_name("Acme Freight"), "Acme_Freight");
        assert_eq!(sanitize_customer_name("Acme \t  Freight\nCo"), "Acme_Freight_Co");
        assert_eq!(sanitize_customer_name("  padded  "), "padded");
    }

    #[test]
    fn test_path_characters_are_replaced() {
        assert_eq!(sanitize_customer_name("A/B\\C:D"), "A_B_C_D");
        assert_eq!(sanitize_customer_name("González"), "González");
    }

    #[test]
    fn test_filename_uses_millis() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            export_filename_at("Acme", at, "txt"),
            format!("TCO_Acme_{}.txt", at.timestamp_millis())
        );
    }

    #[test]
    fn test_write_file_creates_directory() {
        let dir = std::env::temp_dir()
            .join(format!("tco-report-fs-{}", std::process::id()))
            .join("nested");
        let path = write_file(&dir, "a.txt", "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        let _ = fs::remove_dir_all(dir.parent().unwrap());
    }
}
