//! # Export Commands
//!
//! Writes the current form's calculation, or a saved one (`--id`), as a
//! JSON document or a paginated text report. A failed export is reported
//! and changes nothing else: the form, history and result are untouched.

use std::path::PathBuf;

use tco_core::{InputRecord, TcoResult};
use tco_report::{ExportDocument, ReportDocument, ReportResult};
use tracing::{info, warn};

use super::Context;
use crate::cli::{ExportCommand, ExportTarget};
use crate::error::AppResult;
use crate::state::FormState;

/// Resolves what to export: a history entry or the current form.
async fn calculation(ctx: &Context, target: &ExportTarget) -> AppResult<(InputRecord, TcoResult)> {
    match &target.id {
        Some(id) => {
            let entry = ctx.db.history().get(id).await?;
            Ok((entry.input, entry.result))
        }
        None => {
            let form = FormState::load(ctx.db.kv()).await;
            let result = form.evaluate()?;
            Ok((form.input().clone(), result))
        }
    }
}

pub async fn run(ctx: &Context, command: ExportCommand) -> AppResult<()> {
    let (kind, target) = match &command {
        ExportCommand::Json { target } => ("JSON", target),
        ExportCommand::Report { target } => ("report", target),
    };

    let (input, result) = calculation(ctx, target).await?;
    let dir = ctx.config.export_dir(target.out.as_deref());

    let written: ReportResult<PathBuf> = match command {
        ExportCommand::Json { .. } => ExportDocument::new(input, result)
            .generated_by(&ctx.config.branding.company_name)
            .write_to(&dir),
        ExportCommand::Report { .. } => {
            ReportDocument::build(&input, &result, &ctx.config.report_options()).write_to(&dir)
        }
    };

    match written {
        Ok(path) => {
            info!(kind, path = %path.display(), "Export written");
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            warn!(kind, dir = %dir.display(), error = %e, "Export failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::error::AppError;
    use crate::state::AppConfig;
    use tco_core::Field;
    use tco_db::Database;

    async fn context(company: &str, dir: PathBuf) -> Context {
        let db = Database::in_memory().await.unwrap();
        let mut form = FormState::load(db.kv()).await;
        form.set(Field::CustomerName, "Fletes Norte").await.unwrap();

        let mut config = AppConfig::default();
        config.export.output_dir = Some(dir);
        config.branding.company_name = company.to_string();
        Context {
            config,
            db,
            format: OutputFormat::Table,
        }
    }

    #[tokio::test]
    async fn test_json_export_carries_company_branding() {
        let dir = std::env::temp_dir().join(format!("tco-export-json-{}", std::process::id()));
        let ctx = context("Acme Trucks", dir.clone()).await;

        let target = ExportTarget::default();
        run(&ctx, ExportCommand::Json { target }).await.unwrap();

        let path = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| path.extension().is_some_and(|ext| ext == "json"))
            .unwrap();
        let doc = ExportDocument::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.metadata.generated_by, "Acme Trucks");
        assert_eq!(doc.customer.customer_name, "Fletes Norte");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_failed_export_returns_the_error() {
        // A regular file where the output directory should be.
        let blocker = std::env::temp_dir().join(format!("tco-export-file-{}", std::process::id()));
        std::fs::write(&blocker, "not a directory").unwrap();
        let ctx = context("Acme Trucks", blocker.join("out")).await;

        let target = ExportTarget::default();
        let err = run(&ctx, ExportCommand::Report { target }).await.unwrap_err();
        assert!(matches!(err, AppError::Report(_)));
        assert!(!err.is_user_error());

        let _ = std::fs::remove_file(&blocker);
    }
}
