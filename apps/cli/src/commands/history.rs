//! # History Commands
//!
//! Saved calculations live under `tco-saved-calculations`, most recent
//! first, at most ten. Ids can be given as a unique prefix (`history show
//! 3f2a`), which is what `history list` prints.

use tco_core::{InputRecord, SavedCalculation, TcoResult};
use tco_db::HistoryRepository;
use tracing::info;

use super::Context;
use crate::cli::{HistoryCommand, OutputFormat};
use crate::error::{AppError, AppResult};
use crate::output;
use crate::state::FormState;

/// Saves a calculation to history.
///
/// Requires a computed result and a non-empty customer name. Returns the
/// saved entry; entries pushed past capacity are logged.
pub async fn save(
    history: &HistoryRepository,
    input: &InputRecord,
    result: Option<&TcoResult>,
) -> AppResult<SavedCalculation> {
    let result = result.ok_or_else(|| {
        AppError::SaveRejected("there is no valid result to save".into())
    })?;
    if input.customer_name.trim().is_empty() {
        return Err(AppError::SaveRejected("the customer name is empty".into()));
    }

    let saved = SavedCalculation::new(input.clone(), result.clone());
    let evicted = history.push(saved.clone()).await?;
    for old in &evicted {
        info!(id = %old.id, customer = %old.customer_name, "Oldest saved calculation evicted");
    }
    Ok(saved)
}

pub async fn run(ctx: &Context, command: HistoryCommand) -> AppResult<()> {
    let history = ctx.db.history();
    let symbol = ctx.currency_symbol();

    match command {
        HistoryCommand::List => {
            let entries = history.list().await;
            output::print_history(ctx.format, &entries, symbol)
        }
        HistoryCommand::Show { id } => {
            let entry = history.get(&id).await?;
            match ctx.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&entry)?);
                    Ok(())
                }
                OutputFormat::Table => {
                    println!(
                        "Saved {} ({})",
                        entry.timestamp.format("%Y-%m-%d %H:%M UTC"),
                        entry.id
                    );
                    output::print_result(ctx.format, &entry.input, &entry.result, symbol)
                }
            }
        }
        HistoryCommand::Load { id } => {
            let entry = history.get(&id).await?;
            let mut form = FormState::load(ctx.db.kv()).await;
            form.replace(entry.input).await?;
            println!("Loaded '{}' into the form", entry.customer_name);
            Ok(())
        }
        HistoryCommand::Remove { id } => {
            let removed = history.remove(&id).await?;
            println!("Removed '{}' ({})", removed.customer_name, removed.id);
            Ok(())
        }
        HistoryCommand::Clear => {
            let count = history.clear().await?;
            println!("Removed {count} saved calculation(s)");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tco_core::compute_tco;
    use tco_db::Database;

    fn calculation(name: &str) -> (InputRecord, TcoResult) {
        let mut input = InputRecord::form_defaults();
        input.customer_name = name.to_string();
        let result = compute_tco(&input.validated().unwrap()).unwrap();
        (input, result)
    }

    #[tokio::test]
    async fn test_save_requires_result() {
        let db = Database::in_memory().await.unwrap();
        let (input, _) = calculation("Fletes Norte");

        let err = save(&db.history(), &input, None).await.unwrap_err();
        assert!(matches!(err, AppError::SaveRejected(_)));
        assert!(db.history().list().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_requires_name() {
        let db = Database::in_memory().await.unwrap();
        let (mut input, result) = calculation("Fletes Norte");
        input.customer_name = "   ".into();

        let err = save(&db.history(), &input, Some(&result)).await.unwrap_err();
        assert!(matches!(err, AppError::SaveRejected(_)));
    }

    #[tokio::test]
    async fn test_save_snapshots_the_calculation() {
        let db = Database::in_memory().await.unwrap();
        let (input, result) = calculation("  Fletes Norte ");

        let saved = save(&db.history(), &input, Some(&result)).await.unwrap();
        assert_eq!(saved.customer_name, "Fletes Norte");

        let listed = db.history().list().await;
        assert_eq!(listed, vec![saved]);
    }
}
