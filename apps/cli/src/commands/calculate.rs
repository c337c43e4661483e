//! `tco calculate`: apply the flags to the stored form, compute, print and
//! optionally save.

use tracing::info;

use super::{history, Context};
use crate::cli::FieldArgs;
use crate::error::AppResult;
use crate::output;
use crate::state::FormState;

pub async fn run(ctx: &Context, fields: &FieldArgs, save: bool) -> AppResult<()> {
    let mut form = FormState::load(ctx.db.kv()).await;

    let mut input = form.input().clone();
    if fields.apply_to(&mut input) {
        form.replace(input).await?;
    }

    let result = form.evaluate()?;
    output::print_result(ctx.format, form.input(), &result, ctx.currency_symbol())?;

    if save {
        let saved = history::save(&ctx.db.history(), form.input(), Some(&result)).await?;
        info!(id = %saved.id, "Calculation saved");
        eprintln!("Saved as {}", saved.id);
    }

    Ok(())
}
