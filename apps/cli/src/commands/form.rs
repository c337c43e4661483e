//! `tco form`: inspect and edit the stored form.

use tco_core::validate;

use super::Context;
use crate::cli::FormCommand;
use crate::error::AppResult;
use crate::output;
use crate::state::{parse_assignment, FormState};

pub async fn run(ctx: &Context, command: FormCommand) -> AppResult<()> {
    let mut form = FormState::load(ctx.db.kv()).await;

    match command {
        FormCommand::Show => {}
        FormCommand::Set { assignments } => {
            let edits = assignments
                .iter()
                .map(String::as_str)
                .map(parse_assignment)
                .collect::<Result<Vec<_>, _>>()?;
            form.apply(&edits).await?;
        }
        FormCommand::Reset => form.reset().await?,
    }

    output::print_form(ctx.format, form.input(), &validate(form.input()))
}
