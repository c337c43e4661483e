//! # Interactive Session
//!
//! Line-oriented form editing with live, debounced recalculation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  stdin line ──► Input ──► FormState (persisted) ──► Recalculator        │
//! │                                                          │              │
//! │  ChangeWatcher ──► StorageEvent (External form) ──► adopt + submit      │
//! │                                                          │              │
//! │                        results.changed() ◄───────────────┘              │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                     summary or field errors                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Typing mistakes are printed and the session goes on; only stdin closing
//! or `quit` ends it.

use tco_core::format::{format_currency_with, format_number};
use tco_core::{CoreError, CoreResult, Field, InputRecord};
use tco_db::{ChangeSource, StorageEvent, StorageKey};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::{export, history, Context};
use crate::cli::{ExportCommand, ExportTarget};
use crate::error::AppResult;
use crate::output;
use crate::state::{evaluate, parse_assignment, FormState, Recalculation, Recalculator};

const HELP: &str = "\
Commands:
  <field>=<value>   edit a field (e.g. truckValue=950000, has_financing=yes)
  <field>           clear an optional field
  show              print the form
  save              save the current calculation to history
  export json       write a JSON export
  export report     write a text report
  reset             restore the form defaults
  help              this text
  quit              leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Empty,
    Help,
    Show,
    Save,
    Reset,
    ExportJson,
    ExportReport,
    Quit,
    Edit(Field, String),
}

impl Input {
    pub fn parse(line: &str) -> CoreResult<Input> {
        let line = line.trim();
        let input = match line.to_ascii_lowercase().as_str() {
            "" => Input::Empty,
            "help" | "?" => Input::Help,
            "show" => Input::Show,
            "save" => Input::Save,
            "reset" => Input::Reset,
            "export json" => Input::ExportJson,
            "export report" => Input::ExportReport,
            "quit" | "exit" | "q" => Input::Quit,
            _ => {
                let (field, value) = parse_assignment(line)?;
                Input::Edit(field, value)
            }
        };
        Ok(input)
    }
}

fn print_recalculation(ctx: &Context, recalculation: &Recalculation) {
    let symbol = ctx.currency_symbol();
    match &recalculation.outcome {
        Ok(result) => println!(
            "  → {} per year · {} over {} years · {symbol}{} per distance",
            format_currency_with(result.total_annual_cost, symbol),
            format_currency_with(result.total_period_cost, symbol),
            recalculation.input.operation_years.unwrap_or_default(),
            format_number(result.cost_per_distance, 2),
        ),
        Err(CoreError::Validation(errors)) => {
            println!("  → {} field(s) need attention:", errors.len());
            print!("{}", output::render_errors(errors));
        }
        Err(e) => println!("  → cannot compute: {e}"),
    }
}

fn unreadable_line(error: &std::io::Error) -> String {
    match error.kind() {
        std::io::ErrorKind::InvalidData => "input is not valid UTF-8, line ignored".to_string(),
        _ => format!("could not read input: {error}"),
    }
}

/// Returns `false` when the session should end.
async fn handle(
    ctx: &Context,
    form: &mut FormState,
    recalc: &mut Recalculator,
    input: Input,
) -> AppResult<bool> {
    match input {
        Input::Empty => {}
        Input::Help => println!("{HELP}"),
        Input::Quit => return Ok(false),
        Input::Show => {
            print!("{}", output::render_form(form.input(), &tco_core::validate(form.input())));
        }
        Input::Edit(field, value) => {
            form.set(field, &value).await?;
            recalc.submit(form.input().clone());
        }
        Input::Reset => {
            form.reset().await?;
            recalc.submit(form.input().clone());
        }
        Input::Save => {
            let result = evaluate(form.input()).ok();
            let saved = history::save(&ctx.db.history(), form.input(), result.as_ref()).await?;
            println!("  saved as {}", saved.id);
        }
        Input::ExportJson => {
            export::run(ctx, ExportCommand::Json { target: ExportTarget::default() }).await?;
        }
        Input::ExportReport => {
            export::run(ctx, ExportCommand::Report { target: ExportTarget::default() }).await?;
        }
    }
    Ok(true)
}

/// Applies a form snapshot written by another process.
fn on_storage_event(form: &mut FormState, recalc: &mut Recalculator, event: StorageEvent) {
    if event.source != ChangeSource::External || event.key != StorageKey::FormSnapshot {
        return;
    }

    match event.decode::<InputRecord>() {
        Ok(snapshot) => {
            form.adopt(snapshot.unwrap_or_else(InputRecord::form_defaults));
            recalc.submit(form.input().clone());
            println!("  (form changed in another session)");
        }
        Err(e) => warn!(error = %e, "Ignoring unreadable form snapshot"),
    }
}

pub async fn run(ctx: &Context) -> AppResult<()> {
    let mut form = FormState::load(ctx.db.kv()).await;
    let mut recalc = Recalculator::new(ctx.config.debounce());
    let mut results = recalc.subscribe();
    let mut storage = ctx.db.subscribe();

    let (watcher, watcher_handle) = ctx.db.watcher(ctx.config.watch_interval());
    let watcher_task = tokio::spawn(watcher.run());

    info!("Interactive session started");
    println!("{HELP}");
    recalc.submit(form.input().clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        debug!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Unreadable input line");
                        println!("  {}", unreadable_line(&e));
                        continue;
                    }
                };
                let outcome = match Input::parse(&line) {
                    Ok(input) => handle(ctx, &mut form, &mut recalc, input).await,
                    Err(e) => Err(e.into()),
                };
                match outcome {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("  {e}"),
                }
            }

            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = results.borrow_and_update().clone();
                if let Some(recalculation) = latest {
                    print_recalculation(ctx, &recalculation);
                }
            }

            event = storage.recv() => match event {
                Ok(event) => on_storage_event(&mut form, &mut recalc, event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed storage events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    recalc.cancel();
    if let Err(e) = watcher_handle.shutdown().await {
        debug!(error = %e, "Change watcher already stopped");
    }
    if let Err(e) = watcher_task.await {
        warn!(error = %e, "Change watcher task failed");
    }

    info!("Interactive session ended");
    Ok(())
}
