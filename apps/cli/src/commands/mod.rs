//! # Commands Module
//!
//! One file per top-level subcommand. Each handler takes the shared
//! [`Context`] and returns [`AppResult`]; printing goes through
//! [`crate::output`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command              │  Handler                                        │
//! ├───────────────────────┼─────────────────────────────────────────────────┤
//! │  calculate            │  calculate::run                                 │
//! │  form show|set|reset  │  form::run                                      │
//! │  history ...          │  history::run                                   │
//! │  export json|report   │  export::run                                    │
//! │  compare              │  compare::run                                   │
//! │  interactive          │  interactive::run                               │
//! │  config show|init     │  config::run (no database needed)               │
//! └───────────────────────┴─────────────────────────────────────────────────┘
//! ```

pub mod calculate;
pub mod compare;
pub mod config;
pub mod export;
pub mod form;
pub mod history;
pub mod interactive;

use tco_db::Database;

use crate::cli::{Commands, OutputFormat};
use crate::error::AppResult;
use crate::state::AppConfig;

/// Everything a command needs.
pub struct Context {
    pub config: AppConfig,
    pub db: Database,
    pub format: OutputFormat,
}

impl Context {
    pub fn currency_symbol(&self) -> &str {
        &self.config.branding.currency_symbol
    }
}

/// Runs every command that needs the database.
pub async fn dispatch(ctx: &Context, command: Commands) -> AppResult<()> {
    match command {
        Commands::Calculate { fields, save } => calculate::run(ctx, &fields, save).await,
        Commands::Form(cmd) => form::run(ctx, cmd).await,
        Commands::History(cmd) => history::run(ctx, cmd).await,
        Commands::Export(cmd) => export::run(ctx, cmd).await,
        Commands::Compare { types, ids } => compare::run(ctx, types, &ids).await,
        Commands::Interactive => interactive::run(ctx).await,
        // Handled before the database is opened.
        Commands::Config(cmd) => config::run(&ctx.config, None, ctx.format, cmd),
    }
}
