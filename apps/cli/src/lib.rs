//! # tco: Fleet TCO Command Line
//!
//! Thin orchestration over the workspace crates: parse arguments, load the
//! configuration, open the database, run one command.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  main() ── Cli::parse ── init_tracing (stderr)                          │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  run(cli) ── AppConfig::load (defaults → config.toml → FLEET_TCO_*)     │
//! │              │                                                          │
//! │              ├── config show|init ──────────────► done (no database)    │
//! │              │                                                          │
//! │              ▼                                                          │
//! │           Database::new (migrations) ── commands::dispatch ── close    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod state;

use tco_db::{Database, DbConfig};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Context;
use error::AppResult;
use state::AppConfig;

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "debug,sqlx=info"
    } else {
        "info,tco=debug,sqlx=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::load(cli.config.clone())?;
    if let Some(db) = cli.db {
        config.storage.database_path = Some(db);
    }

    let command = match cli.command {
        Commands::Config(cmd) => return commands::config::run(&config, cli.config, cli.format, cmd),
        other => other,
    };

    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");
    let db = Database::new(DbConfig::new(db_path)).await?;

    let ctx = Context {
        config,
        db,
        format: cli.format,
    };

    let outcome = commands::dispatch(&ctx, command).await;
    ctx.db.close().await;
    outcome
}
