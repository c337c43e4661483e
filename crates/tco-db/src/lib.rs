//! # tco-db: Storage Layer for Fleet TCO
//!
//! Local persistence for the calculator: the current form, the saved
//! calculation history and change notifications, all in one SQLite file.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fleet TCO Data Flow                              │
//! │                                                                         │
//! │  CLI command (calculate --save, form set, history list)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tco-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ KvRepository  │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ HistoryRepo   │    │              │  │   │
//! │  │   │ event channel │    │               │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           └──► StorageEvent ◄── ChangeWatcher (other processes) │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/fleet-tco.db                                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`events`] - Storage keys and change events
//! - [`watcher`] - Cross-process change detection
//! - [`repository`] - Key-value and history repositories
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tco_db::{Database, DbConfig, StorageKey};
//!
//! let db = Database::new(DbConfig::new("fleet-tco.db")).await?;
//!
//! let form = db
//!     .kv()
//!     .get_or_default(StorageKey::FormSnapshot, InputRecord::form_defaults())
//!     .await;
//! db.history().push(SavedCalculation::new(form, result)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod watcher;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use events::{ChangeSource, StorageEvent, StorageKey};
pub use pool::{Database, DbConfig};
pub use watcher::{ChangeWatcher, ChangeWatcherHandle};

// Repository re-exports for convenience
pub use repository::history::HistoryRepository;
pub use repository::kv::{KvEntry, KvRepository};
