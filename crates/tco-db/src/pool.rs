//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  CLI startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ├──► db.kv()        KvRepository       (form snapshot)           │
//! │       ├──► db.history()   HistoryRepository  (saved calculations)      │
//! │       └──► db.subscribe() StorageEvent stream                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL lets a second `tco` process (or a watcher) read while another writes.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::StorageEvent;
use crate::migrations;
use crate::repository::history::HistoryRepository;
use crate::repository::kv::KvRepository;
use crate::watcher::{ChangeWatcher, ChangeWatcherHandle};

/// Buffered change events per subscriber before it starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/fleet-tco.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 4
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the given file. The file is created on
    /// first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            // In-memory requires a single connection
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cloning is cheap: clones share the pool, the event channel and the
/// instance id.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    events: broadcast::Sender<StorageEvent>,
    /// Tags every row this handle writes.
    instance_id: String,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Enables WAL mode with NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);
        if config.is_in_memory() {
            // Closing the last connection would drop the whole database.
            pool_options = pool_options
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool created");

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let db = Database {
            pool,
            events,
            instance_id: Uuid::new_v4().to_string(),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Shorthand for `Database::new(DbConfig::in_memory())`.
    pub async fn in_memory() -> DbResult<Self> {
        Self::new(DbConfig::in_memory()).await
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the key-value repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let form: InputRecord = db.kv().get_or_default(StorageKey::FormSnapshot, defaults).await;
    /// ```
    pub fn kv(&self) -> KvRepository {
        KvRepository::new(
            self.pool.clone(),
            self.events.clone(),
            self.instance_id.clone(),
        )
    }

    /// Returns the saved calculation history.
    pub fn history(&self) -> HistoryRepository {
        HistoryRepository::new(self.kv())
    }

    /// Subscribes to change events for every key.
    ///
    /// Local writes are published immediately. Writes by other processes are
    /// published only while a [`ChangeWatcher`] is running.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    /// Creates a watcher that polls for writes made by other processes.
    ///
    /// Spawn [`ChangeWatcher::run`] and keep the handle to stop it.
    pub fn watcher(&self, poll_interval: Duration) -> (ChangeWatcher, ChangeWatcherHandle) {
        ChangeWatcher::new(self.kv(), self.events.clone(), poll_interval)
    }

    /// Id written to the `writer` column by this handle and its clones.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Closes the connection pool. Later repository calls fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
