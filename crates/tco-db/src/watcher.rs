//! # Change Watcher
//!
//! Detects writes made by other processes sharing the database file and
//! republishes them as [`StorageEvent`]s with [`ChangeSource::External`].
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  every poll_interval:                                                  │
//! │    for key in StorageKey::ALL                                          │
//! │      row = SELECT value, version, writer                               │
//! │      version changed && writer != our instance id?                     │
//! │        └── yes → broadcast StorageEvent { source: External }           │
//! │      remember row                                                      │
//! │                                                                         │
//! │  shutdown: ChangeWatcherHandle::shutdown() or dropping every handle    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let (watcher, handle) = db.watcher(Duration::from_millis(500));
//! tokio::spawn(watcher.run());
//! let mut events = db.subscribe();
//! // ...
//! handle.shutdown().await?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};
use crate::events::{ChangeSource, StorageEvent, StorageKey};
use crate::repository::kv::{KvEntry, KvRepository};

// =============================================================================
// Change Watcher
// =============================================================================

/// Polls `kv_store` for rows written by other instances.
pub struct ChangeWatcher {
    kv: KvRepository,
    events: broadcast::Sender<StorageEvent>,
    poll_interval: Duration,
    /// Last row observed per key.
    seen: HashMap<StorageKey, KvEntry>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping a running [`ChangeWatcher`].
#[derive(Debug, Clone)]
pub struct ChangeWatcherHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ChangeWatcherHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> DbResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| DbError::Internal("Change watcher already stopped".into()))
    }
}

impl ChangeWatcher {
    /// Creates a watcher and its handle. Nothing runs until [`Self::run`].
    pub fn new(
        kv: KvRepository,
        events: broadcast::Sender<StorageEvent>,
        poll_interval: Duration,
    ) -> (Self, ChangeWatcherHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let watcher = ChangeWatcher {
            kv,
            events,
            poll_interval,
            seen: HashMap::new(),
            shutdown_rx,
        };

        (watcher, ChangeWatcherHandle { shutdown_tx })
    }

    /// Runs the polling loop until shutdown.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(interval_ms = self.poll_interval.as_millis() as u64, "Change watcher starting");

        if let Err(e) = self.baseline().await {
            error!(?e, "Failed to read initial storage state");
        }

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.poll().await {
                        error!(?e, "Failed to poll storage for changes");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Change watcher shutting down");
                    break;
                }
            }
        }

        info!("Change watcher stopped");
    }

    /// Records the current rows without publishing anything.
    pub async fn baseline(&mut self) -> DbResult<()> {
        for key in StorageKey::ALL {
            if let Some(entry) = self.kv.entry(key).await? {
                self.seen.insert(key, entry);
            }
        }
        Ok(())
    }

    /// Checks every key once. Returns how many external changes were published.
    pub async fn poll(&mut self) -> DbResult<usize> {
        let mut published = 0;

        for key in StorageKey::ALL {
            let Some(current) = self.kv.entry(key).await? else {
                continue;
            };

            let previous = self.seen.get(&key);
            let changed = previous.map_or(true, |p| p.version != current.version);

            if changed && current.writer != self.kv.writer() {
                debug!(key = %key, version = current.version, "External change detected");
                let event = StorageEvent {
                    key,
                    new_value: current.value.clone(),
                    old_value: previous.and_then(|p| p.value.clone()),
                    version: current.version,
                    source: ChangeSource::External,
                };
                // No subscribers is not an error.
                let _ = self.events.send(event);
                published += 1;
            }

            self.seen.insert(key, current);
        }

        Ok(published)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
