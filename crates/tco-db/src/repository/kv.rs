//! # Key-Value Repository
//!
//! JSON documents stored under the fixed [`StorageKey`]s.
//!
//! ## Semantics
//! - `set` is an upsert: last writer wins, the key's version grows by one
//! - `remove` leaves a tombstone (NULL value), so versions never go back
//! - every successful change is published as a [`StorageEvent`]
//! - `get_or_default` never fails: unreadable values are logged and replaced
//!   by the caller's default

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::events::{ChangeSource, StorageEvent, StorageKey};

/// One row of `kv_store`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct KvEntry {
    /// JSON text, `None` for a removed key.
    pub value: Option<String>,
    pub version: i64,
    /// Instance id of the last writer.
    pub writer: String,
}

/// Repository for key-value documents.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
    events: broadcast::Sender<StorageEvent>,
    writer: String,
}

impl KvRepository {
    /// Creates a new KvRepository writing as `writer`.
    pub fn new(pool: SqlitePool, events: broadcast::Sender<StorageEvent>, writer: String) -> Self {
        KvRepository {
            pool,
            events,
            writer,
        }
    }

    /// The instance id stamped on rows written through this repository.
    pub fn writer(&self) -> &str {
        &self.writer
    }

    /// Reads the raw row of a key, tombstones included.
    pub async fn entry(&self, key: StorageKey) -> DbResult<Option<KvEntry>> {
        let entry = sqlx::query_as::<_, KvEntry>(
            r#"
            SELECT value, version, writer
            FROM kv_store
            WHERE key = ?1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Reads the raw JSON text of a key.
    pub async fn get_raw(&self, key: StorageKey) -> DbResult<Option<String>> {
        Ok(self.entry(key).await?.and_then(|entry| entry.value))
    }

    /// Reads and decodes a key.
    ///
    /// ## Returns
    /// * `Ok(None)` - the key was never written or was removed
    /// * `Err(DbError::Serialization)` - the stored JSON doesn't match `T`
    pub async fn get<T: DeserializeOwned>(&self, key: StorageKey) -> DbResult<Option<T>> {
        self.get_raw(key)
            .await?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| DbError::serialization(key.as_str(), e))
            })
            .transpose()
    }

    /// Reads a key, falling back to `default` when it is absent or unreadable.
    pub async fn get_or_default<T: DeserializeOwned>(&self, key: StorageKey, default: T) -> T {
        match self.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable stored value, using default");
                default
            }
        }
    }

    /// Encodes and stores a value. Returns the key's new version.
    pub async fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> DbResult<i64> {
        let raw =
            serde_json::to_string(value).map_err(|e| DbError::serialization(key.as_str(), e))?;
        let version = self.write(key, Some(raw)).await?;
        // A write with a value always produces a version.
        Ok(version.unwrap_or_default())
    }

    /// Removes a key. Returns `false` when there was nothing to remove.
    pub async fn remove(&self, key: StorageKey) -> DbResult<bool> {
        Ok(self.write(key, None).await?.is_some())
    }

    /// Current version of a key, 0 when it was never written.
    pub async fn version(&self, key: StorageKey) -> DbResult<i64> {
        Ok(self.entry(key).await?.map_or(0, |entry| entry.version))
    }

    /// Reads, changes and stores a value in one transaction.
    ///
    /// `apply` receives the current value (`None` when absent) and returns
    /// the value to store plus an output for the caller. An error from
    /// `apply` leaves the stored value untouched. An unreadable current value
    /// is logged and passed as `None`.
    ///
    /// A concurrent writer that got in between makes this fail with a busy
    /// error instead of being overwritten.
    pub async fn update<T, R, F>(&self, key: StorageKey, apply: F) -> DbResult<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> DbResult<(T, R)>,
    {
        let mut tx = self.pool.begin().await?;
        let old_value = stored_value(&mut *tx, key).await?;

        let decoded = old_value.as_deref().map(|raw| serde_json::from_str::<T>(raw));
        let current = match decoded.transpose() {
            Ok(current) => current,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable stored value, replacing it");
                None
            }
        };

        let (value, output) = apply(current)?;
        let raw =
            serde_json::to_string(&value).map_err(|e| DbError::serialization(key.as_str(), e))?;
        let version = store(&mut *tx, key, Some(raw.as_str()), &self.writer).await?;
        tx.commit().await?;

        self.publish(key, Some(raw), old_value, version);
        Ok(output)
    }

    /// Writes a value or a tombstone and publishes the change.
    ///
    /// Returns `None` when removing a key that holds no value.
    async fn write(&self, key: StorageKey, new_value: Option<String>) -> DbResult<Option<i64>> {
        let mut tx = self.pool.begin().await?;
        let old_value = stored_value(&mut *tx, key).await?;

        if new_value.is_none() && old_value.is_none() {
            return Ok(None);
        }

        let version = store(&mut *tx, key, new_value.as_deref(), &self.writer).await?;
        tx.commit().await?;

        self.publish(key, new_value, old_value, version);
        Ok(Some(version))
    }

    fn publish(
        &self,
        key: StorageKey,
        new_value: Option<String>,
        old_value: Option<String>,
        version: i64,
    ) {
        debug!(
            key = %key,
            version,
            removed = new_value.is_none(),
            "Stored value"
        );

        // No subscribers is not an error.
        let _ = self.events.send(StorageEvent {
            key,
            new_value,
            old_value,
            version,
            source: ChangeSource::Local,
        });
    }
}

async fn stored_value(conn: &mut SqliteConnection, key: StorageKey) -> DbResult<Option<String>> {
    let value = sqlx::query_scalar::<_, Option<String>>("SELECT value FROM kv_store WHERE key = ?1")
        .bind(key.as_str())
        .fetch_optional(&mut *conn)
        .await?
        .flatten();

    Ok(value)
}

/// Upserts a value (`None` writes a tombstone) and returns the new version.
async fn store(
    conn: &mut SqliteConnection,
    key: StorageKey,
    value: Option<&str>,
    writer: &str,
) -> DbResult<i64> {
    let version: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO kv_store (key, value, version, writer, updated_at)
        VALUES (?1, ?2, 1, ?3, ?4)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            version = kv_store.version + 1,
            writer = excluded.writer,
            updated_at = excluded.updated_at
        RETURNING version
        "#,
    )
    .bind(key.as_str())
    .bind(value)
    .bind(writer)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(version)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use tco_core::InputRecord;

    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let db = Database::in_memory().await.unwrap();
        let value: Option<InputRecord> = db.kv().get(StorageKey::FormSnapshot).await.unwrap();
        assert!(value.is_none());
        assert_eq!(db.kv().version(StorageKey::FormSnapshot).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let db = Database::in_memory().await.unwrap();
        let mut form = InputRecord::form_defaults();
        form.customer_name = "Acme Freight".to_string();
        form.custom_fuel_efficiency = Some(5.25);

        db.kv().set(StorageKey::FormSnapshot, &form).await.unwrap();

        let stored: InputRecord = db.kv().get(StorageKey::FormSnapshot).await.unwrap().unwrap();
        assert_eq!(stored, form);
    }

    #[tokio::test]
    async fn test_set_bumps_version_and_last_writer_wins() {
        let db = Database::in_memory().await.unwrap();
        let kv = db.kv();

        assert_eq!(kv.set(StorageKey::FormSnapshot, &1u32).await.unwrap(), 1);
        assert_eq!(kv.set(StorageKey::FormSnapshot, &2u32).await.unwrap(), 2);
        assert_eq!(kv.get::<u32>(StorageKey::FormSnapshot).await.unwrap(), Some(2));

        // Keys are independent.
        assert_eq!(kv.set(StorageKey::SavedCalculations, &[0u8; 0]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_leaves_tombstone() {
        let db = Database::in_memory().await.unwrap();
        let kv = db.kv();

        assert!(!kv.remove(StorageKey::FormSnapshot).await.unwrap());

        kv.set(StorageKey::FormSnapshot, "form").await.unwrap();
        assert!(kv.remove(StorageKey::FormSnapshot).await.unwrap());
        assert!(!kv.remove(StorageKey::FormSnapshot).await.unwrap());
        assert_eq!(kv.get_raw(StorageKey::FormSnapshot).await.unwrap(), None);
        assert_eq!(kv.version(StorageKey::FormSnapshot).await.unwrap(), 2);

        assert_eq!(kv.set(StorageKey::FormSnapshot, "again").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_value_falls_back_to_default() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO kv_store (key, value, version, writer, updated_at) \
             VALUES (?1, ?2, 1, '', ?3)",
        )
        .bind(StorageKey::FormSnapshot.as_str())
        .bind("{not json")
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let kv = db.kv();
        assert!(matches!(
            kv.get::<InputRecord>(StorageKey::FormSnapshot).await,
            Err(DbError::Serialization { .. })
        ));

        let form = kv
            .get_or_default(StorageKey::FormSnapshot, InputRecord::form_defaults())
            .await;
        assert_eq!(form, InputRecord::form_defaults());
    }

    #[tokio::test]
    async fn test_local_changes_are_published() {
        let db = Database::in_memory().await.unwrap();
        let mut events = db.subscribe();
        let kv = db.kv();

        kv.set(StorageKey::FormSnapshot, &"first").await.unwrap();
        kv.set(StorageKey::FormSnapshot, &"second").await.unwrap();
        kv.remove(StorageKey::FormSnapshot).await.unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(first.key, StorageKey::FormSnapshot);
        assert_eq!(first.old_value, None);
        assert_eq!(first.new_value.as_deref(), Some("\"first\""));
        assert_eq!(first.version, 1);
        assert_eq!(first.source, ChangeSource::Local);

        let second = events.recv().await.unwrap();
        assert_eq!(second.old_value.as_deref(), Some("\"first\""));
        assert_eq!(second.decode::<String>().unwrap().as_deref(), Some("second"));

        let removed = events.recv().await.unwrap();
        assert_eq!(removed.new_value, None);
        assert_eq!(removed.version, 3);
    }

    #[tokio::test]
    async fn test_update_reads_and_writes_in_one_step() {
        let db = Database::in_memory().await.unwrap();
        let kv = db.kv();

        let seen = kv
            .update(StorageKey::FormSnapshot, |current: Option<u32>| {
                Ok((current.unwrap_or_default() + 1, current))
            })
            .await
            .unwrap();
        assert_eq!(seen, None);

        let seen = kv
            .update(StorageKey::FormSnapshot, |current: Option<u32>| {
                Ok((current.unwrap_or_default() + 1, current))
            })
            .await
            .unwrap();
        assert_eq!(seen, Some(1));
        assert_eq!(kv.get::<u32>(StorageKey::FormSnapshot).await.unwrap(), Some(2));
        assert_eq!(kv.version(StorageKey::FormSnapshot).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_changes_nothing() {
        let db = Database::in_memory().await.unwrap();
        let mut events = db.subscribe();
        let kv = db.kv();
        kv.set(StorageKey::FormSnapshot, &7u32).await.unwrap();
        events.recv().await.unwrap();

        let outcome = kv
            .update(StorageKey::FormSnapshot, |_: Option<u32>| -> DbResult<(u32, ())> {
                Err(DbError::not_found("Value", "7"))
            })
            .await;

        assert!(matches!(outcome, Err(DbError::NotFound { .. })));
        assert_eq!(kv.get::<u32>(StorageKey::FormSnapshot).await.unwrap(), Some(7));
        assert_eq!(kv.version(StorageKey::FormSnapshot).await.unwrap(), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_replaces_unreadable_value() {
        let db = Database::in_memory().await.unwrap();
        let kv = db.kv();
        kv.set(StorageKey::SavedCalculations, &"not a list").await.unwrap();

        let seen = kv
            .update(StorageKey::SavedCalculations, |current: Option<Vec<u32>>| {
                Ok((vec![1], current))
            })
            .await
            .unwrap();

        assert_eq!(seen, None);
        assert_eq!(
            kv.get::<Vec<u32>>(StorageKey::SavedCalculations).await.unwrap(),
            Some(vec![1])
        );
    }

    #[tokio::test]
    async fn test_rows_are_stamped_with_writer() {
        let db = Database::in_memory().await.unwrap();
        db.kv().set(StorageKey::FormSnapshot, &0).await.unwrap();
        let entry = db.kv().entry(StorageKey::FormSnapshot).await.unwrap().unwrap();
        assert_eq!(entry.writer, db.instance_id());
    }
}
