//! # Saved Calculation History
//!
//! A bounded list of [`SavedCalculation`]s stored as one JSON array under
//! [`StorageKey::SavedCalculations`].
//!
//! ```text
//!   push(new) ──► [new, e1, e2, ... e9]     (most recent first)
//!                                   └── e10 evicted when full
//! ```

use tco_core::{SavedCalculation, HISTORY_CAPACITY};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::events::StorageKey;
use crate::repository::kv::KvRepository;

const ENTITY: &str = "Saved calculation";

/// Repository for the saved calculation history.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    kv: KvRepository,
    capacity: usize,
}

impl HistoryRepository {
    /// Creates a history holding at most [`HISTORY_CAPACITY`] entries.
    pub fn new(kv: KvRepository) -> Self {
        Self::with_capacity(kv, HISTORY_CAPACITY)
    }

    pub fn with_capacity(kv: KvRepository, capacity: usize) -> Self {
        HistoryRepository { kv, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All saved calculations, most recent first.
    ///
    /// An unreadable history is logged and treated as empty.
    pub async fn list(&self) -> Vec<SavedCalculation> {
        self.kv
            .get_or_default(StorageKey::SavedCalculations, Vec::new())
            .await
    }

    /// Prepends a calculation, evicting the oldest entries beyond capacity.
    ///
    /// The read and the write happen in one transaction. An unreadable
    /// stored history is logged and replaced.
    ///
    /// ## Returns
    /// The evicted entries, oldest last.
    pub async fn push(&self, calculation: SavedCalculation) -> DbResult<Vec<SavedCalculation>> {
        let id = calculation.id.clone();
        let capacity = self.capacity;

        let (stored, evicted) = self
            .kv
            .update(StorageKey::SavedCalculations, |current: Option<Vec<SavedCalculation>>| {
                let mut entries = current.unwrap_or_default();
                entries.insert(0, calculation);
                let evicted = if entries.len() > capacity {
                    entries.split_off(capacity)
                } else {
                    Vec::new()
                };
                let stored = entries.len();
                Ok((entries, (stored, evicted)))
            })
            .await?;

        info!(
            id = %id,
            stored,
            evicted = evicted.len(),
            "Saved calculation"
        );
        Ok(evicted)
    }

    /// Finds a calculation by id or by a unique id prefix.
    pub async fn get(&self, id: &str) -> DbResult<SavedCalculation> {
        let entries = self.list().await;
        let index = find_index(&entries, id)?;
        entries
            .into_iter()
            .nth(index)
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Removes a calculation by id or unique id prefix and returns it.
    pub async fn remove(&self, id: &str) -> DbResult<SavedCalculation> {
        let (removed, remaining) = self
            .kv
            .update(StorageKey::SavedCalculations, |current: Option<Vec<SavedCalculation>>| {
                let mut entries = current.unwrap_or_default();
                let index = find_index(&entries, id)?;
                let removed = entries.remove(index);
                let remaining = entries.len();
                Ok((entries, (removed, remaining)))
            })
            .await?;

        debug!(id = %removed.id, remaining, "Removed saved calculation");
        Ok(removed)
    }

    /// Removes every saved calculation. Returns how many there were.
    pub async fn clear(&self) -> DbResult<usize> {
        let count = self.list().await.len();
        self.kv.remove(StorageKey::SavedCalculations).await?;
        info!(count, "Cleared history");
        Ok(count)
    }
}

/// Exact id match first, then a prefix that matches exactly one entry.
fn find_index(entries: &[SavedCalculation], id: &str) -> DbResult<usize> {
    let id = id.trim();
    if let Some(index) = entries.iter().position(|e| e.id == id) {
        return Ok(index);
    }

    let mut matches = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !id.is_empty() && e.id.starts_with(id))
        .map(|(index, _)| index);

    match (matches.next(), matches.next()) {
        (Some(index), None) => Ok(index),
        _ => Err(DbError::not_found(ENTITY, id)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use tco_core::{compute_tco, InputRecord};

    use super::*;
    use crate::Database;

    fn saved(name: &str) -> SavedCalculation {
        let input = InputRecord {
            customer_name: name.to_string(),
            ..InputRecord::form_defaults()
        };
        let result = compute_tco(&input.validated().unwrap()).unwrap();
        SavedCalculation::new(input, result)
    }

    #[tokio::test]
    async fn test_empty_history() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.history().list().await.is_empty());
        assert_eq!(db.history().clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_push_prepends() {
        let db = Database::in_memory().await.unwrap();
        let history = db.history();

        history.push(saved("first")).await.unwrap();
        history.push(saved("second")).await.unwrap();

        let names: Vec<String> = history
            .list()
            .await
            .into_iter()
            .map(|e| e.customer_name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_eleventh_save_evicts_oldest() {
        let db = Database::in_memory().await.unwrap();
        let history = db.history();

        for i in 0..HISTORY_CAPACITY {
            assert!(history.push(saved(&format!("c{i}"))).await.unwrap().is_empty());
        }
        let evicted = history.push(saved("newest")).await.unwrap();

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].customer_name, "c0");

        let entries = history.list().await;
        assert_eq!(entries.len(), HISTORY_CAPACITY);
        assert_eq!(entries[0].customer_name, "newest");
        assert_eq!(entries[HISTORY_CAPACITY - 1].customer_name, "c1");
    }

    #[tokio::test]
    async fn test_snapshot_survives_storage() {
        let db = Database::in_memory().await.unwrap();
        let entry = saved("Snapshot");
        db.history().push(entry.clone()).await.unwrap();

        let stored = db.history().get(&entry.id).await.unwrap();
        assert_eq!(stored, entry);
    }

    #[tokio::test]
    async fn test_get_by_prefix() {
        let db = Database::in_memory().await.unwrap();
        let entry = saved("Prefix");
        db.history().push(entry.clone()).await.unwrap();

        let found = db.history().get(&entry.id[..8]).await.unwrap();
        assert_eq!(found.id, entry.id);
        assert!(matches!(
            db.history().get("no-such-id").await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.history().get("").await.is_err());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let db = Database::in_memory().await.unwrap();
        let history = db.history();
        let keep = saved("keep");
        let dropped = saved("drop");
        history.push(keep.clone()).await.unwrap();
        history.push(dropped.clone()).await.unwrap();

        let removed = history.remove(&dropped.id).await.unwrap();
        assert_eq!(removed.customer_name, "drop");
        assert_eq!(history.list().await, vec![keep]);
        assert!(history.remove(&dropped.id).await.is_err());

        assert_eq!(history.clear().await.unwrap(), 1);
        assert!(history.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_history_reads_as_empty() {
        let db = Database::in_memory().await.unwrap();
        db.kv()
            .set(StorageKey::SavedCalculations, &"not a list")
            .await
            .unwrap();
        assert!(db.history().list().await.is_empty());

        db.history().push(saved("fresh")).await.unwrap();
        assert_eq!(db.history().list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_pushes_keep_every_entry() {
        let db = Database::in_memory().await.unwrap();
        let (first, second) = (db.history(), db.history());

        let (a, b) = tokio::join!(first.push(saved("first")), second.push(saved("second")));
        a.unwrap();
        b.unwrap();

        let mut names: Vec<String> = db
            .history()
            .list()
            .await
            .into_iter()
            .map(|e| e.customer_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_remove_of_unknown_id_keeps_history() {
        let db = Database::in_memory().await.unwrap();
        let history = db.history();
        history.push(saved("keep")).await.unwrap();
        let version = db.kv().version(StorageKey::SavedCalculations).await.unwrap();

        assert!(history.remove("no-such-id").await.is_err());
        assert_eq!(history.list().await.len(), 1);
        assert_eq!(
            db.kv().version(StorageKey::SavedCalculations).await.unwrap(),
            version
        );
    }
}
