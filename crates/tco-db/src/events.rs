//! # Storage Keys & Change Events
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   KvRepository::set/remove ──────────┐   (this process)                │
//! │                                      ▼                                  │
//! │                           broadcast::Sender<StorageEvent>               │
//! │                                      ▲           │                      │
//! │   ChangeWatcher (polls versions) ────┘           ▼                      │
//! │   (writes by other processes)          Database::subscribe()            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

/// The logical keys of the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StorageKey {
    /// The calculator form as last edited.
    #[serde(rename = "tco-form-data")]
    FormSnapshot,
    /// Saved calculation history, most recent first.
    #[serde(rename = "tco-saved-calculations")]
    SavedCalculations,
}

impl StorageKey {
    pub const ALL: [StorageKey; 2] = [StorageKey::FormSnapshot, StorageKey::SavedCalculations];

    /// The key as stored in the `kv_store` table.
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageKey::FormSnapshot => "tco-form-data",
            StorageKey::SavedCalculations => "tco-saved-calculations",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKey {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DbError::not_found("Storage key", s))
    }
}

/// Where a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    /// Written through this process's [`crate::KvRepository`].
    Local,
    /// Detected by a [`crate::ChangeWatcher`]: another process wrote the file.
    External,
}

/// A value changed under a storage key.
///
/// Values are the raw JSON text; `None` means the key is absent (before the
/// first write, or after a remove).
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub key: StorageKey,
    pub new_value: Option<String>,
    pub old_value: Option<String>,
    /// Version after the change. A remove bumps it like any write.
    pub version: i64,
    pub source: ChangeSource,
}

impl StorageEvent {
    /// Decodes the new value.
    pub fn decode<T: DeserializeOwned>(&self) -> DbResult<Option<T>> {
        self.new_value
            .as_deref()
            .map(|raw| {
                serde_json::from_str(raw).map_err(|e| DbError::serialization(self.key.as_str(), e))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys() {
        assert_eq!(StorageKey::FormSnapshot.as_str(), "tco-form-data");
        assert_eq!(StorageKey::SavedCalculations.as_str(), "tco-saved-calculations");
        assert_eq!(
            "tco-form-data".parse::<StorageKey>().unwrap(),
            StorageKey::FormSnapshot
        );
        assert!("tco-other".parse::<StorageKey>().is_err());
    }

    #[test]
    fn test_event_decode() {
        let event = StorageEvent {
            key: StorageKey::FormSnapshot,
            new_value: Some("[1,2,3]".to_string()),
            old_value: None,
            version: 1,
            source: ChangeSource::Local,
        };
        assert_eq!(event.decode::<Vec<u8>>().unwrap(), Some(vec![1, 2, 3]));
        assert!(event.decode::<String>().is_err());

        let removed = StorageEvent {
            new_value: None,
            ..event
        };
        assert_eq!(removed.decode::<Vec<u8>>().unwrap(), None);
    }
}
