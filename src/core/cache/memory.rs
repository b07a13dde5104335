//! In-memory record store for testing.

use super::{HashRecord, RecordStore};
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory record store
///
/// Same keying as the JSON store; nothing survives the process.
pub struct InMemoryStore {
    records: RwLock<BTreeMap<String, HashRecord>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    fn poisoned<T>(_: T) -> StoreError {
        StoreError::Poisoned {
            location: PathBuf::from("memory"),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryStore {
    fn location(&self) -> PathBuf {
        PathBuf::from("memory")
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let records = self.records.read().map_err(Self::poisoned)?;

        Ok(records.contains_key(key))
    }

    fn load(&self, key: &str) -> Result<HashRecord, StoreError> {
        let records = self.records.read().map_err(Self::poisoned)?;

        records.get(key).cloned().ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }

    fn save(&self, key: &str, record: &HashRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(Self::poisoned)?;

        records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(Self::poisoned)?;

        records.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().map_err(Self::poisoned)?;

        Ok(records.keys().cloned().collect())
    }
}
