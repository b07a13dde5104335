//! Record store trait definition.

use super::HashRecord;
use crate::error::StoreError;
use std::path::PathBuf;

/// Trait for record store backends
///
/// Keys are path keys (hex SHA-256 of the indexed path string). A store
/// never derives keys itself: a record's own `path` may differ from the path
/// it is indexed under, and the record stays where it was found.
pub trait RecordStore: Send + Sync {
    /// Whether a record is stored under `key`
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Load the record stored under `key`
    ///
    /// Fails with [`StoreError::NotFound`] when nothing is stored and
    /// [`StoreError::Corrupt`] when the stored payload does not parse.
    fn load(&self, key: &str) -> Result<HashRecord, StoreError>;

    /// Store `record` under `key`, replacing any previous one
    fn save(&self, key: &str, record: &HashRecord) -> Result<(), StoreError>;

    /// Remove every stored record
    fn clear(&self) -> Result<(), StoreError>;

    /// Where the records live, for messages
    fn location(&self) -> PathBuf;

    /// All stored keys, sorted
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Number of stored records
    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.keys()?.len())
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
