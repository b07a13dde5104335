//! # Fingerprint Module
//!
//! Turns one indexed path (plus whatever record was cached for it) into an
//! up-to-date [`HashRecord`].
//!
//! ## Rules
//! 1. A cached record is the starting point; its `path` is never rewritten
//! 2. Only DATA digests are carried over
//! 3. `size` and `modified` come from a fresh stat
//! 4. File content is read only when no DATA digest survived
//!
//! Whether a cached record is handed in at all is the caller's decision (see
//! [`DataSet::hash`](crate::core::dataset::DataSet::hash)).

mod merge;

pub use merge::{epoch_seconds, merge_record, needs_content_hash, FileStat};

use crate::core::cache::{HashEntry, HashRecord};
use crate::core::hasher::hash_file;
use crate::error::HashError;
use std::path::Path;

/// Produces and refreshes hash records
#[derive(Debug, Clone, Default)]
pub struct FingerprintEngine;

impl FingerprintEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint `path`, starting from `existing` when given.
    ///
    /// Fails with [`HashError::Io`] if the file cannot be stat'ed or, when a
    /// digest is needed, read.
    pub fn process(
        &self,
        path: &str,
        existing: Option<HashRecord>,
    ) -> Result<HashRecord, HashError> {
        let file_path = Path::new(path);

        if let Some(record) = &existing {
            if record.path != path {
                tracing::warn!(
                    stored = %record.path,
                    current = %path,
                    "cached record path differs from indexed path; keeping stored path"
                );
            }
        }

        let stat = FileStat::read(file_path)?;

        let data_hash = if needs_content_hash(existing.as_ref()) {
            let digest = hash_file(file_path)?;
            tracing::debug!(path = %path, digest = %digest.value, "hashed content");
            Some(HashEntry::data(&digest))
        } else {
            None
        };

        Ok(merge_record(existing, path, Some(stat), data_hash))
    }
}
