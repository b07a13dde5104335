//! Pure record merge logic.
//!
//! Kept free of file I/O so the update rules can be tested on their own.

use crate::core::cache::{HashEntry, HashRecord};
use crate::error::HashError;
use std::fs::Metadata;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Size and modification time taken from a single stat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileStat {
    /// Size in bytes
    pub size: u64,
    /// Seconds since the Unix epoch, fractional, negative before 1970
    pub modified: f64,
}

impl FileStat {
    /// Stat a file on disk
    pub fn read(path: &Path) -> Result<Self, HashError> {
        let metadata = std::fs::metadata(path).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_metadata(&metadata).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build from already-fetched metadata
    pub fn from_metadata(metadata: &Metadata) -> std::io::Result<Self> {
        Ok(Self {
            size: metadata.len(),
            modified: epoch_seconds(metadata.modified()?),
        })
    }
}

/// Convert a timestamp to fractional seconds relative to the Unix epoch
pub fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

/// Whether a record still needs a content digest
///
/// Only DATA entries survive a merge, so anything else in `existing` does not
/// count.
pub fn needs_content_hash(existing: Option<&HashRecord>) -> bool {
    existing.map_or(true, |record| record.data_hash().is_none())
}

/// Merge an existing record with freshly gathered facts about its file.
///
/// - `path` is kept from `existing` when there is one; `path` only fills a
///   new record. A stored path is never rewritten.
/// - Every non-DATA hash entry is dropped.
/// - `stat`, when given, replaces `size` and `modified`.
/// - `data_hash` is appended only when no DATA entry survived; an existing
///   digest is never replaced.
pub fn merge_record(
    existing: Option<HashRecord>,
    path: &str,
    stat: Option<FileStat>,
    data_hash: Option<HashEntry>,
) -> HashRecord {
    let mut record = existing.unwrap_or_else(|| HashRecord::new(path));

    record.hash.retain(HashEntry::is_data);

    if let Some(stat) = stat {
        record.size = Some(stat.size);
        record.modified = Some(stat.modified);
    }

    if record.hash.is_empty() {
        if let Some(entry) = data_hash {
            record.hash.push(entry);
        }
    }

    record
}
