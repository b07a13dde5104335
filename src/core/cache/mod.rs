//! # Cache Module
//!
//! Per-file hash records and the stores that persist them.
//!
//! ## Layout
//! One record per indexed path, keyed by the SHA-256 of the path string
//! (see [`hash_path_key`](crate::core::hasher::hash_path_key)). The key is
//! derived from the path alone, so a record never needs to be looked up by
//! content.
//!
//! ## Backends
//! - `JsonFileStore` - one pretty-printed JSON file per record
//! - `InMemoryStore` - for testing

mod json;
mod memory;
mod traits;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::RecordStore;

use crate::core::hasher::ContentDigest;
use serde::{Deserialize, Deserializer, Serialize};

/// What a hash entry was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// The file's path string (legacy, never written going forward)
    Name,
    /// The file's byte content
    Data,
    /// Any source tag this version does not know about
    #[serde(other)]
    Unrecognized,
}

/// A single digest attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashEntry {
    pub source: SourceType,
    /// Algorithm identifier, e.g. `sha256`
    #[serde(rename = "type")]
    pub algorithm: String,
    /// Lowercase hex digest
    pub value: String,
}

impl HashEntry {
    /// A DATA entry for a freshly computed content digest
    pub fn data(digest: &ContentDigest) -> Self {
        Self {
            source: SourceType::Data,
            algorithm: digest.algorithm.as_str().to_string(),
            value: digest.value.clone(),
        }
    }

    pub fn is_data(&self) -> bool {
        self.source == SourceType::Data
    }
}

/// The cached fingerprint of one file
///
/// `size` and `modified` stay `None` until a stat has been taken and are left
/// out of the serialized form while unset. Unknown fields found on disk (such
/// as the legacy `id`) are ignored on load and therefore never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashRecord {
    /// Path the record was created for
    pub path: String,
    /// File size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Modification time, seconds since the Unix epoch (fractional)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_modified"
    )]
    pub modified: Option<f64>,
    /// Digests, in the order they were added
    #[serde(default)]
    pub hash: Vec<HashEntry>,
}

impl HashRecord {
    /// An empty record for a path: no stat, no digests
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: None,
            modified: None,
            hash: Vec::new(),
        }
    }

    /// The first DATA entry, if any
    pub fn data_hash(&self) -> Option<&HashEntry> {
        self.hash.iter().find(|entry| entry.is_data())
    }
}

/// Accept `modified` as a number or as a decimal string.
///
/// Older catalogs stored the timestamp as text; both load to the same value.
fn deserialize_modified<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawModified {
        Seconds(f64),
        Text(String),
    }

    match Option::<RawModified>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawModified::Seconds(seconds)) => Ok(Some(seconds)),
        Some(RawModified::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
