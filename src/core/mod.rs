//! # Core Module
//!
//! The fingerprint engine, independent of any front end.
//!
//! ## Modules
//! - `indexer` - Lists the regular files under a search path
//! - `hasher` - Path keys and content digests
//! - `cache` - Per-file hash records and their stores
//! - `fingerprint` - Creates and refreshes records
//! - `reporter` - CSV and table export
//! - `dataset` - Layout and stage orchestration

pub(crate) mod atomic;
pub mod cache;
pub mod dataset;
pub mod fingerprint;
pub mod hasher;
pub mod indexer;
pub mod reporter;

// Re-export commonly used types
pub use cache::{HashEntry, HashRecord, RecordStore, SourceType};
pub use dataset::{DataSet, DataSetLayout, HashSummary};
pub use fingerprint::FingerprintEngine;
pub use hasher::{hash_file, hash_path_key, ContentDigest};
pub use reporter::{FingerprintTable, ReportRow};
