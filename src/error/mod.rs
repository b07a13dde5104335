//! # Error Module
//!
//! Error types for the fingerprint pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - every filesystem error carries the path it hit
//! - **Per-stage enums** - the facade decides what is fatal to a stage and
//!   what is only fatal to a single record

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Indexing error: {0}")]
    Index(#[from] IndexError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to prepare {path}: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while building or reading the index
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Search path not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Search path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },

    #[error("Failed to write index {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read index {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting a single file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No record stored under key {key}")]
    NotFound { key: String },

    #[error("Corrupt record at {path}: {reason}. Rerun with --update or --recreate to regenerate it.")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Record store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record for {path}: {reason}")]
    Serialize { path: String, reason: String },

    #[error("Record store lock poisoned at {location}")]
    Poisoned { location: PathBuf },
}

/// Errors that occur while exporting the report
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unable to build report, no hash data found in {path}")]
    MissingHashes { path: PathBuf },

    #[error("Record for {path} has no data hash; the record cache is inconsistent")]
    MissingDataHash { path: String },

    #[error("Export I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode table {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to decode table {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FingerprintError>;
