//! # File Fingerprint
//!
//! Durable, incrementally updatable fingerprint catalogs of directory trees.
//!
//! ## How It Works
//! - **Index** - every regular file under a search path is listed once
//! - **Hash** - each listed file gets a cached record with its SHA-256
//! - **Report** - the cache is exported as CSV and as a compressed table
//!
//! Re-running any stage reuses what is already on disk, so a large tree only
//! pays for the files it has not seen before.
//!
//! ## Architecture
//! - `core` - indexing, hashing, record cache and export
//! - `events` - progress reporting over a channel
//! - `error` - error types per stage

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::dataset::{DataSet, DataSetBuilder};
pub use error::{FingerprintError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `info`) is used.
/// Does nothing if the host already installed a subscriber.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
