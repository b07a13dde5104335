//! # Reporter Module
//!
//! Turns the record cache into shareable artifacts.
//!
//! ## Formats
//! 1. **CSV**: `path,hash,size,modified`, one row per cached record, sorted by
//!    record key
//! 2. **Table**: the same four columns stored column-wise, bincode-encoded and
//!    gzip-compressed
//!
//! The table is always built from the CSV, never from the cache directly, so
//! both artifacts describe the same snapshot.

mod csv;
mod table;

pub use self::csv::{export_csv, ReportRow};
pub use table::{export_table, read_table, FingerprintTable, TABLE_FORMAT_VERSION};
