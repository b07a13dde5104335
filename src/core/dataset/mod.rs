//! # DataSet Module
//!
//! Owns a catalog's directory layout and runs its stages in order.
//!
//! ## Stages
//! 1. **Index** - list every regular file under the search path
//! 2. **Hash** - create or refresh one record per indexed path
//! 3. **CSV** - export the record cache as a report
//! 4. **Table** - compress the report into a columnar table
//!
//! Every stage leaves a durable artifact under `{metadata_root}/{name}/` and
//! is safe to rerun: an existing artifact is reused unless told otherwise,
//! and a missing upstream artifact is produced on demand.
//!
//! ## Example
//! ```rust,ignore
//! use file_fingerprint::core::dataset::DataSet;
//!
//! let dataset = DataSet::builder()
//!     .name("photos")
//!     .search_path("/mnt/photos")
//!     .metadata_root("/var/lib/fingerprint")
//!     .open()?;
//! dataset.hash(false, false)?;
//! dataset.generate_dataframe()?;
//! ```

mod executor;
mod layout;

pub use executor::{DataSet, DataSetBuilder, HashSummary, IndexSummary, RunSummary};
pub use layout::DataSetLayout;
