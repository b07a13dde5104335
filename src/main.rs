//! # fingerprint CLI
//!
//! Command-line interface for fingerprint catalogs.
//!
//! ## Usage
//! ```bash
//! fingerprint run --name photos --search-path ~/Photos
//! fingerprint hash --name photos --search-path ~/Photos --update --verbose
//! ```

mod cli;

use file_fingerprint::Result;

fn main() -> Result<()> {
    cli::run()
}
