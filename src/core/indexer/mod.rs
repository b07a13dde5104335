//! # Indexer Module
//!
//! Lists every regular file under a search root.
//!
//! ## Index Format
//! One absolute path per line, each terminated by `\r\n`, in walk order.
//! The order is whatever the filesystem yields and carries no meaning; paths
//! are not sorted or de-duplicated.
//!
//! ## Example
//! ```rust,ignore
//! use file_fingerprint::core::indexer::{WalkDirIndexer, read_index};
//!
//! let file = std::fs::File::create("photos.txt")?;
//! let result = WalkDirIndexer::new().build_index(Path::new("/photos"), file)?;
//! let paths = read_index(Path::new("photos.txt"))?;
//! ```

mod walker;

pub use walker::WalkDirIndexer;

use crate::error::IndexError;
use std::fs;
use std::path::Path;

/// Line terminator written after every index entry
pub const INDEX_LINE_TERMINATOR: &str = "\r\n";

/// Result of an indexing run
#[derive(Debug)]
pub struct IndexResult {
    /// Number of paths written
    pub files_indexed: usize,
    /// Entries that could not be indexed (non-fatal)
    pub errors: Vec<IndexError>,
}

/// Read the entries of an index file.
///
/// Only the line terminator is stripped, so file names that end in spaces
/// survive. Blank lines are skipped.
pub fn read_index(index_file: &Path) -> Result<Vec<String>, IndexError> {
    let content = fs::read_to_string(index_file).map_err(|source| IndexError::Read {
        path: index_file.to_path_buf(),
        source,
    })?;

    Ok(parse_index(&content))
}

fn parse_index(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_strips_crlf_only() {
        let entries = parse_index("/data/a.txt\r\n/data/trailing space \r\n");

        assert_eq!(entries, vec!["/data/a.txt", "/data/trailing space "]);
    }

    #[test]
    fn parse_accepts_bare_newlines_and_skips_blank_lines() {
        let entries = parse_index("/data/a.txt\n\n/data/b.txt\r\n\r\n");

        assert_eq!(entries, vec!["/data/a.txt", "/data/b.txt"]);
    }

    #[test]
    fn read_index_round_trips_walker_output() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("one.txt"), "1").unwrap();
        fs::write(root.join("two.txt"), "2").unwrap();

        let index_file = temp_dir.path().join("index.txt");
        let file = fs::File::create(&index_file).unwrap();
        let result = WalkDirIndexer::new().build_index(&root, file).unwrap();

        let entries = read_index(&index_file).unwrap();

        assert_eq!(entries.len(), result.files_indexed);
        assert!(entries.iter().all(|e| Path::new(e).is_file()));
    }

    #[test]
    fn missing_index_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();

        let err = read_index(&temp_dir.path().join("absent.txt")).unwrap_err();

        assert!(matches!(err, IndexError::Read { .. }));
    }
}
