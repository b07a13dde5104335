//! On-disk layout of a catalog.

use std::path::{Path, PathBuf};

const HASH_DIR: &str = ".hashes";

/// Every path a catalog reads or writes, derived from its name and root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSetLayout {
    metadata_base: PathBuf,
    hash_path: PathBuf,
    index_file: PathBuf,
    csv_file: PathBuf,
    table_file: PathBuf,
}

impl DataSetLayout {
    pub fn new(metadata_root: &Path, name: &str) -> Self {
        let metadata_base = metadata_root.join(name);
        Self {
            hash_path: metadata_base.join(HASH_DIR),
            index_file: metadata_base.join(format!("{name}.txt")),
            csv_file: metadata_base.join(format!("{name}.csv")),
            table_file: metadata_base.join(format!("{name}.table")),
            metadata_base,
        }
    }

    /// `{metadata_root}/{name}`
    pub fn metadata_base(&self) -> &Path {
        &self.metadata_base
    }

    /// Directory of per-file records
    pub fn hash_path(&self) -> &Path {
        &self.hash_path
    }

    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    pub fn csv_file(&self) -> &Path {
        &self.csv_file
    }

    pub fn table_file(&self) -> &Path {
        &self.table_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_root_and_name() {
        let layout = DataSetLayout::new(Path::new("/meta"), "photos");

        assert_eq!(layout.metadata_base(), Path::new("/meta/photos"));
        assert_eq!(layout.hash_path(), Path::new("/meta/photos/.hashes"));
        assert_eq!(layout.index_file(), Path::new("/meta/photos/photos.txt"));
        assert_eq!(layout.csv_file(), Path::new("/meta/photos/photos.csv"));
        assert_eq!(layout.table_file(), Path::new("/meta/photos/photos.table"));
    }
}
