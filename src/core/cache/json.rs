//! JSON file record store: one file per record in a flat directory.

use super::{HashRecord, RecordStore};
use crate::core::atomic::{discard_temp, temp_sibling};
use crate::error::StoreError;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// File-backed record store
///
/// Records live at `{root}/{key}.json`. Writes go to `{key}.json.tmp` first
/// and are renamed over the target, so an interrupted save leaves the
/// previous record intact.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root).map_err(|source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Directory holding the record files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file that holds (or would hold) the record for `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{RECORD_EXTENSION}"))
    }

    fn write_record(temp: &Path, content: &str) -> std::io::Result<()> {
        let mut file = File::create(temp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    }
}

impl RecordStore for JsonFileStore {
    fn location(&self) -> PathBuf {
        self.root.clone()
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.record_path(key).is_file())
    }

    fn load(&self, key: &str) -> Result<HashRecord, StoreError> {
        let path = self.record_path(key);

        let content = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StoreError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }

    fn save(&self, key: &str, record: &HashRecord) -> Result<(), StoreError> {
        let target = self.record_path(key);
        let temp = temp_sibling(&target);

        let content =
            serde_json::to_string_pretty(record).map_err(|e| StoreError::Serialize {
                path: record.path.clone(),
                reason: e.to_string(),
            })?;

        if let Err(source) = Self::write_record(&temp, &content) {
            discard_temp(&temp);
            return Err(StoreError::Io { path: temp, source });
        }

        if let Err(source) = fs::rename(&temp, &target) {
            discard_temp(&temp);
            return Err(StoreError::Io {
                path: target,
                source,
            });
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
        }

        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{HashEntry, SourceType};
    use crate::core::hasher::hash_path_key;
    use tempfile::TempDir;

    fn sample_record(path: &str) -> HashRecord {
        HashRecord {
            path: path.to_string(),
            size: Some(4),
            modified: Some(1_700_000_000.5),
            hash: vec![HashEntry {
                source: SourceType::Data,
                algorithm: "sha256".to_string(),
                value: "ab".repeat(32),
            }],
        }
    }

    #[test]
    fn save_then_load_returns_same_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(&dir.path().join(".hashes")).unwrap();
        let record = sample_record("/data/a.txt");
        let key = hash_path_key("/data/a.txt");

        store.save(&key, &record).unwrap();

        assert!(store.exists(&key).unwrap());
        assert_eq!(store.load(&key).unwrap(), record);
        assert!(store.record_path(&key).is_file());
    }

    #[test]
    fn load_missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let err = store.load(&hash_path_key("/nope")).unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn unparseable_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let key = hash_path_key("/data/a.txt");
        fs::write(store.record_path(&key), "{ not json").unwrap();

        let err = store.load(&key).unwrap_err();

        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn keys_ignore_temp_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.save(&hash_path_key("/b"), &sample_record("/b")).unwrap();
        store.save(&hash_path_key("/a"), &sample_record("/a")).unwrap();
        fs::write(dir.path().join("leftover.json.tmp"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let keys = store.keys().unwrap();

        let mut expected = vec![hash_path_key("/a"), hash_path_key("/b")];
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn save_overwrites_previous_record_without_leaving_temp() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let key = hash_path_key("/data/a.txt");
        let mut record = sample_record("/data/a.txt");
        store.save(&key, &record).unwrap();

        record.size = Some(99);
        store.save(&key, &record).unwrap();

        assert_eq!(store.load(&key).unwrap().size, Some(99));
        assert!(!temp_sibling(&store.record_path(&key)).exists());
    }

    #[test]
    fn record_stays_under_the_key_it_was_saved_with() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let key = hash_path_key("/new/root/a.txt");

        store.save(&key, &sample_record("/old/root/a.txt")).unwrap();

        assert_eq!(store.keys().unwrap(), vec![key.clone()]);
        assert_eq!(store.load(&key).unwrap().path, "/old/root/a.txt");
        assert!(!store.exists(&hash_path_key("/old/root/a.txt")).unwrap());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let key = hash_path_key("/data/a.txt");
        fs::create_dir(store.record_path(&key)).unwrap();
        fs::write(store.record_path(&key).join("occupied"), "x").unwrap();

        let err = store.save(&key, &sample_record("/data/a.txt")).unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!temp_sibling(&store.record_path(&key)).exists());
    }

    #[test]
    fn clear_empties_the_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(".hashes");
        let store = JsonFileStore::open(&root).unwrap();
        store.save(&hash_path_key("/a"), &sample_record("/a")).unwrap();

        store.clear().unwrap();

        assert!(root.is_dir());
        assert!(store.is_empty().unwrap());
    }
}
