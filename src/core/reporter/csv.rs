//! CSV export of the record cache.

use crate::core::cache::RecordStore;
use crate::error::{ExportError, StoreError};
use crate::events::{Event, EventSender, ExportEvent, ExportFormat};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// A single row of the report
///
/// Field order is the column order of the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Path the record was created for
    pub path: String,
    /// Hex content digest
    pub hash: String,
    /// File size in bytes
    pub size: Option<u64>,
    /// Seconds since the Unix epoch
    pub modified: Option<f64>,
}

/// Write every valid record in `store` to `out` as CSV.
///
/// Records are visited in key order. A record that fails to parse is skipped
/// with a warning. Returns the number of rows written.
///
/// # Errors
/// - [`ExportError::MissingHashes`] when no valid record exists. Nothing but
///   possibly the header has been written to `out` at that point.
/// - [`ExportError::MissingDataHash`] when a record carries no DATA digest.
pub fn export_csv<W: Write>(
    store: &dyn RecordStore,
    out: W,
    events: &EventSender,
) -> Result<usize, ExportError> {
    events.send(Event::Export(ExportEvent::Started {
        format: ExportFormat::Csv,
    }));

    let mut writer = ::csv::Writer::from_writer(out);
    let mut rows = 0;

    for key in store.keys()? {
        let record = match store.load(&key) {
            Ok(record) => record,
            Err(StoreError::Corrupt { path, reason }) => {
                tracing::warn!(path = %path.display(), %reason, "skipping corrupt record");
                events.send(Event::Export(ExportEvent::RecordSkipped {
                    path,
                    message: reason,
                }));
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let Some(data_hash) = record.data_hash() else {
            return Err(ExportError::MissingDataHash { path: record.path });
        };

        writer.serialize(ReportRow {
            hash: data_hash.value.clone(),
            path: record.path,
            size: record.size,
            modified: record.modified,
        })?;
        rows += 1;
    }

    if rows == 0 {
        return Err(ExportError::MissingHashes {
            path: store.location(),
        });
    }

    writer.flush().map_err(|source| ExportError::Io {
        path: store.location(),
        source,
    })?;

    tracing::debug!(rows, "csv rows written");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{HashEntry, HashRecord, InMemoryStore, JsonFileStore, SourceType};
    use crate::core::hasher::hash_path_key;
    use crate::events::{null_sender, EventChannel};
    use std::fs;
    use tempfile::TempDir;

    fn record(path: &str, digest: &str) -> HashRecord {
        HashRecord {
            path: path.to_string(),
            size: Some(3),
            modified: Some(1_700_000_000.25),
            hash: vec![HashEntry {
                source: SourceType::Data,
                algorithm: "sha256".to_string(),
                value: digest.to_string(),
            }],
        }
    }

    fn put(store: &dyn RecordStore, record: &HashRecord) {
        store.save(&hash_path_key(&record.path), record).unwrap();
    }

    fn export_to_string(store: &dyn RecordStore) -> Result<(usize, String), ExportError> {
        let mut buffer: Vec<u8> = Vec::new();
        let rows = export_csv(store, &mut buffer, &null_sender())?;
        Ok((rows, String::from_utf8(buffer).unwrap()))
    }

    #[test]
    fn header_and_one_row_per_record() {
        let store = InMemoryStore::new();
        put(&store, &record("/data/a.txt", "aa"));
        put(&store, &record("/data/b.txt", "bb"));

        let (rows, output) = export_to_string(&store).unwrap();

        assert_eq!(rows, 2);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "path,hash,size,modified");
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"/data/a.txt,aa,3,1700000000.25"));
        assert!(lines.contains(&"/data/b.txt,bb,3,1700000000.25"));
    }

    #[test]
    fn unset_stat_fields_are_empty_cells() {
        let store = InMemoryStore::new();
        let mut bare = record("/data/a.txt", "aa");
        bare.size = None;
        bare.modified = None;
        put(&store, &bare);

        let (_, output) = export_to_string(&store).unwrap();

        assert!(output.lines().any(|line| line == "/data/a.txt,aa,,"));
    }

    #[test]
    fn row_uses_the_data_entry_not_the_name_entry() {
        let store = InMemoryStore::new();
        let mut mixed = record("/data/a.txt", "data-digest");
        mixed.hash.insert(
            0,
            HashEntry {
                source: SourceType::Name,
                algorithm: "sha256".to_string(),
                value: "name-digest".to_string(),
            },
        );
        put(&store, &mixed);

        let (_, output) = export_to_string(&store).unwrap();

        assert!(output.contains("data-digest"));
        assert!(!output.contains("name-digest"));
    }

    #[test]
    fn empty_store_is_missing_hashes() {
        let store = InMemoryStore::new();

        let err = export_to_string(&store).unwrap_err();

        assert!(matches!(err, ExportError::MissingHashes { .. }));
    }

    #[test]
    fn record_without_data_digest_is_an_error() {
        let store = InMemoryStore::new();
        put(&store, &HashRecord::new("/data/a.txt"));

        let err = export_to_string(&store).unwrap_err();

        assert!(matches!(err, ExportError::MissingDataHash { path } if path == "/data/a.txt"));
    }

    #[test]
    fn corrupt_record_file_is_skipped_and_reported() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        put(&store, &record("/data/a.txt", "aa"));
        let broken = store.record_path(&hash_path_key("/data/b.txt"));
        fs::write(&broken, "{ \"path\": ").unwrap();
        let (sender, receiver) = EventChannel::new();

        let mut buffer: Vec<u8> = Vec::new();
        let rows = export_csv(&store, &mut buffer, &sender).unwrap();
        drop(sender);

        assert_eq!(rows, 1);
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.lines().count(), 2);
        assert!(output.contains("/data/a.txt,aa"));
        let skipped: Vec<_> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Export(ExportEvent::RecordSkipped { path, .. }) => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![broken]);
    }

    #[test]
    fn only_corrupt_records_is_missing_hashes() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        fs::write(store.record_path(&hash_path_key("/data/a.txt")), "not json").unwrap();

        let err = export_to_string(&store).unwrap_err();

        assert!(matches!(err, ExportError::MissingHashes { .. }));
    }
}
