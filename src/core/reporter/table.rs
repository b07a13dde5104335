//! Compressed columnar table built from the CSV report.

use super::ReportRow;
use crate::core::atomic::{discard_temp, temp_sibling};
use crate::error::ExportError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Bumped whenever the column layout changes
pub const TABLE_FORMAT_VERSION: u32 = 1;

/// The report stored column-wise
///
/// All columns always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintTable {
    pub version: u32,
    pub path: Vec<String>,
    pub hash: Vec<String>,
    pub size: Vec<Option<u64>>,
    pub modified: Vec<Option<f64>>,
}

impl Default for FingerprintTable {
    fn default() -> Self {
        Self {
            version: TABLE_FORMAT_VERSION,
            path: Vec::new(),
            hash: Vec::new(),
            size: Vec::new(),
            modified: Vec::new(),
        }
    }
}

impl FingerprintTable {
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Append one report row
    pub fn push(&mut self, row: ReportRow) {
        self.path.push(row.path);
        self.hash.push(row.hash);
        self.size.push(row.size);
        self.modified.push(row.modified);
    }

    /// Iterate the table row by row
    pub fn rows(&self) -> impl Iterator<Item = ReportRow> + '_ {
        (0..self.len()).map(move |i| ReportRow {
            path: self.path[i].clone(),
            hash: self.hash[i].clone(),
            size: self.size[i],
            modified: self.modified[i],
        })
    }

    fn is_consistent(&self) -> bool {
        let n = self.path.len();
        self.hash.len() == n && self.size.len() == n && self.modified.len() == n
    }
}

/// Build the table from `csv_file` and write it to `table_file`.
///
/// The table is written to a temporary sibling and renamed into place, so a
/// failed export never leaves a truncated table behind. Returns the number of
/// rows.
pub fn export_table(csv_file: &Path, table_file: &Path) -> Result<usize, ExportError> {
    let table = read_csv(csv_file)?;
    let temp = temp_sibling(table_file);

    if let Err(e) = write_table(&table, &temp) {
        discard_temp(&temp);
        return Err(e);
    }

    if let Err(source) = fs::rename(&temp, table_file) {
        discard_temp(&temp);
        return Err(ExportError::Io {
            path: table_file.to_path_buf(),
            source,
        });
    }

    tracing::debug!(rows = table.len(), path = %table_file.display(), "table written");
    Ok(table.len())
}

/// Decode a table written by [`export_table`]
pub fn read_table(table_file: &Path) -> Result<FingerprintTable, ExportError> {
    let file = File::open(table_file).map_err(|source| ExportError::Io {
        path: table_file.to_path_buf(),
        source,
    })?;

    let decoder = GzDecoder::new(BufReader::new(file));
    let table: FingerprintTable =
        bincode::deserialize_from(decoder).map_err(|e| ExportError::Decode {
            path: table_file.to_path_buf(),
            reason: e.to_string(),
        })?;

    if table.version != TABLE_FORMAT_VERSION {
        return Err(ExportError::Decode {
            path: table_file.to_path_buf(),
            reason: format!(
                "unsupported table version {} (expected {TABLE_FORMAT_VERSION})",
                table.version
            ),
        });
    }
    if !table.is_consistent() {
        return Err(ExportError::Decode {
            path: table_file.to_path_buf(),
            reason: "column lengths differ".to_string(),
        });
    }

    Ok(table)
}

fn read_csv(csv_file: &Path) -> Result<FingerprintTable, ExportError> {
    let file = File::open(csv_file).map_err(|source| ExportError::Io {
        path: csv_file.to_path_buf(),
        source,
    })?;

    let mut reader = ::csv::Reader::from_reader(BufReader::new(file));
    let mut table = FingerprintTable::default();
    for row in reader.deserialize::<ReportRow>() {
        table.push(row?);
    }

    Ok(table)
}

fn write_table(table: &FingerprintTable, path: &Path) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

    bincode::serialize_into(&mut encoder, table).map_err(|e| ExportError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut writer = encoder.finish().map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_CSV: &str = "path,hash,size,modified\n\
        /data/a.txt,aa,3,1700000000.25\n\
        /data/b.txt,bb,,\n";

    #[test]
    fn csv_round_trips_through_the_table() {
        let dir = TempDir::new().unwrap();
        let csv_file = dir.path().join("set.csv");
        let table_file = dir.path().join("set.table");
        fs::write(&csv_file, SAMPLE_CSV).unwrap();

        let rows = export_table(&csv_file, &table_file).unwrap();
        let table = read_table(&table_file).unwrap();

        assert_eq!(rows, 2);
        assert_eq!(table.version, TABLE_FORMAT_VERSION);
        assert_eq!(table.path, vec!["/data/a.txt", "/data/b.txt"]);
        assert_eq!(table.hash, vec!["aa", "bb"]);
        assert_eq!(table.size, vec![Some(3), None]);
        assert_eq!(table.modified, vec![Some(1_700_000_000.25), None]);
        assert!(!temp_sibling(&table_file).exists());
    }

    #[test]
    fn rows_yield_report_rows_in_order() {
        let mut table = FingerprintTable::default();
        table.push(ReportRow {
            path: "/a".to_string(),
            hash: "aa".to_string(),
            size: Some(1),
            modified: None,
        });

        let rows: Vec<ReportRow> = table.rows().collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "/a");
        assert_eq!(rows[0].size, Some(1));
    }

    #[test]
    fn missing_csv_is_io_error() {
        let dir = TempDir::new().unwrap();

        let err = export_table(&dir.path().join("absent.csv"), &dir.path().join("t")).unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let csv_file = dir.path().join("set.csv");
        let table_file = dir.path().join("set.table");
        fs::write(&csv_file, SAMPLE_CSV).unwrap();
        fs::create_dir(&table_file).unwrap();
        fs::write(table_file.join("occupied"), "x").unwrap();

        let err = export_table(&csv_file, &table_file).unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }));
        assert!(!temp_sibling(&table_file).exists());
    }

    #[test]
    fn garbage_table_fails_to_decode() {
        let dir = TempDir::new().unwrap();
        let table_file = dir.path().join("set.table");
        fs::write(&table_file, b"not a gzip stream").unwrap();

        let err = read_table(&table_file).unwrap_err();

        assert!(matches!(err, ExportError::Decode { .. }));
    }
}
