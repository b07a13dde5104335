//! DataSet construction and stage execution.

use super::layout::DataSetLayout;
use crate::core::atomic::{discard_temp, temp_sibling};
use crate::core::cache::{HashRecord, JsonFileStore, RecordStore};
use crate::core::fingerprint::FingerprintEngine;
use crate::core::hasher::hash_path_key;
use crate::core::indexer::{read_index, WalkDirIndexer};
use crate::core::reporter::{export_csv, export_table};
use crate::error::{ExportError, FingerprintError, IndexError, StoreError};
use crate::events::{
    null_sender, Event, EventSender, ExportEvent, ExportFormat, HashEvent, HashProgress,
    IndexEvent, PipelineEvent, PipelinePhase,
};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Outcome of [`DataSet::build_index`]
#[derive(Debug)]
pub struct IndexSummary {
    /// Paths in the index (0 when an existing index was reused)
    pub files_indexed: usize,
    /// An existing index was kept as is
    pub reused: bool,
    /// Entries skipped during the walk (non-fatal)
    pub errors: Vec<IndexError>,
}

/// Outcome of [`DataSet::hash`]
#[derive(Debug)]
pub struct HashSummary {
    /// Paths read from the index
    pub total_paths: usize,
    /// Records created or rewritten
    pub processed: usize,
    /// Existing records left untouched
    pub skipped: usize,
    /// Stored records that failed to parse and were regenerated
    pub corrupt: usize,
    /// Per-file failures (non-fatal)
    pub errors: Vec<FingerprintError>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Outcome of [`DataSet::run`]
#[derive(Debug)]
pub struct RunSummary {
    pub index: IndexSummary,
    pub hash: HashSummary,
    pub csv_rows: usize,
    pub table_rows: usize,
}

/// Configuration for a catalog
#[derive(Debug, Clone)]
struct DataSetConfig {
    /// Catalog name, also the directory name under `metadata_root`
    pub name: String,
    /// Directory tree to fingerprint
    pub search_path: PathBuf,
    /// Parent directory of every catalog
    pub metadata_root: PathBuf,
    /// Remove all existing artifacts when opening
    pub recreate: bool,
    /// Build the index when opening
    pub auto_index: bool,
}

impl Default for DataSetConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            search_path: PathBuf::new(),
            metadata_root: PathBuf::from("."),
            recreate: false,
            auto_index: true,
        }
    }
}

impl DataSetConfig {
    fn validate(&self) -> Result<(), FingerprintError> {
        let name = self.name.as_str();
        if name.is_empty() || name == "." || name == ".." {
            return Err(FingerprintError::Config(format!(
                "invalid catalog name {name:?}"
            )));
        }
        if name.contains(['/', '\\']) {
            return Err(FingerprintError::Config(format!(
                "catalog name {name:?} must not contain path separators"
            )));
        }
        if self.search_path.as_os_str().is_empty() {
            return Err(FingerprintError::Config(
                "search path is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for a [`DataSet`]
pub struct DataSetBuilder {
    config: DataSetConfig,
    store: Option<Box<dyn RecordStore>>,
    events: Option<EventSender>,
}

impl DataSetBuilder {
    pub fn new() -> Self {
        Self {
            config: DataSetConfig::default(),
            store: None,
            events: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.search_path = path.into();
        self
    }

    pub fn metadata_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.metadata_root = path.into();
        self
    }

    /// Remove every existing artifact of the catalog when opening
    pub fn recreate(mut self, recreate: bool) -> Self {
        self.config.recreate = recreate;
        self
    }

    /// Build the index as part of opening
    pub fn auto_index(mut self, auto_index: bool) -> Self {
        self.config.auto_index = auto_index;
        self
    }

    /// Use a record store other than the JSON directory
    pub fn store(mut self, store: Box<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Report progress through `events`
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Prepare the catalog directory and open the catalog.
    ///
    /// With `recreate`, the whole `{metadata_root}/{name}` directory is
    /// removed first. With `auto_index`, the index is built before returning.
    pub fn open(self) -> Result<DataSet, FingerprintError> {
        self.config.validate()?;

        let layout = DataSetLayout::new(&self.config.metadata_root, &self.config.name);
        let base = layout.metadata_base();

        if self.config.recreate && base.is_dir() {
            tracing::warn!(name = %self.config.name, path = %base.display(), "removing existing catalog");
            fs::remove_dir_all(base).map_err(|source| FingerprintError::Layout {
                path: base.to_path_buf(),
                source,
            })?;
        }

        fs::create_dir_all(base).map_err(|source| FingerprintError::Layout {
            path: base.to_path_buf(),
            source,
        })?;

        let store: Box<dyn RecordStore> = match self.store {
            Some(store) => store,
            None => Box::new(JsonFileStore::open(layout.hash_path())?),
        };

        let dataset = DataSet {
            config: self.config,
            layout,
            store,
            events: self.events.unwrap_or_else(null_sender),
            indexer: WalkDirIndexer::new(),
            engine: FingerprintEngine::new(),
        };

        if dataset.config.auto_index {
            tracing::info!(name = %dataset.config.name, "auto-indexing");
            dataset.build_index(dataset.config.recreate)?;
        }

        Ok(dataset)
    }
}

impl Default for DataSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A named fingerprint catalog of one directory tree
pub struct DataSet {
    config: DataSetConfig,
    layout: DataSetLayout,
    store: Box<dyn RecordStore>,
    events: EventSender,
    indexer: WalkDirIndexer,
    engine: FingerprintEngine,
}

enum PathOutcome {
    Written,
    Skipped,
    Failed(FingerprintError),
}

impl DataSet {
    pub fn builder() -> DataSetBuilder {
        DataSetBuilder::new()
    }

    pub fn layout(&self) -> &DataSetLayout {
        &self.layout
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Write the index of the search path.
    ///
    /// An existing index is reused unless `recreate` is set. The index is
    /// written to a temporary file and renamed into place, so a failed walk
    /// never leaves a partial index that a later run would reuse.
    pub fn build_index(&self, recreate: bool) -> Result<IndexSummary, FingerprintError> {
        self.phase(PipelinePhase::Indexing);
        let index_file = self.layout.index_file();

        if recreate && index_file.exists() {
            tracing::info!(path = %index_file.display(), "removing existing index");
            remove_if_present(index_file).map_err(|source| IndexError::Write {
                path: index_file.to_path_buf(),
                source,
            })?;
        }

        if index_file.exists() {
            tracing::info!(path = %index_file.display(), "index already exists, skipping");
            self.events.send(Event::Index(IndexEvent::Reused {
                index_file: index_file.to_path_buf(),
            }));
            return Ok(IndexSummary {
                files_indexed: 0,
                reused: true,
                errors: Vec::new(),
            });
        }

        tracing::info!(root = %self.config.search_path.display(), "indexing search path");
        self.ensure_dir(self.layout.metadata_base())?;

        let temp = temp_sibling(index_file);
        let result = write_atomically(&temp, index_file, |file| {
            let mut out = BufWriter::new(file);
            let result =
                self.indexer
                    .build_index_with_events(&self.config.search_path, &mut out, &self.events)?;
            out.flush().map_err(|source| IndexError::Write {
                path: temp.clone(),
                source,
            })?;
            Ok::<_, IndexError>(result)
        })
        .map_err(|e| self.stage_failed(e))?;

        tracing::info!(files = result.files_indexed, skipped = result.errors.len(), "index written");

        Ok(IndexSummary {
            files_indexed: result.files_indexed,
            reused: false,
            errors: result.errors,
        })
    }

    /// Create or refresh the record of every indexed path.
    ///
    /// - `recreate` clears every stored record first.
    /// - Without `update`, a path whose record exists is left alone.
    /// - With `update`, existing records are reprocessed: stat fields are
    ///   refreshed and a missing content digest is computed, but a stored
    ///   digest is never recomputed.
    ///
    /// A stored record that fails to parse is regenerated as if absent. A path
    /// that cannot be fingerprinted is logged, reported and skipped.
    pub fn hash(&self, recreate: bool, update: bool) -> Result<HashSummary, FingerprintError> {
        let start_time = Instant::now();

        if recreate {
            tracing::info!(path = %self.store.location().display(), "removing existing records");
            self.store.clear()?;
        }

        if !self.layout.index_file().exists() {
            self.build_index(recreate)?;
        }

        self.phase(PipelinePhase::Hashing);
        let paths = read_index(self.layout.index_file())?;
        let total_paths = paths.len();

        tracing::info!(total = total_paths, update, "hashing files");
        self.events.send(Event::Hash(HashEvent::Started { total_paths }));

        let completed = AtomicUsize::new(0);
        let cache_hits = AtomicUsize::new(0);
        let corrupt = AtomicUsize::new(0);

        let outcomes: Vec<PathOutcome> = paths
            .par_iter()
            .map(|path| {
                let outcome = self.hash_path(path, update, &corrupt);

                if matches!(outcome, PathOutcome::Skipped) {
                    cache_hits.fetch_add(1, Ordering::SeqCst);
                }
                let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                self.events.send(Event::Hash(HashEvent::Progress(HashProgress {
                    completed: current,
                    total: total_paths,
                    current_path: PathBuf::from(path),
                    cache_hits: cache_hits.load(Ordering::SeqCst),
                })));

                outcome
            })
            .collect();

        let mut processed = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                PathOutcome::Written => processed += 1,
                PathOutcome::Skipped => skipped += 1,
                PathOutcome::Failed(e) => errors.push(e),
            }
        }

        self.events.send(Event::Hash(HashEvent::Completed {
            processed,
            cache_hits: skipped,
            errors: errors.len(),
        }));

        let summary = HashSummary {
            total_paths,
            processed,
            skipped,
            corrupt: corrupt.load(Ordering::SeqCst),
            errors,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        tracing::info!(
            processed = summary.processed,
            skipped = summary.skipped,
            corrupt = summary.corrupt,
            errors = summary.errors.len(),
            duration_ms = summary.duration_ms,
            "hashing completed"
        );

        Ok(summary)
    }

    fn hash_path(&self, path: &str, update: bool, corrupt: &AtomicUsize) -> PathOutcome {
        tracing::debug!(path = %path, "hashing");
        let key = hash_path_key(path);

        let existing = match self.existing_record(&key, corrupt) {
            Ok(existing) => existing,
            Err(e) => return self.path_failed(path, e.into()),
        };

        if existing.is_some() && !update {
            self.events.send(Event::Hash(HashEvent::CacheHit {
                path: PathBuf::from(path),
            }));
            return PathOutcome::Skipped;
        }

        let record = match self.engine.process(path, existing) {
            Ok(record) => record,
            Err(e) => return self.path_failed(path, e.into()),
        };

        if let Err(e) = self.store.save(&key, &record) {
            return self.path_failed(path, e.into());
        }

        self.events.send(Event::Hash(HashEvent::RecordWritten {
            path: PathBuf::from(path),
        }));
        PathOutcome::Written
    }

    /// Load the record stored under `key`, treating a corrupt one as absent
    fn existing_record(
        &self,
        key: &str,
        corrupt: &AtomicUsize,
    ) -> Result<Option<HashRecord>, StoreError> {
        if !self.store.exists(key)? {
            return Ok(None);
        }

        match self.store.load(key) {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(StoreError::Corrupt { path, reason }) => {
                corrupt.fetch_add(1, Ordering::SeqCst);
                tracing::warn!(path = %path.display(), %reason, "corrupt record, regenerating");
                self.events.send(Event::Hash(HashEvent::CorruptRecord {
                    path,
                    message: reason,
                }));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn path_failed(&self, path: &str, error: FingerprintError) -> PathOutcome {
        tracing::warn!(path = %path, "{error}");
        self.events.send(Event::Hash(HashEvent::Error {
            path: PathBuf::from(path),
            message: error.to_string(),
        }));
        PathOutcome::Failed(error)
    }

    /// Export the record cache as `{name}.csv`.
    ///
    /// The CSV is written to a temporary file and renamed into place. On any
    /// failure both the temporary file and any previous CSV are removed, so a
    /// stale report never outlives a failed export.
    pub fn generate_csv(&self) -> Result<usize, FingerprintError> {
        self.phase(PipelinePhase::ExportingCsv);
        tracing::info!(name = %self.config.name, "generating csv");

        let csv_file = self.layout.csv_file();
        self.ensure_dir(self.layout.metadata_base())?;
        let temp = temp_sibling(csv_file);

        let result = write_atomically(&temp, csv_file, |file| {
            let mut out = BufWriter::new(file);
            let rows = export_csv(self.store.as_ref(), &mut out, &self.events)?;
            out.flush().map_err(|source| ExportError::Io {
                path: temp.clone(),
                source,
            })?;
            Ok::<_, ExportError>(rows)
        });

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                if let Err(remove_err) = remove_if_present(csv_file) {
                    tracing::warn!(path = %csv_file.display(), "failed to remove stale csv: {remove_err}");
                }
                return Err(self.stage_failed(e));
            }
        };

        self.events.send(Event::Export(ExportEvent::Completed {
            format: ExportFormat::Csv,
            rows,
            output: csv_file.to_path_buf(),
        }));
        tracing::info!(rows, path = %csv_file.display(), "csv written");

        Ok(rows)
    }

    /// Build `{name}.table` from the CSV, generating the CSV first if needed
    pub fn generate_dataframe(&self) -> Result<usize, FingerprintError> {
        let csv_file = self.layout.csv_file();
        if !csv_file.exists() {
            self.generate_csv()?;
        }

        self.phase(PipelinePhase::ExportingTable);
        tracing::info!(name = %self.config.name, "generating table");
        self.events.send(Event::Export(ExportEvent::Started {
            format: ExportFormat::Table,
        }));

        let table_file = self.layout.table_file();
        let rows = export_table(csv_file, table_file).map_err(|e| self.stage_failed(e))?;

        self.events.send(Event::Export(ExportEvent::Completed {
            format: ExportFormat::Table,
            rows,
            output: table_file.to_path_buf(),
        }));
        tracing::info!(rows, path = %table_file.display(), "table written");

        Ok(rows)
    }

    /// Run every stage in order: index, hash, CSV, table.
    ///
    /// The CSV is always regenerated so it reflects this hash pass.
    pub fn run(&self, update: bool) -> Result<RunSummary, FingerprintError> {
        self.events.send(Event::Pipeline(PipelineEvent::Started));

        let index = self.build_index(false)?;
        let hash = self.hash(false, update)?;
        let csv_rows = self.generate_csv()?;
        let table_rows = self.generate_dataframe()?;

        Ok(RunSummary {
            index,
            hash,
            csv_rows,
            table_rows,
        })
    }

    fn phase(&self, phase: PipelinePhase) {
        self.events
            .send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), FingerprintError> {
        fs::create_dir_all(dir).map_err(|source| FingerprintError::Layout {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn stage_failed(&self, error: impl Into<FingerprintError>) -> FingerprintError {
        let error = error.into();
        tracing::error!("{error}");
        self.events.send(Event::Pipeline(PipelineEvent::Error {
            message: error.to_string(),
        }));
        error
    }
}

/// Run `write` against a fresh `temp` file, then rename it over `target`.
///
/// The temp file is removed if writing or renaming fails.
fn write_atomically<T, E>(
    temp: &Path,
    target: &Path,
    write: impl FnOnce(File) -> Result<T, E>,
) -> Result<T, FingerprintError>
where
    E: Into<FingerprintError>,
{
    let file = File::create(temp).map_err(|source| FingerprintError::Layout {
        path: temp.to_path_buf(),
        source,
    })?;

    let value = match write(file) {
        Ok(value) => value,
        Err(e) => {
            discard_temp(temp);
            return Err(e.into());
        }
    };

    if let Err(source) = fs::rename(temp, target) {
        discard_temp(temp);
        return Err(FingerprintError::Layout {
            path: target.to_path_buf(),
            source,
        });
    }

    Ok(value)
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
