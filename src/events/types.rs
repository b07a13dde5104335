//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the fingerprint pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Indexing phase events
    Index(IndexEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// CSV and table export events
    Export(ExportEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the indexing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexEvent {
    /// Walking has started
    Started { root: PathBuf },
    /// A regular file was written to the index
    FileIndexed { path: PathBuf },
    /// An index already exists and was reused
    Reused { index_file: PathBuf },
    /// An entry could not be indexed but walking continues
    Error { path: PathBuf, message: String },
    /// Indexing completed
    Completed { total_files: usize },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_paths: usize },
    /// Progress update during hashing
    Progress(HashProgress),
    /// A record was written for this path
    RecordWritten { path: PathBuf },
    /// A record already existed and was left untouched
    CacheHit { path: PathBuf },
    /// A stored record could not be parsed and is being regenerated
    CorruptRecord { path: PathBuf, message: String },
    /// A file failed to fingerprint but hashing continues
    Error { path: PathBuf, message: String },
    /// Hashing completed
    Completed {
        processed: usize,
        cache_hits: usize,
        errors: usize,
    },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of paths handled so far
    pub completed: usize,
    /// Total number of indexed paths
    pub total: usize,
    /// Path just handled
    pub current_path: PathBuf,
    /// Number of cache hits so far
    pub cache_hits: usize,
}

/// Events during report export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportEvent {
    /// Export of an artifact has started
    Started { format: ExportFormat },
    /// A record was skipped during export
    RecordSkipped { path: PathBuf, message: String },
    /// Export of an artifact completed
    Completed {
        format: ExportFormat,
        rows: usize,
        output: PathBuf,
    },
}

/// Artifacts produced by the export phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Table,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// A phase failed and the pipeline stopped
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Indexing,
    Hashing,
    ExportingCsv,
    ExportingTable,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Indexing => write!(f, "Indexing"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::ExportingCsv => write!(f, "Exporting CSV"),
            PipelinePhase::ExportingTable => write!(f, "Exporting table"),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Hash(HashEvent::Progress(HashProgress {
            completed: 10,
            total: 50,
            current_path: PathBuf::from("/data/a.bin"),
            cache_hits: 4,
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Hash(HashEvent::Progress(p)) => {
                assert_eq!(p.total, 50);
                assert_eq!(p.cache_hits, 4);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(PipelinePhase::ExportingCsv.to_string(), "Exporting CSV");
        assert_eq!(ExportFormat::Table.to_string(), "table");
    }
}
