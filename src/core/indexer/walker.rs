//! Directory walking implementation using walkdir.

use super::{IndexResult, INDEX_LINE_TERMINATOR};
use crate::error::IndexError;
use crate::events::{Event, EventSender, IndexEvent};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Writes one absolute path per regular file under a root
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDirIndexer;

impl WalkDirIndexer {
    pub fn new() -> Self {
        Self
    }

    /// Index `root` into `out` without progress reporting
    pub fn build_index<W: Write>(&self, root: &Path, out: W) -> Result<IndexResult, IndexError> {
        self.build_index_with_events(root, out, &crate::events::null_sender())
    }

    /// Index `root` into `out`, reporting through `events`.
    ///
    /// Symlinks are not followed and are never written; neither are
    /// directories or special files. Entries that cannot be read are recorded
    /// in the result and skipped.
    pub fn build_index_with_events<W: Write>(
        &self,
        root: &Path,
        mut out: W,
        events: &EventSender,
    ) -> Result<IndexResult, IndexError> {
        let root = absolute_root(root)?;

        events.send(Event::Index(IndexEvent::Started { root: root.clone() }));

        let walker = WalkDir::new(&root).follow_links(false);

        let mut files_indexed = 0;
        let mut errors = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let error = IndexError::Walk {
                        path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                        reason: e.to_string(),
                    };
                    report(events, &error);
                    errors.push(error);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(path_str) = entry.path().to_str() else {
                let error = IndexError::NonUtf8Path {
                    path: entry.path().to_path_buf(),
                };
                report(events, &error);
                errors.push(error);
                continue;
            };

            write!(out, "{path_str}{INDEX_LINE_TERMINATOR}").map_err(|source| {
                IndexError::Write {
                    path: entry.path().to_path_buf(),
                    source,
                }
            })?;
            files_indexed += 1;

            tracing::debug!(path = %path_str, "indexed");
            events.send(Event::Index(IndexEvent::FileIndexed {
                path: entry.path().to_path_buf(),
            }));
        }

        out.flush().map_err(|source| IndexError::Write {
            path: root.clone(),
            source,
        })?;

        events.send(Event::Index(IndexEvent::Completed {
            total_files: files_indexed,
        }));

        Ok(IndexResult {
            files_indexed,
            errors,
        })
    }
}

/// Resolve the walk root to an absolute directory path
fn absolute_root(root: &Path) -> Result<PathBuf, IndexError> {
    let resolved = fs::canonicalize(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IndexError::RootNotFound {
            path: root.to_path_buf(),
        },
        _ => IndexError::Walk {
            path: root.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    if !resolved.is_dir() {
        return Err(IndexError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    Ok(resolved)
}

fn report(events: &EventSender, error: &IndexError) {
    let path = match error {
        IndexError::Walk { path, .. } | IndexError::NonUtf8Path { path } => path.clone(),
        _ => PathBuf::new(),
    };
    tracing::warn!(path = %path.display(), "{error}");
    events.send(Event::Index(IndexEvent::Error {
        path,
        message: error.to_string(),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn index_to_string(root: &Path) -> (IndexResult, String) {
        let mut buffer: Vec<u8> = Vec::new();
        let result = WalkDirIndexer::new().build_index(root, &mut buffer).unwrap();
        (result, String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn empty_directory_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();

        let (result, output) = index_to_string(temp_dir.path());

        assert_eq!(result.files_indexed, 0);
        assert!(result.errors.is_empty());
        assert!(output.is_empty());
    }

    #[test]
    fn nested_files_are_listed_with_crlf() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("nested").join("deeper");
        fs::create_dir_all(&subdir).unwrap();
        File::create(temp_dir.path().join("root.txt")).unwrap();
        File::create(subdir.join("leaf.bin")).unwrap();

        let (result, output) = index_to_string(temp_dir.path());

        assert_eq!(result.files_indexed, 2);
        assert_eq!(output.matches("\r\n").count(), 2);
        assert!(output.ends_with("\r\n"));
        for line in output.split_terminator("\r\n") {
            assert!(Path::new(line).is_absolute(), "{line} is not absolute");
            assert!(Path::new(line).is_file());
        }
    }

    #[test]
    fn hidden_files_are_included() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join(".env")).unwrap();

        let (result, _) = index_to_string(temp_dir.path());

        assert_eq!(result.files_indexed, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.txt");
        File::create(&target).unwrap();
        std::os::unix::fs::symlink(&target, temp_dir.path().join("link.txt")).unwrap();

        let (result, output) = index_to_string(temp_dir.path());

        assert_eq!(result.files_indexed, 1);
        assert!(output.contains("real.txt"));
        assert!(!output.contains("link.txt"));
    }

    #[test]
    fn nonexistent_root_is_an_error() {
        let err = WalkDirIndexer::new()
            .build_index(Path::new("/nonexistent/path/12345"), Vec::<u8>::new())
            .unwrap_err();

        assert!(matches!(err, IndexError::RootNotFound { .. }));
    }

    #[test]
    fn file_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        File::create(&file).unwrap();

        let err = WalkDirIndexer::new().build_index(&file, Vec::<u8>::new()).unwrap_err();

        assert!(matches!(err, IndexError::NotADirectory { .. }));
    }
}
