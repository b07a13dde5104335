//! Temp-file helpers for artifacts that are written then renamed into place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Sibling path used while `target` is being written
///
/// Kept in the same directory so the final rename never crosses filesystems.
pub(crate) fn temp_sibling(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Remove a temp file left by a failed write.
///
/// A file that is already gone is fine; any other failure is logged.
pub(crate) fn discard_temp(temp: &Path) {
    match fs::remove_file(temp) {
        Err(e) if e.kind() != ErrorKind::NotFound => {
            tracing::warn!(path = %temp.display(), "failed to remove temp file: {e}");
        }
        _ => {}
    }
}
