//! Content digests over file bytes.

use super::{HashAlgorithmKind, CONTENT_ALGORITHM};
use crate::error::HashError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Read buffer used when streaming a file through the digest
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// A computed content digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigest {
    /// Algorithm that produced `value`
    pub algorithm: HashAlgorithmKind,
    /// Lowercase hex digest
    pub value: String,
}

/// Digest an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> ContentDigest {
    ContentDigest {
        algorithm: CONTENT_ALGORITHM,
        value: hex::encode(Sha256::digest(data)),
    }
}

/// Digest the full contents of a file.
///
/// The file is streamed through the hasher, which produces the same value as
/// [`hash_bytes`] over the whole file without holding it in memory.
pub fn hash_file(path: &Path) -> Result<ContentDigest, HashError> {
    let file = File::open(path).map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ContentDigest {
        algorithm: CONTENT_ALGORITHM,
        value: hex::encode(hasher.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn empty_input_has_known_digest() {
        assert_eq!(
            hash_bytes(b"").value,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn streamed_file_matches_buffer_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("large.bin");

        // Larger than one read buffer so the stream spans several chunks
        let data: Vec<u8> = (0..(READ_BUFFER_SIZE * 3 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&data)
            .unwrap();

        let from_file = hash_file(&path).unwrap();

        assert_eq!(from_file, hash_bytes(&data));
        assert_eq!(from_file.algorithm.as_str(), "sha256");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vanished.txt");

        let err = hash_file(&path).unwrap_err();

        match err {
            HashError::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
        }
    }
}
