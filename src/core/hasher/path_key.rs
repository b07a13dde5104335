//! Cache keys derived from path strings.

use sha2::{Digest, Sha256};

/// Compute the cache key for a path string.
///
/// The key is the SHA-256 of the string's UTF-8 bytes, hex encoded. No
/// normalization happens here: `/a/b` and `/a/b/` are different keys, so
/// callers must pass the same absolute form every time.
pub fn hash_path_key(file_path: &str) -> String {
    hex::encode(Sha256::digest(file_path.as_bytes()))
}
