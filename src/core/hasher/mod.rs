//! # Hasher Module
//!
//! The two digests the catalog is built on:
//! - **path key** - SHA-256 of a path string, used only as a cache filename
//! - **content digest** - SHA-256 of a file's bytes, the actual fingerprint
//!
//! Both are lowercase hex, 64 characters.
//!
//! ## Example
//! ```rust,ignore
//! use file_fingerprint::core::hasher::{hash_path_key, hash_file};
//!
//! let key = hash_path_key("/data/report.pdf");
//! let digest = hash_file(Path::new("/data/report.pdf"))?;
//! ```

mod content;
mod path_key;

pub use content::{hash_bytes, hash_file, ContentDigest};
pub use path_key::hash_path_key;

use serde::{Deserialize, Serialize};

/// Digest algorithms the catalog knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithmKind {
    Sha256,
}

impl HashAlgorithmKind {
    /// Identifier persisted in the `type` field of a hash entry
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm used for content digests
pub const CONTENT_ALGORITHM: HashAlgorithmKind = HashAlgorithmKind::Sha256;
