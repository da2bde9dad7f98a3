//! Scanner module: File discovery, path normalization and content hashing
//!
//! Responsible for walking the source root, respecting .gitignore and a
//! fixed set of build/tooling directories, and producing normalized
//! forward-slash paths so file keys are stable across platforms.

mod path;
mod walker;

use sha2::{Digest, Sha256};

pub use path::{extension_matches, normalize_extensions, normalize_path, relative_path};
pub use walker::{DEFAULT_EXTENSIONS, DiscoveredFile, EXCLUDED_DIRS, Scanner};

/// Lowercase hex SHA-256 of file content
#[must_use]
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
