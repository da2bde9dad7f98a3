//! Key builder: deterministic identity strings for graph nodes
//!
//! Every node written to the graph is merged by key, so the same logical
//! entity must always produce a byte-identical key. All keys are scoped by
//! the repo key supplied by the caller.


/// Build the key of a resolved symbol: `{repo_key}:{canonical_signature}`.
///
/// The signature must already disambiguate overloads and generics.
#[must_use]
pub fn symbol_key(repo_key: &str, canonical_signature: &str) -> String {
    format!("{repo_key}:{canonical_signature}")
}

/// Build the key of a file from its normalized, root-relative path.
#[must_use]
pub fn file_key(repo_key: &str, normalized_path: &str) -> String {
    format!("{repo_key}:{}", normalized_path.trim_start_matches('/'))
}

/// Build the key of an element scoped to a single file.
///
/// Format: `{file_key}:{kind}:{name}` with `:{line}` appended when known.
#[must_use]
pub fn element_key(file_key: &str, kind: &str, name: &str, line: Option<u32>) -> String {
    match line {
        Some(line) => format!("{file_key}:{kind}:{name}:{line}"),
        None => format!("{file_key}:{kind}:{name}"),
    }
}

/// Build the key of an external package dependency.
#[must_use]
pub fn dependency_key(name: &str, version: &str) -> String {
    format!("pkg:{name}:{version}")
}

/// Key builder bound to one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    repo_key: String,
}

impl KeyBuilder {
    /// Create a key builder for the given repo key
    #[must_use]
    pub fn new(repo_key: impl Into<String>) -> Self {
        Self {
            repo_key: repo_key.into(),
        }
    }

    /// The repo key every generated key is scoped to
    #[must_use]
    pub fn repo_key(&self) -> &str {
        &self.repo_key
    }

    #[must_use]
    pub fn symbol(&self, canonical_signature: &str) -> String {
        symbol_key(&self.repo_key, canonical_signature)
    }

    #[must_use]
    pub fn file(&self, normalized_path: &str) -> String {
        file_key(&self.repo_key, normalized_path)
    }
}
