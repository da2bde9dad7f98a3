//! Version control: change detection and file provenance from git
//!
//! All paths crossing this boundary are absolute and normalized with
//! forward slashes, so they compare equal to scanner output.

mod git;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::graph::model::AuthorStats;

pub use git::GitRepository;

/// Errors from the version-control collaborator. All of them are fatal
/// for the run.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("No git repository found at or above {path}")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository at {0} has no working directory")]
    BareRepository(PathBuf),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("A diff base was given but no git repository is available")]
    Unavailable,

    #[error("Source root {root} is outside repository {repository}")]
    OutsideRepository { root: PathBuf, repository: String },
}

/// Files changed between the diff base and HEAD
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    pub modified: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
}

/// A commit in the diff range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
    pub message: String,
    /// Normalized absolute paths touched by the commit
    pub changed_files: Vec<String>,
}

/// Git provenance of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub authors: Vec<AuthorStats>,
    /// Newest first
    pub commit_hashes: Vec<String>,
    pub tags: Vec<String>,
}

/// Version-control collaborator used by the change-set resolver and the
/// file enrichment step.
pub trait VersionControl: Send + Sync {
    /// Normalized working-tree root of the repository
    fn repository_root(&self) -> &str;

    /// Files added, modified or deleted between `merge-base(base, HEAD)` and
    /// HEAD, restricted to `source_root` and `extensions`.
    ///
    /// # Errors
    /// Returns an error if the base cannot be resolved or the diff fails.
    fn changed_files(
        &self,
        base: &str,
        source_root: &Path,
        extensions: &[String],
    ) -> Result<ChangedFiles, VcsError>;

    /// Commits reachable from HEAD but not from `base`, newest first
    ///
    /// # Errors
    /// Returns an error if the base cannot be resolved or history walking fails.
    fn commits_since(&self, base: &str) -> Result<Vec<CommitInfo>, VcsError>;

    /// Provenance of a file; empty when history is unavailable
    fn file_metadata(&self, path: &str) -> FileMetadata;
}
