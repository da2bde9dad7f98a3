//! Change-set resolution: which files a run must touch
//!
//! A run is either a full resync, an incremental run restricted to the
//! files changed since a diff base, or a forced run that processes every
//! file but still ingests the commit history of the range.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::scanner::{DiscoveredFile, normalize_path, relative_path};
use crate::vcs::{CommitInfo, VcsError, VersionControl};


/// How a run selects its files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// No diff base: every discovered file, no deletions tracked
    Full,
    /// Diff base: only modified files, deleted files tombstoned
    Incremental,
    /// Diff base with force: every discovered file, commits still ingested
    Forced,
}

impl SyncMode {
    #[must_use]
    pub fn from_options(diff_base: Option<&str>, force: bool) -> Self {
        match (diff_base, force) {
            (None, _) => Self::Full,
            (Some(_), false) => Self::Incremental,
            (Some(_), true) => Self::Forced,
        }
    }

    /// Whether this mode consults version control
    #[must_use]
    pub fn uses_history(self) -> bool {
        !matches!(self, Self::Full)
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Incremental => write!(f, "incremental"),
            Self::Forced => write!(f, "forced"),
        }
    }
}

/// The resolved work of one run. Paths are normalized absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub mode: SyncMode,
    pub modified: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    /// Newest first
    pub commits: Vec<CommitInfo>,
}

impl ChangeSet {
    /// A full resync: no diff, no deletions, no commits
    #[must_use]
    pub fn full() -> Self {
        Self {
            mode: SyncMode::Full,
            modified: BTreeSet::new(),
            deleted: BTreeSet::new(),
            commits: Vec::new(),
        }
    }

    /// Files to process, in discovery order
    #[must_use]
    pub fn worklist<'a>(&self, discovered: &'a [DiscoveredFile]) -> Vec<&'a DiscoveredFile> {
        match self.mode {
            SyncMode::Full | SyncMode::Forced => discovered.iter().collect(),
            SyncMode::Incremental => discovered
                .iter()
                .filter(|file| self.modified.contains(&file.path))
                .collect(),
        }
    }

    /// Files to tombstone. Only incremental runs track deletions.
    #[must_use]
    pub fn tombstones(&self) -> impl Iterator<Item = &str> {
        self.deleted
            .iter()
            .filter(|_| self.mode == SyncMode::Incremental)
            .map(String::as_str)
    }
}

/// Resolves a [`ChangeSet`] against an optional version-control collaborator
pub struct ChangeSetResolver<'a> {
    vcs: Option<&'a dyn VersionControl>,
}

impl<'a> ChangeSetResolver<'a> {
    #[must_use]
    pub fn new(vcs: Option<&'a dyn VersionControl>) -> Self {
        Self { vcs }
    }

    /// Resolve the change set for a run.
    ///
    /// # Errors
    /// Returns an error if a diff base is given and version control is
    /// unavailable or fails. Such failures abort the run.
    pub fn resolve(
        &self,
        diff_base: Option<&str>,
        force: bool,
        source_root: &Path,
        extensions: &[String],
    ) -> Result<ChangeSet, VcsError> {
        let mode = SyncMode::from_options(diff_base, force);
        let Some(base) = diff_base else {
            return Ok(ChangeSet::full());
        };
        let vcs = self.vcs.ok_or(VcsError::Unavailable)?;
        let repository = vcs.repository_root();
        if !is_within(repository, source_root) {
            return Err(VcsError::OutsideRepository {
                root: source_root.to_path_buf(),
                repository: repository.to_string(),
            });
        }

        let commits = vcs.commits_since(base)?;
        let (modified, deleted) = if mode == SyncMode::Incremental {
            let changed = vcs.changed_files(base, source_root, extensions)?;
            (changed.modified, changed.deleted)
        } else {
            (BTreeSet::new(), BTreeSet::new())
        };

        tracing::info!(
            "Change set ({} against {}): {} modified, {} deleted, {} commits",
            mode,
            base,
            modified.len(),
            deleted.len(),
            commits.len()
        );

        Ok(ChangeSet {
            mode,
            modified,
            deleted,
            commits,
        })
    }
}

/// Whether `source_root` is the repository root or lies beneath it
fn is_within(repository: &str, source_root: &Path) -> bool {
    normalize_path(source_root) == normalize_path(Path::new(repository))
        || relative_path(Path::new(repository), source_root).is_some()
}
