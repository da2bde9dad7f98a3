//! git2-backed version control

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use chrono::{DateTime, Utc};
use git2::{Commit, Delta, DiffFindOptions, Oid, Repository, Sort};

use super::{ChangedFiles, CommitInfo, FileMetadata, VcsError, VersionControl};
use crate::graph::model::AuthorStats;
use crate::scanner::{extension_matches, normalize_path, relative_path};

/// One commit touching a file, as recorded in the history index
#[derive(Debug, Clone)]
struct Touch {
    hash: String,
    author: String,
    time: DateTime<Utc>,
    tags: Vec<String>,
}

/// A git repository discovered from a start directory
pub struct GitRepository {
    repo: Mutex<Repository>,
    root: String,
    history: OnceLock<HashMap<String, Vec<Touch>>>,
}

impl GitRepository {
    /// Discover the repository containing `start` and resolve its root.
    ///
    /// # Errors
    /// Returns an error if `start` is not inside a non-bare git repository.
    pub fn discover(start: &Path) -> Result<Self, VcsError> {
        let repo = Repository::discover(start).map_err(|source| VcsError::NotARepository {
            path: start.to_path_buf(),
            source,
        })?;
        let root = repo
            .workdir()
            .map(normalize_path)
            .ok_or_else(|| VcsError::BareRepository(repo.path().to_path_buf()))?;

        tracing::debug!("Resolved repository root: {}", root);

        Ok(Self {
            repo: Mutex::new(repo),
            root,
            history: OnceLock::new(),
        })
    }

    fn absolute(&self, repo_relative: &Path) -> String {
        normalize_path(&Path::new(&self.root).join(repo_relative))
    }

    fn history(&self) -> &HashMap<String, Vec<Touch>> {
        self.history.get_or_init(|| {
            let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);
            build_history(&repo).unwrap_or_else(|e| {
                tracing::debug!("File history unavailable: {}", e);
                HashMap::new()
            })
        })
    }
}

impl VersionControl for GitRepository {
    fn repository_root(&self) -> &str {
        &self.root
    }

    fn changed_files(
        &self,
        base: &str,
        source_root: &Path,
        extensions: &[String],
    ) -> Result<ChangedFiles, VcsError> {
        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);

        let base_commit = repo.revparse_single(base)?.peel_to_commit()?;
        let head = repo.head()?.peel_to_commit()?;
        let merge_base = repo.merge_base(base_commit.id(), head.id())?;
        let old_tree = repo.find_commit(merge_base)?.tree()?;
        let new_tree = head.tree()?;

        let mut diff = repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;

        let keep = |path: &str| {
            relative_path(source_root, Path::new(path)).is_some()
                && extension_matches(path, extensions)
        };

        let mut changes = ChangedFiles::default();
        for delta in diff.deltas() {
            let old_path = delta.old_file().path().map(|p| self.absolute(p));
            let new_path = delta.new_file().path().map(|p| self.absolute(p));

            match delta.status() {
                Delta::Deleted => {
                    changes.deleted.extend(old_path.filter(|p| keep(p.as_str())));
                }
                Delta::Renamed => {
                    changes.deleted.extend(old_path.filter(|p| keep(p.as_str())));
                    changes.modified.extend(new_path.filter(|p| keep(p.as_str())));
                }
                Delta::Added | Delta::Modified | Delta::Copied | Delta::Typechange => {
                    changes.modified.extend(new_path.filter(|p| keep(p.as_str())));
                }
                _ => {}
            }
        }

        tracing::debug!(
            "Diff {}...HEAD: {} modified, {} deleted",
            base,
            changes.modified.len(),
            changes.deleted.len()
        );
        Ok(changes)
    }

    fn commits_since(&self, base: &str) -> Result<Vec<CommitInfo>, VcsError> {
        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);

        let base_commit = repo.revparse_single(base)?.peel_to_commit()?;
        let head = repo.head()?.peel_to_commit()?;

        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push(head.id())?;
        walk.hide(base_commit.id())?;

        let mut commits = Vec::new();
        for oid in walk {
            let commit = repo.find_commit(oid?)?;
            let changed_files = touched_paths(&repo, &commit)?
                .into_iter()
                .map(|p| self.absolute(Path::new(&p)))
                .collect();
            let author = commit.author();

            commits.push(CommitInfo {
                hash: commit.id().to_string(),
                author_name: author.name().unwrap_or_default().to_string(),
                author_email: author.email().unwrap_or_default().to_string(),
                date: commit_time(&commit),
                message: commit.message().unwrap_or_default().trim().to_string(),
                changed_files,
            });
        }

        Ok(commits)
    }

    fn file_metadata(&self, path: &str) -> FileMetadata {
        let Some(relative) = relative_path(Path::new(&self.root), Path::new(path)) else {
            return FileMetadata::default();
        };
        self.history()
            .get(&relative)
            .map(|touches| summarize(touches.as_slice()))
            .unwrap_or_default()
    }
}

fn commit_time(commit: &Commit<'_>) -> DateTime<Utc> {
    DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default()
}

/// Repo-relative paths a commit changed compared to its parent.
///
/// Merge commits touch nothing; their changes belong to the commits that
/// were merged, which the walk visits on their own.
fn touched_paths(repo: &Repository, commit: &Commit<'_>) -> Result<Vec<String>, git2::Error> {
    if commit.parent_count() > 1 {
        return Ok(Vec::new());
    }
    let tree = commit.tree()?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree()?),
        Err(_) => None,
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let mut paths = Vec::new();
    for delta in diff.deltas() {
        let file = if delta.status() == Delta::Deleted {
            delta.old_file()
        } else {
            delta.new_file()
        };
        if let Some(path) = file.path() {
            paths.push(path.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(paths)
}

/// Tag names keyed by the commit they point to
fn tags_by_commit(repo: &Repository) -> Result<HashMap<Oid, Vec<String>>, git2::Error> {
    let mut tags: HashMap<Oid, Vec<String>> = HashMap::new();
    for name in repo.tag_names(None)?.iter().flatten() {
        let target = repo
            .revparse_single(&format!("refs/tags/{name}"))
            .and_then(|object| object.peel_to_commit());
        if let Ok(commit) = target {
            tags.entry(commit.id()).or_default().push(name.to_string());
        }
    }
    Ok(tags)
}

/// Walk the full history once and index every touch by repo-relative path
fn build_history(repo: &Repository) -> Result<HashMap<String, Vec<Touch>>, git2::Error> {
    let tags = tags_by_commit(repo)?;

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TIME)?;
    walk.push_head()?;

    let mut history: HashMap<String, Vec<Touch>> = HashMap::new();
    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        let touch = Touch {
            hash: commit.id().to_string(),
            author: commit.author().name().unwrap_or_default().to_string(),
            time: commit_time(&commit),
            tags: tags.get(&commit.id()).cloned().unwrap_or_default(),
        };
        for path in touched_paths(repo, &commit)? {
            history.entry(path).or_default().push(touch.clone());
        }
    }
    Ok(history)
}

/// Fold the touches of one file (newest first) into its metadata
fn summarize(touches: &[Touch]) -> FileMetadata {
    let mut authors: BTreeMap<&str, AuthorStats> = BTreeMap::new();
    for touch in touches {
        authors
            .entry(touch.author.as_str())
            .and_modify(|stats| {
                stats.first_commit = stats.first_commit.min(touch.time);
                stats.last_commit = stats.last_commit.max(touch.time);
                stats.commit_count += 1;
            })
            .or_insert_with(|| AuthorStats {
                name: touch.author.clone(),
                first_commit: touch.time,
                last_commit: touch.time,
                commit_count: 1,
            });
    }

    let mut tags: Vec<String> = touches.iter().flat_map(|t| t.tags.clone()).collect();
    tags.sort();
    tags.dedup();

    FileMetadata {
        created: touches.iter().map(|t| t.time).min(),
        last_modified: touches.iter().map(|t| t.time).max(),
        authors: authors.into_values().collect(),
        commit_hashes: touches.iter().map(|t| t.hash.clone()).collect(),
        tags,
    }
}
