//! Sync module: the run orchestrator
//!
//! A run verifies the store, resolves the change set, writes the project
//! scaffolding (project, dependencies, tombstones, commits), then walks
//! the worklist one file at a time: upsert the file, delete its prior
//! symbols, extract, and hand the output to the flush controller.

mod buffer;
mod progress;
mod stats;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::info;

use crate::changes::{ChangeSet, ChangeSetResolver};
use crate::extract::handlers::package_references;
use crate::extract::{Dispatcher, ExtractionStats, FileContext, has_extension};
use crate::graph::model::{Accessibility, CommitRecord, DependencyRecord, FileRecord, ProjectRecord};
use crate::graph::{GraphError, GraphStore};
use crate::keys::{KeyBuilder, dependency_key};
use crate::scanner::{
    DEFAULT_EXTENSIONS, DiscoveredFile, Scanner, compute_content_hash, relative_path,
};
use crate::vcs::{FileMetadata, VcsError, VersionControl};

pub use buffer::{BatchBuffer, DEFAULT_BATCH_SIZE, FlushController, FlushTotals};
pub use progress::{LogProgress, NoProgress, ProgressReporter};
pub use stats::SyncReport;

/// Version recorded for package references that do not pin one
pub const UNPINNED_VERSION: &str = "*";

static LOG_PROGRESS: LogProgress = LogProgress;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Sync cancelled after {processed} of {total} files")]
    Cancelled { processed: usize, total: usize },
}

/// Options of a single run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Source root; file keys are relative to it
    pub root: PathBuf,
    pub repo_key: String,
    pub diff_base: Option<String>,
    pub force: bool,
    pub batch_size: usize,
    pub min_accessibility: Accessibility,
    pub extensions: Vec<String>,
    pub skip_dependencies: bool,
}

impl SyncOptions {
    /// Full run over `root` with default settings
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, repo_key: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            repo_key: repo_key.into(),
            diff_base: None,
            force: false,
            batch_size: DEFAULT_BATCH_SIZE,
            min_accessibility: Accessibility::Private,
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            skip_dependencies: false,
        }
    }

    #[must_use]
    pub fn with_diff_base(mut self, diff_base: impl Into<String>) -> Self {
        self.diff_base = Some(diff_base.into());
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_min_accessibility(mut self, min_accessibility: Accessibility) -> Self {
        self.min_accessibility = min_accessibility;
        self
    }

    #[must_use]
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions.iter().map(|e| e.as_ref().to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_skip_dependencies(mut self, skip: bool) -> Self {
        self.skip_dependencies = skip;
        self
    }

    /// Display name of the project: the source root directory name
    #[must_use]
    pub fn project_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.repo_key.clone())
    }
}

/// Lifecycle of a run, logged as it advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    VersionVerified,
    SchemaEnsured,
    ProjectUpserted,
    Processing,
    FinalFlush,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::VersionVerified => "version verified",
            Self::SchemaEnsured => "schema ensured",
            Self::ProjectUpserted => "project upserted",
            Self::Processing => "processing",
            Self::FinalFlush => "final flush",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Runs a sync against a store with injected collaborators
pub struct Synchronizer<'a> {
    store: &'a dyn GraphStore,
    dispatcher: &'a Dispatcher,
    vcs: Option<Arc<dyn VersionControl>>,
    progress: &'a dyn ProgressReporter,
    cancel: Arc<AtomicBool>,
}

impl<'a> Synchronizer<'a> {
    #[must_use]
    pub fn new(store: &'a dyn GraphStore, dispatcher: &'a Dispatcher) -> Self {
        Self {
            store,
            dispatcher,
            vcs: None,
            progress: &LOG_PROGRESS,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Version control used for change sets and file provenance
    #[must_use]
    pub fn with_vcs(mut self, vcs: Arc<dyn VersionControl>) -> Self {
        self.vcs = Some(vcs);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Flag checked at every file boundary; setting it ends the run
    #[must_use]
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute one run
    ///
    /// # Errors
    /// Returns an error on an unsupported store, a version-control failure,
    /// a store write that exhausted its retries, or cancellation.
    pub async fn run(&self, options: &SyncOptions) -> Result<SyncReport, SyncError> {
        enter(RunPhase::Idle);
        self.store.verify_version().await?;
        enter(RunPhase::VersionVerified);
        self.store.ensure_schema().await?;
        enter(RunPhase::SchemaEnsured);

        let (discovered, changes) = self.discover(options).await?;

        let keys = KeyBuilder::new(options.repo_key.as_str());
        let mut report = SyncReport::new(changes.mode);
        report.files_discovered = discovered.len();

        self.store
            .upsert_project(&ProjectRecord {
                repo_key: options.repo_key.clone(),
                name: options.project_name(),
            })
            .await?;
        enter(RunPhase::ProjectUpserted);

        if !options.skip_dependencies {
            let dependencies = collect_dependencies(&discovered).await;
            if !dependencies.is_empty() {
                self.store
                    .upsert_dependencies(&options.repo_key, &dependencies)
                    .await?;
            }
            report.dependencies = dependencies.len();
        }

        report.files_deleted = self.tombstone_deleted(&changes, &keys, options).await?;

        if changes.mode.uses_history() && !changes.commits.is_empty() {
            let commits = commit_records(&changes, &keys, &options.root);
            self.store
                .upsert_commits(&options.repo_key, &commits)
                .await?;
            report.commits = commits.len();
        }

        let worklist = changes.worklist(&discovered);
        report.files_selected = worklist.len();
        info!(
            "{} sync of {}: {} of {} files selected",
            changes.mode,
            options.root.display(),
            worklist.len(),
            discovered.len()
        );

        enter(RunPhase::Processing);
        let mut controller = FlushController::new(self.store, options.batch_size);
        let total = worklist.len();
        for (index, file) in worklist.into_iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                controller.flush().await?;
                info!("Cancelled; {} of {} files processed", index, total);
                return Err(SyncError::Cancelled {
                    processed: index,
                    total,
                });
            }

            self.progress.report(index + 1, total, &file.relative_path);
            let processed = self
                .sync_file(file, &keys, options, &mut controller, &mut report.extraction)
                .await?;
            if processed {
                report.files_processed += 1;
            } else {
                report.files_failed += 1;
            }
        }

        enter(RunPhase::FinalFlush);
        controller.flush().await?;
        report.absorb(controller.totals());
        enter(RunPhase::Done);

        info!("✓ {}", report);
        let handlers = report.handler_summary();
        if !handlers.is_empty() {
            info!("Handlers: {}", handlers);
        }
        Ok(report)
    }

    /// Walk the source root and resolve the change set off the async runtime
    async fn discover(
        &self,
        options: &SyncOptions,
    ) -> Result<(Vec<DiscoveredFile>, ChangeSet), SyncError> {
        let vcs = self.vcs.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || {
            let scanner = Scanner::new(&options.root).with_extensions(&options.extensions);
            let discovered = scanner.scan();
            let changes = ChangeSetResolver::new(vcs.as_deref()).resolve(
                options.diff_base.as_deref(),
                options.force,
                &options.root,
                scanner.extensions(),
            )?;
            Ok::<_, SyncError>((discovered, changes))
        })
        .await?
    }

    /// Git provenance of one file; empty without a repository
    async fn file_metadata(&self, path: &str) -> FileMetadata {
        let Some(vcs) = self.vcs.clone() else {
            return FileMetadata::default();
        };
        let owned = path.to_string();
        match tokio::task::spawn_blocking(move || vcs.file_metadata(&owned)).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("History lookup for {} failed: {}", path, e);
                FileMetadata::default()
            }
        }
    }

    /// Tombstone every deleted file under the root; returns how many
    async fn tombstone_deleted(
        &self,
        changes: &ChangeSet,
        keys: &KeyBuilder,
        options: &SyncOptions,
    ) -> Result<usize, SyncError> {
        let mut count = 0;
        for path in changes.tombstones() {
            let Some(relative) = relative_path(&options.root, Path::new(path)) else {
                continue;
            };
            self.store.mark_file_as_deleted(&keys.file(&relative)).await?;
            tracing::debug!("Tombstoned {}", relative);
            count += 1;
        }
        Ok(count)
    }

    /// Process one file. Returns `false` when the file could not be read.
    async fn sync_file(
        &self,
        file: &DiscoveredFile,
        keys: &KeyBuilder,
        options: &SyncOptions,
        controller: &mut FlushController<'_>,
        stats: &mut ExtractionStats,
    ) -> Result<bool, SyncError> {
        let bytes = match tokio::fs::read(&file.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file.relative_path, e);
                return Ok(false);
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        let file_key = keys.file(&file.relative_path);

        let metadata = self.file_metadata(&file.path).await;
        let record = FileRecord {
            file_key: file_key.clone(),
            path: file.path.clone(),
            relative_path: file.relative_path.clone(),
            content_hash: compute_content_hash(&bytes),
            created: metadata.created,
            last_modified: metadata.last_modified,
            authors: metadata.authors,
            commit_hashes: metadata.commit_hashes,
            tags: metadata.tags,
        };

        self.store.upsert_file(&options.repo_key, &record).await?;
        self.store.delete_prior_symbols(&file_key).await?;

        let ctx = FileContext {
            keys,
            file_key: &file_key,
            path: Path::new(&file.path),
            file_path: &file.path,
            content: &content,
        };
        let extraction = self
            .dispatcher
            .extract(&ctx, options.min_accessibility, stats)
            .await;
        controller.offer(extraction).await?;
        Ok(true)
    }
}

fn enter(phase: RunPhase) {
    tracing::debug!("Run phase: {}", phase);
}

/// Package references of every discovered project file, deduplicated by key
async fn collect_dependencies(discovered: &[DiscoveredFile]) -> Vec<DependencyRecord> {
    let mut by_key = BTreeMap::new();
    for file in discovered
        .iter()
        .filter(|f| has_extension(Path::new(&f.path), &["csproj"]))
    {
        let content = match tokio::fs::read_to_string(&file.path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Cannot read project file {}: {}", file.relative_path, e);
                continue;
            }
        };
        for (name, version) in package_references(&content) {
            let version = version.unwrap_or_else(|| UNPINNED_VERSION.to_string());
            let key = dependency_key(&name, &version);
            by_key.entry(key.clone()).or_insert(DependencyRecord { key, name, version });
        }
    }
    by_key.into_values().collect()
}

/// Commits of the change set with touched paths mapped to file keys.
/// Paths outside the root are dropped.
fn commit_records(changes: &ChangeSet, keys: &KeyBuilder, root: &Path) -> Vec<CommitRecord> {
    changes
        .commits
        .iter()
        .map(|commit| CommitRecord {
            hash: commit.hash.clone(),
            author_name: commit.author_name.clone(),
            author_email: commit.author_email.clone(),
            date: commit.date,
            message: commit.message.clone(),
            changed_file_keys: commit
                .changed_files
                .iter()
                .filter_map(|path| relative_path(root, Path::new(path)))
                .map(|relative| keys.file(&relative))
                .collect(),
        })
        .collect()
}
