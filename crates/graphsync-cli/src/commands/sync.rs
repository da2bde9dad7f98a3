//! Sync command: extract a source tree and merge it into Neo4j

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use graphsync_core::facts::{FactProvider, NoFacts};
use graphsync_core::graph::RetryPolicy;
use graphsync_core::lsp::{LspFactProvider, LspServerConfig};
use graphsync_core::{
    Dispatcher, GitRepository, GraphStore, Neo4jClient, Neo4jConfig, SyncOptions, SyncReport,
    Synchronizer, VersionControl,
};
use tracing::info;

use super::types::SyncArgs;
use crate::progress::select_reporter;

/// Run the sync command
///
/// # Errors
/// Returns an error if the store is unreachable or unsupported (checked
/// before git or the language server are touched), if git is
/// required but unavailable, if a write exhausts its retries, or if the run
/// is cancelled.
pub async fn run(args: &SyncArgs) -> Result<SyncReport> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Source root {} does not exist", args.path.display()))?;
    let options = build_options(args, &root);
    info!("Syncing {} as '{}'", root.display(), options.repo_key);

    let client = connect_neo4j(args).await?;
    client
        .verify_version()
        .await
        .with_context(|| format!("Neo4j pre-flight failed at {}", args.uri))?;
    let vcs = open_repository(&root, args.diff_base.is_some())?;
    let (facts, lsp) = start_language_server(&args.language_server, &root).await;
    let dispatcher = Dispatcher::with_defaults(facts);

    let cancel = Arc::new(AtomicBool::new(false));
    watch_ctrl_c(cancel.clone());

    let reporter = select_reporter();
    let mut synchronizer = Synchronizer::new(&client, &dispatcher)
        .with_progress(reporter.as_ref())
        .with_cancellation(cancel);
    if let Some(vcs) = vcs {
        synchronizer = synchronizer.with_vcs(Arc::new(vcs) as Arc<dyn VersionControl>);
    }

    let result = synchronizer.run(&options).await;
    shutdown_language_server(lsp).await;
    Ok(result?)
}

/// Translate arguments into run options
#[must_use]
pub fn build_options(args: &SyncArgs, root: &Path) -> SyncOptions {
    let mut options = SyncOptions::new(root, args.resolved_repo_key())
        .with_force(args.force)
        .with_batch_size(args.batch_size)
        .with_min_accessibility(args.min_accessibility)
        .with_extensions(&args.include)
        .with_skip_dependencies(args.skip_dependencies);
    if let Some(base) = &args.diff_base {
        options = options.with_diff_base(base.as_str());
    }
    options
}

async fn connect_neo4j(args: &SyncArgs) -> Result<Neo4jClient> {
    let config = Neo4jConfig::new(&args.uri, &args.user, &args.password)
        .with_database(&args.database)
        .with_retry(RetryPolicy::default().with_max_retries(args.max_retries));
    Neo4jClient::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", args.uri))
}

/// Git is only mandatory when a diff base was given; otherwise a missing
/// repository just means files carry no provenance.
fn open_repository(root: &Path, required: bool) -> Result<Option<GitRepository>> {
    match GitRepository::discover(root) {
        Ok(repo) => Ok(Some(repo)),
        Err(e) if required => Err(e.into()),
        Err(e) => {
            tracing::debug!("No git provenance: {}", e);
            Ok(None)
        }
    }
}

async fn start_language_server(
    command: &str,
    root: &Path,
) -> (Arc<dyn FactProvider>, Option<Arc<LspFactProvider>>) {
    let config = LspServerConfig::csharp(root).with_command(command, Vec::new());
    match LspFactProvider::start(config).await {
        Ok(provider) => {
            let provider = Arc::new(provider);
            let facts: Arc<dyn FactProvider> = provider.clone();
            (facts, Some(provider))
        }
        Err(e) => {
            tracing::warn!(
                "Language server '{}' unavailable, source declarations will be skipped: {}",
                command,
                e
            );
            let facts: Arc<dyn FactProvider> = Arc::new(NoFacts);
            (facts, None)
        }
    }
}

async fn shutdown_language_server(lsp: Option<Arc<LspFactProvider>>) {
    if let Some(lsp) = lsp {
        if let Err(e) = lsp.shutdown().await {
            tracing::warn!("Failed to shutdown language server: {}", e);
        }
    }
}

fn watch_ctrl_c(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Cancellation requested, stopping at the next file");
            cancel.store(true, Ordering::SeqCst);
        }
    });
}
