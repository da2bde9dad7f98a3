//! Command-line surface shared between main and library

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use graphsync_core::Accessibility;
use graphsync_core::scanner::DEFAULT_EXTENSIONS;
use graphsync_core::sync::DEFAULT_BATCH_SIZE;

#[derive(Debug, Parser)]
#[command(name = "graphsync")]
#[command(author, version, about = "Sync code structure into a Neo4j graph", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract a source tree and merge it into Neo4j
    Sync(SyncArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Source root to synchronize
    pub path: PathBuf,

    /// Neo4j connection URI
    #[arg(long, default_value = "bolt://localhost:7687")]
    pub uri: String,

    /// Neo4j username
    #[arg(long, default_value = "neo4j")]
    pub user: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Neo4j database
    #[arg(long, default_value = "neo4j")]
    pub database: String,

    /// Key scoping every node of this repository (default: source root name)
    #[arg(long)]
    pub repo_key: Option<String>,

    /// Only process files changed since this git ref
    #[arg(long)]
    pub diff_base: Option<String>,

    /// Symbols buffered before each write
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Lowest accessibility written to the graph
    #[arg(long, default_value = "private")]
    pub min_accessibility: Accessibility,

    /// File extensions to include
    #[arg(long, num_args = 1.., default_values = DEFAULT_EXTENSIONS.iter().copied())]
    pub include: Vec<String>,

    /// Process every file even with --diff-base (commit history is still ingested)
    #[arg(long)]
    pub force: bool,

    /// Do not ingest package references
    #[arg(long)]
    pub skip_dependencies: bool,

    /// Language server command for compiled sources
    #[arg(long, default_value = "csharp-ls")]
    pub language_server: String,

    /// Retries for transient store errors
    #[arg(long, default_value_t = 5)]
    pub max_retries: u32,
}

impl SyncArgs {
    /// The explicit repo key, or the source root directory name
    #[must_use]
    pub fn resolved_repo_key(&self) -> String {
        if let Some(key) = &self.repo_key {
            return key.clone();
        }
        self.path
            .canonicalize()
            .unwrap_or_else(|_| self.path.clone())
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repo".to_string())
    }
}
