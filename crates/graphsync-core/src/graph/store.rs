//! Graph store gateway trait

use async_trait::async_trait;

use super::model::{
    CommitRecord, DependencyRecord, FileRecord, ProjectRecord, Relationship, Symbol,
};
use super::neo4j::{GraphError, check_version};

/// What a flush actually wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub symbols_written: usize,
    /// Relationships whose endpoints both resolved
    pub relationships_merged: usize,
}

/// Idempotent write surface of the graph store.
///
/// Every write merges by key, so replaying any operation is harmless.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// The store's reported semantic version string
    async fn server_version(&self) -> Result<String, GraphError>;

    /// Enforce the minimum version gate. Fatal and never retried.
    async fn verify_version(&self) -> Result<(), GraphError> {
        let version = self.server_version().await?;
        check_version(&version)?;
        tracing::info!("Connected to Neo4j {}", version);
        Ok(())
    }

    /// Create uniqueness constraints and lookup indexes if absent
    async fn ensure_schema(&self) -> Result<(), GraphError>;

    async fn upsert_project(&self, project: &ProjectRecord) -> Result<(), GraphError>;

    /// Merge a file node, link it to the project and clear any tombstone
    async fn upsert_file(&self, repo_key: &str, file: &FileRecord) -> Result<(), GraphError>;

    async fn upsert_dependencies(
        &self,
        repo_key: &str,
        dependencies: &[DependencyRecord],
    ) -> Result<(), GraphError>;

    async fn upsert_commits(
        &self,
        repo_key: &str,
        commits: &[CommitRecord],
    ) -> Result<(), GraphError>;

    /// Detach-delete every symbol declared in the file
    async fn delete_prior_symbols(&self, file_key: &str) -> Result<(), GraphError>;

    /// Soft-delete a file and its symbols
    async fn mark_file_as_deleted(&self, file_key: &str) -> Result<(), GraphError>;

    /// Upsert a symbol batch and merge a relationship batch
    async fn flush(
        &self,
        symbols: &[Symbol],
        relationships: &[Relationship],
    ) -> Result<FlushOutcome, GraphError>;
}
