//! Neo4j query modules organized by entity

mod commit;
mod file;
mod project;
mod schema;
mod symbol;

use async_trait::async_trait;

// Re-export Neo4jClient for the impl blocks
pub(super) use super::neo4j::Neo4jClient;

use super::model::{
    CommitRecord, DependencyRecord, FileRecord, ProjectRecord, Relationship, Symbol,
};
use super::neo4j::GraphError;
use super::store::{FlushOutcome, GraphStore};

pub use schema::SCHEMA_STATEMENTS;
pub(crate) use symbol::flush_statements;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn server_version(&self) -> Result<String, GraphError> {
        self.fetch_server_version().await
    }

    async fn ensure_schema(&self) -> Result<(), GraphError> {
        self.create_schema().await
    }

    async fn upsert_project(&self, project: &ProjectRecord) -> Result<(), GraphError> {
        self.merge_project(project).await
    }

    async fn upsert_file(&self, repo_key: &str, file: &FileRecord) -> Result<(), GraphError> {
        self.merge_file(repo_key, file).await
    }

    async fn upsert_dependencies(
        &self,
        repo_key: &str,
        dependencies: &[DependencyRecord],
    ) -> Result<(), GraphError> {
        self.merge_dependencies(repo_key, dependencies).await
    }

    async fn upsert_commits(
        &self,
        repo_key: &str,
        commits: &[CommitRecord],
    ) -> Result<(), GraphError> {
        self.merge_commits(repo_key, commits).await
    }

    async fn delete_prior_symbols(&self, file_key: &str) -> Result<(), GraphError> {
        self.delete_file_symbols(file_key).await
    }

    async fn mark_file_as_deleted(&self, file_key: &str) -> Result<(), GraphError> {
        self.tombstone_file(file_key).await
    }

    async fn flush(
        &self,
        symbols: &[Symbol],
        relationships: &[Relationship],
    ) -> Result<FlushOutcome, GraphError> {
        self.flush_batch(symbols, relationships).await
    }
}
