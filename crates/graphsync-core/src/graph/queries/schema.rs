//! Schema and server-version queries

use neo4rs::Query;

use super::Neo4jClient;
use crate::graph::neo4j::GraphError;

/// Idempotent constraint and index statements, run on every invocation
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT project_key IF NOT EXISTS FOR (p:Project) REQUIRE p.key IS UNIQUE",
    "CREATE CONSTRAINT file_key IF NOT EXISTS FOR (f:File) REQUIRE f.key IS UNIQUE",
    "CREATE CONSTRAINT symbol_key IF NOT EXISTS FOR (s:Symbol) REQUIRE s.key IS UNIQUE",
    "CREATE CONSTRAINT commit_hash IF NOT EXISTS FOR (c:Commit) REQUIRE c.hash IS UNIQUE",
    "CREATE CONSTRAINT dependency_key IF NOT EXISTS FOR (d:Dependency) REQUIRE d.key IS UNIQUE",
    "CREATE INDEX symbol_name IF NOT EXISTS FOR (s:Symbol) ON (s.name)",
    "CREATE INDEX symbol_kind IF NOT EXISTS FOR (s:Symbol) ON (s.kind)",
    "CREATE INDEX symbol_fqn IF NOT EXISTS FOR (s:Symbol) ON (s.fqn)",
    "CREATE INDEX symbol_file_key IF NOT EXISTS FOR (s:Symbol) ON (s.fileKey)",
];

impl Neo4jClient {
    /// Read the kernel version reported by the server
    ///
    /// # Errors
    /// Returns an error if the query fails or reports no version.
    pub async fn fetch_server_version(&self) -> Result<String, GraphError> {
        let rows = self
            .fetch_retrying("server_version", || {
                Query::new(
                    r#"
                    CALL dbms.components() YIELD name, versions
                    WHERE name = 'Neo4j Kernel'
                    RETURN versions[0] AS version
                    "#
                    .to_string(),
                )
            })
            .await?;

        rows.first()
            .and_then(|row| row.get::<String>("version").ok())
            .filter(|v| !v.trim().is_empty())
            .ok_or(GraphError::UnknownVersion)
    }

    /// Create all constraints and indexes that do not exist yet
    ///
    /// # Errors
    /// Returns an error if any statement fails after retries.
    pub async fn create_schema(&self) -> Result<(), GraphError> {
        for statement in SCHEMA_STATEMENTS {
            self.run_retrying("ensure_schema", || Query::new((*statement).to_string()))
                .await?;
        }
        tracing::debug!("Schema ensured ({} statements)", SCHEMA_STATEMENTS.len());
        Ok(())
    }
}
