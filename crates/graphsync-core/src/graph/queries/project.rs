//! Project and dependency Neo4j queries

use neo4rs::Query;

use super::Neo4jClient;
use crate::graph::convert::{BoltMap, dependency_to_bolt};
use crate::graph::model::{DependencyRecord, ProjectRecord};
use crate::graph::neo4j::GraphError;

impl Neo4jClient {
    /// Merge the project root node
    ///
    /// # Errors
    /// Returns an error if the query fails after retries.
    pub async fn merge_project(&self, project: &ProjectRecord) -> Result<(), GraphError> {
        self.run_retrying("upsert_project", || {
            Query::new(
                r#"
                MERGE (p:Project {key: $key})
                SET p.name = $name, p.updatedAt = datetime()
                "#
                .to_string(),
            )
            .param("key", project.repo_key.as_str())
            .param("name", project.name.as_str())
        })
        .await
    }

    /// Merge package dependencies and link them to the project
    ///
    /// # Errors
    /// Returns an error if the query fails after retries.
    pub async fn merge_dependencies(
        &self,
        repo_key: &str,
        dependencies: &[DependencyRecord],
    ) -> Result<(), GraphError> {
        if dependencies.is_empty() {
            return Ok(());
        }

        let batch: Vec<BoltMap> = dependencies.iter().map(dependency_to_bolt).collect();

        self.run_retrying("upsert_dependencies", || {
            Query::new(
                r#"
                MATCH (p:Project {key: $repoKey})
                UNWIND $dependencies AS dep
                MERGE (d:Dependency {key: dep.key})
                SET d.name = dep.name, d.version = dep.version
                MERGE (p)-[:DEPENDS_ON]->(d)
                "#
                .to_string(),
            )
            .param("repoKey", repo_key)
            .param("dependencies", batch.clone())
        })
        .await
    }
}
