//! Commit-related Neo4j queries

use neo4rs::Query;

use super::Neo4jClient;
use crate::graph::convert::{BoltMap, commit_to_bolt};
use crate::graph::model::CommitRecord;
use crate::graph::neo4j::GraphError;

impl Neo4jClient {
    /// Merge commits of the synced range and link the files they touched
    ///
    /// # Errors
    /// Returns an error if the query fails after retries.
    pub async fn merge_commits(
        &self,
        repo_key: &str,
        commits: &[CommitRecord],
    ) -> Result<(), GraphError> {
        if commits.is_empty() {
            return Ok(());
        }

        let batch: Vec<BoltMap> = commits.iter().map(commit_to_bolt).collect();

        self.run_retrying("upsert_commits", || {
            Query::new(
                r#"
                MATCH (p:Project {key: $repoKey})
                UNWIND $commits AS commit
                MERGE (c:Commit {hash: commit.hash})
                SET c.authorName = commit.authorName,
                    c.authorEmail = commit.authorEmail,
                    c.date = commit.date,
                    c.message = commit.message
                MERGE (p)-[:HAS_COMMIT]->(c)
                WITH c, commit
                UNWIND commit.changedFiles AS fileKey
                MERGE (f:File {key: fileKey})
                MERGE (c)-[:MODIFIED]->(f)
                "#
                .to_string(),
            )
            .param("repoKey", repo_key)
            .param("commits", batch.clone())
        })
        .await
    }
}
