//! File-related Neo4j queries

use neo4rs::Query;

use super::Neo4jClient;
use crate::graph::convert::{BoltMap, author_to_bolt, timestamp};
use crate::graph::model::FileRecord;
use crate::graph::neo4j::GraphError;

impl Neo4jClient {
    /// Merge a file with its git provenance and clear any tombstone
    ///
    /// # Errors
    /// Returns an error if the query fails after retries.
    pub async fn merge_file(&self, repo_key: &str, file: &FileRecord) -> Result<(), GraphError> {
        let authors: Vec<BoltMap> = file.authors.iter().map(author_to_bolt).collect();
        let created = timestamp(file.created.as_ref());
        let last_modified = timestamp(file.last_modified.as_ref());

        self.run_retrying("upsert_file", || {
            Query::new(
                r#"
                MERGE (f:File {key: $fileKey})
                SET f.path = $path,
                    f.relativePath = $relativePath,
                    f.hash = $hash,
                    f.created = $created,
                    f.lastModified = $lastModified,
                    f.commits = $commits,
                    f.tags = $tags,
                    f.deleted = false
                REMOVE f.deletedAt
                WITH f
                MATCH (p:Project {key: $repoKey})
                MERGE (p)-[:CONTAINS]->(f)
                WITH f
                UNWIND $authors AS author
                MERGE (a:Author {name: author.name})
                MERGE (a)-[r:AUTHORED]->(f)
                SET r.firstCommit = author.firstCommit,
                    r.lastCommit = author.lastCommit,
                    r.commitCount = author.commitCount
                "#
                .to_string(),
            )
            .param("fileKey", file.file_key.as_str())
            .param("path", file.path.as_str())
            .param("relativePath", file.relative_path.as_str())
            .param("hash", file.content_hash.as_str())
            .param("created", created.as_str())
            .param("lastModified", last_modified.as_str())
            .param("commits", file.commit_hashes.clone())
            .param("tags", file.tags.clone())
            .param("authors", authors.clone())
            .param("repoKey", repo_key)
        })
        .await
    }

    /// Soft-delete a file and every symbol it declared
    ///
    /// # Errors
    /// Returns an error if the query fails after retries.
    pub async fn tombstone_file(&self, file_key: &str) -> Result<(), GraphError> {
        self.run_retrying("mark_file_as_deleted", || {
            Query::new(
                r#"
                MATCH (f:File {key: $fileKey})
                SET f.deleted = true, f.deletedAt = datetime()
                WITH f
                OPTIONAL MATCH (s:Symbol {fileKey: $fileKey})
                SET s.deleted = true
                "#
                .to_string(),
            )
            .param("fileKey", file_key)
        })
        .await
    }
}
