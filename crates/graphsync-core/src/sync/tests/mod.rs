mod tests_options;

use std::sync::Mutex;

use async_trait::async_trait;

use crate::graph::model::{
    CommitRecord, DependencyRecord, FileRecord, ProjectRecord, Relationship, Symbol,
};
use crate::graph::{FlushOutcome, GraphError, GraphStore};

/// Store that only records flushes. Relationships resolve when both
/// endpoints were flushed at some point.
#[derive(Default)]
pub(super) struct FlushRecorder {
    pub batches: Mutex<Vec<(usize, usize)>>,
    pub keys: Mutex<Vec<String>>,
}

#[async_trait]
impl GraphStore for FlushRecorder {
    async fn server_version(&self) -> Result<String, GraphError> {
        Ok("5.20.0".to_string())
    }

    async fn ensure_schema(&self) -> Result<(), GraphError> {
        Ok(())
    }

    async fn upsert_project(&self, _project: &ProjectRecord) -> Result<(), GraphError> {
        Ok(())
    }

    async fn upsert_file(&self, _repo_key: &str, _file: &FileRecord) -> Result<(), GraphError> {
        Ok(())
    }

    async fn upsert_dependencies(
        &self,
        _repo_key: &str,
        _dependencies: &[DependencyRecord],
    ) -> Result<(), GraphError> {
        Ok(())
    }

    async fn upsert_commits(
        &self,
        _repo_key: &str,
        _commits: &[CommitRecord],
    ) -> Result<(), GraphError> {
        Ok(())
    }

    async fn delete_prior_symbols(&self, _file_key: &str) -> Result<(), GraphError> {
        Ok(())
    }

    async fn mark_file_as_deleted(&self, _file_key: &str) -> Result<(), GraphError> {
        Ok(())
    }

    #[allow(clippy::expect_used)]
    async fn flush(
        &self,
        symbols: &[Symbol],
        relationships: &[Relationship],
    ) -> Result<FlushOutcome, GraphError> {
        let mut keys = self.keys.lock().expect("lock");
        keys.extend(symbols.iter().map(|s| s.key.clone()));
        let merged = relationships
            .iter()
            .filter(|r| keys.contains(&r.from_key) && keys.contains(&r.to_key))
            .count();
        self.batches
            .lock()
            .expect("lock")
            .push((symbols.len(), relationships.len()));
        Ok(FlushOutcome {
            symbols_written: symbols.len(),
            relationships_merged: merged,
        })
    }
}
