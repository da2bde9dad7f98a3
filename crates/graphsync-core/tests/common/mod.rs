//! Shared fixtures for pipeline integration tests

#![allow(dead_code, clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use graphsync_core::facts::{DeclaredSymbol, FactError, FactProvider};
use graphsync_core::graph::model::{
    CommitRecord, DependencyRecord, FileRecord, ProjectRecord,
};
use graphsync_core::graph::{FlushOutcome, GraphError, GraphStore};
use graphsync_core::vcs::{ChangedFiles, CommitInfo, FileMetadata, VcsError};
use graphsync_core::{Accessibility, Relationship, Symbol, SymbolKind, VersionControl};

// ============================================================================
// In-memory graph store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryState {
    pub calls: Vec<String>,
    pub projects: BTreeMap<String, ProjectRecord>,
    pub files: BTreeMap<String, FileRecord>,
    pub tombstoned: BTreeSet<String>,
    pub symbols: BTreeMap<String, Symbol>,
    pub relationships: BTreeSet<(String, String, String)>,
    pub commits: BTreeMap<String, CommitRecord>,
    pub dependencies: BTreeMap<String, DependencyRecord>,
    pub flushes: usize,
}

/// Graph store with the same merge-by-key semantics as the Neo4j gateway
pub struct MemoryStore {
    version: String,
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_version("5.26.0")
    }

    pub fn with_version(version: &str) -> Self {
        Self {
            version: version.to_string(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("store lock")
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Calls whose name starts with `prefix`, with their argument
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn server_version(&self) -> Result<String, GraphError> {
        self.record("server_version".to_string());
        Ok(self.version.clone())
    }

    async fn ensure_schema(&self) -> Result<(), GraphError> {
        self.record("ensure_schema".to_string());
        Ok(())
    }

    async fn upsert_project(&self, project: &ProjectRecord) -> Result<(), GraphError> {
        let mut state = self.state();
        state.calls.push(format!("upsert_project {}", project.repo_key));
        state
            .projects
            .insert(project.repo_key.clone(), project.clone());
        Ok(())
    }

    async fn upsert_file(&self, _repo_key: &str, file: &FileRecord) -> Result<(), GraphError> {
        let mut state = self.state();
        state.calls.push(format!("upsert_file {}", file.file_key));
        state.tombstoned.remove(&file.file_key);
        state.files.insert(file.file_key.clone(), file.clone());
        Ok(())
    }

    async fn upsert_dependencies(
        &self,
        _repo_key: &str,
        dependencies: &[DependencyRecord],
    ) -> Result<(), GraphError> {
        let mut state = self.state();
        state.calls.push("upsert_dependencies".to_string());
        for dependency in dependencies {
            state
                .dependencies
                .insert(dependency.key.clone(), dependency.clone());
        }
        Ok(())
    }

    async fn upsert_commits(
        &self,
        _repo_key: &str,
        commits: &[CommitRecord],
    ) -> Result<(), GraphError> {
        let mut state = self.state();
        state.calls.push("upsert_commits".to_string());
        for commit in commits {
            state.commits.insert(commit.hash.clone(), commit.clone());
        }
        Ok(())
    }

    async fn delete_prior_symbols(&self, file_key: &str) -> Result<(), GraphError> {
        let mut state = self.state();
        state.calls.push(format!("delete_prior_symbols {file_key}"));
        let doomed: BTreeSet<String> = state
            .symbols
            .values()
            .filter(|s| s.file_key == file_key)
            .map(|s| s.key.clone())
            .collect();
        state.symbols.retain(|key, _| !doomed.contains(key));
        state
            .relationships
            .retain(|(from, to, _)| !doomed.contains(from) && !doomed.contains(to));
        Ok(())
    }

    async fn mark_file_as_deleted(&self, file_key: &str) -> Result<(), GraphError> {
        let mut state = self.state();
        state.calls.push(format!("mark_file_as_deleted {file_key}"));
        state.tombstoned.insert(file_key.to_string());
        Ok(())
    }

    async fn flush(
        &self,
        symbols: &[Symbol],
        relationships: &[Relationship],
    ) -> Result<FlushOutcome, GraphError> {
        let mut state = self.state();
        state.calls.push("flush".to_string());
        state.flushes += 1;
        for symbol in symbols {
            state.symbols.insert(symbol.key.clone(), symbol.clone());
        }

        let resolved: Vec<(String, String, String)> = relationships
            .iter()
            .filter(|r| {
                let resolves =
                    |key: &str| state.symbols.contains_key(key) || state.files.contains_key(key);
                resolves(&r.from_key) && resolves(&r.to_key)
            })
            .map(|r| (r.from_key.clone(), r.to_key.clone(), r.rel_type.to_string()))
            .collect();
        let merged = resolved.len();
        state.relationships.extend(resolved);

        Ok(FlushOutcome {
            symbols_written: symbols.len(),
            relationships_merged: merged,
        })
    }
}

// ============================================================================
// Scripted version control
// ============================================================================

/// Version control returning a fixed diff and history
#[derive(Debug, Default)]
pub struct ScriptedVcs {
    pub root: String,
    pub changes: ChangedFiles,
    pub commits: Vec<CommitInfo>,
}

impl VersionControl for ScriptedVcs {
    fn repository_root(&self) -> &str {
        &self.root
    }

    fn changed_files(
        &self,
        _base: &str,
        _source_root: &Path,
        _extensions: &[String],
    ) -> Result<ChangedFiles, VcsError> {
        Ok(self.changes.clone())
    }

    fn commits_since(&self, _base: &str) -> Result<Vec<CommitInfo>, VcsError> {
        Ok(self.commits.clone())
    }

    fn file_metadata(&self, _path: &str) -> FileMetadata {
        FileMetadata::default()
    }
}

// ============================================================================
// Facts for `public class Foo { private void Bar() {} }`
// ============================================================================

pub struct FooFacts;

fn declared(
    name: &str,
    kind: SymbolKind,
    signature: &str,
    accessibility: Accessibility,
    children: Vec<DeclaredSymbol>,
) -> DeclaredSymbol {
    DeclaredSymbol {
        name: name.to_string(),
        kind,
        fully_qualified_name: signature.trim_end_matches("()").to_string(),
        signature: signature.to_string(),
        accessibility,
        start_line: 1,
        end_line: 1,
        documentation: None,
        children,
    }
}

#[async_trait]
impl FactProvider for FooFacts {
    async fn declared_symbols(
        &self,
        _path: &Path,
        _content: &str,
    ) -> Result<Vec<DeclaredSymbol>, FactError> {
        let bar = declared("Bar", SymbolKind::Method, "Foo.Bar()", Accessibility::Private, vec![]);
        Ok(vec![declared(
            "Foo",
            SymbolKind::Class,
            "Foo",
            Accessibility::Public,
            vec![bar],
        )])
    }

    async fn diagnostics(&self, _path: &Path) -> Vec<String> {
        Vec::new()
    }
}

// ============================================================================
// Source trees
// ============================================================================

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(path, content).expect("write file");
}

/// Normalized absolute path of a file under `root`
pub fn abs(root: &Path, relative: &str) -> String {
    graphsync_core::normalize_path(&root.join(relative))
}
