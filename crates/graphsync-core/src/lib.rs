//! graphsync-core: Core library for syncing code structure into Neo4j
//!
//! Extracts declared symbols, containment and dependency relationships,
//! and git provenance from a heterogeneous source tree, then merges them
//! into a Neo4j property graph. Supports full and incremental runs.
//!
//! # Pipeline
//!
//! - [`changes`] resolves which files need work (full, incremental, forced)
//! - [`extract`] dispatches each file to the first matching handler
//! - [`sync`] buffers extraction output and flushes it in batches
//! - [`graph`] owns the store connection, schema, version gate and retries

pub mod changes;
pub mod extract;
pub mod facts;
pub mod graph;
pub mod keys;
pub mod lsp;
pub mod scanner;
pub mod sync;
pub mod vcs;

// Re-export commonly used types
pub use changes::{ChangeSet, ChangeSetResolver, SyncMode};
pub use extract::{Dispatcher, DocumentHandler, Extraction, ExtractionStats, FileContext};
pub use graph::model::{Accessibility, RelType, Relationship, Symbol, SymbolKind};
pub use graph::neo4j::{Neo4jClient, Neo4jConfig};
pub use graph::store::GraphStore;
pub use keys::KeyBuilder;
pub use scanner::{DiscoveredFile, Scanner, compute_content_hash, normalize_path};
pub use sync::{SyncOptions, SyncReport, Synchronizer};
pub use vcs::{GitRepository, VersionControl};
