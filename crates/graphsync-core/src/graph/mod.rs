//! Graph module: Data model and the Neo4j sync gateway
//!
//! Defines the graph model written by a sync run, the [`store::GraphStore`]
//! gateway trait, and its Neo4j implementation with retry and
//! version gating.

pub mod convert;
pub mod model;
pub mod neo4j;
pub mod queries;
pub mod retry;
pub mod store;

pub use neo4j::{GraphError, check_version};
pub use retry::RetryPolicy;
pub use store::{FlushOutcome, GraphStore};

#[cfg(test)]
mod tests;
