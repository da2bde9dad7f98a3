//! Neo4j client for graph storage

use std::sync::Arc;

use neo4rs::{
    ConfigBuilder, Graph, Neo4jClientErrorKind, Neo4jErrorKind, Neo4jSecurityErrorKind, Query, Row,
};
use thiserror::Error;

use super::retry::RetryPolicy;

/// Lowest supported Neo4j major version
pub const MIN_MAJOR_VERSION: u32 = 5;

/// Errors that can occur during graph store operations
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("Neo4j version {version} is not supported. Minimum required version is {MIN_MAJOR_VERSION}.0.")]
    UnsupportedVersion { version: String },

    #[error("Could not determine the Neo4j server version")]
    UnknownVersion,
}

impl GraphError {
    /// Whether the store classifies this error as safe to retry
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Neo4j(neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError) => true,
            Self::Neo4j(neo4rs::Error::Neo4j(server)) => is_transient_kind(server.kind()),
            _ => false,
        }
    }
}

/// Transient server error classes: `Neo.TransientError.*`, plus leader
/// changes and expired authorization, which the driver maps to client kinds.
#[must_use]
pub fn is_transient_kind(kind: Neo4jErrorKind) -> bool {
    matches!(
        kind,
        Neo4jErrorKind::Transient
            | Neo4jErrorKind::Client(
                Neo4jClientErrorKind::SessionExpired
                    | Neo4jClientErrorKind::Security(Neo4jSecurityErrorKind::AuthorizationExpired)
            )
    )
}

/// Enforce the minimum major-version gate on a reported server version.
///
/// Pre-release and edition suffixes after `-` are ignored (`5.26.0-aura`).
///
/// # Errors
/// Returns `UnknownVersion` for empty or unparseable versions and
/// `UnsupportedVersion` when the major version is below the minimum.
pub fn check_version(version: &str) -> Result<(), GraphError> {
    let core = version.trim().split('-').next().unwrap_or_default();
    let major = core
        .split('.')
        .next()
        .and_then(|m| m.parse::<u32>().ok())
        .ok_or(GraphError::UnknownVersion)?;

    if major < MIN_MAJOR_VERSION {
        return Err(GraphError::UnsupportedVersion {
            version: version.trim().to_string(),
        });
    }
    Ok(())
}

/// Configuration for Neo4j connection
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
    pub retry: RetryPolicy,
}

impl Neo4jConfig {
    /// Create a new Neo4j configuration
    #[must_use]
    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            database: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the database name
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the retry policy wrapped around every operation
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Client for interacting with Neo4j
pub struct Neo4jClient {
    graph: Arc<Graph>,
    retry: RetryPolicy,
}

impl Neo4jClient {
    /// Connect to Neo4j.
    ///
    /// The driver opens connections lazily, so this only validates the
    /// configuration; the first round trip is the retried version read.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, GraphError> {
        let mut builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password);

        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }

        let neo_config = builder
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        let graph = Graph::connect(neo_config).await?;

        Ok(Self {
            graph: Arc::new(graph),
            retry: config.retry.clone(),
        })
    }

    /// Run statements as one transaction under the retry policy and return
    /// the rows of each statement in order.
    ///
    /// `build` is called once per attempt since queries are consumed on send.
    /// Explicit transactions are never retried by the driver, so the policy
    /// is the only retry layer.
    pub(super) async fn transact(
        &self,
        name: &str,
        build: impl Fn() -> Vec<Query>,
    ) -> Result<Vec<Vec<Row>>, GraphError> {
        let graph = &self.graph;
        self.retry
            .run(name, GraphError::is_transient, move || {
                let queries = build();
                async move { execute_in_transaction(graph, queries).await }
            })
            .await
    }

    /// Run a single write statement under the retry policy
    pub(super) async fn run_retrying(
        &self,
        name: &str,
        build: impl Fn() -> Query,
    ) -> Result<(), GraphError> {
        self.transact(name, || vec![build()]).await.map(|_| ())
    }

    /// Execute a single statement under the retry policy and collect its rows
    pub(super) async fn fetch_retrying(
        &self,
        name: &str,
        build: impl Fn() -> Query,
    ) -> Result<Vec<Row>, GraphError> {
        let mut results = self.transact(name, || vec![build()]).await?;
        Ok(results.pop().unwrap_or_default())
    }
}

/// One attempt: begin, execute every statement, commit. A failed attempt
/// never commits; the driver resets the connection before reusing it.
async fn execute_in_transaction(
    graph: &Graph,
    queries: Vec<Query>,
) -> Result<Vec<Vec<Row>>, GraphError> {
    let mut txn = graph.start_txn().await?;
    let mut results = Vec::with_capacity(queries.len());
    for query in queries {
        let mut stream = txn.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next(txn.handle()).await? {
            rows.push(row);
        }
        results.push(rows);
    }
    txn.commit().await?;
    Ok(results)
}
