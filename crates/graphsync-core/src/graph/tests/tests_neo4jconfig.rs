//! Tests for Neo4jConfig

use std::time::Duration;

use crate::graph::neo4j::Neo4jConfig;
use crate::graph::retry::RetryPolicy;

#[test]
fn test_new_with_string_slices() {
    let config = Neo4jConfig::new("bolt://localhost:7687", "neo4j", "password");

    assert_eq!(config.uri, "bolt://localhost:7687");
    assert_eq!(config.user, "neo4j");
    assert_eq!(config.password, "password");
    assert_eq!(config.database, None);
}

#[test]
fn test_new_uses_default_retry_policy() {
    let config = Neo4jConfig::new("bolt://localhost:7687", "neo4j", "password");

    assert_eq!(config.retry, RetryPolicy::default());
    assert_eq!(config.retry.max_retries, 5);
    assert_eq!(config.retry.base_delay, Duration::from_secs(1));
}

#[test]
fn test_with_database_last_wins() {
    let config = Neo4jConfig::new("bolt://localhost:7687", "neo4j", "password")
        .with_database("first_db")
        .with_database("graph");

    assert_eq!(config.database, Some("graph".to_string()));
}

#[test]
fn test_with_retry_preserves_other_fields() {
    let config = Neo4jConfig::new("bolt://custom:1234", "admin", "secret")
        .with_database("production")
        .with_retry(RetryPolicy::none());

    assert_eq!(config.uri, "bolt://custom:1234");
    assert_eq!(config.user, "admin");
    assert_eq!(config.password, "secret");
    assert_eq!(config.database.as_deref(), Some("production"));
    assert_eq!(config.retry.max_retries, 0);
}

#[test]
fn test_debug_trait() {
    let config = Neo4jConfig::new("bolt://localhost:7687", "neo4j", "password");
    let debug_output = format!("{:?}", config);

    assert!(debug_output.contains("Neo4jConfig"));
    assert!(debug_output.contains("bolt://localhost:7687"));
    assert!(debug_output.contains("RetryPolicy"));
}
