//! Symbol and relationship Neo4j queries

use std::collections::BTreeMap;

use neo4rs::{Query, Row};

use super::Neo4jClient;
use crate::graph::convert::{BoltMap, relationship_to_bolt, symbol_to_bolt};
use crate::graph::model::{RelType, Relationship, Symbol};
use crate::graph::neo4j::GraphError;
use crate::graph::store::FlushOutcome;

impl Neo4jClient {
    /// Detach-delete every symbol declared in a file
    ///
    /// # Errors
    /// Returns an error if the query fails after retries.
    pub async fn delete_file_symbols(&self, file_key: &str) -> Result<(), GraphError> {
        self.run_retrying("delete_prior_symbols", || {
            Query::new(
                r#"
                MATCH (s:Symbol {fileKey: $fileKey})
                DETACH DELETE s
                "#
                .to_string(),
            )
            .param("fileKey", file_key)
        })
        .await
    }

    /// Write one flush as a single transaction: the symbol batch first,
    /// then one relationship statement per type.
    ///
    /// Relationship endpoints are looked up by key among symbols and files,
    /// so endpoints written earlier in the same transaction resolve.
    ///
    /// # Errors
    /// Returns an error if the transaction fails after retries.
    pub async fn flush_batch(
        &self,
        symbols: &[Symbol],
        relationships: &[Relationship],
    ) -> Result<FlushOutcome, GraphError> {
        if symbols.is_empty() && relationships.is_empty() {
            return Ok(FlushOutcome::default());
        }

        let results = self
            .transact("flush", || flush_statements(symbols, relationships))
            .await?;

        let skip = usize::from(!symbols.is_empty());
        let relationships_merged = results.iter().skip(skip).map(|rows| merged_count(rows)).sum();
        Ok(FlushOutcome {
            symbols_written: symbols.len(),
            relationships_merged,
        })
    }
}

const MERGE_SYMBOLS: &str = r#"
    UNWIND $symbols AS sym
    MERGE (s:Symbol {key: sym.key})
    SET s.name = sym.name,
        s.kind = sym.kind,
        s.fqn = sym.fqn,
        s.accessibility = sym.accessibility,
        s.fileKey = sym.fileKey,
        s.filePath = sym.filePath,
        s.startLine = sym.startLine,
        s.endLine = sym.endLine,
        s.documentation = sym.documentation,
        s.comments = sym.comments,
        s.deleted = false
    WITH s, sym
    MATCH (f:File {key: sym.fileKey})
    MERGE (s)-[:DEFINED_IN]->(f)
"#;

/// Statements of one flush, in execution order: the `$symbols` batch when
/// there are symbols, then one `$rels` batch per relationship type.
pub(crate) fn flush_statements(symbols: &[Symbol], relationships: &[Relationship]) -> Vec<Query> {
    let mut statements = Vec::new();
    if !symbols.is_empty() {
        let batch: Vec<BoltMap> = symbols.iter().map(symbol_to_bolt).collect();
        statements.push(Query::new(MERGE_SYMBOLS.to_string()).param("symbols", batch));
    }

    let mut by_type: BTreeMap<&RelType, Vec<BoltMap>> = BTreeMap::new();
    for relationship in relationships {
        by_type
            .entry(&relationship.rel_type)
            .or_default()
            .push(relationship_to_bolt(relationship));
    }
    for (rel_type, batch) in by_type {
        statements.push(Query::new(merge_relationships_statement(rel_type)).param("rels", batch));
    }
    statements
}

fn merge_relationships_statement(rel_type: &RelType) -> String {
    // Relationship types cannot be parameterized
    let rel_type = RelType::other(rel_type.as_str());
    format!(
        r#"
        UNWIND $rels AS rel
        OPTIONAL MATCH (fromSymbol:Symbol {{key: rel.fromKey}})
        OPTIONAL MATCH (fromFile:File {{key: rel.fromKey}})
        OPTIONAL MATCH (toSymbol:Symbol {{key: rel.toKey}})
        OPTIONAL MATCH (toFile:File {{key: rel.toKey}})
        WITH coalesce(fromSymbol, fromFile) AS source,
             coalesce(toSymbol, toFile) AS target
        WHERE source IS NOT NULL AND target IS NOT NULL
        MERGE (source)-[:{rel_type}]->(target)
        RETURN count(*) AS merged
        "#
    )
}

fn merged_count(rows: &[Row]) -> usize {
    rows.first()
        .and_then(|row| row.get::<i64>("merged").ok())
        .and_then(|count| usize::try_from(count).ok())
        .unwrap_or_default()
}
