//! Conversion utilities between graph model types and Bolt query parameters

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use neo4rs::BoltType;

use super::model::{AuthorStats, CommitRecord, DependencyRecord, Relationship, Symbol};

/// One row of an `UNWIND` parameter list
pub type BoltMap = HashMap<&'static str, BoltType>;

/// Line value stored when a symbol has no source position
pub const NO_LINE: i64 = -1;

fn text(value: &str) -> BoltType {
    BoltType::String(value.into())
}

fn integer(value: i64) -> BoltType {
    BoltType::Integer(value.into())
}

fn line(value: Option<u32>) -> BoltType {
    integer(value.map_or(NO_LINE, i64::from))
}

/// Render a timestamp for storage; missing timestamps become empty strings
#[must_use]
pub fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value.map(DateTime::to_rfc3339).unwrap_or_default()
}

#[must_use]
pub fn symbol_to_bolt(symbol: &Symbol) -> BoltMap {
    let mut map = HashMap::new();
    map.insert("key", text(&symbol.key));
    map.insert("name", text(&symbol.name));
    map.insert("kind", text(&symbol.kind.to_string()));
    map.insert("fqn", text(&symbol.fully_qualified_name));
    map.insert("accessibility", text(&symbol.accessibility.to_string()));
    map.insert("fileKey", text(&symbol.file_key));
    map.insert("filePath", text(&symbol.file_path));
    map.insert("startLine", line(symbol.start_line));
    map.insert("endLine", line(symbol.end_line));
    map.insert(
        "documentation",
        text(symbol.documentation.as_deref().unwrap_or_default()),
    );
    map.insert(
        "comments",
        text(symbol.comments.as_deref().unwrap_or_default()),
    );
    map
}

#[must_use]
pub fn relationship_to_bolt(relationship: &Relationship) -> BoltMap {
    let mut map = HashMap::new();
    map.insert("fromKey", text(&relationship.from_key));
    map.insert("toKey", text(&relationship.to_key));
    map
}

#[must_use]
pub fn author_to_bolt(author: &AuthorStats) -> BoltMap {
    let mut map = HashMap::new();
    map.insert("name", text(&author.name));
    map.insert("firstCommit", text(&author.first_commit.to_rfc3339()));
    map.insert("lastCommit", text(&author.last_commit.to_rfc3339()));
    map.insert("commitCount", integer(i64::from(author.commit_count)));
    map
}

#[must_use]
pub fn commit_to_bolt(commit: &CommitRecord) -> BoltMap {
    let mut map = HashMap::new();
    map.insert("hash", text(&commit.hash));
    map.insert("authorName", text(&commit.author_name));
    map.insert("authorEmail", text(&commit.author_email));
    map.insert("date", text(&commit.date.to_rfc3339()));
    map.insert("message", text(&commit.message));
    map.insert(
        "changedFiles",
        BoltType::from(commit.changed_file_keys.clone()),
    );
    map
}

#[must_use]
pub fn dependency_to_bolt(dependency: &DependencyRecord) -> BoltMap {
    let mut map = HashMap::new();
    map.insert("key", text(&dependency.key));
    map.insert("name", text(&dependency.name));
    map.insert("version", text(&dependency.version));
    map
}
