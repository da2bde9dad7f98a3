//! Extraction: turn one file into symbols and relationships
//!
//! Each artifact type is a [`DocumentHandler`]. The [`Dispatcher`] picks the
//! first handler that accepts a path, runs it, and applies the accessibility
//! filter to whatever the handler produced. Handlers never fail: malformed
//! input yields an empty [`Extraction`] and a logged diagnostic.

mod dispatcher;
mod filter;
pub mod handlers;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use crate::graph::model::{Accessibility, RelType, Relationship, Symbol, SymbolKind};
use crate::keys::KeyBuilder;

pub use dispatcher::Dispatcher;
pub use filter::apply_accessibility;

/// Everything a handler knows about the file it is processing
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    pub keys: &'a KeyBuilder,
    pub file_key: &'a str,
    /// Absolute path on disk
    pub path: &'a Path,
    /// Normalized absolute path, stored on every symbol
    pub file_path: &'a str,
    pub content: &'a str,
}

impl FileContext<'_> {
    /// 1-based line of a byte offset into the content
    #[must_use]
    pub fn line_at(&self, offset: usize) -> u32 {
        line_of(self.content, offset)
    }

    /// A public, single-line symbol declared in this file
    #[must_use]
    pub fn element(
        &self,
        key: String,
        name: impl Into<String>,
        kind: SymbolKind,
        fully_qualified_name: impl Into<String>,
        line: Option<u32>,
    ) -> Symbol {
        Symbol {
            key,
            name: name.into(),
            kind,
            fully_qualified_name: fully_qualified_name.into(),
            accessibility: Accessibility::Public,
            file_key: self.file_key.to_string(),
            file_path: self.file_path.to_string(),
            start_line: line,
            end_line: line,
            documentation: None,
            comments: None,
        }
    }
}

/// Output of one handler invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub symbols: Vec<Symbol>,
    pub relationships: Vec<Relationship>,
}

impl Extraction {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.relationships.is_empty()
    }

    /// Add a symbol reached from `from_key` through an edge of `rel_type`
    pub fn attach(&mut self, from_key: &str, rel_type: RelType, symbol: Symbol) {
        self.relationships
            .push(Relationship::new(from_key, symbol.key.as_str(), rel_type));
        self.symbols.push(symbol);
    }
}

/// One artifact type the pipeline knows how to read
#[async_trait]
pub trait DocumentHandler: Send + Sync {
    /// Stable name used in run statistics
    fn name(&self) -> &'static str;

    fn can_handle(&self, path: &Path) -> bool;

    /// Extract symbols and relationships. Must not fail: parse errors are
    /// logged and produce an empty result.
    async fn handle(&self, ctx: &FileContext<'_>, min_accessibility: Accessibility) -> Extraction;
}

/// Per-run count of files handled by each handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    handled: BTreeMap<&'static str, u64>,
    unhandled: u64,
}

impl ExtractionStats {
    pub fn record(&mut self, handler: &'static str) {
        *self.handled.entry(handler).or_default() += 1;
    }

    pub fn record_unhandled(&mut self) {
        self.unhandled += 1;
    }

    #[must_use]
    pub fn handled(&self, handler: &str) -> u64 {
        self.handled.get(handler).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_handled(&self) -> u64 {
        self.handled.values().sum()
    }

    #[must_use]
    pub fn unhandled(&self) -> u64 {
        self.unhandled
    }

    /// Handler names and counts, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.handled.iter().map(|(name, count)| (*name, *count))
    }
}

/// 1-based line of a byte offset into `text`
#[must_use]
pub fn line_of(text: &str, offset: usize) -> u32 {
    let prefix = text.get(..offset).unwrap_or(text);
    let newlines = prefix.bytes().filter(|b| *b == b'\n').count();
    u32::try_from(newlines + 1).unwrap_or(u32::MAX)
}

/// Case-insensitive extension check against dotted extensions
#[must_use]
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
}
