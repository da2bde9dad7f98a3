//! Run summary

use std::fmt;

use crate::changes::SyncMode;
use crate::extract::ExtractionStats;

use super::buffer::FlushTotals;

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: SyncMode,
    /// Files discovered under the source root
    pub files_discovered: usize,
    /// Files selected by the change set
    pub files_selected: usize,
    pub files_processed: usize,
    /// Files that could not be read
    pub files_failed: usize,
    pub files_deleted: usize,
    pub commits: usize,
    pub dependencies: usize,
    pub symbols: usize,
    pub relationships: usize,
    pub dangling_relationships: usize,
    pub flushes: usize,
    pub extraction: ExtractionStats,
}

impl SyncReport {
    #[must_use]
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            files_discovered: 0,
            files_selected: 0,
            files_processed: 0,
            files_failed: 0,
            files_deleted: 0,
            commits: 0,
            dependencies: 0,
            symbols: 0,
            relationships: 0,
            dangling_relationships: 0,
            flushes: 0,
            extraction: ExtractionStats::default(),
        }
    }

    pub(super) fn absorb(&mut self, totals: FlushTotals) {
        self.symbols = totals.symbols;
        self.relationships = totals.relationships;
        self.dangling_relationships = totals.dangling;
        self.flushes = totals.flushes;
    }

    /// Per-handler counts as `name=count`, comma-separated
    #[must_use]
    pub fn handler_summary(&self) -> String {
        let mut parts: Vec<String> = self
            .extraction
            .iter()
            .map(|(name, count)| format!("{name}={count}"))
            .collect();
        if self.extraction.unhandled() > 0 {
            parts.push(format!("unhandled={}", self.extraction.unhandled()));
        }
        parts.join(", ")
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sync: {}/{} files processed ({} failed, {} deleted), {} symbols, {} relationships ({} dangling) in {} flushes",
            self.mode,
            self.files_processed,
            self.files_selected,
            self.files_failed,
            self.files_deleted,
            self.symbols,
            self.relationships,
            self.dangling_relationships,
            self.flushes
        )
    }
}
