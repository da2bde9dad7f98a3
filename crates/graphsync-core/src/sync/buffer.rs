//! Batch buffer and flush controller
//!
//! Extraction output accumulates across files and is written in bounded
//! batches. A batch may hold partial results of several files; a file's
//! symbols and the relationships between them always travel together.

use std::mem;

use crate::extract::Extraction;
use crate::graph::model::{Relationship, Symbol};
use crate::graph::{FlushOutcome, GraphError, GraphStore};

/// Default flush threshold
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Symbols and relationships waiting to be written
#[derive(Debug, Default)]
pub struct BatchBuffer {
    symbols: Vec<Symbol>,
    relationships: Vec<Relationship>,
    threshold: usize,
}

impl BatchBuffer {
    /// A threshold of zero behaves as one
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            symbols: Vec::new(),
            relationships: Vec::new(),
            threshold: threshold.max(1),
        }
    }

    pub fn push(&mut self, extraction: Extraction) {
        self.symbols.extend(extraction.symbols);
        self.relationships.extend(extraction.relationships);
    }

    /// Whether either sequence has reached the threshold
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.symbols.len() >= self.threshold || self.relationships.len() >= self.threshold
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.relationships.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> (usize, usize) {
        (self.symbols.len(), self.relationships.len())
    }

    /// Drain both sequences, leaving the buffer empty
    pub fn take(&mut self) -> (Vec<Symbol>, Vec<Relationship>) {
        (
            mem::take(&mut self.symbols),
            mem::take(&mut self.relationships),
        )
    }
}

/// Running totals of everything the controller has written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushTotals {
    pub flushes: usize,
    pub symbols: usize,
    pub relationships: usize,
    /// Relationships sent whose endpoints did not resolve
    pub dangling: usize,
}

/// Drains a [`BatchBuffer`] into a [`GraphStore`]
pub struct FlushController<'a> {
    store: &'a dyn GraphStore,
    buffer: BatchBuffer,
    totals: FlushTotals,
}

impl<'a> FlushController<'a> {
    #[must_use]
    pub fn new(store: &'a dyn GraphStore, threshold: usize) -> Self {
        Self {
            store,
            buffer: BatchBuffer::new(threshold),
            totals: FlushTotals::default(),
        }
    }

    /// Buffer one file's output, flushing if the threshold is reached
    ///
    /// # Errors
    /// Returns an error if a triggered flush fails after retries.
    pub async fn offer(&mut self, extraction: Extraction) -> Result<(), GraphError> {
        self.buffer.push(extraction);
        if self.buffer.is_full() {
            self.flush().await?;
        }
        Ok(())
    }

    /// Write whatever is buffered. A no-op when the buffer is empty.
    ///
    /// # Errors
    /// Returns an error if the store write fails after retries.
    pub async fn flush(&mut self) -> Result<(), GraphError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let (symbols, relationships) = self.buffer.take();
        let FlushOutcome {
            symbols_written,
            relationships_merged,
        } = self.store.flush(&symbols, &relationships).await?;

        let dangling = relationships.len().saturating_sub(relationships_merged);
        if dangling > 0 {
            tracing::warn!(
                "{} of {} relationships reference symbols that were never written",
                dangling,
                relationships.len()
            );
        }

        self.totals.flushes += 1;
        self.totals.symbols += symbols_written;
        self.totals.relationships += relationships_merged;
        self.totals.dangling += dangling;

        tracing::debug!(
            "Flushed batch {}: {} symbols, {} relationships",
            self.totals.flushes,
            symbols_written,
            relationships_merged
        );
        Ok(())
    }

    /// Pending (symbols, relationships)
    #[must_use]
    pub fn pending(&self) -> (usize, usize) {
        self.buffer.len()
    }

    #[must_use]
    pub fn totals(&self) -> FlushTotals {
        self.totals
    }
}
