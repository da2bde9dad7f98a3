//! Semantic facts about compiled source files
//!
//! The source handler does not parse code itself. It asks a
//! [`FactProvider`] for the declarations of a file, typically backed by a
//! language server (see [`crate::lsp::LspFactProvider`]).

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::model::{Accessibility, SymbolKind};

#[derive(Debug, Error)]
pub enum FactError {
    #[error("Language server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A declaration reported for a source file, with nested declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub fully_qualified_name: String,
    /// Fully-qualified name plus parameter types; unique across overloads
    pub signature: String,
    pub accessibility: Accessibility,
    /// 1-based
    pub start_line: u32,
    /// 1-based
    pub end_line: u32,
    pub documentation: Option<String>,
    pub children: Vec<DeclaredSymbol>,
}

/// Source of declared-symbol facts for compiled source files
#[async_trait]
pub trait FactProvider: Send + Sync {
    /// Declarations in `path`, outermost first.
    ///
    /// # Errors
    /// Returns an error if the facts cannot be obtained for this file.
    async fn declared_symbols(
        &self,
        path: &Path,
        content: &str,
    ) -> Result<Vec<DeclaredSymbol>, FactError>;

    /// Diagnostics published for `path`, if any
    async fn diagnostics(&self, path: &Path) -> Vec<String>;
}

/// Provider used when no language server is available. Every file yields
/// no declarations.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFacts;

#[async_trait]
impl FactProvider for NoFacts {
    async fn declared_symbols(
        &self,
        _path: &Path,
        _content: &str,
    ) -> Result<Vec<DeclaredSymbol>, FactError> {
        Ok(Vec::new())
    }

    async fn diagnostics(&self, _path: &Path) -> Vec<String> {
        vec!["No language server available; source declarations were not extracted".to_string()]
    }
}
