//! LSP module: declared-symbol facts via the Language Server Protocol
//!
//! Drives an external language server over stdio and turns its document
//! symbols into [`crate::facts::DeclaredSymbol`] trees.

mod client;
mod convert;
mod provider;
mod state;
mod types;

pub use client::LspClient;
pub use convert::{
    convert_document_symbol, convert_symbol_information, convert_symbol_kind,
    convert_symbol_response, declared_kind, to_declared,
};
pub use provider::LspFactProvider;
pub use state::DiagnosticMap;
pub use types::{LspServerConfig, LspSymbol, LspSymbolKind};
