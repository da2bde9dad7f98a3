//! LSP types for extracted information

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A symbol reported by a language server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LspSymbol {
    pub name: String,
    pub kind: LspSymbolKind,
    /// Signature or type detail, when the server provides one
    pub detail: Option<String>,
    /// Container name (flat `SymbolInformation` format only)
    pub container_name: Option<String>,
    /// Line of the symbol name (0-indexed)
    pub start_line: u32,
    /// Last line of the declaration (0-indexed)
    pub end_line: u32,
    /// Column of the symbol name
    pub start_col: u32,
    pub children: Vec<LspSymbol>,
}

/// LSP Symbol kinds (mirrors lsp_types::SymbolKind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LspSymbolKind {
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Key,
    Null,
    EnumMember,
    Struct,
    Event,
    Operator,
    TypeParameter,
}

/// Configuration for a language server process
#[derive(Debug, Clone)]
pub struct LspServerConfig {
    /// Command to start the server
    pub command: String,
    pub args: Vec<String>,
    /// Workspace root, also the server's working directory
    pub root_path: PathBuf,
    /// `languageId` sent with `textDocument/didOpen`
    pub language_id: String,
    /// Initialization options (JSON)
    pub init_options: Option<serde_json::Value>,
    /// Progress tokens whose end marks indexing complete. Empty means the
    /// end of any work-done progress counts.
    pub indexing_tokens: Vec<String>,
    /// Upper bound on the wait for indexing
    pub indexing_timeout: Duration,
}

impl LspServerConfig {
    /// Default C# server (`csharp-ls`) rooted at `root_path`
    #[must_use]
    pub fn csharp(root_path: impl Into<PathBuf>) -> Self {
        Self {
            command: "csharp-ls".to_string(),
            args: Vec::new(),
            root_path: root_path.into(),
            language_id: "csharp".to_string(),
            init_options: None,
            indexing_tokens: Vec::new(),
            indexing_timeout: Duration::from_secs(120),
        }
    }

    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = command.into();
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_indexing_timeout(mut self, timeout: Duration) -> Self {
        self.indexing_timeout = timeout;
        self
    }
}
