//! Graph model types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    // Compiled-language declarations
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    EnumMember,
    Method,
    Constructor,
    Property,
    Field,
    Event,
    Delegate,
    Function,
    Constant,
    Variable,

    // Markup and configuration elements
    JsonProperty,
    XmlElement,
    XamlElement,
    XamlEventHandler,
    ProjectProperty,
    PackageReference,
    ProjectReference,
    CssSelector,
    JavaScriptFunction,
    JavaScriptImport,
    HtmlScriptReference,
    HtmlElementId,
    UsingDirective,
    InjectDirective,
    ModelDirective,
    InheritsDirective,
}

impl SymbolKind {
    /// Whether this kind only scopes names and never becomes a node
    #[must_use]
    pub fn is_namespace(self) -> bool {
        matches!(self, Self::Namespace)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Namespace => "Namespace",
            Self::Class => "Class",
            Self::Struct => "Struct",
            Self::Interface => "Interface",
            Self::Enum => "Enum",
            Self::EnumMember => "EnumMember",
            Self::Method => "Method",
            Self::Constructor => "Constructor",
            Self::Property => "Property",
            Self::Field => "Field",
            Self::Event => "Event",
            Self::Delegate => "Delegate",
            Self::Function => "Function",
            Self::Constant => "Constant",
            Self::Variable => "Variable",
            Self::JsonProperty => "JsonProperty",
            Self::XmlElement => "XmlElement",
            Self::XamlElement => "XamlElement",
            Self::XamlEventHandler => "XamlEventHandler",
            Self::ProjectProperty => "ProjectProperty",
            Self::PackageReference => "PackageReference",
            Self::ProjectReference => "ProjectReference",
            Self::CssSelector => "CssSelector",
            Self::JavaScriptFunction => "JavaScriptFunction",
            Self::JavaScriptImport => "JavaScriptImport",
            Self::HtmlScriptReference => "HtmlScriptReference",
            Self::HtmlElementId => "HtmlElementId",
            Self::UsingDirective => "UsingDirective",
            Self::InjectDirective => "InjectDirective",
            Self::ModelDirective => "ModelDirective",
            Self::InheritsDirective => "InheritsDirective",
        };
        write!(f, "{s}")
    }
}

/// Declared accessibility of a symbol, ordered from least to most visible.
///
/// `NotApplicable` sorts lowest but is always admitted by a minimum filter:
/// it marks symbols for which accessibility has no meaning (markup, config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Accessibility {
    NotApplicable,
    Private,
    ProtectedAndInternal,
    Protected,
    Internal,
    ProtectedOrInternal,
    Public,
}

impl Accessibility {
    /// Whether a symbol with this accessibility passes the `minimum` filter
    #[must_use]
    pub fn admits(self, minimum: Accessibility) -> bool {
        self == Self::NotApplicable || self >= minimum
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotApplicable => "NotApplicable",
            Self::Private => "Private",
            Self::ProtectedAndInternal => "ProtectedAndInternal",
            Self::Protected => "Protected",
            Self::Internal => "Internal",
            Self::ProtectedOrInternal => "ProtectedOrInternal",
            Self::Public => "Public",
        };
        write!(f, "{s}")
    }
}

/// Error returned when an accessibility name is not recognized
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown accessibility '{0}' (expected one of: private, protected-and-internal, protected, internal, protected-or-internal, public, not-applicable)")]
pub struct ParseAccessibilityError(pub String);

impl FromStr for Accessibility {
    type Err = ParseAccessibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "notapplicable" => Ok(Self::NotApplicable),
            "private" => Ok(Self::Private),
            "protectedandinternal" | "privateprotected" => Ok(Self::ProtectedAndInternal),
            "protected" => Ok(Self::Protected),
            "internal" => Ok(Self::Internal),
            "protectedorinternal" | "protectedinternal" => Ok(Self::ProtectedOrInternal),
            "public" => Ok(Self::Public),
            _ => Err(ParseAccessibilityError(s.to_string())),
        }
    }
}

/// Relationship type between two keyed nodes.
///
/// The well-known vocabulary is closed over the built-in handlers; new
/// handlers may introduce their own types through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelType {
    Contains,
    DependsOn,
    BindsTo,
    HasProperty,
    Other(String),
}

impl RelType {
    /// Build a custom relationship type, normalized to `SCREAMING_SNAKE_CASE`.
    ///
    /// Characters outside `[A-Za-z0-9_]` become underscores so the result is
    /// always a valid Cypher relationship type.
    #[must_use]
    pub fn other(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        match normalized.as_str() {
            "CONTAINS" => Self::Contains,
            "DEPENDS_ON" => Self::DependsOn,
            "BINDS_TO" => Self::BindsTo,
            "HAS_PROPERTY" => Self::HasProperty,
            _ if normalized.is_empty() => Self::Other("RELATED_TO".to_string()),
            _ => Self::Other(normalized),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Contains => "CONTAINS",
            Self::DependsOn => "DEPENDS_ON",
            Self::BindsTo => "BINDS_TO",
            Self::HasProperty => "HAS_PROPERTY",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A symbol node in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Deterministic key, see [`crate::keys`]
    pub key: String,
    pub name: String,
    pub kind: SymbolKind,
    pub fully_qualified_name: String,
    pub accessibility: Accessibility,
    /// Key of the file that declares this symbol
    pub file_key: String,
    /// Normalized absolute path of the declaring file
    pub file_path: String,
    /// Start line (1-indexed)
    pub start_line: Option<u32>,
    /// End line (1-indexed)
    pub end_line: Option<u32>,
    pub documentation: Option<String>,
    pub comments: Option<String>,
}

/// A directed, typed edge between two keyed nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub from_key: String,
    pub to_key: String,
    pub rel_type: RelType,
}

impl Relationship {
    #[must_use]
    pub fn new(from_key: impl Into<String>, to_key: impl Into<String>, rel_type: RelType) -> Self {
        Self {
            from_key: from_key.into(),
            to_key: to_key.into(),
            rel_type,
        }
    }
}

/// Per-author history of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub name: String,
    pub first_commit: DateTime<Utc>,
    pub last_commit: DateTime<Utc>,
    pub commit_count: u32,
}

/// A file node with its provenance metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_key: String,
    /// Normalized absolute path
    pub path: String,
    /// Path relative to the source root
    pub relative_path: String,
    /// SHA-256 of the file content
    pub content_hash: String,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub authors: Vec<AuthorStats>,
    pub commit_hashes: Vec<String>,
    pub tags: Vec<String>,
}

/// The root node every other node is scoped under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub repo_key: String,
    /// Display name, usually the source root directory name
    pub name: String,
}

/// An external package the project depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub key: String,
    pub name: String,
    pub version: String,
}

/// A commit in the synced range, with touched files mapped to file keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub changed_file_keys: Vec<String>,
}
