//! LSP type conversion utilities
//!
//! Converts `async_lsp::lsp_types` responses into [`LspSymbol`] trees, and
//! those trees into [`DeclaredSymbol`] facts for the source handler.

use async_lsp::lsp_types::{DocumentSymbol, DocumentSymbolResponse, SymbolInformation, SymbolKind};

use super::types::{LspSymbol, LspSymbolKind};
use crate::facts::DeclaredSymbol;
use crate::graph::model::{Accessibility, SymbolKind as DeclKind};

/// Convert a `DocumentSymbolResponse` to a list of `LspSymbol`.
#[must_use]
pub fn convert_symbol_response(response: Option<DocumentSymbolResponse>) -> Vec<LspSymbol> {
    match response {
        Some(DocumentSymbolResponse::Flat(symbols)) => {
            nest_by_container(symbols.iter().map(convert_symbol_information).collect())
        }
        Some(DocumentSymbolResponse::Nested(symbols)) => {
            symbols.iter().map(convert_document_symbol).collect()
        }
        None => vec![],
    }
}

/// Convert a `DocumentSymbol` (hierarchical format) to our `LspSymbol` type.
#[must_use]
pub fn convert_document_symbol(symbol: &DocumentSymbol) -> LspSymbol {
    let children = symbol
        .children
        .as_ref()
        .map(|c| c.iter().map(convert_document_symbol).collect())
        .unwrap_or_default();

    LspSymbol {
        name: symbol.name.clone(),
        kind: convert_symbol_kind(symbol.kind),
        detail: symbol.detail.clone(),
        container_name: None,
        start_line: symbol.selection_range.start.line,
        end_line: symbol.range.end.line,
        start_col: symbol.selection_range.start.character,
        children,
    }
}

/// Convert a `SymbolInformation` (flat format) to our `LspSymbol` type.
#[must_use]
pub fn convert_symbol_information(symbol: &SymbolInformation) -> LspSymbol {
    #[allow(deprecated)]
    let container_name = symbol.container_name.clone();
    LspSymbol {
        name: symbol.name.clone(),
        kind: convert_symbol_kind(symbol.kind),
        detail: None,
        container_name,
        start_line: symbol.location.range.start.line,
        end_line: symbol.location.range.end.line,
        start_col: symbol.location.range.start.character,
        children: vec![],
    }
}

/// Rebuild the tree of a flat response. Each symbol becomes a child of the
/// innermost symbol that encloses its lines and whose name its container
/// name ends with; symbols without such a container stay at the top level.
#[must_use]
pub fn nest_by_container(flat: Vec<LspSymbol>) -> Vec<LspSymbol> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut roots = Vec::new();
    for index in 0..flat.len() {
        match container_of(&flat, index) {
            Some(parent) => children[parent].push(index),
            None => roots.push(index),
        }
    }

    let mut slots: Vec<Option<LspSymbol>> = flat.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|index| assemble(index, &mut slots, &children))
        .collect()
}

/// Parent of `flat[index]`. A parent spans more lines than its child, or
/// the same lines and comes earlier, so parent links never form a cycle.
fn container_of(flat: &[LspSymbol], index: usize) -> Option<usize> {
    let child = flat.get(index)?;
    let container = child.container_name.as_deref().filter(|c| !c.is_empty())?;
    let span = |s: &LspSymbol| s.end_line.saturating_sub(s.start_line);

    flat.iter()
        .enumerate()
        .filter(|&(candidate_index, candidate)| {
            let wider = span(candidate) > span(child)
                || (span(candidate) == span(child) && candidate_index < index);
            candidate_index != index
                && wider
                && candidate.start_line <= child.start_line
                && candidate.end_line >= child.end_line
                && names_container(container, &candidate.name)
        })
        .min_by_key(|&(candidate_index, candidate)| {
            (span(candidate), std::cmp::Reverse(candidate_index))
        })
        .map(|(candidate_index, _)| candidate_index)
}

/// `Greeter` and `Acme.Core.Greeter` both name the container `Greeter`
fn names_container(container: &str, name: &str) -> bool {
    container == name
        || container
            .strip_suffix(name)
            .is_some_and(|qualifier| qualifier.ends_with('.'))
}

fn assemble(
    index: usize,
    slots: &mut [Option<LspSymbol>],
    children: &[Vec<usize>],
) -> Option<LspSymbol> {
    let mut symbol = slots.get_mut(index)?.take()?;
    symbol.children = children
        .get(index)
        .into_iter()
        .flatten()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(symbol)
}

/// Convert an LSP `SymbolKind` to our `LspSymbolKind` enum.
#[must_use]
pub fn convert_symbol_kind(kind: SymbolKind) -> LspSymbolKind {
    match kind {
        SymbolKind::FILE => LspSymbolKind::File,
        SymbolKind::MODULE => LspSymbolKind::Module,
        SymbolKind::NAMESPACE => LspSymbolKind::Namespace,
        SymbolKind::PACKAGE => LspSymbolKind::Package,
        SymbolKind::CLASS => LspSymbolKind::Class,
        SymbolKind::METHOD => LspSymbolKind::Method,
        SymbolKind::PROPERTY => LspSymbolKind::Property,
        SymbolKind::FIELD => LspSymbolKind::Field,
        SymbolKind::CONSTRUCTOR => LspSymbolKind::Constructor,
        SymbolKind::ENUM => LspSymbolKind::Enum,
        SymbolKind::INTERFACE => LspSymbolKind::Interface,
        SymbolKind::FUNCTION => LspSymbolKind::Function,
        SymbolKind::VARIABLE => LspSymbolKind::Variable,
        SymbolKind::CONSTANT => LspSymbolKind::Constant,
        SymbolKind::STRING => LspSymbolKind::String,
        SymbolKind::NUMBER => LspSymbolKind::Number,
        SymbolKind::BOOLEAN => LspSymbolKind::Boolean,
        SymbolKind::ARRAY => LspSymbolKind::Array,
        SymbolKind::OBJECT => LspSymbolKind::Object,
        SymbolKind::KEY => LspSymbolKind::Key,
        SymbolKind::NULL => LspSymbolKind::Null,
        SymbolKind::ENUM_MEMBER => LspSymbolKind::EnumMember,
        SymbolKind::STRUCT => LspSymbolKind::Struct,
        SymbolKind::EVENT => LspSymbolKind::Event,
        SymbolKind::OPERATOR => LspSymbolKind::Operator,
        SymbolKind::TYPE_PARAMETER => LspSymbolKind::TypeParameter,
        _ => LspSymbolKind::Variable,
    }
}

/// Graph kind of a server-reported kind; `None` for kinds that are not
/// declarations (literals, type parameters).
#[must_use]
pub fn declared_kind(kind: LspSymbolKind) -> Option<DeclKind> {
    let kind = match kind {
        LspSymbolKind::Namespace | LspSymbolKind::Module | LspSymbolKind::Package => {
            DeclKind::Namespace
        }
        LspSymbolKind::Class | LspSymbolKind::Object => DeclKind::Class,
        LspSymbolKind::Struct => DeclKind::Struct,
        LspSymbolKind::Interface => DeclKind::Interface,
        LspSymbolKind::Enum => DeclKind::Enum,
        LspSymbolKind::EnumMember => DeclKind::EnumMember,
        LspSymbolKind::Method | LspSymbolKind::Operator => DeclKind::Method,
        LspSymbolKind::Constructor => DeclKind::Constructor,
        LspSymbolKind::Property => DeclKind::Property,
        LspSymbolKind::Field => DeclKind::Field,
        LspSymbolKind::Event => DeclKind::Event,
        LspSymbolKind::Function => DeclKind::Function,
        LspSymbolKind::Constant => DeclKind::Constant,
        LspSymbolKind::Variable => DeclKind::Variable,
        _ => return None,
    };
    Some(kind)
}

/// Convert a server symbol tree into declarations, using `content` to
/// recover declared modifiers and doc comments.
#[must_use]
pub fn to_declared(symbols: &[LspSymbol], content: &str) -> Vec<DeclaredSymbol> {
    let lines: Vec<&str> = content.lines().collect();
    symbols
        .iter()
        .filter_map(|s| {
            let scope = s.container_name.as_deref().unwrap_or_default();
            declare(s, scope, None, &lines)
        })
        .collect()
}

fn declare(
    symbol: &LspSymbol,
    scope: &str,
    parent: Option<DeclKind>,
    lines: &[&str],
) -> Option<DeclaredSymbol> {
    let kind = declared_kind(symbol.kind)?;

    // Some servers fold the parameter list into the name
    let (name, name_params) = split_parameters(&symbol.name);
    let fully_qualified_name = if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    };

    let is_callable = matches!(
        kind,
        DeclKind::Method | DeclKind::Constructor | DeclKind::Function | DeclKind::Delegate
    );
    let signature = if is_callable {
        let params = name_params
            .or_else(|| symbol.detail.as_deref().and_then(|d| split_parameters(d).1))
            .unwrap_or("()");
        format!("{fully_qualified_name}{params}")
    } else {
        fully_qualified_name.clone()
    };

    let line = lines.get(symbol.start_line as usize).copied().unwrap_or_default();
    let accessibility = declared_accessibility(line, symbol.start_col as usize, name)
        .unwrap_or_else(|| default_accessibility(kind, parent));

    let children = symbol
        .children
        .iter()
        .filter_map(|child| declare(child, &fully_qualified_name, Some(kind), lines))
        .collect();

    Some(DeclaredSymbol {
        name: name.to_string(),
        kind,
        fully_qualified_name,
        signature,
        accessibility,
        start_line: symbol.start_line + 1,
        end_line: symbol.end_line + 1,
        documentation: doc_comment(lines, symbol.start_line as usize),
        children,
    })
}

/// Split `Name(int, string)` into `("Name", Some("(int, string)"))`
fn split_parameters(text: &str) -> (&str, Option<&str>) {
    match (text.find('('), text.rfind(')')) {
        (Some(open), Some(close)) if close > open => {
            let head = text[..open].trim();
            let name = head.rsplit(char::is_whitespace).next().unwrap_or(head);
            (name, Some(&text[open..=close]))
        }
        _ => (text.trim(), None),
    }
}

/// Modifiers written before `name` on its declaration line, scoped to the
/// text after the last `{`, `}`, `;` or `]` so neighbouring declarations
/// on the same line are not consulted.
pub(super) fn declared_accessibility(line: &str, from: usize, name: &str) -> Option<Accessibility> {
    let start = line.get(from..).map_or(0, |_| from);
    let at = find_word(line, name, start).or_else(|| find_word(line, name, 0))?;
    let prefix = &line[..at];
    let clause = prefix
        .rfind(['{', '}', ';', ']'])
        .map_or(prefix, |i| &prefix[i + 1..]);

    let words: Vec<&str> = clause.split_whitespace().collect();
    let has = |m: &str| words.contains(&m);
    match (has("public"), has("protected"), has("internal"), has("private")) {
        (true, ..) => Some(Accessibility::Public),
        (_, true, true, _) => Some(Accessibility::ProtectedOrInternal),
        (_, true, _, true) => Some(Accessibility::ProtectedAndInternal),
        (_, true, ..) => Some(Accessibility::Protected),
        (_, _, true, _) => Some(Accessibility::Internal),
        (_, _, _, true) => Some(Accessibility::Private),
        _ => None,
    }
}

/// Language defaults when no modifier is written
fn default_accessibility(kind: DeclKind, parent: Option<DeclKind>) -> Accessibility {
    match parent {
        Some(DeclKind::Interface | DeclKind::Enum) => Accessibility::Public,
        _ if kind == DeclKind::EnumMember => Accessibility::Public,
        None | Some(DeclKind::Namespace) => Accessibility::Internal,
        _ => Accessibility::Private,
    }
}

/// Byte offset of `word` in `line` at or after `from`, on identifier
/// boundaries
fn find_word(line: &str, word: &str, from: usize) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    let mut search = from;
    while let Some(pos) = line.get(search..).and_then(|rest| rest.find(word)) {
        let at = search + pos;
        let end = at + word.len();
        let before_ok = !line[..at].chars().next_back().is_some_and(is_ident);
        let after_ok = !line[end..].chars().next().is_some_and(is_ident);
        if before_ok && after_ok {
            return Some(at);
        }
        search = end;
    }
    None
}

/// `///` comment block directly above a declaration line
fn doc_comment(lines: &[&str], start_line: usize) -> Option<String> {
    let mut block: Vec<&str> = lines[..start_line.min(lines.len())]
        .iter()
        .rev()
        .map(|l| l.trim())
        .take_while(|l| l.starts_with("///") || l.starts_with('['))
        .filter_map(|l| l.strip_prefix("///"))
        .map(str::trim)
        .collect();
    if block.is_empty() {
        return None;
    }
    block.reverse();
    Some(block.join("\n"))
}
