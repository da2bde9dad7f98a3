//! Compiled source files, via the semantic-fact provider

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::facts::{DeclaredSymbol, FactProvider};
use crate::graph::model::{Accessibility, RelType, Relationship, Symbol};

pub struct SourceHandler {
    facts: Arc<dyn FactProvider>,
}

impl SourceHandler {
    #[must_use]
    pub fn new(facts: Arc<dyn FactProvider>) -> Self {
        Self { facts }
    }
}

#[async_trait]
impl DocumentHandler for SourceHandler {
    fn name(&self) -> &'static str {
        "source"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".cs"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, min_accessibility: Accessibility) -> Extraction {
        let declared = match self.facts.declared_symbols(ctx.path, ctx.content).await {
            Ok(declared) => declared,
            Err(e) => {
                tracing::warn!("No declarations for {}: {}", ctx.file_path, e);
                Vec::new()
            }
        };

        let mut out = Extraction::default();
        for symbol in &declared {
            visit(ctx, symbol, None, min_accessibility, &mut out);
        }

        if out.is_empty() {
            for diagnostic in self.facts.diagnostics(ctx.path).await {
                tracing::debug!("{}: {}", ctx.file_path, diagnostic);
            }
        }
        out
    }
}

/// Compiler-generated or unresolved declarations never become nodes
fn is_synthetic(name: &str) -> bool {
    name.is_empty() || name.starts_with('<')
}

fn visit(
    ctx: &FileContext<'_>,
    declared: &DeclaredSymbol,
    container: Option<&str>,
    min_accessibility: Accessibility,
    out: &mut Extraction,
) {
    if is_synthetic(&declared.name) {
        return;
    }

    // Namespaces scope names but are not nodes; their members attach to
    // whatever contained the namespace.
    if declared.kind.is_namespace() {
        for child in &declared.children {
            visit(ctx, child, container, min_accessibility, out);
        }
        return;
    }

    if !declared.accessibility.admits(min_accessibility) {
        return;
    }

    let key = ctx.keys.symbol(&declared.signature);
    out.symbols.push(Symbol {
        key: key.clone(),
        name: declared.name.clone(),
        kind: declared.kind,
        fully_qualified_name: declared.fully_qualified_name.clone(),
        accessibility: declared.accessibility,
        file_key: ctx.file_key.to_string(),
        file_path: ctx.file_path.to_string(),
        start_line: Some(declared.start_line),
        end_line: Some(declared.end_line),
        documentation: declared.documentation.clone(),
        comments: None,
    });
    if let Some(container) = container {
        out.relationships
            .push(Relationship::new(container, key.as_str(), RelType::Contains));
    }

    for child in &declared.children {
        visit(ctx, child, Some(&key), min_accessibility, out);
    }
}
