//! Generic XML: every element becomes a node

use std::path::Path;

use async_trait::async_trait;

use super::markup::{XmlNode, parse_document};
use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

pub struct XmlHandler;

#[async_trait]
impl DocumentHandler for XmlHandler {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".xml", ".config", ".props", ".targets"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let mut out = Extraction::default();
        match parse_document(ctx.content) {
            Ok(root) => visit(ctx, &root, ctx.file_key, &mut out),
            Err(e) => tracing::warn!("Skipping malformed XML {}: {}", ctx.file_path, e),
        }
        out
    }
}

fn visit(ctx: &FileContext<'_>, node: &XmlNode, parent_key: &str, out: &mut Extraction) {
    let kind = SymbolKind::XmlElement;
    let key = element_key(ctx.file_key, &kind.to_string(), &node.name, Some(node.line));
    out.attach(
        parent_key,
        RelType::Contains,
        ctx.element(key.clone(), &node.name, kind, &node.name, Some(node.line)),
    );

    for child in &node.children {
        visit(ctx, child, &key, out);
    }
}
