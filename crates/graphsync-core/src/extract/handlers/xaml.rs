//! XAML views: element tree plus event-handler bindings

use std::path::Path;

use async_trait::async_trait;

use super::markup::{XmlNode, parse_document};
use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

/// Attribute suffixes that name an event handler method
const EVENT_SUFFIXES: &[&str] = &["Click", "Changed", "Loaded", "Pressed", "Released"];

pub struct XamlHandler;

#[async_trait]
impl DocumentHandler for XamlHandler {
    fn name(&self) -> &'static str {
        "xaml"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".xaml"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let mut out = Extraction::default();
        match parse_document(ctx.content) {
            Ok(root) => visit(ctx, &root, ctx.file_key, &mut out),
            Err(e) => tracing::warn!("Skipping malformed XAML {}: {}", ctx.file_path, e),
        }
        out
    }
}

fn is_event_attribute(name: &str) -> bool {
    let local = name.rsplit(':').next().unwrap_or(name);
    local == "Command" || EVENT_SUFFIXES.iter().any(|s| local.ends_with(s))
}

fn visit(ctx: &FileContext<'_>, node: &XmlNode, parent_key: &str, out: &mut Extraction) {
    let identity = node
        .attribute("x:Name")
        .or_else(|| node.attribute("Name"))
        .or_else(|| node.attribute("x:Key"));

    let qualified = match identity {
        Some(id) => format!("{}:{}", node.name, id),
        None => node.name.clone(),
    };
    let key = format!("{}:{}:{}", ctx.file_key, qualified, node.line);
    let line = Some(node.line);

    out.attach(
        parent_key,
        RelType::Contains,
        ctx.element(
            key.clone(),
            identity.unwrap_or(&node.name),
            SymbolKind::XamlElement,
            qualified,
            line,
        ),
    );

    for (attr, value) in &node.attributes {
        if !is_event_attribute(attr) || value.is_empty() {
            continue;
        }
        let handler_key = element_key(ctx.file_key, "EventHandler", value, None);
        let mut handler = ctx.element(
            handler_key,
            value,
            SymbolKind::XamlEventHandler,
            value,
            line,
        );
        handler.accessibility = Accessibility::Private;
        out.attach(&key, RelType::BindsTo, handler);
    }

    for child in &node.children {
        visit(ctx, child, &key, out);
    }
}
