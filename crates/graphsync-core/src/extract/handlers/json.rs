//! JSON documents: one node per property, keyed by its dotted path

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

pub struct JsonHandler;

#[async_trait]
impl DocumentHandler for JsonHandler {
    fn name(&self) -> &'static str {
        "json"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".json"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let mut out = Extraction::default();
        match serde_json::from_str::<Value>(ctx.content) {
            Ok(value) => visit(ctx, &value, "", &mut out),
            Err(e) => tracing::warn!("Skipping malformed JSON {}: {}", ctx.file_path, e),
        }
        out
    }
}

fn visit(ctx: &FileContext<'_>, value: &Value, path: &str, out: &mut Extraction) {
    match value {
        Value::Object(map) => {
            let kind = SymbolKind::JsonProperty;
            for (name, child) in map {
                let child_path = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                let key = element_key(ctx.file_key, &kind.to_string(), &child_path, None);
                out.attach(
                    ctx.file_key,
                    RelType::Contains,
                    ctx.element(key, name, kind, &child_path, None),
                );
                visit(ctx, child, &child_path, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                visit(ctx, item, &format!("{path}[{index}]"), out);
            }
        }
        _ => {}
    }
}
