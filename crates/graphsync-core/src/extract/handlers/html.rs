//! HTML pages: script references and element ids

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::pattern;
use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

static SCRIPT_SRC: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern(r#"(?i)<script\s[^>]*?src\s*=\s*['"]([^'"]+)['"]"#));
static ELEMENT_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern(r#"(?i)\sid\s*=\s*['"]([^'"]+)['"]"#));

pub struct HtmlHandler;

#[async_trait]
impl DocumentHandler for HtmlHandler {
    fn name(&self) -> &'static str {
        "html"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".html", ".htm"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let mut out = Extraction::default();
        let targets = [
            (SCRIPT_SRC.as_ref(), SymbolKind::HtmlScriptReference, RelType::DependsOn),
            (ELEMENT_ID.as_ref(), SymbolKind::HtmlElementId, RelType::Contains),
        ];

        for (regex, kind, rel_type) in targets {
            let Some(regex) = regex else { continue };
            for caps in regex.captures_iter(ctx.content) {
                let Some(value) = caps.get(1) else { continue };
                let line = ctx.line_at(value.start());
                let key = element_key(ctx.file_key, &kind.to_string(), value.as_str(), Some(line));
                out.attach(
                    ctx.file_key,
                    rel_type.clone(),
                    ctx.element(key, value.as_str(), kind, value.as_str(), Some(line)),
                );
            }
        }
        out
    }
}
