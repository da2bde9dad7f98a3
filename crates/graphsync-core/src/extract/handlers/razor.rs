//! Razor components and views: top-level directives

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::pattern;
use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

static DIRECTIVE: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern(r"(?m)^[ \t]*@(using|inject|model|inherits)[ \t]+([^\r\n]+)"));

pub struct RazorHandler;

#[async_trait]
impl DocumentHandler for RazorHandler {
    fn name(&self) -> &'static str {
        "razor"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".razor", ".cshtml"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let mut out = Extraction::default();
        let Some(directive) = DIRECTIVE.as_ref() else {
            return out;
        };
        for caps in directive.captures_iter(ctx.content) {
            let kind = match &caps[1] {
                "using" => SymbolKind::UsingDirective,
                "inject" => SymbolKind::InjectDirective,
                "model" => SymbolKind::ModelDirective,
                _ => SymbolKind::InheritsDirective,
            };
            let value = caps[2].trim().trim_end_matches(';').trim();
            if value.is_empty() {
                continue;
            }

            let line = caps.get(0).map_or(1, |m| ctx.line_at(m.start()));
            let key = element_key(ctx.file_key, &kind.to_string(), value, None);
            out.attach(
                ctx.file_key,
                RelType::Contains,
                ctx.element(key, value, kind, value, Some(line)),
            );
        }
        out
    }
}
