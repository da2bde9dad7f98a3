//! Stylesheets: rule selectors

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::pattern;
use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension, line_of};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

static COMMENT: LazyLock<Option<Regex>> = LazyLock::new(|| pattern(r"(?s)/\*.*?\*/"));
static SELECTOR: LazyLock<Option<Regex>> = LazyLock::new(|| pattern(r"([^{}]+)\{"));

pub struct CssHandler;

#[async_trait]
impl DocumentHandler for CssHandler {
    fn name(&self) -> &'static str {
        "css"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".css"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let (Some(comment), Some(selectors)) = (COMMENT.as_ref(), SELECTOR.as_ref()) else {
            return Extraction::default();
        };

        // Blank out comments but keep their newlines so offsets map to lines
        let stripped = comment.replace_all(ctx.content, |caps: &regex::Captures<'_>| {
            caps[0]
                .chars()
                .map(|c| if c == '\n' { '\n' } else { ' ' })
                .collect::<String>()
        });

        let kind = SymbolKind::CssSelector;
        let mut out = Extraction::default();
        for caps in selectors.captures_iter(&stripped) {
            let Some(group) = caps.get(1) else { continue };
            let selector = group.as_str().trim();
            if selector.is_empty() || selector.starts_with('@') {
                continue;
            }

            let leading = group.as_str().len() - group.as_str().trim_start().len();
            let line = line_of(&stripped, group.start() + leading);
            let key = element_key(ctx.file_key, &kind.to_string(), selector, Some(line));
            out.attach(
                ctx.file_key,
                RelType::Contains,
                ctx.element(key, selector, kind, selector, Some(line)),
            );
        }
        out
    }
}
