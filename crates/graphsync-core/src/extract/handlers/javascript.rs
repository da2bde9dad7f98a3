//! JavaScript: function declarations and module imports

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::pattern;
use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

/// `function name(`, `const name = (..) =>`, `name: function`
static FUNCTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    pattern(
        r"function\s+([A-Za-z0-9_$]+)|(?:const|let|var)\s+([A-Za-z0-9_$]+)\s*=\s*(?:async\s*)?\([^)]*\)\s*=>|([A-Za-z0-9_$]+)\s*:\s*(?:async\s+)?function",
    )
});

/// `import x from 'mod'` and `require('mod')`
static IMPORT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    pattern(r#"import\s+[^;]*?\s+from\s+['"]([^'"]+)['"]|require\(\s*['"]([^'"]+)['"]\s*\)"#)
});

pub struct JavaScriptHandler;

#[async_trait]
impl DocumentHandler for JavaScriptHandler {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".js"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let mut out = Extraction::default();
        collect(ctx, FUNCTION.as_ref(), SymbolKind::JavaScriptFunction, RelType::Contains, &mut out);
        collect(ctx, IMPORT.as_ref(), SymbolKind::JavaScriptImport, RelType::DependsOn, &mut out);
        out
    }
}

/// One symbol per match, named by the first participating capture group
fn collect(
    ctx: &FileContext<'_>,
    regex: Option<&Regex>,
    kind: SymbolKind,
    rel_type: RelType,
    out: &mut Extraction,
) {
    let Some(regex) = regex else { return };
    for caps in regex.captures_iter(ctx.content) {
        let Some(name) = caps.iter().skip(1).flatten().next() else {
            continue;
        };
        let Some(whole) = caps.get(0) else { continue };

        let line = ctx.line_at(whole.start());
        let key = element_key(ctx.file_key, &kind.to_string(), name.as_str(), Some(line));
        out.attach(
            ctx.file_key,
            rel_type.clone(),
            ctx.element(key, name.as_str(), kind, name.as_str(), Some(line)),
        );
    }
}
