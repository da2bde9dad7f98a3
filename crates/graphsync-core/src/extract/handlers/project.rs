//! MSBuild project files: properties, package and project references

use std::path::Path;

use async_trait::async_trait;

use super::markup::{XmlNode, parse_document};
use crate::extract::{DocumentHandler, Extraction, FileContext, has_extension};
use crate::graph::model::{Accessibility, RelType, SymbolKind};
use crate::keys::element_key;

pub struct ProjectFileHandler;

#[async_trait]
impl DocumentHandler for ProjectFileHandler {
    fn name(&self) -> &'static str {
        "project"
    }

    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, &[".csproj"])
    }

    async fn handle(&self, ctx: &FileContext<'_>, _min: Accessibility) -> Extraction {
        let root = match parse_document(ctx.content) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!("Skipping malformed project file {}: {}", ctx.file_path, e);
                return Extraction::default();
            }
        };

        let mut out = Extraction::default();
        properties(ctx, &root, &mut out);
        references(ctx, &root, &mut out);
        out
    }
}

/// `(include, version)` of every `PackageReference` in a project file.
///
/// Malformed documents yield no references.
#[must_use]
pub fn package_references(content: &str) -> Vec<(String, Option<String>)> {
    let Ok(root) = parse_document(content) else {
        return Vec::new();
    };
    root.descendants()
        .into_iter()
        .filter(|n| n.name == "PackageReference")
        .filter_map(|n| {
            let include = n.attribute("Include")?.trim();
            (!include.is_empty()).then(|| (include.to_string(), version_of(n)))
        })
        .collect()
}

fn version_of(node: &XmlNode) -> Option<String> {
    node.attribute("Version")
        .map(str::to_string)
        .or_else(|| {
            node.children_named("Version")
                .next()
                .map(|v| v.text.trim().to_string())
        })
        .filter(|v| !v.is_empty())
}

fn properties(ctx: &FileContext<'_>, root: &XmlNode, out: &mut Extraction) {
    let kind = SymbolKind::ProjectProperty;
    for property in root
        .children_named("PropertyGroup")
        .flat_map(|group| group.children.iter())
    {
        let value = property.text.trim();
        if property.name.is_empty() || value.is_empty() {
            continue;
        }
        let key = element_key(
            ctx.file_key,
            &kind.to_string(),
            &property.name,
            Some(property.line),
        );
        let mut symbol = ctx.element(
            key,
            &property.name,
            kind,
            format!("{}: {}", property.name, value),
            Some(property.line),
        );
        symbol.documentation = Some(value.to_string());
        out.attach(ctx.file_key, RelType::HasProperty, symbol);
    }
}

fn references(ctx: &FileContext<'_>, root: &XmlNode, out: &mut Extraction) {
    for node in root.descendants() {
        let kind = match node.name.as_str() {
            "PackageReference" => SymbolKind::PackageReference,
            "ProjectReference" => SymbolKind::ProjectReference,
            _ => continue,
        };
        let Some(include) = node.attribute("Include").map(str::trim) else {
            continue;
        };
        if include.is_empty() {
            continue;
        }

        let key = element_key(ctx.file_key, &kind.to_string(), include, Some(node.line));
        let symbol = if kind == SymbolKind::PackageReference {
            let version = version_of(node);
            let mut symbol = ctx.element(
                key,
                include,
                kind,
                format!("{} ({})", include, version.as_deref().unwrap_or("*")),
                Some(node.line),
            );
            symbol.documentation = version;
            symbol
        } else {
            ctx.element(key, include, kind, include, Some(node.line))
        };
        out.attach(ctx.file_key, RelType::DependsOn, symbol);
    }
}
