//! Tests for the XML-family handlers

#![allow(clippy::expect_used)]

use std::path::Path;

use super::context;
use crate::extract::handlers::{
    MarkupError, ProjectFileHandler, XamlHandler, XmlHandler, package_references, parse_document,
};
use crate::extract::{DocumentHandler, Extraction};
use crate::graph::model::{Accessibility, RelType, Relationship, SymbolKind};
use crate::keys::KeyBuilder;

async fn run(handler: &dyn DocumentHandler, file: &str, content: &str) -> Extraction {
    let keys = KeyBuilder::new("repo");
    let file_key = keys.file(file);
    let path = Path::new("/src").join(file);
    let ctx = context(&keys, &file_key, &path, content);
    handler.handle(&ctx, Accessibility::Private).await
}

// ============================================================================
// parse_document
// ============================================================================

#[test]
fn test_parse_document_builds_tree_with_lines() {
    let root = parse_document("<?xml version=\"1.0\"?>\n<a x=\"1\">\n  <b>hi</b>\n  <c/>\n</a>")
        .expect("well-formed");

    assert_eq!(root.name, "a");
    assert_eq!(root.line, 2);
    assert_eq!(root.attribute("x"), Some("1"));
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].text, "hi");
    assert_eq!(root.children[0].line, 3);
    assert_eq!(root.children[1].line, 4);
    assert_eq!(root.descendants().len(), 2);
}

#[test]
fn test_parse_document_strips_prefix_from_name() {
    let root = parse_document(r#"<x:Root xmlns:x="urn:x"><x:Item x:Key="k"/></x:Root>"#)
        .expect("well-formed");

    assert_eq!(root.name, "Root");
    assert_eq!(root.children[0].name, "Item");
    assert_eq!(root.children[0].attribute("x:Key"), Some("k"));
}

#[test]
fn test_parse_document_rejects_mismatched_tags() {
    assert!(parse_document("<a><b></a>").is_err());
}

#[test]
fn test_parse_document_rejects_empty_input() {
    assert!(matches!(parse_document("   "), Err(MarkupError::Empty)));
}

// ============================================================================
// XmlHandler
// ============================================================================

#[tokio::test]
async fn test_xml_handler_emits_element_tree() {
    let content = "<root>\n  <child a=\"1\"/>\n  <child>text</child>\n</root>";
    let out = run(&XmlHandler, "app.xml", content).await;

    let keys: Vec<&str> = out.symbols.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "repo:app.xml:XmlElement:root:1",
            "repo:app.xml:XmlElement:child:2",
            "repo:app.xml:XmlElement:child:3",
        ]
    );
    assert_eq!(
        out.relationships[0],
        Relationship::new("repo:app.xml", "repo:app.xml:XmlElement:root:1", RelType::Contains)
    );
    assert_eq!(out.relationships[2].from_key, "repo:app.xml:XmlElement:root:1");
    assert!(out.symbols.iter().all(|s| s.kind == SymbolKind::XmlElement));
}

#[tokio::test]
async fn test_xml_handler_fails_gracefully() {
    let out = run(&XmlHandler, "broken.config", "<root><a></root>").await;
    assert!(out.is_empty());
}

#[test]
fn test_xml_handler_extensions() {
    for file in ["a.xml", "web.config", "Directory.Build.props", "b.TARGETS"] {
        assert!(XmlHandler.can_handle(Path::new(file)), "{file}");
    }
    assert!(!XmlHandler.can_handle(Path::new("a.xaml")));
}

// ============================================================================
// XamlHandler
// ============================================================================

const XAML: &str = r#"<Window x:Class="App.Main" xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">
  <Button x:Name="SaveButton" Click="OnSave" />
  <ResourceDictionary>
    <Style x:Key="Primary" />
  </ResourceDictionary>
</Window>"#;

#[tokio::test]
async fn test_xaml_handler_keys_elements_by_identity() {
    let out = run(&XamlHandler, "Main.xaml", XAML).await;

    let button = out
        .symbols
        .iter()
        .find(|s| s.key == "repo:Main.xaml:Button:SaveButton:2")
        .expect("button element");
    assert_eq!(button.name, "SaveButton");
    assert_eq!(button.fully_qualified_name, "Button:SaveButton");

    assert!(out.symbols.iter().any(|s| s.key == "repo:Main.xaml:Window:1"));
    assert!(out.symbols.iter().any(|s| s.key == "repo:Main.xaml:Style:Primary:4"));
    assert_eq!(out.symbols.len(), 5);
}

#[tokio::test]
async fn test_xaml_handler_binds_event_handlers() {
    let out = run(&XamlHandler, "Main.xaml", XAML).await;

    let handler = out
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::XamlEventHandler)
        .expect("event handler");
    assert_eq!(handler.key, "repo:Main.xaml:EventHandler:OnSave");
    assert_eq!(handler.accessibility, Accessibility::Private);
    assert!(out.relationships.contains(&Relationship::new(
        "repo:Main.xaml:Button:SaveButton:2",
        "repo:Main.xaml:EventHandler:OnSave",
        RelType::BindsTo,
    )));
}

// ============================================================================
// ProjectFileHandler
// ============================================================================

const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Nullable>enable</Nullable>
    <Empty></Empty>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
    <PackageReference Include="Serilog">
      <Version>3.1.1</Version>
    </PackageReference>
    <ProjectReference Include="..\Core\Core.csproj" />
  </ItemGroup>
</Project>"#;

#[tokio::test]
async fn test_project_handler_properties() {
    let out = run(&ProjectFileHandler, "App.csproj", CSPROJ).await;

    let framework = out
        .symbols
        .iter()
        .find(|s| s.name == "TargetFramework")
        .expect("property");
    assert_eq!(framework.kind, SymbolKind::ProjectProperty);
    assert_eq!(framework.key, "repo:App.csproj:ProjectProperty:TargetFramework:3");
    assert_eq!(framework.fully_qualified_name, "TargetFramework: net8.0");
    assert_eq!(framework.documentation.as_deref(), Some("net8.0"));
    assert!(out.relationships.contains(&Relationship::new(
        "repo:App.csproj",
        framework.key.as_str(),
        RelType::HasProperty,
    )));
    assert!(!out.symbols.iter().any(|s| s.name == "Empty"));
}

#[tokio::test]
async fn test_project_handler_references() {
    let out = run(&ProjectFileHandler, "App.csproj", CSPROJ).await;

    let packages: Vec<&str> = out
        .symbols
        .iter()
        .filter(|s| s.kind == SymbolKind::PackageReference)
        .map(|s| s.fully_qualified_name.as_str())
        .collect();
    assert_eq!(packages, vec!["Newtonsoft.Json (13.0.3)", "Serilog (3.1.1)"]);

    let project_ref = out
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::ProjectReference)
        .expect("project reference");
    assert_eq!(project_ref.name, r"..\Core\Core.csproj");

    let depends = out
        .relationships
        .iter()
        .filter(|r| r.rel_type == RelType::DependsOn)
        .count();
    assert_eq!(depends, 3);
    assert_eq!(out.symbols.len(), 5);
}

#[test]
fn test_package_references() {
    assert_eq!(
        package_references(CSPROJ),
        vec![
            ("Newtonsoft.Json".to_string(), Some("13.0.3".to_string())),
            ("Serilog".to_string(), Some("3.1.1".to_string())),
        ]
    );
    assert!(package_references("<Project>").is_empty());
}
