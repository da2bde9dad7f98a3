//! Integration tests for the language-server fact provider
//!
//! These tests require `csharp-ls` and the .NET SDK to be installed; they
//! are skipped otherwise.

use std::fs;
use std::path::Path;
use std::time::Duration;

use graphsync_core::facts::{DeclaredSymbol, FactProvider};
use graphsync_core::lsp::{LspFactProvider, LspServerConfig};
use graphsync_core::{Accessibility, SymbolKind};
use tempfile::TempDir;

/// Helper to check if a command exists on PATH
fn command_exists(cmd: &str) -> bool {
    std::process::Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn create_project(dir: &Path) -> std::io::Result<()> {
    fs::write(
        dir.join("Sample.csproj"),
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
</Project>
"#,
    )
}

fn names(symbols: &[DeclaredSymbol], out: &mut Vec<String>) {
    for symbol in symbols {
        out.push(symbol.name.clone());
        names(&symbol.children, out);
    }
}

#[tokio::test]
async fn test_csharp_declared_symbols() -> anyhow::Result<()> {
    if !command_exists("csharp-ls") || !command_exists("dotnet") {
        eprintln!("Skipping test: csharp-ls or dotnet not found");
        return Ok(());
    }

    let temp = TempDir::new()?;
    create_project(temp.path())?;

    let code = r#"namespace Sample
{
    public class Greeter
    {
        public string Hello(string name) => name;
        private int Count() => 0;
    }
}
"#;
    let file_path = temp.path().join("Greeter.cs");
    fs::write(&file_path, code)?;

    let config = LspServerConfig::csharp(temp.path()).with_indexing_timeout(Duration::from_secs(60));
    let provider = LspFactProvider::start(config).await?;

    // The first request can race project loading
    let mut symbols = Vec::new();
    for attempt in 0..3 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        match provider.declared_symbols(&file_path, code).await {
            Ok(s) if !s.is_empty() => {
                symbols = s;
                break;
            }
            Ok(_) => continue,
            Err(e) if attempt < 2 => {
                eprintln!("Retry {}: {}", attempt + 1, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut found = Vec::new();
    names(&symbols, &mut found);
    assert!(
        found.iter().any(|n| n == "Greeter"),
        "Expected 'Greeter' class, got: {:?}",
        found
    );

    let greeter = symbols
        .iter()
        .flat_map(|s| std::iter::once(s).chain(s.children.iter()))
        .find(|s| s.name == "Greeter");
    if let Some(greeter) = greeter {
        assert_eq!(greeter.kind, SymbolKind::Class);
        assert_eq!(greeter.accessibility, Accessibility::Public);
        assert_eq!(greeter.start_line, 3);
    }

    provider.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_start_fails_for_missing_server() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let config =
        LspServerConfig::csharp(temp.path()).with_command("graphsync-missing-server", Vec::new());

    assert!(LspFactProvider::start(config).await.is_err());
    Ok(())
}
