//! File walker: Discovers files in a directory tree

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::path::{extension_matches, normalize_extensions, normalize_path, relative_path};

/// Directory names never descended into
pub const EXCLUDED_DIRS: &[&str] = &["bin", "obj", ".git", ".idea", "node_modules"];

/// Default extension allow-list
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".cs", ".razor", ".xaml", ".js", ".html", ".xml", ".json", ".css", ".csproj",
];

/// A file discovered during scanning
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredFile {
    /// Normalized absolute path (forward slashes)
    pub path: String,
    /// Path relative to the scan root
    pub relative_path: String,
}

impl DiscoveredFile {
    /// Build from a path under `root`; `None` if the path lies outside it
    #[must_use]
    pub fn new(root: &Path, path: &Path) -> Option<Self> {
        relative_path(root, path).map(|relative_path| Self {
            path: normalize_path(path),
            relative_path,
        })
    }
}

/// Scanner for discovering source files in a directory
#[derive(Debug)]
pub struct Scanner {
    root: PathBuf,
    extensions: Vec<String>,
}

impl Scanner {
    /// Create a new scanner for the given root directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: normalize_extensions(DEFAULT_EXTENSIONS),
        }
    }

    /// Restrict scanning to the given extensions (with or without dot)
    #[must_use]
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = normalize_extensions(extensions);
        self
    }

    /// Scan the directory and return discovered files, sorted by path
    #[must_use]
    pub fn scan(&self) -> Vec<DiscoveredFile> {
        let mut files: Vec<DiscoveredFile> = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir && entry.depth() > 0 && is_excluded_dir(entry.file_name()))
            })
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter(|entry| {
                extension_matches(&entry.path().to_string_lossy(), &self.extensions)
            })
            .filter_map(|entry| DiscoveredFile::new(&self.root, entry.path()))
            .collect();

        files.sort();
        files.dedup();
        files
    }

    /// The normalized extension allow-list
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

fn is_excluded_dir(name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy();
    EXCLUDED_DIRS
        .iter()
        .any(|excluded| name.eq_ignore_ascii_case(excluded))
}
