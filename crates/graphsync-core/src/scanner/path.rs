//! Lexical path normalization

use std::path::{Component, Path, PathBuf};

/// Normalize a path to an absolute, forward-slash string.
///
/// Relative paths are joined to the current directory. `.` and `..` are
/// resolved lexically; the filesystem is never consulted, so paths of
/// deleted files normalize the same way as existing ones.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }

    let text = resolved.to_string_lossy().replace('\\', "/");
    if text.len() > 1 {
        text.trim_end_matches('/').to_string()
    } else {
        text
    }
}

/// Path of `path` relative to `root`, both normalized first.
///
/// Returns `None` when `path` is not under `root`.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let root = normalize_path(root);
    let path = normalize_path(path);

    let rest = path.strip_prefix(root.trim_end_matches('/'))?;
    let rest = rest.strip_prefix('/')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Normalize an extension allow-list to lowercase with a leading dot
#[must_use]
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e != ".")
        .map(|e| {
            if e.starts_with('.') {
                e
            } else {
                format!(".{e}")
            }
        })
        .collect()
}

/// Case-insensitive match of a path against a normalized extension list
#[must_use]
pub fn extension_matches(path: &str, extensions: &[String]) -> bool {
    let lower = path.to_ascii_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
}
