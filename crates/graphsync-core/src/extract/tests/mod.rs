mod tests_markup;

use std::path::Path;

use crate::extract::FileContext;
use crate::keys::KeyBuilder;

/// Handler context for a single in-memory file
pub(super) fn context<'a>(
    keys: &'a KeyBuilder,
    file_key: &'a str,
    path: &'a Path,
    content: &'a str,
) -> FileContext<'a> {
    FileContext {
        keys,
        file_key,
        path,
        file_path: path.to_str().unwrap_or_default(),
        content,
    }
}
