//! Per-file progress reporting

/// Receives one call per worklist file, before the file is processed
pub trait ProgressReporter: Send + Sync {
    /// `current` is 1-based; `path` is relative to the source root
    fn report(&self, current: usize, total: usize, path: &str);
}

/// Reports progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, current: usize, total: usize, path: &str) {
        tracing::debug!("Processing file {}/{}: {}", current, total, path);
    }
}

/// Discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _current: usize, _total: usize, _path: &str) {}
}
