//! Progress reporters for terminals and CI systems

use graphsync_core::sync::ProgressReporter;

/// Where the process is running, as far as progress output is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiEnvironment {
    GitHubActions,
    AzureDevOps,
    Console,
}

impl CiEnvironment {
    /// Detect from `GITHUB_ACTIONS` and `TF_BUILD`
    #[must_use]
    pub fn detect() -> Self {
        if std::env::var_os("GITHUB_ACTIONS").is_some() {
            Self::GitHubActions
        } else if std::env::var_os("TF_BUILD").is_some() {
            Self::AzureDevOps
        } else {
            Self::Console
        }
    }
}

/// Reporter for the detected environment
#[must_use]
pub fn select_reporter() -> Box<dyn ProgressReporter> {
    match CiEnvironment::detect() {
        CiEnvironment::GitHubActions => Box::new(GitHubActionsProgress),
        CiEnvironment::AzureDevOps => Box::new(AzureDevOpsProgress),
        CiEnvironment::Console => Box::new(ConsoleProgress),
    }
}

/// Plain `[i/n] path` lines
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    #[must_use]
    pub fn line(current: usize, total: usize, path: &str) -> String {
        format!("[{current}/{total}] {path}")
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, current: usize, total: usize, path: &str) {
        println!("{}", Self::line(current, total, path));
    }
}

/// GitHub Actions workflow notices
#[derive(Debug, Default, Clone, Copy)]
pub struct GitHubActionsProgress;

impl GitHubActionsProgress {
    #[must_use]
    pub fn line(current: usize, total: usize, path: &str) -> String {
        format!("::notice::Processing file {current}/{total}: {path}")
    }
}

impl ProgressReporter for GitHubActionsProgress {
    fn report(&self, current: usize, total: usize, path: &str) {
        println!("{}", Self::line(current, total, path));
    }
}

/// Azure DevOps task progress logging commands
#[derive(Debug, Default, Clone, Copy)]
pub struct AzureDevOpsProgress;

impl AzureDevOpsProgress {
    #[must_use]
    pub fn line(current: usize, total: usize, path: &str) -> String {
        let percent = if total == 0 {
            100
        } else {
            current.saturating_mul(100) / total
        };
        format!("##vso[task.setprogress value={percent};]Processing file {current}/{total}: {path}")
    }
}

impl ProgressReporter for AzureDevOpsProgress {
    fn report(&self, current: usize, total: usize, path: &str) {
        println!("{}", Self::line(current, total, path));
    }
}
