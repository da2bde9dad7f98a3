//! Tests for run options and the run report

use crate::changes::SyncMode;
use crate::graph::model::Accessibility;
use crate::sync::{DEFAULT_BATCH_SIZE, RunPhase, SyncOptions, SyncReport};

#[test]
fn test_options_defaults() {
    let options = SyncOptions::new("/work/shop", "shop");

    assert_eq!(options.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(options.min_accessibility, Accessibility::Private);
    assert!(options.diff_base.is_none());
    assert!(!options.force);
    assert!(!options.skip_dependencies);
    assert!(options.extensions.iter().any(|e| e == ".csproj"));
    assert_eq!(options.project_name(), "shop");
}

#[test]
fn test_options_builders() {
    let options = SyncOptions::new("/work/shop", "shop")
        .with_diff_base("origin/main")
        .with_force(true)
        .with_batch_size(10)
        .with_min_accessibility(Accessibility::Public)
        .with_extensions(&["cs"])
        .with_skip_dependencies(true);

    assert_eq!(options.diff_base.as_deref(), Some("origin/main"));
    assert!(options.force);
    assert_eq!(options.batch_size, 10);
    assert_eq!(options.min_accessibility, Accessibility::Public);
    assert_eq!(options.extensions, vec!["cs".to_string()]);
    assert!(options.skip_dependencies);
}

#[test]
fn test_project_name_falls_back_to_repo_key() {
    let options = SyncOptions::new("/", "root-repo");
    assert_eq!(options.project_name(), "root-repo");
}

#[test]
fn test_report_display_and_handler_summary() {
    let mut report = SyncReport::new(SyncMode::Incremental);
    report.files_selected = 3;
    report.files_processed = 2;
    report.files_failed = 1;
    report.symbols = 7;
    report.flushes = 1;
    report.extraction.record("json");
    report.extraction.record("source");
    report.extraction.record("json");
    report.extraction.record_unhandled();

    let text = report.to_string();
    assert!(text.starts_with("incremental sync: 2/3 files processed (1 failed, 0 deleted)"));
    assert!(text.contains("7 symbols"));
    assert_eq!(report.handler_summary(), "json=2, source=1, unhandled=1");
}

#[test]
fn test_run_phase_display() {
    assert_eq!(RunPhase::SchemaEnsured.to_string(), "schema ensured");
    assert_eq!(RunPhase::FinalFlush.to_string(), "final flush");
}
