//! Tests for the git2-backed version control collaborator

#![allow(clippy::expect_used)]

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature, Time};
use tempfile::TempDir;

use crate::scanner::{normalize_extensions, normalize_path};
use crate::vcs::{GitRepository, VcsError, VersionControl};

const T0: i64 = 1_700_000_000;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir");
    }
    fs::write(path, content).expect("write file");
}

fn commit_all(repo: &Repository, author: &str, message: &str, time: i64) -> Oid {
    let mut index = repo.index().expect("index");
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .expect("add all");
    index.update_all(["*"].iter(), None).expect("update all");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");

    let email = format!("{}@example.com", author.to_lowercase());
    let sig = Signature::new(author, &email, &Time::new(time, 0)).expect("signature");
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit")
}

fn tag(repo: &Repository, name: &str, oid: Oid) {
    let object = repo.find_object(oid, None).expect("find object");
    repo.tag_lightweight(name, &object, false).expect("tag");
}

/// Base commit with A, B, C and a readme; second commit modifies A,
/// deletes B, adds D and touches the readme.
fn fixture() -> (TempDir, Repository) {
    let temp = TempDir::new().expect("temp dir");
    let repo = Repository::init(temp.path()).expect("init");

    write(temp.path(), "A.cs", "class A {}");
    write(temp.path(), "B.cs", "class B {}");
    write(temp.path(), "C.cs", "class C {}");
    write(temp.path(), "readme.md", "hello");
    let base = commit_all(&repo, "Ada", "initial", T0);
    tag(&repo, "base", base);

    write(temp.path(), "A.cs", "class A { void M() {} }");
    fs::remove_file(temp.path().join("B.cs")).expect("remove B");
    write(temp.path(), "D.cs", "class D {}");
    write(temp.path(), "readme.md", "hello again");
    commit_all(&repo, "Grace", "second", T0 + 100);

    (temp, repo)
}

/// Extends the fixture with a side commit adding E and a merge of it whose
/// first parent is the second commit; HEAD ends detached at the merge.
fn merge_fixture() -> (TempDir, Repository, Oid) {
    let (temp, repo) = fixture();
    let merge = {
        let second = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("second commit");
        write(temp.path(), "E.cs", "class E {}");
        let side = commit_all(&repo, "Linus", "side branch", T0 + 200);
        let side = repo.find_commit(side).expect("side commit");
        let tree = side.tree().expect("side tree");

        let sig = Signature::new("Merger", "merger@example.com", &Time::new(T0 + 300, 0))
            .expect("signature");
        repo.commit(None, &sig, &sig, "merge side", &tree, &[&second, &side])
            .expect("merge commit")
    };
    repo.set_head_detached(merge).expect("detach at merge");
    (temp, repo, merge)
}

fn abs(temp: &TempDir, relative: &str) -> String {
    normalize_path(&temp.path().join(relative))
}

// ============================================================================
// discover
// ============================================================================

#[test]
fn test_discover_outside_repository_fails() {
    let temp = TempDir::new().expect("temp dir");
    let result = GitRepository::discover(temp.path());
    assert!(matches!(result, Err(VcsError::NotARepository { .. })));
}

#[test]
fn test_discover_from_subdirectory_resolves_root() {
    let (temp, _repo) = fixture();
    fs::create_dir_all(temp.path().join("nested/deeper")).expect("create dir");

    let git = GitRepository::discover(&temp.path().join("nested/deeper")).expect("discover");

    assert_eq!(git.repository_root(), normalize_path(temp.path()));
}

// ============================================================================
// changed_files
// ============================================================================

#[test]
fn test_changed_files_classifies_and_filters() {
    let (temp, _repo) = fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let changes = git
        .changed_files("base", temp.path(), &normalize_extensions(&[".cs"]))
        .expect("diff");

    let modified: Vec<String> = changes.modified.into_iter().collect();
    let deleted: Vec<String> = changes.deleted.into_iter().collect();
    assert_eq!(modified, vec![abs(&temp, "A.cs"), abs(&temp, "D.cs")]);
    assert_eq!(deleted, vec![abs(&temp, "B.cs")]);
}

#[test]
fn test_changed_files_reports_rename_as_delete_and_modify() {
    let (temp, repo) = fixture();
    let head = repo.head().expect("head").target().expect("oid");
    tag(&repo, "before-rename", head);

    let body = "class C {}";
    fs::remove_file(temp.path().join("C.cs")).expect("remove C");
    write(temp.path(), "Renamed.cs", body);
    commit_all(&repo, "Ada", "rename", T0 + 200);

    let git = GitRepository::discover(temp.path()).expect("discover");
    let changes = git
        .changed_files("before-rename", temp.path(), &normalize_extensions(&["cs"]))
        .expect("diff");

    assert!(changes.deleted.contains(&abs(&temp, "C.cs")));
    assert!(changes.modified.contains(&abs(&temp, "Renamed.cs")));
}

#[test]
fn test_changed_files_ignores_paths_outside_source_root() {
    let (temp, repo) = fixture();
    let head = repo.head().expect("head").target().expect("oid");
    tag(&repo, "pre-src", head);

    write(temp.path(), "src/In.cs", "class In {}");
    write(temp.path(), "tools/Out.cs", "class Out {}");
    commit_all(&repo, "Ada", "add src and tools", T0 + 300);

    let git = GitRepository::discover(temp.path()).expect("discover");
    let changes = git
        .changed_files(
            "pre-src",
            &temp.path().join("src"),
            &normalize_extensions(&[".cs"]),
        )
        .expect("diff");

    assert_eq!(changes.modified.len(), 1);
    assert!(changes.modified.contains(&abs(&temp, "src/In.cs")));
}

#[test]
fn test_changed_files_unknown_base_is_fatal() {
    let (temp, _repo) = fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let result = git.changed_files("no-such-ref", temp.path(), &normalize_extensions(&[".cs"]));
    assert!(matches!(result, Err(VcsError::Git(_))));
}

// ============================================================================
// commits_since
// ============================================================================

#[test]
fn test_commits_since_returns_range_only() {
    let (temp, _repo) = fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let commits = git.commits_since("base").expect("commits");

    assert_eq!(commits.len(), 1);
    let commit = &commits[0];
    assert_eq!(commit.author_name, "Grace");
    assert_eq!(commit.author_email, "grace@example.com");
    assert_eq!(commit.message, "second");
    assert_eq!(commit.date.timestamp(), T0 + 100);
    assert!(commit.changed_files.contains(&abs(&temp, "A.cs")));
    assert!(commit.changed_files.contains(&abs(&temp, "B.cs")));
    assert!(commit.changed_files.contains(&abs(&temp, "readme.md")));
}

// ============================================================================
// file_metadata
// ============================================================================

#[test]
fn test_file_metadata_aggregates_history() {
    let (temp, _repo) = fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let meta = git.file_metadata(&abs(&temp, "A.cs"));

    assert_eq!(meta.created.map(|d| d.timestamp()), Some(T0));
    assert_eq!(meta.last_modified.map(|d| d.timestamp()), Some(T0 + 100));
    assert_eq!(meta.commit_hashes.len(), 2);
    assert_eq!(meta.authors.len(), 2);
    assert!(meta.authors.iter().all(|a| a.commit_count == 1));
    assert_eq!(meta.tags, vec!["base".to_string()]);
}

#[test]
fn test_file_metadata_single_commit_file() {
    let (temp, _repo) = fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let meta = git.file_metadata(&abs(&temp, "D.cs"));

    assert_eq!(meta.commit_hashes.len(), 1);
    assert_eq!(meta.authors[0].name, "Grace");
    assert!(meta.tags.is_empty());
}

#[test]
fn test_file_metadata_unknown_file_is_empty() {
    let (temp, _repo) = fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let meta = git.file_metadata(&abs(&temp, "Untracked.cs"));
    assert_eq!(meta, crate::vcs::FileMetadata::default());
}

#[test]
fn test_merge_commit_is_not_credited_with_merged_changes() {
    let (temp, _repo, _merge) = merge_fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let meta = git.file_metadata(&abs(&temp, "E.cs"));

    assert_eq!(meta.commit_hashes.len(), 1);
    assert_eq!(meta.authors.len(), 1);
    assert_eq!(meta.authors[0].name, "Linus");
    assert_eq!(meta.last_modified.map(|d| d.timestamp()), Some(T0 + 200));
}

#[test]
fn test_commits_since_keeps_merge_without_touched_files() {
    let (temp, _repo, merge) = merge_fixture();
    let git = GitRepository::discover(temp.path()).expect("discover");

    let commits = git.commits_since("base").expect("commits");

    assert_eq!(commits.len(), 3);
    let merge_info = commits
        .iter()
        .find(|c| c.hash == merge.to_string())
        .expect("merge listed");
    assert!(merge_info.changed_files.is_empty());
    let side = commits
        .iter()
        .find(|c| c.author_name == "Linus")
        .expect("side listed");
    assert_eq!(side.changed_files, vec![abs(&temp, "E.cs")]);
}
