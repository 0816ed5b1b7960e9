use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_duplicates_across_roots() {
    let one = tempdir().unwrap();
    let two = tempdir().unwrap();
    let a = write(one.path(), "photo.jpg", b"jpeg bytes");
    let b = write(two.path(), "copy_of_photo.jpg", b"jpeg bytes");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[one.path(), two.path()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].paths, vec![a, b]);
    assert_eq!(report.summary.count_for(&key(one.path())), Some(1));
    assert_eq!(report.summary.count_for(&key(two.path())), Some(1));
}

#[test]
fn test_root_order_decides_keeper() {
    let one = tempdir().unwrap();
    let two = tempdir().unwrap();
    let a = write(one.path(), "z.txt", b"same");
    let b = write(two.path(), "a.txt", b"same");

    let forward = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[one.path(), two.path()])
        .unwrap();
    assert_eq!(forward.groups[0].first(), Some(a.as_path()));

    let reverse = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[two.path(), one.path()])
        .unwrap();
    assert_eq!(reverse.groups[0].first(), Some(b.as_path()));
}

#[test]
fn test_nested_roots_record_each_file_once() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    write(dir.path(), "top.txt", b"top");
    write(&sub, "inner.txt", b"inner");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path(), sub.as_path()])
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert!(!report.has_duplicates());
}

#[test]
fn test_nested_roots_count_files_under_each_root() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    write(dir.path(), "top.txt", b"top");
    write(&sub, "inner.txt", b"inner");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path(), sub.as_path()])
        .unwrap();

    assert_eq!(report.summary.count_for(&key(dir.path())), Some(2));
    assert_eq!(report.summary.count_for(&key(&sub)), Some(1));
    // Overlapping roots are counted once per root
    assert_eq!(report.summary.total(), 3);
}

#[test]
fn test_prefix_sharing_roots_overlap_in_counts() {
    let base = tempdir().unwrap();
    let data = base.path().join("data");
    let database = base.path().join("database");
    write(&data, "a.txt", b"a");
    write(&database, "b.txt", b"b");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[data.as_path(), database.as_path()])
        .unwrap();

    assert_eq!(report.records.len(), 2);
    // "/…/database/b.txt" starts with "/…/data"
    assert_eq!(report.summary.count_for(&key(&data)), Some(2));
    assert_eq!(report.summary.count_for(&key(&database)), Some(1));
}

#[test]
fn test_missing_root_is_skipped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");
    let missing = dir.path().join("does-not-exist");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[missing.as_path(), dir.path()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.scan_errors.len(), 1);
    assert_eq!(report.summary.count_for(&key(&missing)), Some(0));
}

#[test]
fn test_file_root_is_skipped() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "not_a_dir.txt", b"x");
    let sub = dir.path().join("sub");
    write(&sub, "a", b"x");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[file.as_path(), sub.as_path()])
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.scan_errors.len(), 1);
}

#[test]
fn test_all_roots_invalid() {
    let dir = tempdir().unwrap();
    let missing_a = dir.path().join("a");
    let missing_b = dir.path().join("b");

    let err = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[missing_a.clone(), missing_b.clone()])
        .unwrap_err();

    match err {
        FinderError::NoValidRoots(roots) => assert_eq!(roots, vec![missing_a, missing_b]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_valid_but_empty_roots_find_nothing() {
    let one = tempdir().unwrap();
    let two = tempdir().unwrap();
    fs::create_dir(one.path().join(".git")).unwrap();
    write(one.path(), ".git/HEAD", b"ref: refs/heads/main");

    let err = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[one.path(), two.path()])
        .unwrap_err();

    assert!(matches!(err, FinderError::NothingFound));
}
