use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderError, ResolutionPolicy};
use dupfind::scanner::{ExclusionPolicy, HashAlgorithm, Hasher};
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

#[test]
fn test_scan_empty_directory_is_nothing_found() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::new(FinderConfig::default());

    let err = finder.find_duplicates_in_paths(&[dir.path()]).unwrap_err();
    assert!(matches!(err, FinderError::NothingFound));
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let finder = DuplicateFinder::new(FinderConfig::default());
    let report = finder.find_duplicates_in_paths(&[dir.path()]).unwrap();

    assert!(!report.has_duplicates());
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.stats.duplicate_groups, 0);
    assert_eq!(report.stats.distinct_contents, 3);
    assert_eq!(report.wasted_space(), 0);
}

#[test]
fn test_scan_two_copies_and_one_unique() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"AAAA");
    let b = write(dir.path(), "b.txt", b"AAAA");
    write(dir.path(), "c.txt", b"BBBB");

    let finder = DuplicateFinder::new(FinderConfig::default());
    let report = finder.find_duplicates_in_paths(&[dir.path()]).unwrap();

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.groups.len(), 1);

    let group = &report.groups[0];
    assert_eq!(group.paths, vec![a, b]);
    assert_eq!(group.digest.len(), 64);
    assert_eq!(report.stats.duplicate_files, 1);
    assert_eq!(report.stats.distinct_contents, 2);
    assert_eq!(report.wasted_space(), 4);
}

#[test]
fn test_scan_digest_matches_known_sha256() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one", b"hello");
    write(dir.path(), "two", b"hello");

    let finder = DuplicateFinder::new(FinderConfig::default());
    let report = finder.find_duplicates_in_paths(&[dir.path()]).unwrap();

    assert_eq!(
        report.groups[0].digest,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_scan_blake3_groups_like_sha256() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same bytes");
    write(dir.path(), "b", b"same bytes");
    write(dir.path(), "c", b"other bytes");

    let sha = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();
    let blake = DuplicateFinder::new(
        FinderConfig::default().with_hasher(Hasher::new().with_algorithm(HashAlgorithm::Blake3)),
    )
    .find_duplicates_in_paths(&[dir.path()])
    .unwrap();

    assert_eq!(sha.groups.len(), blake.groups.len());
    assert_eq!(sha.groups[0].paths, blake.groups[0].paths);
    assert_ne!(sha.groups[0].digest, blake.groups[0].digest);
}

#[test]
fn test_scan_skips_hidden_files_and_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "visible.txt", b"same");
    write(dir.path(), ".hidden.txt", b"same");
    write(dir.path(), ".cache/inner.txt", b"same");

    let finder = DuplicateFinder::new(FinderConfig::default());
    let report = finder.find_duplicates_in_paths(&[dir.path()]).unwrap();

    assert_eq!(report.records.len(), 1);
    assert!(!report.has_duplicates());
}

#[test]
fn test_scan_skips_default_denylist() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.py", b"print(1)");
    write(dir.path(), "module.pyc", b"print(1)");
    write(dir.path(), "__pycache__/keep.py", b"print(1)");
    write(dir.path(), "Thumbs.db", b"print(1)");

    let finder = DuplicateFinder::new(FinderConfig::default());
    let report = finder.find_duplicates_in_paths(&[dir.path()]).unwrap();

    let names: Vec<_> = report
        .records
        .paths()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["keep.py"]);
}

#[test]
fn test_scan_extra_exclusions() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.log", b"dup");
    write(dir.path(), "b.log", b"dup");
    write(dir.path(), "node_modules/c.txt", b"dup");
    write(dir.path(), "d.txt", b"dup");

    let config = FinderConfig::default()
        .with_exclusions(ExclusionPolicy::default().extended(["*.log", "node_modules"]));
    let report = DuplicateFinder::new(config)
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    assert_eq!(report.records.len(), 1);
}

#[test]
fn test_scan_without_exclusions_sees_everything() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".a", b"x");
    write(dir.path(), ".git/b", b"x");

    let config = FinderConfig::default().with_exclusions(ExclusionPolicy::none());
    let report = DuplicateFinder::new(config)
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.groups.len(), 1);
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"");
    write(dir.path(), "b", b"");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.wasted_space(), 0);
}

#[test]
fn test_scan_groups_sorted_largest_first() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a_small1", b"x");
    write(dir.path(), "a_small2", b"x");
    write(dir.path(), "b_big1", &[7u8; 2048]);
    write(dir.path(), "b_big2", &[7u8; 2048]);
    write(dir.path(), "c_mid1", &[1u8; 100]);
    write(dir.path(), "c_mid2", &[1u8; 100]);

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    let sizes: Vec<u64> = report
        .groups
        .iter()
        .map(|g| ResolutionPolicy::representative_size(g, &report.records))
        .collect();
    assert_eq!(sizes, vec![2048, 100, 1]);
}

#[test]
fn test_scan_unsorted_keeps_discovery_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a_small1", b"x");
    write(dir.path(), "a_small2", b"x");
    write(dir.path(), "b_big1", &[7u8; 2048]);
    write(dir.path(), "b_big2", &[7u8; 2048]);

    let config = FinderConfig::default().with_policy(ResolutionPolicy::unsorted());
    let report = DuplicateFinder::new(config)
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    assert!(report.groups[0].paths[0].ends_with("a_small1"));
    assert!(report.groups[1].paths[0].ends_with("b_big1"));
}

#[test]
fn test_scan_equal_sizes_keep_discovery_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a1", b"1111");
    write(dir.path(), "a2", b"1111");
    write(dir.path(), "b1", b"2222");
    write(dir.path(), "b2", b"2222");

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    assert!(report.groups[0].paths[0].ends_with("a1"));
    assert!(report.groups[1].paths[0].ends_with("b1"));
}

#[test]
fn test_scan_is_deterministic() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("d{}/f{}.bin", i % 4, i), &[(i % 5) as u8; 64]);
    }

    let run = || {
        let report = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
            .find_duplicates_in_paths(&[dir.path()])
            .unwrap();
        report
            .groups
            .iter()
            .map(|g| (g.digest.clone(), g.paths.clone()))
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first.len(), 5);
    for _ in 0..3 {
        assert_eq!(run(), first);
    }
}

#[cfg(unix)]
#[test]
fn test_scan_ignores_symlinks() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "real.txt", b"content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert!(!report.has_duplicates());
}

#[test]
fn test_unreadable_file_is_left_out_of_groups() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"same");
    let b = write(dir.path(), "b", b"same");
    let c = write(dir.path(), "c", b"same");

    let finder = DuplicateFinder::new(FinderConfig::default());
    let mut scan = finder.scan(&[dir.path()]);
    assert_eq!(scan.records.len(), 3);

    // Vanishes between the walk and the hash
    fs::remove_file(&c).unwrap();

    let errors = finder.hash_records(&mut scan.records).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), c.as_path());
    assert!(!scan.records.get(&c).unwrap().has_digest());

    let (groups, stats) = finder.group(&scan.records);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![a, b]);
    assert_eq!(stats.digested_files, 2);
}
