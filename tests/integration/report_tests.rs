use dupfind::actions::{delete_removables, DeleteProgressCallback, Deleter, TrashStrategy};
use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderReport};
use dupfind::output::{HtmlReport, JsonReport, ReportData, TextReport};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn fixture() -> (TempDir, FinderReport) {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"AAAA");
    write(dir.path(), "b.txt", b"AAAA");
    write(dir.path(), "c.txt", b"BBBB");
    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();
    (dir, report)
}

#[test]
fn test_text_report_before_cleanup() {
    let (dir, report) = fixture();
    let data = ReportData::new(&report.summary, &report.groups, &report.records);
    let text = TextReport::new(data).render();

    assert!(text.contains(&format!("Directory: {}", dir.path().display())));
    assert!(text.contains("Files processed: 3"));
    assert!(text.contains("Total files processed: 3"));
    assert!(text.contains(&format!("Group 1 (Hash: {}...)", &report.groups[0].digest[..16])));
    assert!(text.contains(&format!("{} [KEPT]", dir.path().join("a.txt").display())));
    assert!(!text.contains("[DELETED]"));
    assert!(!text.contains("AUTO-CLEAN SUMMARY"));
    assert!(!text.contains("c.txt"));
}

#[test]
fn test_text_report_after_cleanup() {
    let (dir, mut report) = fixture();
    let deleter = Deleter::new(TrashStrategy::Permanent);
    let batch = delete_removables(
        &report.groups,
        &mut report.records,
        &deleter,
        None::<&dyn DeleteProgressCallback>,
    );
    let deleted: Vec<PathBuf> = batch.deleted_paths().map(Path::to_path_buf).collect();

    let data = ReportData::new(&report.summary, &report.groups, &report.records)
        .with_deleted(&deleted);
    let text = TextReport::new(data).render();

    assert!(text.contains("AUTO-CLEAN SUMMARY"));
    assert!(text.contains("Files deleted: 1"));
    assert!(text.contains(&format!("{} [DELETED]", dir.path().join("b.txt").display())));
    assert!(text.contains(&format!("{} [KEPT]", dir.path().join("a.txt").display())));
}

#[test]
fn test_text_report_without_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one", b"1");
    let report = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir.path()])
        .unwrap();

    let text = TextReport::new(ReportData::new(
        &report.summary,
        &report.groups,
        &report.records,
    ))
    .render();

    assert!(text.contains("No duplicate files detected."));
}

#[test]
fn test_json_report_document() {
    let (dir, report) = fixture();
    let data = ReportData::new(&report.summary, &report.groups, &report.records);

    let mut buffer = Vec::new();
    JsonReport::new(&data).write_to(&mut buffer).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    assert_eq!(json["summary"]["total_files"], 3);
    assert_eq!(json["summary"]["duplicate_groups"], 1);
    assert_eq!(json["summary"]["duplicate_files"], 1);
    assert_eq!(json["summary"]["reclaimable_bytes"], 4);
    assert_eq!(
        json["summary"]["roots"][0]["root"],
        dir.path().to_string_lossy().as_ref()
    );
    assert!(json["auto_clean"].is_null());

    let files = json["groups"][0]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["status"], "kept");
    assert_eq!(files[1]["status"], "duplicate");
    assert_eq!(files[1]["size"], 4);
}

#[test]
fn test_json_report_after_cleanup() {
    let (_dir, mut report) = fixture();
    let deleter = Deleter::new(TrashStrategy::Permanent);
    let batch = delete_removables(
        &report.groups,
        &mut report.records,
        &deleter,
        None::<&dyn DeleteProgressCallback>,
    );
    let deleted: Vec<PathBuf> = batch.deleted_paths().map(Path::to_path_buf).collect();

    let data = ReportData::new(&report.summary, &report.groups, &report.records)
        .with_deleted(&deleted);
    let json: serde_json::Value =
        serde_json::from_str(&JsonReport::new(&data).to_json().unwrap()).unwrap();

    assert_eq!(json["auto_clean"]["files_deleted"], 1);
    assert_eq!(json["auto_clean"]["bytes_freed"], 4);
    assert_eq!(json["groups"][0]["files"][1]["status"], "deleted");
}

#[test]
fn test_html_report_after_cleanup() {
    let (dir, mut report) = fixture();
    let deleter = Deleter::new(TrashStrategy::Permanent);
    let batch = delete_removables(
        &report.groups,
        &mut report.records,
        &deleter,
        None::<&dyn DeleteProgressCallback>,
    );
    let deleted: Vec<PathBuf> = batch.deleted_paths().map(Path::to_path_buf).collect();

    let data = ReportData::new(&report.summary, &report.groups, &report.records)
        .with_deleted(&deleted);
    let mut buffer = Vec::new();
    HtmlReport::new(&data).write_to(&mut buffer).unwrap();
    let html = String::from_utf8(buffer).unwrap();

    assert!(html.contains("Group 1 • 2 files • 4 B"));
    assert!(html.contains("Auto-clean completed: 1 files deleted, 4 B space freed"));
    assert!(html.contains("★ KEPT"));
    assert!(html.contains("✓ DELETED"));
    assert!(html.contains("a.txt"));
    assert!(html.contains("b.txt"));
    assert!(!html.contains("c.txt"));
    assert!(dir.path().join("a.txt").exists());
}
