use dupfind::actions::{
    assess, delete_removables, ConfirmationGate, Decision, DeleteErrorKind,
    DeleteProgressCallback, DeleteResult, Deleter, ScriptedChannel, TrashStrategy,
};
use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderReport};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{tempdir, TempDir};

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn find(dir: &Path) -> FinderReport {
    DuplicateFinder::new(FinderConfig::default())
        .find_duplicates_in_paths(&[dir])
        .unwrap()
}

/// Two groups: three copies of "AAAA" and two of "BBBBBBBB".
fn fixture() -> (TempDir, FinderReport) {
    let dir = tempdir().unwrap();
    write(dir.path(), "a1.txt", b"AAAA");
    write(dir.path(), "a2.txt", b"AAAA");
    write(dir.path(), "a3.txt", b"AAAA");
    write(dir.path(), "b1.txt", b"BBBBBBBB");
    write(dir.path(), "b2.txt", b"BBBBBBBB");
    write(dir.path(), "unique.txt", b"C");
    let report = find(dir.path());
    (dir, report)
}

#[derive(Default)]
struct Recorder {
    before: Mutex<Vec<PathBuf>>,
    failures: Mutex<usize>,
    completed: Mutex<bool>,
}

impl DeleteProgressCallback for Recorder {
    fn on_before_delete(&self, path: &Path, _index: usize, _total: usize) {
        self.before.lock().unwrap().push(path.to_path_buf());
    }

    fn on_delete_success(&self, _result: &DeleteResult) {}

    fn on_delete_failure(&self, _error: &dupfind::actions::DeleteError) {
        *self.failures.lock().unwrap() += 1;
    }

    fn on_complete(&self, _result: &dupfind::actions::BatchDeleteResult) {
        *self.completed.lock().unwrap() = true;
    }
}

#[test]
fn test_assessment_counts_non_first_members() {
    let (_dir, report) = fixture();

    let assessment = assess(&report.groups, &report.records);
    assert_eq!(assessment.files_to_delete, 3);
    assert_eq!(assessment.bytes_to_delete, 4 + 4 + 8);
}

#[test]
fn test_cleanup_keeps_first_of_each_group() {
    let (_dir, mut report) = fixture();
    let keepers: Vec<PathBuf> = report
        .groups
        .iter()
        .map(|g| g.first().unwrap().to_path_buf())
        .collect();

    let deleter = Deleter::new(TrashStrategy::Permanent);
    let result = delete_removables(
        &report.groups,
        &mut report.records,
        &deleter,
        None::<&dyn DeleteProgressCallback>,
    );

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.bytes_freed, 16);

    for keeper in &keepers {
        assert!(keeper.exists(), "keeper {} was removed", keeper.display());
        assert!(!report.records.get(keeper).unwrap().deleted);
    }
    for group in &report.groups {
        for path in group.rest() {
            assert!(!path.exists());
            assert!(report.records.get(path).unwrap().deleted);
        }
    }
}

#[test]
fn test_cleanup_notifies_callback_in_group_order() {
    let (_dir, mut report) = fixture();
    let expected: Vec<PathBuf> = report
        .groups
        .iter()
        .flat_map(|g| g.rest().iter().cloned())
        .collect();

    let recorder = Recorder::default();
    let deleter = Deleter::new(TrashStrategy::Permanent);
    delete_removables(&report.groups, &mut report.records, &deleter, Some(&recorder));

    assert_eq!(*recorder.before.lock().unwrap(), expected);
    assert_eq!(*recorder.failures.lock().unwrap(), 0);
    assert!(*recorder.completed.lock().unwrap());
}

#[test]
fn test_cleanup_vanished_file_is_not_found() {
    let (_dir, mut report) = fixture();
    let vanished = report.groups[0].rest()[0].clone();
    fs::remove_file(&vanished).unwrap();

    let deleter = Deleter::new(TrashStrategy::Permanent);
    let result = delete_removables(
        &report.groups,
        &mut report.records,
        &deleter,
        None::<&dyn DeleteProgressCallback>,
    );

    assert!(!result.all_succeeded());
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failures[0].kind(), DeleteErrorKind::NotFound);
    assert_eq!(result.failures[0].path(), vanished.as_path());
    assert!(!report.records.get(&vanished).unwrap().deleted);
    assert!(!result.deleted_paths().any(|p| p == vanished));
}

#[test]
fn test_remove_refuses_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    let err = Deleter::new(TrashStrategy::Permanent).remove(&sub).unwrap_err();
    assert_eq!(err.kind(), DeleteErrorKind::NotAFile);
    assert!(sub.exists());
}

#[test]
fn test_outcome_reports_message() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "gone.txt", b"x");
    let deleter = Deleter::new(TrashStrategy::Permanent);

    let ok = deleter.outcome(&file);
    assert!(ok.success);
    assert_eq!(ok.message, "File permanently deleted");

    let missing = deleter.outcome(&file);
    assert!(!missing.success);
    assert!(missing.message.contains("gone.txt"));
}

#[cfg(unix)]
#[test]
fn test_cleanup_into_xdg_trash() {
    let (dir, mut report) = fixture();
    let trash_root = dir.path().join("Trash");
    fs::create_dir_all(trash_root.join("files")).unwrap();

    // The trash lives inside the scanned tree but after the scan
    let deleter = Deleter::new(TrashStrategy::XdgTrash {
        trash_root: trash_root.clone(),
    });
    let result = delete_removables(
        &report.groups,
        &mut report.records,
        &deleter,
        None::<&dyn DeleteProgressCallback>,
    );

    assert!(result.all_succeeded(), "{}", result.summary());
    let moved = fs::read_dir(trash_root.join("files")).unwrap().count();
    let infos = fs::read_dir(trash_root.join("info")).unwrap().count();
    assert_eq!(moved, 3);
    assert_eq!(infos, 3);
    assert!(result.successes.iter().all(|r| !r.permanent));
}

#[test]
fn test_gate_confirmed_then_cleanup() {
    let (_dir, mut report) = fixture();
    let assessment = assess(&report.groups, &report.records);

    let mut channel = ScriptedChannel::new(["yes\n"]);
    let decision = ConfirmationGate::new().confirm(&assessment, &mut channel);
    assert_eq!(decision, Decision::Confirmed);
    assert!(channel.transcript().contains("Files to delete: 3"));

    let deleter = Deleter::new(TrashStrategy::Permanent);
    let result = delete_removables(
        &report.groups,
        &mut report.records,
        &deleter,
        None::<&dyn DeleteProgressCallback>,
    );
    assert_eq!(result.success_count(), 3);
}

#[test]
fn test_gate_declined_touches_nothing() {
    let (dir, report) = fixture();
    let assessment = assess(&report.groups, &report.records);

    let mut channel = ScriptedChannel::new(["no"]);
    let decision = ConfirmationGate::new().confirm(&assessment, &mut channel);

    assert_eq!(decision, Decision::Declined);
    assert!(!decision.is_confirmed());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 6);
}

#[test]
fn test_gate_reprompts_until_valid() {
    let (_dir, report) = fixture();
    let assessment = assess(&report.groups, &report.records);

    let mut channel = ScriptedChannel::new(["maybe", "", "Y"]);
    let decision = ConfirmationGate::new().confirm(&assessment, &mut channel);

    assert_eq!(decision, Decision::Confirmed);
    assert_eq!(channel.remaining(), 0);
}

#[test]
fn test_gate_closed_input_is_unavailable() {
    let (_dir, report) = fixture();
    let assessment = assess(&report.groups, &report.records);

    let mut channel = ScriptedChannel::new(["what?"]);
    let decision = ConfirmationGate::new().confirm(&assessment, &mut channel);

    assert_eq!(decision, Decision::Unavailable);
}

#[test]
fn test_gate_skips_prompt_without_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"1");
    write(dir.path(), "b", b"2");
    let report = find(dir.path());

    let assessment = assess(&report.groups, &report.records);
    assert!(assessment.is_empty());

    let mut channel = ScriptedChannel::new(["yes"]);
    let decision = ConfirmationGate::new().confirm(&assessment, &mut channel);

    assert_eq!(decision, Decision::NothingToDo);
    assert!(channel.transcript().is_empty());
    assert_eq!(channel.remaining(), 1);
}
