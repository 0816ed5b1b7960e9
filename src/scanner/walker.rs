//! Multi-root directory scanner built on jwalk.
//!
//! # Overview
//!
//! [`Scanner::scan`] walks every root in turn and records one
//! [`FileRecord`] per regular file, keyed by absolute path.
//!
//! - Children of each directory are sorted by name, so discovery order is
//!   deterministic across runs.
//! - Excluded entries are dropped inside jwalk's `process_read_dir` hook,
//!   before the walker descends: excluded subtrees are never read.
//! - Roots that are missing or not directories are skipped with a warning.
//! - Files whose metadata cannot be read are skipped with a warning; they
//!   are never recorded with a made-up size.
//! - Symbolic links are not followed.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{ExclusionPolicy, Scanner};
//!
//! let roots = ["/home/user/Downloads", "/home/user/Desktop"];
//! let result = Scanner::new(ExclusionPolicy::default()).scan(&roots);
//! for (root, count) in result.summary(&roots).iter() {
//!     println!("{}: {} files", root, count);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jwalk::WalkDir;

use super::exclude::ExclusionPolicy;
use super::{FileRecord, FileRecords, ScanError};
use crate::progress::ProgressCallback;

/// Per-root file counts.
///
/// A root's count is the number of scanned files whose absolute path
/// string starts with the root's absolute path string. Nested or
/// prefix-sharing roots (`/data` and `/data/sub`, or `/data` and
/// `/database`) therefore count the same file more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    roots: Vec<(String, usize)>,
}

impl ScanSummary {
    /// Roots and their counts, in the order the roots were requested.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, (String, usize)> {
        self.roots.iter()
    }

    /// Count for a root, as it was spelled in the request.
    #[must_use]
    pub fn count_for(&self, root: &str) -> Option<usize> {
        self.roots
            .iter()
            .find(|(r, _)| r == root)
            .map(|(_, count)| *count)
    }

    /// Sum of all per-root counts (includes double counting).
    #[must_use]
    pub fn total(&self) -> usize {
        self.roots.iter().map(|(_, count)| count).sum()
    }

    /// Number of roots in the summary.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the summary lists no roots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Outcome of a multi-root scan.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Scanned files in discovery order (digests not yet computed)
    pub records: FileRecords,
    /// Non-fatal errors hit while walking
    pub errors: Vec<ScanError>,
    /// Roots that were skipped because they were missing or not directories
    pub skipped_roots: Vec<PathBuf>,
}

impl ScanResult {
    /// Derive the per-root string-prefix counts.
    #[must_use]
    pub fn summary<P: AsRef<Path>>(&self, roots: &[P]) -> ScanSummary {
        let roots = roots
            .iter()
            .map(|root| {
                let root = root.as_ref();
                let prefix = absolute_root(root).to_string_lossy().into_owned();
                let count = self
                    .records
                    .paths()
                    .filter(|path| path.to_string_lossy().starts_with(prefix.as_str()))
                    .count();
                (root.to_string_lossy().into_owned(), count)
            })
            .collect();

        ScanSummary { roots }
    }
}

/// Directory scanner for one or more roots.
#[derive(Clone)]
pub struct Scanner {
    policy: Arc<ExclusionPolicy>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("policy", &self.policy)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ExclusionPolicy::default())
    }
}

impl Scanner {
    /// Create a scanner with the given exclusion policy.
    #[must_use]
    pub fn new(policy: ExclusionPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            progress_callback: None,
        }
    }

    /// Report discovered files to a progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The exclusion policy in use.
    #[must_use]
    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    /// Scan all roots, in order.
    ///
    /// A path reachable from several roots is recorded once, at the
    /// position of its first discovery.
    pub fn scan<P: AsRef<Path>>(&self, roots: &[P]) -> ScanResult {
        let mut result = ScanResult::default();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        for root in roots {
            self.walk_root(root.as_ref(), &mut result);
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("walking");
        }

        log::info!(
            "Scan complete: {} files in {} root(s), {} root(s) skipped, {} error(s)",
            result.records.len(),
            roots.len(),
            result.skipped_roots.len(),
            result.errors.len()
        );

        result
    }

    fn walk_root(&self, root: &Path, result: &mut ScanResult) {
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                log::warn!("{} is not a valid directory, skipping", root.display());
                result.skipped_roots.push(root.to_path_buf());
                result
                    .errors
                    .push(ScanError::NotADirectory(root.to_path_buf()));
                return;
            }
            Err(e) => {
                log::warn!("{} is not a valid directory ({}), skipping", root.display(), e);
                result.skipped_roots.push(root.to_path_buf());
                result.errors.push(ScanError::from_io(root, e));
                return;
            }
        }

        let root = absolute_root(root);
        log::debug!("Walking {}", root.display());

        let policy = Arc::clone(&self.policy);
        let walk_dir = WalkDir::new(&root)
            .follow_links(false)
            .skip_hidden(false)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Prune before descent: removed directories are never read
                children.retain(|child| match child {
                    Ok(entry) => {
                        let excluded =
                            policy.is_excluded(entry.file_name(), entry.file_type().is_dir());
                        if excluded {
                            log::trace!("Excluded: {}", entry.path().display());
                        }
                        !excluded
                    }
                    Err(_) => true,
                });
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        for entry_result in walk_dir {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    // Skip the root directory itself
                    if path == root {
                        continue;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        continue;
                    }

                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        continue;
                    }

                    let metadata = match std::fs::symlink_metadata(&path) {
                        Ok(m) => m,
                        Err(e) => {
                            log::warn!("Error accessing file {}: {}", path.display(), e);
                            result.errors.push(ScanError::from_io(&path, e));
                            continue;
                        }
                    };

                    if !metadata.is_file() {
                        log::trace!("Skipping non-regular file: {}", path.display());
                        continue;
                    }

                    let size = metadata.len();
                    if !result.records.insert(FileRecord::new(path.clone(), size)) {
                        log::debug!("Already scanned via another root: {}", path.display());
                    }

                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(result.records.len(), path.to_string_lossy().as_ref());
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| root.clone(), std::borrow::ToOwned::to_owned);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    result.errors.push(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    });
                }
            }
        }
    }
}

/// Absolute form of a root without resolving symlinks.
fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}
