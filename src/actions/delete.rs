//! Duplicate removal.
//!
//! # Overview
//!
//! [`Deleter::remove`] is the single removal contract used by the auto-clean
//! batch and by any embedding transport:
//! - the path must exist and be a regular file, checked before any side
//!   effect;
//! - removal goes through the [`TrashStrategy`] resolved at startup;
//! - every failure carries a category ([`DeleteErrorKind`]) and a
//!   human-readable message.
//!
//! [`delete_removables`] runs the batch: every member of every group except
//! the first is removed, failures are recorded and the batch moves on.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::actions::{Deleter, TrashMethod, TrashStrategy};
//! use std::path::Path;
//!
//! let deleter = Deleter::new(TrashStrategy::resolve(TrashMethod::Auto).unwrap());
//! match deleter.remove(Path::new("/tmp/copy.txt")) {
//!     Ok(result) => println!("{}", result.message),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use super::trash::{ResolveError, TrashStrategy};
use crate::config::Config;
use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecords;

/// Default upper bound on a trash subprocess.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for deletion operations.
#[derive(Debug, Clone, Error)]
pub enum DeleteError {
    /// Nothing exists at the path.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The path exists but is not a regular file.
    #[error("Path is not a file: {0}")]
    NotAFile(PathBuf),

    /// The OS refused the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A trash subprocess ran past its deadline and was killed.
    #[error("{method} operation timed out after {}s: {path}", .timeout.as_secs())]
    TimedOut {
        /// File being removed
        path: PathBuf,
        /// Strategy label
        method: String,
        /// Deadline that expired
        timeout: Duration,
    },

    /// Any other failure.
    #[error("{method} error for {path}: {message}")]
    Failed {
        /// File being removed
        path: PathBuf,
        /// Strategy label
        method: String,
        /// Underlying cause
        message: String,
    },
}

/// Failure categories of [`DeleteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteErrorKind {
    /// Nothing exists at the path.
    NotFound,
    /// Not a regular file.
    NotAFile,
    /// The OS refused the operation.
    PermissionDenied,
    /// A subprocess was killed at its deadline.
    TimedOut,
    /// Anything else.
    Other,
}

impl DeleteError {
    /// Classify an I/O error raised by `method` on `path`.
    #[must_use]
    pub fn from_io(path: &Path, method: &str, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Failed {
                path: path.to_path_buf(),
                method: method.to_string(),
                message: error.to_string(),
            },
        }
    }

    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> DeleteErrorKind {
        match self {
            Self::NotFound(_) => DeleteErrorKind::NotFound,
            Self::NotAFile(_) => DeleteErrorKind::NotAFile,
            Self::PermissionDenied(_) => DeleteErrorKind::PermissionDenied,
            Self::TimedOut { .. } => DeleteErrorKind::TimedOut,
            Self::Failed { .. } => DeleteErrorKind::Other,
        }
    }

    /// Path the error is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::NotAFile(p) | Self::PermissionDenied(p) => p,
            Self::TimedOut { path, .. } | Self::Failed { path, .. } => path,
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was removed.
    pub path: PathBuf,
    /// Size of the file in bytes at removal time.
    pub size: u64,
    /// Whether removal was permanent (true) or to a trash (false).
    pub permanent: bool,
    /// What happened, for display.
    pub message: String,
}

/// Flat success/message view of one removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    /// Whether the file is gone from its original location.
    pub success: bool,
    /// Human-readable description.
    pub message: String,
}

impl From<&Result<DeleteResult, DeleteError>> for DeleteOutcome {
    fn from(result: &Result<DeleteResult, DeleteError>) -> Self {
        match result {
            Ok(done) => Self {
                success: true,
                message: done.message.clone(),
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

/// Removes files through one resolved strategy.
#[derive(Debug, Clone)]
pub struct Deleter {
    strategy: TrashStrategy,
    timeout: Duration,
}

impl Deleter {
    /// Create a deleter with the default subprocess timeout.
    #[must_use]
    pub fn new(strategy: TrashStrategy) -> Self {
        Self {
            strategy,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolve the configured method and timeout.
    ///
    /// # Errors
    ///
    /// Propagates [`ResolveError`] from strategy resolution.
    pub fn from_config(config: &Config) -> Result<Self, ResolveError> {
        Ok(Self::new(TrashStrategy::resolve(config.trash_method)?)
            .with_timeout(Duration::from_secs(config.trash_timeout_secs)))
    }

    /// Set the subprocess timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The resolved strategy.
    #[must_use]
    pub fn strategy(&self) -> &TrashStrategy {
        &self.strategy
    }

    /// The subprocess timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Remove one regular file.
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing exists at `path`
    /// - `NotAFile` if `path` is a directory, symlink or special file
    /// - `PermissionDenied`, `TimedOut` or `Failed` from the strategy
    pub fn remove(&self, path: &Path) -> Result<DeleteResult, DeleteError> {
        let metadata = fs::symlink_metadata(path)
            .map_err(|e| DeleteError::from_io(path, self.strategy.label(), e))?;
        if !metadata.is_file() {
            return Err(DeleteError::NotAFile(path.to_path_buf()));
        }
        let size = metadata.len();

        self.strategy.dispose(path, self.timeout).inspect_err(|e| {
            log::error!("Failed to remove {}: {}", path.display(), e);
        })?;

        log::debug!(
            "Removed {} ({} bytes) via {}",
            path.display(),
            size,
            self.strategy.label()
        );

        Ok(DeleteResult {
            path: path.to_path_buf(),
            size,
            permanent: self.strategy.is_permanent(),
            message: self.strategy.success_message().to_string(),
        })
    }

    /// [`Deleter::remove`] flattened to a success flag and message.
    #[must_use]
    pub fn outcome(&self, path: &Path) -> DeleteOutcome {
        DeleteOutcome::from(&self.remove(path))
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully removed files, in removal order.
    pub successes: Vec<DeleteResult>,
    /// Failed removals, in attempt order.
    pub failures: Vec<DeleteError>,
    /// Recorded bytes of the removed files.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful removals.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed removals.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all removals succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Removed paths, in removal order.
    pub fn deleted_paths(&self) -> impl Iterator<Item = &Path> {
        self.successes.iter().map(|r| r.path.as_path())
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s) ({})", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s) ({}), {} failed",
                self.success_count(),
                freed,
                self.failure_count()
            )
        }
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each removal attempt.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after a successful removal.
    fn on_delete_success(&self, result: &DeleteResult);

    /// Called after a failed removal.
    fn on_delete_failure(&self, error: &DeleteError);

    /// Called when the batch completes.
    fn on_complete(&self, _result: &BatchDeleteResult) {}
}

/// Remove every non-first member of every group.
///
/// The first member of a group is never passed to the deleter. Successful
/// removals set `deleted` on the matching record; freed bytes use the size
/// recorded at scan time.
pub fn delete_removables<C: DeleteProgressCallback + ?Sized>(
    groups: &[DuplicateGroup],
    records: &mut FileRecords,
    deleter: &Deleter,
    callback: Option<&C>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total: usize = groups.iter().map(DuplicateGroup::duplicate_count).sum();
    let mut index = 0;

    log::info!(
        "Removing {} duplicate file(s) via {}",
        total,
        deleter.strategy().describe()
    );

    for group in groups {
        for path in group.rest() {
            if let Some(cb) = callback {
                cb.on_before_delete(path, index, total);
            }
            index += 1;

            match deleter.remove(path) {
                Ok(done) => {
                    records.mark_deleted(path);
                    result.bytes_freed += records.size_of(path).unwrap_or(done.size);
                    if let Some(cb) = callback {
                        cb.on_delete_success(&done);
                    }
                    result.successes.push(done);
                }
                Err(e) => {
                    if let Some(cb) = callback {
                        cb.on_delete_failure(&e);
                    }
                    result.failures.push(e);
                }
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }
    log::info!("{}", result.summary());
    result
}
