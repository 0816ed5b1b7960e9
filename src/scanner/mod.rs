//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Multi-root directory walking using jwalk
//! - Pruning of excluded names before descent
//! - Streaming content digests (SHA-256 by default, BLAKE3 optional)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`exclude`]: Name denylist, hidden-file rule and `*.ext` globs
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Block-streamed file hashing
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{ExclusionPolicy, Hasher, Scanner};
//!
//! let scanner = Scanner::new(ExclusionPolicy::default());
//! let mut result = scanner.scan(&["/data/photos", "/backup/photos"]);
//!
//! let hasher = Hasher::new();
//! for record in result.records.iter_mut() {
//!     record.digest = hasher.digest_or_warn(&record.path);
//! }
//! println!("{} files scanned", result.records.len());
//! ```

pub mod exclude;
pub mod hasher;
pub mod walker;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

// Re-export main types
pub use exclude::{ExclusionPolicy, DEFAULT_EXCLUSIONS};
pub use hasher::{HashAlgorithm, Hasher, DEFAULT_BLOCK_SIZE};
pub use walker::{ScanResult, ScanSummary, Scanner};

/// Everything the pipeline knows about one scanned file.
///
/// Records are created by the scanner, receive their digest from the hasher
/// and are only ever mutated afterwards to flag a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes, as seen at scan time
    pub size: u64,
    /// Lowercase hex content digest, `None` if the file could not be read
    pub digest: Option<String>,
    /// Set once the file has been moved to the trash by an auto-clean pass
    pub deleted: bool,
}

impl FileRecord {
    /// Create a record for a freshly scanned file (no digest yet).
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            digest: None,
            deleted: false,
        }
    }

    /// Create a record with a known digest.
    #[must_use]
    pub fn with_digest(path: PathBuf, size: u64, digest: impl Into<String>) -> Self {
        Self {
            path,
            size,
            digest: Some(digest.into()),
            deleted: false,
        }
    }

    /// Whether the hasher produced a digest for this file.
    #[must_use]
    pub fn has_digest(&self) -> bool {
        self.digest.is_some()
    }
}

/// Path → [`FileRecord`] mapping with a stable iteration order.
///
/// Iteration yields records in the order their paths were first inserted,
/// which is the scanner's discovery order. Re-inserting an existing path
/// replaces the record in place and keeps its original position, so no
/// path is ever listed twice.
#[derive(Debug, Clone, Default)]
pub struct FileRecords {
    records: Vec<FileRecord>,
    index: HashMap<PathBuf, usize>,
}

impl FileRecords {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    ///
    /// Returns `true` if the path was not present before.
    pub fn insert(&mut self, record: FileRecord) -> bool {
        if let Some(&idx) = self.index.get(&record.path) {
            self.records[idx] = record;
            false
        } else {
            self.index.insert(record.path.clone(), self.records.len());
            self.records.push(record);
            true
        }
    }

    /// Look up a record by path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.index.get(path).map(|&idx| &self.records[idx])
    }

    /// Look up a record by path for mutation.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut FileRecord> {
        match self.index.get(path) {
            Some(&idx) => Some(&mut self.records[idx]),
            None => None,
        }
    }

    /// Recorded size of a path, if it was scanned.
    #[must_use]
    pub fn size_of(&self, path: &Path) -> Option<u64> {
        self.get(path).map(|r| r.size)
    }

    /// Store a digest for a scanned path. Returns `false` for unknown paths.
    pub fn set_digest(&mut self, path: &Path, digest: String) -> bool {
        match self.get_mut(path) {
            Some(record) => {
                record.digest = Some(digest);
                true
            }
            None => false,
        }
    }

    /// Flag a path as deleted. Returns `false` for unknown paths.
    pub fn mark_deleted(&mut self, path: &Path) -> bool {
        match self.get_mut(path) {
            Some(record) => {
                record.deleted = true;
                true
            }
            None => false,
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    /// Mutable records in insertion order.
    ///
    /// Paths must not be changed through this iterator.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FileRecord> {
        self.records.iter_mut()
    }

    /// Records that carry a digest, in insertion order.
    pub fn digested(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter().filter(|r| r.has_digest())
    }

    /// Number of records that carry a digest.
    #[must_use]
    pub fn digested_count(&self) -> usize {
        self.digested().count()
    }

    /// Paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.records.iter().map(|r| r.path.as_path())
    }
}

impl FromIterator<FileRecord> for FileRecords {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut records = Self::new();
        for record in iter {
            records.insert(record);
        }
        records
    }
}

impl<'a> IntoIterator for &'a FileRecords {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}
