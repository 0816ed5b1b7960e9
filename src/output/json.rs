//! JSON report for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-03-05T14:07:09+01:00",
//!   "summary": {
//!     "roots": [{ "root": "/data", "files": 3 }],
//!     "total_files": 3,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_bytes": 4
//!   },
//!   "auto_clean": { "files_deleted": 1, "bytes_freed": 4 },
//!   "groups": [
//!     {
//!       "digest": "5f1f...",
//!       "size": 4,
//!       "files": [
//!         { "path": "/data/a.txt", "size": 4, "status": "kept" },
//!         { "path": "/data/b.txt", "size": 4, "status": "deleted" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `auto_clean` is `null` when no auto-clean ran.

use std::io::Write;

use serde::Serialize;

use super::{MemberStatus, ReportData};

/// One root of the scan summary.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRoot {
    /// Root as requested
    pub root: String,
    /// Files under the root, by path prefix
    pub files: usize,
}

/// Run-level numbers.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Per-root counts
    pub roots: Vec<JsonRoot>,
    /// Sum of per-root counts
    pub total_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Members beyond the first, over all groups
    pub duplicate_files: usize,
    /// Recorded bytes of those members
    pub reclaimable_bytes: u64,
}

/// Auto-clean totals.
#[derive(Debug, Clone, Serialize)]
pub struct JsonAutoClean {
    /// Files removed
    pub files_deleted: usize,
    /// Recorded bytes of removed files
    pub bytes_freed: u64,
}

/// One group member.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// Recorded size, `null` if unknown
    pub size: Option<u64>,
    /// Kept, deleted or still-present duplicate
    pub status: MemberStatus,
}

/// One duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// Hex content digest
    pub digest: String,
    /// Recorded size of the first member
    pub size: u64,
    /// Members in discovery order
    pub files: Vec<JsonFile>,
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Local generation time, RFC 3339
    pub generated_at: String,
    /// Run-level numbers
    pub summary: JsonSummary,
    /// Auto-clean totals, if an auto-clean ran
    pub auto_clean: Option<JsonAutoClean>,
    /// Duplicate groups in display order
    pub groups: Vec<JsonGroup>,
}

impl JsonReport {
    /// Build the document from report data.
    #[must_use]
    pub fn new(data: &ReportData<'_>) -> Self {
        let records = data.records;

        let groups: Vec<JsonGroup> = data
            .groups
            .iter()
            .map(|group| JsonGroup {
                digest: group.digest.clone(),
                size: group.first().and_then(|p| records.size_of(p)).unwrap_or(0),
                files: group
                    .paths
                    .iter()
                    .enumerate()
                    .map(|(index, path)| JsonFile {
                        path: path.to_string_lossy().into_owned(),
                        size: records.size_of(path),
                        status: data.member_status(path, index),
                    })
                    .collect(),
            })
            .collect();

        let summary = JsonSummary {
            roots: data
                .summary
                .iter()
                .map(|(root, files)| JsonRoot {
                    root: root.clone(),
                    files: *files,
                })
                .collect(),
            total_files: data.summary.total(),
            duplicate_groups: data.groups.len(),
            duplicate_files: data.groups.iter().map(|g| g.duplicate_count()).sum(),
            reclaimable_bytes: data.groups.iter().map(|g| g.wasted_space(records)).sum(),
        };

        let auto_clean = data.deleted.map(|deleted| JsonAutoClean {
            files_deleted: deleted.len(),
            bytes_freed: data.deleted_bytes(),
        });

        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            summary,
            auto_clean,
            groups,
        }
    }

    /// Compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)
    }
}
