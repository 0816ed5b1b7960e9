//! Report rendering.
//!
//! Renderers read a [`ReportData`] and never mutate it:
//! - [`text`]: the human-readable report, with optional color
//! - [`json`]: the same data for scripting and automation
//! - [`html`]: a self-contained page with file links

pub mod html;
pub mod json;
pub mod text;

use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateGroup;
use crate::scanner::{FileRecords, ScanSummary};

pub use html::{HtmlReport, HtmlReportError};
pub use json::JsonReport;
pub use text::{format_duration, TextReport};

/// Everything a report shows.
#[derive(Debug, Clone, Copy)]
pub struct ReportData<'a> {
    /// Per-root file counts.
    pub summary: &'a ScanSummary,
    /// Duplicate groups in display order.
    pub groups: &'a [DuplicateGroup],
    /// Every scanned file, with `deleted` flags.
    pub records: &'a FileRecords,
    /// Paths removed by an auto-clean, `None` if no auto-clean ran.
    pub deleted: Option<&'a [PathBuf]>,
}

impl<'a> ReportData<'a> {
    /// Report data without an auto-clean.
    #[must_use]
    pub fn new(
        summary: &'a ScanSummary,
        groups: &'a [DuplicateGroup],
        records: &'a FileRecords,
    ) -> Self {
        Self {
            summary,
            groups,
            records,
            deleted: None,
        }
    }

    /// Attach the auto-clean result.
    #[must_use]
    pub fn with_deleted(mut self, deleted: &'a [PathBuf]) -> Self {
        self.deleted = Some(deleted);
        self
    }

    /// Recorded bytes of the deleted paths.
    #[must_use]
    pub fn deleted_bytes(&self) -> u64 {
        self.deleted
            .unwrap_or_default()
            .iter()
            .filter_map(|p| self.records.size_of(p))
            .sum()
    }

    /// Status of a group member at `index`.
    #[must_use]
    pub fn member_status(&self, path: &Path, index: usize) -> MemberStatus {
        if self.records.get(path).is_some_and(|r| r.deleted) {
            MemberStatus::Deleted
        } else if index == 0 {
            MemberStatus::Kept
        } else {
            MemberStatus::Duplicate
        }
    }
}

/// How a group member is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// First member; survives an auto-clean.
    Kept,
    /// Removed by the auto-clean.
    Deleted,
    /// Redundant copy still on disk.
    Duplicate,
}
