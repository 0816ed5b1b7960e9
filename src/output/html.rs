//! Self-contained HTML report.
//!
//! Rendered with `askama` from `templates/report.html`. All CSS is inlined
//! so the file can be opened or shared on its own. Paths are escaped by the
//! template engine; file links are `file://` URLs.
//!
//! ```rust,ignore
//! use dupfind::output::{HtmlReport, ReportData};
//!
//! let html = HtmlReport::new(&data).to_html()?;
//! ```

use std::io::Write;
use std::path::Path;

use askama::Template;
use bytesize::ByteSize;

use super::{MemberStatus, ReportData};
use crate::actions::trash::percent_encode_path;

/// Complete HTML document for the Askama template.
#[derive(Template)]
#[template(path = "report.html")]
pub struct HtmlReport {
    /// Local generation time
    pub timestamp: String,
    /// Application version
    pub version: String,
    /// Per-root file counts
    pub roots: Vec<HtmlRoot>,
    /// Sum of per-root counts
    pub total_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Members beyond the first, over all groups
    pub duplicate_files: usize,
    /// Human-readable reclaimable space
    pub reclaimable: String,
    /// Auto-clean banner, if an auto-clean ran
    pub auto_clean: Option<HtmlAutoClean>,
    /// Groups in display order
    pub groups: Vec<HtmlGroup>,
}

/// One row of the scan summary table.
pub struct HtmlRoot {
    /// Root as requested
    pub root: String,
    /// Files under it
    pub files: usize,
}

/// Auto-clean totals.
pub struct HtmlAutoClean {
    /// Files removed
    pub files_deleted: usize,
    /// Human-readable space freed
    pub freed: String,
}

/// A duplicate group formatted for HTML.
pub struct HtmlGroup {
    /// 1-based position
    pub number: usize,
    /// Leading digest characters
    pub short_digest: String,
    /// Human-readable size of the first member, "Unknown" if unrecorded
    pub size: String,
    /// Members in discovery order
    pub files: Vec<HtmlFile>,
}

/// A group member formatted for HTML.
pub struct HtmlFile {
    /// Path as displayed
    pub path: String,
    /// `file://` link to the path
    pub url: String,
    /// CSS class: `kept`, `deleted` or `duplicate`
    pub class: &'static str,
    /// Badge text, empty for plain duplicates
    pub badge: &'static str,
    /// Whether the file was removed
    pub deleted: bool,
}

impl HtmlFile {
    fn new(path: &Path, status: MemberStatus) -> Self {
        let (class, badge) = match status {
            MemberStatus::Kept => ("kept", "★ KEPT"),
            MemberStatus::Deleted => ("deleted", "✓ DELETED"),
            MemberStatus::Duplicate => ("duplicate", ""),
        };
        Self {
            path: path.to_string_lossy().into_owned(),
            url: file_url(path),
            class,
            badge,
            deleted: status == MemberStatus::Deleted,
        }
    }
}

impl HtmlReport {
    /// Build the document from report data.
    #[must_use]
    pub fn new(data: &ReportData<'_>) -> Self {
        let records = data.records;

        let groups = data
            .groups
            .iter()
            .enumerate()
            .map(|(i, group)| HtmlGroup {
                number: i + 1,
                short_digest: group.short_digest(16).to_string(),
                size: group
                    .first()
                    .and_then(|p| records.size_of(p))
                    .map_or_else(|| "Unknown".to_string(), |s| ByteSize(s).to_string()),
                files: group
                    .paths
                    .iter()
                    .enumerate()
                    .map(|(index, path)| HtmlFile::new(path, data.member_status(path, index)))
                    .collect(),
            })
            .collect();

        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            roots: data
                .summary
                .iter()
                .map(|(root, files)| HtmlRoot {
                    root: root.clone(),
                    files: *files,
                })
                .collect(),
            total_files: data.summary.total(),
            duplicate_groups: data.groups.len(),
            duplicate_files: data.groups.iter().map(|g| g.duplicate_count()).sum(),
            reclaimable: ByteSize(data.groups.iter().map(|g| g.wasted_space(records)).sum())
                .to_string(),
            auto_clean: data.deleted.map(|deleted| HtmlAutoClean {
                files_deleted: deleted.len(),
                freed: ByteSize(data.deleted_bytes()).to_string(),
            }),
            groups,
        }
    }

    /// Render the document.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        self.render()
    }

    /// Render and write the document.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HtmlReportError> {
        let html = self.to_html()?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }
}

/// `file://` URL for an absolute path.
fn file_url(path: &Path) -> String {
    let encoded = percent_encode_path(path);
    if cfg!(windows) {
        format!("file:///{}", encoded.replace("%5C", "/").replace("%3A", ":"))
    } else {
        format!("file://{}", encoded)
    }
}

/// Errors that can occur while producing the HTML report.
#[derive(thiserror::Error, Debug)]
pub enum HtmlReportError {
    /// Template rendering error
    #[error("HTML template error: {0}")]
    Template(#[from] askama::Error),

    /// I/O error during writing
    #[error("I/O error during HTML generation: {0}")]
    Io(#[from] std::io::Error),
}
