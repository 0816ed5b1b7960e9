//! Plain-text report.
//!
//! ```text
//! ============================================================
//! DUPLICATE FILE FINDER REPORT
//! ============================================================
//!
//! SCAN SUMMARY:
//! ------------------------------------------------------------
//!   Directory: /data
//!     Files processed: 3
//!
//! Total files processed: 3
//!
//! DUPLICATES FOUND:
//! ------------------------------------------------------------
//!   Group 1 (Hash: 5f1f4a7b0a1a0c1f...):
//!     - /data/a.txt [KEPT]
//!     - /data/b.txt
//!
//! ============================================================
//! ```

use std::fmt::Write as _;
use std::io;
use std::time::Duration;

use bytesize::ByteSize;
use yansi::Paint;

use super::{MemberStatus, ReportData};
use crate::duplicates::StepTimings;

const RULE_WIDTH: usize = 60;
const DIGEST_PREFIX: usize = 16;

/// Text renderer.
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    data: ReportData<'a>,
    color: bool,
}

impl<'a> TextReport<'a> {
    /// Uncolored report.
    #[must_use]
    pub fn new(data: ReportData<'a>) -> Self {
        Self { data, color: false }
    }

    /// Enable colored markers.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Render the whole report.
    #[must_use]
    pub fn render(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{heavy}\nDUPLICATE FILE FINDER REPORT\n{heavy}\n");

        let _ = writeln!(out, "SCAN SUMMARY:\n{light}");
        for (root, count) in self.data.summary.iter() {
            let _ = writeln!(out, "  Directory: {root}\n    Files processed: {count}");
        }
        let _ = writeln!(out, "\nTotal files processed: {}\n", self.data.summary.total());

        if let Some(deleted) = self.data.deleted.filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "AUTO-CLEAN SUMMARY:\n{light}");
            let _ = writeln!(out, "  Files deleted: {}", deleted.len());
            let _ = writeln!(
                out,
                "  Space freed: {}\n",
                ByteSize(self.data.deleted_bytes())
            );
        }

        let _ = writeln!(out, "DUPLICATES FOUND:\n{light}");
        if self.data.groups.is_empty() {
            let _ = writeln!(out, "  No duplicate files detected.");
        }
        for (number, group) in self.data.groups.iter().enumerate() {
            let _ = writeln!(
                out,
                "  Group {} (Hash: {}...):",
                number + 1,
                group.short_digest(DIGEST_PREFIX)
            );
            for (index, path) in group.paths.iter().enumerate() {
                let marker = self.marker(self.data.member_status(path, index));
                let _ = writeln!(out, "    - {}{}", path.display(), marker);
            }
            out.push('\n');
        }

        out.push_str(&heavy);
        out
    }

    /// Write the report followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.render())
    }

    fn marker(&self, status: MemberStatus) -> String {
        let (text, painted) = match status {
            MemberStatus::Kept => ("[KEPT]", "[KEPT]".green().bold()),
            MemberStatus::Deleted => ("[DELETED]", "[DELETED]".red().bold()),
            MemberStatus::Duplicate => return String::new(),
        };
        if self.color {
            format!(" {}", painted)
        } else {
            format!(" {}", text)
        }
    }
}

/// Format a duration as `HH:MM:SS.mmm`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn step_label(name: &str) -> &str {
    match name {
        "scan" => "Scanning",
        "hash" => "Hashing",
        "detect" => "Detection",
        "order" => "Processing",
        "auto-clean" => "Auto-clean",
        "report" => "Report",
        other => other,
    }
}

/// Execution-time summary, one numbered line per step.
#[must_use]
pub fn render_timings(timings: &StepTimings, total: Duration) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{heavy}\nEXECUTION TIME SUMMARY\n{heavy}");
    for (number, (name, duration)) in timings.iter().enumerate() {
        let label = format!("Step {} ({}):", number + 1, step_label(name));
        let _ = writeln!(out, "  {:<24}{}", label, format_duration(duration));
    }
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    let _ = writeln!(out, "  {:<24}{}", "TOTAL TIME:", format_duration(total));
    out.push_str(&heavy);
    out
}
