//! One complete run: configuration, pipeline, optional auto-clean, report.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use bytesize::ByteSize;

use crate::actions::{
    assess, delete_removables, BatchDeleteResult, ConfirmationGate, Decision, DeleteError,
    DeleteProgressCallback, DeleteResult, Deleter,
};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderReport};
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::output::text::render_timings;
use crate::output::{format_duration, HtmlReport, JsonReport, ReportData, TextReport};
use crate::progress::{Progress, ProgressCallback, PHASE_DELETING};

/// Prints per-file auto-clean results and drives the deletion bar.
struct CleanupReporter {
    progress: Arc<Progress>,
}

impl DeleteProgressCallback for CleanupReporter {
    fn on_before_delete(&self, path: &Path, index: usize, _total: usize) {
        self.progress
            .on_progress(index + 1, path.to_string_lossy().as_ref());
    }

    fn on_delete_success(&self, result: &DeleteResult) {
        self.progress
            .println(&format!("  ✓ Deleted: {}", result.path.display()));
    }

    fn on_delete_failure(&self, error: &DeleteError) {
        self.progress.println(&format!("  ✗ Error: {}", error));
    }
}

/// Run the application and map the outcome to an exit code.
///
/// # Errors
///
/// Returns configuration errors, [`FinderError`](crate::duplicates::FinderError)
/// when nothing could be scanned, and I/O errors writing the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);
    let run_start = Instant::now();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(ExitCode::Success);
    }

    // Resolve once, before any work, so a bad method fails fast
    let deleter = if cli.auto_clean {
        Some(Deleter::from_config(&config)?)
    } else {
        None
    };

    let progress = Arc::new(Progress::new(cli.quiet));
    let status = |line: &str| progress.println(line);

    status("Step 1: Scanning directories...");
    let finder = DuplicateFinder::new(
        FinderConfig::from_config(&config).with_progress_callback(progress.clone()),
    );
    let mut report = finder.find_duplicates_in_paths(&cli.directories)?;
    print_pipeline_steps(&report, &status);

    let mut step = 5;
    let mut batch: Option<BatchDeleteResult> = None;
    if let Some(deleter) = deleter {
        match confirm_cleanup(&report) {
            Decision::Confirmed => {
                status(&format!("\nStep {}: Auto-cleaning duplicates...", step));
                status(&format!(
                    "  Using deletion method: {}",
                    deleter.strategy().describe()
                ));
                let result = run_cleanup(&mut report, &deleter, &progress);
                status(&format!(
                    "  Deleted {} files ({})",
                    result.success_count(),
                    ByteSize(result.bytes_freed)
                ));
                batch = Some(result);
                step += 1;
            }
            Decision::NothingToDo => status("No duplicate files to delete."),
            Decision::Declined | Decision::Unavailable => {
                status("Skipping auto-clean and proceeding to report generation...");
            }
        }
    }

    status(&format!("\nStep {}: Generating report...", step));
    let report_start = Instant::now();
    let deleted: Vec<PathBuf> = batch
        .as_ref()
        .map(|b| b.deleted_paths().map(Path::to_path_buf).collect())
        .unwrap_or_default();
    let mut data = ReportData::new(&report.summary, &report.groups, &report.records);
    if batch.is_some() {
        data = data.with_deleted(&deleted);
    }
    write_report(&cli, data)?;
    if let Some(path) = cli.html.as_deref() {
        write_html_report(path, &data)?;
        status(&format!("  HTML report saved to: {}", path.display()));
    }
    report.timings.push("report", report_start.elapsed());

    if !cli.quiet {
        status(&format!("\n{}", render_timings(&report.timings, run_start.elapsed())));
    }

    let code = match batch {
        Some(ref b) if !b.all_succeeded() => ExitCode::PartialSuccess,
        _ if report.groups.is_empty() => ExitCode::NoDuplicates,
        _ => ExitCode::Success,
    };
    log::debug!("Exiting with {:?}", code);
    Ok(code)
}

fn print_pipeline_steps(report: &FinderReport, status: &impl Fn(&str)) {
    let time = |name: &str| format_duration(report.timings.get(name).unwrap_or_default());

    status(&format!("  Found {} files total", report.records.len()));
    status(&format!("  Time: {}", time("scan")));

    status("\nStep 2: Calculating file hashes...");
    status(&format!(
        "  Hashes calculated for {} files",
        report.records.digested_count()
    ));
    status(&format!("  Time: {}", time("hash")));

    status("\nStep 3: Detecting duplicates...");
    status(&format!(
        "  Found {} duplicate group(s) totalling {} duplicate file(s) and {} unique file(s)",
        report.stats.duplicate_groups, report.stats.duplicate_files, report.stats.distinct_contents
    ));
    status(&format!("  Time: {}", time("detect")));

    status("\nStep 4: Processing duplicate groups...");
    status(&format!("  Time: {}", time("order")));
}

fn confirm_cleanup(report: &FinderReport) -> Decision {
    let assessment = assess(&report.groups, &report.records);
    ConfirmationGate::new().confirm_on_terminal(&assessment)
}

fn run_cleanup(report: &mut FinderReport, deleter: &Deleter, progress: &Arc<Progress>) -> BatchDeleteResult {
    let total = report.groups.iter().map(|g| g.duplicate_count()).sum();
    let reporter = CleanupReporter {
        progress: Arc::clone(progress),
    };

    let start = Instant::now();
    progress.on_phase_start(PHASE_DELETING, total);
    let result = delete_removables(&report.groups, &mut report.records, deleter, Some(&reporter));
    progress.on_phase_end(PHASE_DELETING);
    report.timings.push("auto-clean", start.elapsed());
    result
}

fn write_html_report(path: &Path, data: &ReportData<'_>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create HTML report {}", path.display()))?;
    let mut out = io::BufWriter::new(file);
    HtmlReport::new(data)
        .write_to(&mut out)
        .with_context(|| format!("Failed to write HTML report {}", path.display()))?;
    out.flush()?;
    Ok(())
}

fn write_report(cli: &Cli, data: ReportData<'_>) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.format {
        OutputFormat::Text => {
            let color = !cli.no_color && stdout.is_terminal();
            writeln!(out)?;
            TextReport::new(data).with_color(color).write_to(&mut out)?;
        }
        OutputFormat::Json => JsonReport::new(&data).write_to(&mut out)?,
    }
    out.flush()?;
    Ok(())
}
