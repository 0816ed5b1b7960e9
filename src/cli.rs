//! Command-line interface definitions.
//!
//! ```bash
//! # Report duplicates across two trees
//! dupfind ~/Photos /mnt/backup/Photos
//!
//! # Keep discovery order and remove copies after confirmation
//! dupfind --no-sort --auto-clean ~/Downloads
//!
//! # Text report plus an HTML page with file links
//! dupfind --html report.html ~/Music
//!
//! # JSON report, BLAKE3 digests, 8 hashing threads
//! dupfind --format json --algorithm blake3 --io-threads 8 ~/data > dupes.json
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::actions::TrashMethod;
use crate::config::Config;
use crate::scanner::HashAlgorithm;

/// Locate duplicate files across directories by content.
///
/// Files are grouped by a SHA-256 (or BLAKE3) digest of their full content.
/// The first file found in each group is always kept; --auto-clean moves the
/// other copies to the trash after an interactive confirmation.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan for duplicate files
    #[arg(value_name = "DIRECTORIES", required_unless_present = "print_config")]
    pub directories: Vec<PathBuf>,

    /// Keep groups in discovery order instead of largest first
    #[arg(long)]
    pub no_sort: bool,

    /// Remove every copy except the first of each group (asks first)
    #[arg(long)]
    pub auto_clean: bool,

    /// Delete permanently instead of moving to the trash
    #[arg(long, requires = "auto_clean", conflicts_with = "trash_method")]
    pub permanent: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also write a self-contained HTML report to this file
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Number of hashing threads [config: io_threads, default 4]
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Content digest algorithm [config: algorithm]
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// How removed copies are disposed of [config: trash_method]
    #[arg(long, value_enum)]
    pub trash_method: Option<TrashMethod>,

    /// Timeout for a trash subprocess, in seconds [config: trash_timeout_secs]
    #[arg(long, value_name = "SECS")]
    pub trash_timeout: Option<u64>,

    /// Extra names or globs to skip (can be specified multiple times)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "PATH", env = "DUPFIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Cli {
    /// Overlay command-line settings on a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(threads) = self.io_threads {
            config.io_threads = threads;
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(method) = self.trash_method {
            config.trash_method = method;
        }
        if self.permanent {
            config.trash_method = TrashMethod::Permanent;
        }
        if let Some(secs) = self.trash_timeout {
            config.trash_timeout_secs = secs;
        }
        if self.no_sort {
            config.sort_by_size = false;
        }
        config.extra_exclusions.extend(self.exclude.iter().cloned());
    }
}
