//! Scan → hash → group pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the three content phases in order:
//!
//! 1. **Scan**: walk every root and collect an ordered [`FileRecords`] map
//! 2. **Hash**: digest every record on a bounded rayon pool
//! 3. **Group**: partition digested records by digest and order the
//!    duplicate groups with the [`ResolutionPolicy`]
//!
//! Hashing is parallel but the record map has a single writer: results are
//! collected with their scan index and written back in scan order after the
//! pool finishes. Grouping starts only once every digest is in.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(2));
//! let report = finder.find_duplicates_in_paths(&["/data"]).unwrap();
//! for group in &report.groups {
//!     println!("{} copies of {}", group.len(), group.short_digest(16));
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::{DigestGroups, DuplicateGroup, GroupingStats, ResolutionPolicy};
use crate::config::Config;
use crate::progress::{ProgressCallback, PHASE_HASHING};
use crate::scanner::{
    ExclusionPolicy, FileRecords, HashError, Hasher, ScanError, ScanResult, ScanSummary, Scanner,
};

/// Pipeline-level errors. Per-file problems never end up here.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Valid roots were walked but held no scannable file.
    #[error("No files found in specified directories")]
    NothingFound,

    /// Every root was missing or not a directory.
    #[error("No valid directory among: {}", format_roots(.0))]
    NoValidRoots(Vec<PathBuf>),

    /// The hashing pool could not be built.
    #[error("Failed to build hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn format_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wall-clock duration of each named pipeline step, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepTimings {
    steps: Vec<(String, Duration)>,
}

impl StepTimings {
    /// Create an empty timing list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step.
    pub fn push(&mut self, name: impl Into<String>, duration: Duration) {
        self.steps.push((name.into(), duration));
    }

    /// Run `f` and record how long it took.
    pub fn time<T>(&mut self, name: impl Into<String>, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.push(name, start.elapsed());
        out
    }

    /// Duration of a step, if recorded.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Duration> {
        self.steps
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| *d)
    }

    /// Steps in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.steps.iter().map(|(n, d)| (n.as_str(), *d))
    }

    /// Sum of all steps.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.steps.iter().map(|(_, d)| *d).sum()
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Worker threads for the hash phase. Default is 4 to avoid disk thrashing.
    pub io_threads: usize,
    /// Content hasher.
    pub hasher: Hasher,
    /// Names skipped while walking.
    pub exclusions: ExclusionPolicy,
    /// Group ordering.
    pub policy: ResolutionPolicy,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("hasher", &self.hasher)
            .field("exclusions", &self.exclusions)
            .field("policy", &self.policy)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            hasher: Hasher::new(),
            exclusions: ExclusionPolicy::default(),
            policy: ResolutionPolicy::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Derive a finder configuration from loaded settings.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            io_threads: config.io_threads,
            hasher: Hasher::new()
                .with_algorithm(config.algorithm)
                .with_block_size(config.block_size),
            exclusions: ExclusionPolicy::default().extended(&config.extra_exclusions),
            policy: ResolutionPolicy::new(config.sort_by_size),
            progress_callback: None,
        }
    }

    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the exclusion policy.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionPolicy) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Set the resolution policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Default)]
pub struct FinderReport {
    /// Per-root file counts.
    pub summary: ScanSummary,
    /// Every scanned file, in discovery order.
    pub records: FileRecords,
    /// Duplicate groups, ordered by the resolution policy.
    pub groups: Vec<DuplicateGroup>,
    /// Grouping counts.
    pub stats: GroupingStats,
    /// Non-fatal scan problems.
    pub scan_errors: Vec<ScanError>,
    /// Files that could not be hashed.
    pub hash_errors: Vec<HashError>,
    /// Duration of the scan, hash, detect and order steps.
    pub timings: StepTimings,
}

impl FinderReport {
    /// Whether at least one duplicate group exists.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Bytes held by every non-keeper member.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.groups
            .iter()
            .map(|g| g.wasted_space(&self.records))
            .sum()
    }
}

/// Runs the content pipeline.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a finder.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Phase 1: walk every root.
    pub fn scan<P: AsRef<Path>>(&self, roots: &[P]) -> ScanResult {
        let mut scanner = Scanner::new(self.config.exclusions.clone());
        if let Some(ref callback) = self.config.progress_callback {
            scanner = scanner.with_progress_callback(Arc::clone(callback));
        }
        scanner.scan(roots)
    }

    /// Phase 2: digest every record, in parallel.
    ///
    /// Records whose file cannot be read keep `digest = None`; the matching
    /// errors are returned in scan order.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if the worker pool cannot start.
    pub fn hash_records(&self, records: &mut FileRecords) -> Result<Vec<HashError>, FinderError> {
        let paths: Vec<PathBuf> = records.paths().map(Path::to_path_buf).collect();
        let total = paths.len();

        log::info!(
            "Hashing {} files with {} on {} thread(s)",
            total,
            self.config.hasher.algorithm(),
            self.config.io_threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()?;

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_phase_start(PHASE_HASHING, total);
        }

        let hasher = self.config.hasher;
        let done = AtomicUsize::new(0);

        let results: Vec<Result<String, HashError>> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let result = hasher.digest(path);
                    let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(cb) = callback {
                        cb.on_progress(current, path.to_string_lossy().as_ref());
                    }
                    result
                })
                .collect()
        });

        if let Some(cb) = callback {
            cb.on_phase_end(PHASE_HASHING);
        }

        // Single writer, scan order
        let mut errors = Vec::new();
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(hex) => {
                    log::trace!("{} {}", &hex[..hex.len().min(16)], path.display());
                    records.set_digest(path, hex);
                }
                Err(e) => {
                    log::warn!("Error reading file {}: {}", path.display(), e);
                    errors.push(e);
                }
            }
        }

        log::info!(
            "Hashes calculated for {} of {} files",
            total - errors.len(),
            total
        );
        Ok(errors)
    }

    /// Phase 3: group digested records and order the duplicate groups.
    #[must_use]
    pub fn group(&self, records: &FileRecords) -> (Vec<DuplicateGroup>, GroupingStats) {
        let grouping = DigestGroups::from_records(records);
        let stats = grouping.stats();
        let groups = self.config.policy.order(grouping.duplicate_groups(), records);
        (groups, stats)
    }

    /// Run the whole pipeline over `roots`.
    ///
    /// # Errors
    ///
    /// - [`FinderError::NoValidRoots`] if no root is a usable directory
    /// - [`FinderError::NothingFound`] if the roots contain no scannable file
    /// - [`FinderError::ThreadPool`] if hashing cannot start
    pub fn find_duplicates_in_paths<P: AsRef<Path>>(
        &self,
        roots: &[P],
    ) -> Result<FinderReport, FinderError> {
        let mut timings = StepTimings::new();

        let scan = timings.time("scan", || self.scan(roots));
        if !roots.is_empty() && scan.skipped_roots.len() == roots.len() {
            return Err(FinderError::NoValidRoots(scan.skipped_roots));
        }
        if scan.records.is_empty() {
            return Err(FinderError::NothingFound);
        }
        let summary = scan.summary(roots);
        let ScanResult {
            mut records,
            errors: scan_errors,
            ..
        } = scan;

        let hash_start = Instant::now();
        let hash_errors = self.hash_records(&mut records)?;
        timings.push("hash", hash_start.elapsed());

        let detect_start = Instant::now();
        let grouping = DigestGroups::from_records(&records);
        let stats = grouping.stats();
        let duplicates = grouping.duplicate_groups();
        timings.push("detect", detect_start.elapsed());

        log::info!(
            "Found {} duplicate group(s) totalling {} duplicate file(s) and {} unique file(s)",
            stats.duplicate_groups,
            stats.duplicate_files,
            stats.distinct_contents
        );

        let groups = timings.time("order", || self.config.policy.order(duplicates, &records));

        Ok(FinderReport {
            summary,
            records,
            groups,
            stats,
            scan_errors,
            hash_errors,
            timings,
        })
    }
}
