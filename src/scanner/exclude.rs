//! Exclusion policy applied to every directory entry during the walk.
//!
//! A name is excluded when it:
//! - matches an entry of the denylist exactly,
//! - starts with `.` (hidden-file convention), or
//! - matches a glob entry of the denylist such as `*.pyc`.
//!
//! The policy only ever looks at the final path component, so it can be
//! evaluated on `jwalk` children before the walker descends into them.

use std::collections::HashSet;
use std::ffi::OsStr;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Names skipped by default: VCS metadata, OS shadow files, editor/IDE
/// state and Python build caches.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    ".gitkeep",
    ".gitignore",
    ".git",
    "__pycache__",
    ".pytest_cache",
    ".vscode",
    ".idea",
    "*.pyc",
    "*.pyo",
];

/// Decides which file and directory names the scanner skips.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    names: HashSet<String>,
    patterns: Vec<String>,
    globs: Option<Gitignore>,
    skip_hidden: bool,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::from_entries(DEFAULT_EXCLUSIONS.iter().copied())
    }
}

impl ExclusionPolicy {
    /// Build a policy from denylist entries.
    ///
    /// Entries containing glob metacharacters (`*`, `?`, `[`) are treated
    /// as name globs; everything else is an exact name.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = HashSet::new();
        let mut patterns = Vec::new();

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            if is_glob(entry) {
                if !patterns.iter().any(|p| p == entry) {
                    patterns.push(entry.to_string());
                }
            } else {
                names.insert(entry.to_string());
            }
        }

        let globs = build_globs(&patterns);
        Self {
            names,
            patterns,
            globs,
            skip_hidden: true,
        }
    }

    /// A policy that excludes nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            names: HashSet::new(),
            patterns: Vec::new(),
            globs: None,
            skip_hidden: false,
        }
    }

    /// Add more denylist entries on top of the current ones.
    #[must_use]
    pub fn extended<I, S>(self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skip_hidden = self.skip_hidden;
        let mut policy = Self::from_entries(
            self.names
                .into_iter()
                .chain(self.patterns)
                .chain(extra.into_iter().map(|s| s.as_ref().to_string())),
        );
        policy.skip_hidden = skip_hidden;
        policy
    }

    /// Enable or disable the hidden-file rule.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    /// Whether the hidden-file rule is active.
    #[must_use]
    pub fn skips_hidden(&self) -> bool {
        self.skip_hidden
    }

    /// Glob entries of the denylist.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check a single path component.
    #[must_use]
    pub fn is_excluded(&self, name: &OsStr, is_dir: bool) -> bool {
        let name = name.to_string_lossy();

        if self.names.contains(name.as_ref()) {
            return true;
        }

        if self.skip_hidden && name.starts_with('.') {
            return true;
        }

        self.globs
            .as_ref()
            .is_some_and(|gi| gi.matched(name.as_ref(), is_dir).is_ignore())
    }
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

fn build_globs(patterns: &[String]) -> Option<Gitignore> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GitignoreBuilder::new("");
    for pattern in patterns {
        if let Err(e) = builder.add_line(None, pattern) {
            log::warn!("Invalid exclusion pattern '{}': {}", pattern, e);
        }
    }

    match builder.build() {
        Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Failed to build exclusion patterns: {}", e);
            None
        }
    }
}
