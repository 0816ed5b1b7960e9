//! Digest grouping.
//!
//! # Overview
//!
//! [`DigestGroups`] partitions every digested [`FileRecord`] into exactly one
//! [`DuplicateGroup`] keyed by digest. Grouping is pure: no file is touched.
//!
//! Ordering is part of the contract:
//! - groups appear in the order their digest was first seen;
//! - members appear in the order their records were presented.
//!
//! Given the same record order, membership and order are identical across
//! runs.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::DigestGroups;
//! use dupfind::scanner::{FileRecord, FileRecords};
//! use std::path::PathBuf;
//!
//! let records: FileRecords = vec![
//!     FileRecord::with_digest(PathBuf::from("/a.txt"), 4, "aa"),
//!     FileRecord::with_digest(PathBuf::from("/b.txt"), 4, "bb"),
//!     FileRecord::with_digest(PathBuf::from("/c.txt"), 4, "aa"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let groups = DigestGroups::from_records(&records);
//! assert_eq!(groups.duplicate_groups().len(), 1);
//! assert_eq!(groups.unique_groups().len(), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{FileRecord, FileRecords};

/// Files sharing one content digest, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Lowercase hex content digest
    pub digest: String,
    /// Member paths; the first one is the keeper candidate
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a group.
    #[must_use]
    pub fn new(digest: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        Self {
            digest: digest.into(),
            paths,
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Two or more members share this content.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.paths.len() > 1
    }

    /// Exactly one member has this content.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.paths.len() == 1
    }

    /// First-discovered member.
    #[must_use]
    pub fn first(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Members after the first.
    #[must_use]
    pub fn rest(&self) -> &[PathBuf] {
        self.paths.get(1..).unwrap_or(&[])
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes held by the members after the first, using recorded sizes.
    #[must_use]
    pub fn wasted_space(&self, records: &FileRecords) -> u64 {
        self.rest().iter().filter_map(|p| records.size_of(p)).sum()
    }

    /// Leading characters of the digest, for display.
    #[must_use]
    pub fn short_digest(&self, len: usize) -> &str {
        let end = self
            .digest
            .char_indices()
            .nth(len)
            .map_or(self.digest.len(), |(idx, _)| idx);
        &self.digest[..end]
    }
}

/// Counts derived from a grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Files that carried a digest
    pub digested_files: usize,
    /// Distinct contents (one per group)
    pub distinct_contents: usize,
    /// Groups with 2+ members
    pub duplicate_groups: usize,
    /// Members beyond the first, summed over duplicate groups
    pub duplicate_files: usize,
    /// Groups with exactly one member
    pub unique_files: usize,
}

/// All digest groups of a run, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestGroups {
    groups: Vec<DuplicateGroup>,
}

impl DigestGroups {
    /// Group digested records. Records without a digest are left out.
    #[must_use]
    pub fn from_records(records: &FileRecords) -> Self {
        Self::from_pairs(
            records
                .iter()
                .filter_map(|r: &FileRecord| r.digest.as_ref().map(|d| (r.path.clone(), d.clone()))),
        )
    }

    /// Group `(path, digest)` pairs in presentation order.
    #[must_use]
    pub fn from_pairs<I, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, D)>,
        D: Into<String>,
    {
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (path, digest) in pairs {
            let digest = digest.into();
            match index.get(&digest) {
                Some(&idx) => groups[idx].paths.push(path),
                None => {
                    index.insert(digest.clone(), groups.len());
                    groups.push(DuplicateGroup::new(digest, vec![path]));
                }
            }
        }

        log::debug!("Grouped files into {} distinct digest(s)", groups.len());
        Self { groups }
    }

    /// Every group, duplicate or not.
    #[must_use]
    pub fn all(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Groups with two or more members, in first-seen order.
    #[must_use]
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        self.groups
            .iter()
            .filter(|g| g.is_duplicate())
            .cloned()
            .collect()
    }

    /// Groups with exactly one member, in first-seen order.
    #[must_use]
    pub fn unique_groups(&self) -> Vec<DuplicateGroup> {
        self.groups
            .iter()
            .filter(|g| g.is_unique())
            .cloned()
            .collect()
    }

    /// Group holding a digest.
    #[must_use]
    pub fn get(&self, digest: &str) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.digest == digest)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Summary counts.
    #[must_use]
    pub fn stats(&self) -> GroupingStats {
        let mut stats = GroupingStats {
            distinct_contents: self.groups.len(),
            ..GroupingStats::default()
        };
        for group in &self.groups {
            stats.digested_files += group.len();
            if group.is_duplicate() {
                stats.duplicate_groups += 1;
                stats.duplicate_files += group.duplicate_count();
            } else {
                stats.unique_files += 1;
            }
        }
        stats
    }
}
