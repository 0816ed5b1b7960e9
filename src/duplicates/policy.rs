//! Group ordering and keeper selection.
//!
//! The keeper of a group is always its first member (the first file
//! discovered). There are no filename, mtime or depth heuristics.
//!
//! By default duplicate groups are ordered by the recorded size of their
//! first member, largest first, so the biggest savings come first. The sort
//! is stable: groups with equal sizes keep their discovery order.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use super::DuplicateGroup;
use crate::scanner::FileRecords;

/// Decides group order and which members an auto-clean may remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionPolicy {
    sort_by_size: bool,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self { sort_by_size: true }
    }
}

impl ResolutionPolicy {
    /// Create a policy; `sort_by_size = false` keeps discovery order.
    #[must_use]
    pub fn new(sort_by_size: bool) -> Self {
        Self { sort_by_size }
    }

    /// Policy that keeps discovery order.
    #[must_use]
    pub fn unsorted() -> Self {
        Self::new(false)
    }

    /// Whether groups are sorted by size.
    #[must_use]
    pub fn sorts_by_size(&self) -> bool {
        self.sort_by_size
    }

    /// Order groups. Member order inside each group is never changed.
    #[must_use]
    pub fn order(&self, mut groups: Vec<DuplicateGroup>, records: &FileRecords) -> Vec<DuplicateGroup> {
        if self.sort_by_size {
            // slice::sort_by_key is stable
            groups.sort_by_key(|g| Reverse(Self::representative_size(g, records)));
        }
        groups
    }

    /// Sort key of a group: recorded size of its first member, 0 if unknown.
    #[must_use]
    pub fn representative_size(group: &DuplicateGroup, records: &FileRecords) -> u64 {
        group
            .first()
            .and_then(|p| records.size_of(p))
            .unwrap_or(0)
    }

    /// The member that always survives.
    #[must_use]
    pub fn keeper<'a>(&self, group: &'a DuplicateGroup) -> Option<&'a Path> {
        group.first()
    }

    /// Members an auto-clean may remove.
    #[must_use]
    pub fn removables<'a>(&self, group: &'a DuplicateGroup) -> &'a [PathBuf] {
        group.rest()
    }
}
