//! Duplicate detection: digest grouping, group ordering and the pipeline.
//!
//! - [`groups`]: partition digested files into [`DuplicateGroup`]s
//! - [`policy`]: order groups and pick the keeper of each
//! - [`finder`]: run scan → hash → group

pub mod finder;
pub mod groups;
pub mod policy;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, FinderReport, StepTimings};
pub use groups::{DigestGroups, DuplicateGroup, GroupingStats};
pub use policy::ResolutionPolicy;
