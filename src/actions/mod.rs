//! File actions: confirmation and removal of duplicates.
//!
//! - [`confirm`]: blast-radius assessment and the interactive yes/no gate
//! - [`trash`]: disposal strategies (system trash, OS relocation, permanent)
//! - [`delete`]: the removal contract and the auto-clean batch
//!
//! ```no_run
//! use dupfind::actions::{assess, ConfirmationGate, Deleter, TrashMethod, TrashStrategy};
//! # let groups: Vec<dupfind::duplicates::DuplicateGroup> = Vec::new();
//! # let records = dupfind::scanner::FileRecords::new();
//!
//! let assessment = assess(&groups, &records);
//! if ConfirmationGate::new().confirm_on_terminal(&assessment).is_confirmed() {
//!     let deleter = Deleter::new(TrashStrategy::resolve(TrashMethod::Auto).unwrap());
//!     // ...
//! }
//! ```

pub mod confirm;
pub mod delete;
pub mod trash;

pub use confirm::{
    assess, CleanupAssessment, ConfirmationChannel, ConfirmationGate, Decision, ScriptedChannel,
    TerminalChannel,
};
pub use delete::{
    delete_removables, BatchDeleteResult, DeleteError, DeleteErrorKind, DeleteOutcome,
    DeleteProgressCallback, DeleteResult, Deleter, DEFAULT_TIMEOUT,
};
pub use trash::{ResolveError, TrashMethod, TrashStrategy};
