//! dupfind - duplicate file finder
//!
//! Locates duplicate files across one or more directory trees by content,
//! groups them by digest, and optionally moves every copy but the first of
//! each group to the trash after an interactive confirmation.
//!
//! Pipeline: [`scanner`] → [`duplicates`] → [`actions`] → [`output`].

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

pub use app::run_app;
