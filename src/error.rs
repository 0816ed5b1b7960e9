//! Exit codes and machine-readable errors.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: Success (completed, duplicates found)
/// - 1: General error (bad configuration, unexpected failure)
/// - 2: No duplicates found
/// - 3: Partial success (some deletions failed)
/// - 4: Nothing found (no file could be scanned under any root)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Auto-clean ran but at least one removal failed.
    PartialSuccess = 3,
    /// No scannable file under any root.
    NothingFound = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DF000",
            Self::GeneralError => "DF001",
            Self::NoDuplicates => "DF002",
            Self::PartialSuccess => "DF003",
            Self::NothingFound => "DF004",
        }
    }

    /// Exit code for an error that escaped the run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<crate::duplicates::FinderError>() {
            Some(
                crate::duplicates::FinderError::NothingFound
                | crate::duplicates::FinderError::NoValidRoots(_),
            ) => Self::NothingFound,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
