//! Patch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A patch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for patch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The diff neither applies nor is already applied. The upstream file most
    /// likely changed and the diff has to be regenerated against it.
    #[display("patch conflict on {}: upstream file likely changed, update the diff ({detail})", target.display())]
    Conflict {
        target: PathBuf,
        detail: String,
    },
    /// The diff itself could not be understood.
    #[display("malformed diff: {_0}")]
    MalformedDiff(#[error(not(source))] String),
    /// The vendor-original copy to restore before patching is missing.
    #[display("patch baseline not found: {}", _0.display())]
    BaselineNotFound(#[error(not(source))] PathBuf),
    /// No diff engine executable could be located.
    #[display("diff engine `{_0}` not found on PATH")]
    EngineNotFound(#[error(not(source))] &'static str),
    /// The diff engine ran but failed for reasons other than a conflict.
    #[display("diff engine failed: {_0}")]
    EngineFailed(#[error(not(source))] String),
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
