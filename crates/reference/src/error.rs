//! Reference Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A reference error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reference operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A generated file's name cannot be used as a module identifier.
    #[display("not a reference document name: {}", _0.display())]
    InvalidName(#[error(not(source))] PathBuf),
    /// A transformation rule's pattern failed to compile.
    #[display("invalid transformation rule: {_0}")]
    InvalidRule(#[error(not(source))] String),
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
