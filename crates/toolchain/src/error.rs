//! Toolchain Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A toolchain error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for toolchain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The executable is not installed or not on `PATH`.
    #[display("{_0} not detected on your system")]
    ToolNotFound(#[error(not(source))] String),
    /// The tool ran and exited unsuccessfully; `stderr` is its own output,
    /// unmodified.
    #[display("{program} failed ({status})\n{stderr}")]
    ToolFailed { program: String, status: String, stderr: String },
    /// The tool could not be started or its output could not be read.
    #[display("could not run {_0}")]
    Spawn(#[error(not(source))] String),
    /// The tool produced output that is not valid UTF-8.
    #[display("{_0} produced non UTF-8 output")]
    Encoding(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Spawn(_))
    }
}
