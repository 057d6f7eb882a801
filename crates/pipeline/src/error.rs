//! Pipeline Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the stage crates are
//! kept as children of the kind describing which stage failed.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
///
/// ### Operator Errors
/// - [`ErrorKind::PatchConflict`]: update the diff against the new upstream file.
/// - [`ErrorKind::StrictBuildFailure`]: fix the warning in generated or
///   hand-authored content.
/// - [`ErrorKind::EnvironmentMismatch`]: rebuild with `--clean`.
///
/// ### Dependency Errors
/// - [`ErrorKind::ScanFailure`], [`ErrorKind::ReleaseNotes`],
///   [`ErrorKind::Patch`], [`ErrorKind::Reference`], [`ErrorKind::BuildFailure`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A diff neither applies nor is already applied.
    #[display("{} has changed upstream; update its diff", _0.display())]
    PatchConflict(#[error(not(source))] PathBuf),
    /// The patch engine failed for a reason other than a conflict.
    #[display("could not apply patch to {}", _0.display())]
    Patch(#[error(not(source))] PathBuf),
    /// The source scanner exited unsuccessfully.
    #[display("source scanner failed")]
    ScanFailure,
    /// The compiler reported warnings, which strict mode treats as errors.
    #[display("documentation build failed (warnings are treated as errors)")]
    StrictBuildFailure,
    #[display("documentation build failed")]
    BuildFailure,
    /// Generated references were produced from a different scanner setup.
    #[display("{} was generated from a different source layout; rebuild with --clean", _0.display())]
    EnvironmentMismatch(#[error(not(source))] PathBuf),
    /// An external tool is missing from the system.
    #[display("required tool is not installed")]
    ToolNotFound,
    #[display("release notes could not be generated")]
    ReleaseNotes,
    /// Reading, transforming or writing reference documents failed.
    #[display("reference documents could not be processed")]
    Reference,
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
