//! Idempotent patching of vendor templates and generated documents.
//!
//! A [`PatchDescriptor`] pairs a target file with the unified diff to apply to
//! it. The [`PatchManager`] optionally restores the target from a vendor
//! baseline first, then hands it to a [`PatchEngine`] which reports a typed
//! [`PatchOutcome`]:
//!
//! - [`PatchOutcome::Fresh`] and [`PatchOutcome::AlreadyApplied`] both resolve
//!   to [`AppliedState::Applied`]; re-running the pipeline is never an error.
//! - [`PatchOutcome::Conflict`] is fatal: the upstream file changed and the
//!   diff needs to be updated. The target is left untouched.
//!
//! Two engines are provided: [`BuiltinEngine`] applies diffs in-process, and
//! [`GnuPatch`] drives the system `patch` executable.

mod builtin;
mod consts;
pub mod error;
mod gnu;
mod unified;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

pub use crate::builtin::BuiltinEngine;
pub use crate::gnu::GnuPatch;

pub type EngineHandle = Arc<dyn PatchEngine + Send + Sync>;

/// What a diff engine observed when asked to apply a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The diff applied and the target was rewritten.
    Fresh,
    /// The target already contains the diff's changes; nothing was written.
    AlreadyApplied,
    /// The diff applies neither forwards nor as a repeat.
    Conflict(String),
}

/// Lifecycle of a [`PatchDescriptor`] within one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppliedState {
    #[default]
    Unapplied,
    Applied,
    Conflict,
}

/// A diff engine capable of applying a single-file unified diff in place.
///
/// Implementations must not leave a partially patched target behind when
/// reporting [`PatchOutcome::Conflict`].
pub trait PatchEngine {
    fn name(&self) -> &str;
    fn apply(&self, target: &Path, diff: &str) -> Result<PatchOutcome>;
}

#[derive(Clone, Debug)]
pub struct PatchDescriptor {
    pub target: PathBuf,
    pub diff: String,
    /// Vendor-original copy of `target`, restored before every application.
    pub baseline: Option<PathBuf>,
    pub state: AppliedState,
}
impl PatchDescriptor {
    pub fn new(target: impl Into<PathBuf>, diff: impl Into<String>) -> Self {
        Self { target: target.into(), diff: diff.into(), baseline: None, state: AppliedState::Unapplied }
    }

    /// Reads the diff content from `diff_path`.
    pub fn load(target: impl Into<PathBuf>, diff_path: impl AsRef<Path>) -> Result<Self> {
        let diff = fs::read_to_string(diff_path.as_ref()).map_err(ErrorKind::Io)?;
        Ok(Self::new(target, diff))
    }

    pub fn with_baseline(mut self, baseline: impl Into<Option<PathBuf>>) -> Self {
        self.baseline = baseline.into();
        self
    }
}

pub struct PatchManager {
    engine: EngineHandle,
}
impl PatchManager {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Applies a descriptor, recording the final state on it.
    ///
    /// When the descriptor carries a baseline, the target is overwritten with
    /// it first so every run starts from the same vendor-original content.
    #[instrument(skip_all, fields(file = %descriptor.target.display(), engine = self.engine.name()))]
    pub fn apply(&self, descriptor: &mut PatchDescriptor) -> Result<AppliedState> {
        if let Some(baseline) = &descriptor.baseline {
            if !baseline.is_file() {
                exn::bail!(ErrorKind::BaselineNotFound(baseline.clone()));
            }
            if let Some(parent) = descriptor.target.parent() {
                fs::create_dir_all(parent).map_err(ErrorKind::Io)?;
            }
            fs::copy(baseline, &descriptor.target).map_err(ErrorKind::Io)?;
            tracing::debug!(baseline = %baseline.display(), "Restored target from vendor baseline");
        }
        let outcome = self
            .engine
            .apply(&descriptor.target, &descriptor.diff)
            .or_raise(|| ErrorKind::EngineFailed(format!("could not patch {}", descriptor.target.display())))?;
        match outcome {
            PatchOutcome::Fresh => {
                tracing::info!("Patch applied");
                descriptor.state = AppliedState::Applied;
            },
            PatchOutcome::AlreadyApplied => {
                tracing::info!("Patch previously applied, skipping");
                descriptor.state = AppliedState::Applied;
            },
            PatchOutcome::Conflict(detail) => {
                descriptor.state = AppliedState::Conflict;
                exn::bail!(ErrorKind::Conflict { target: descriptor.target.clone(), detail });
            },
        }
        Ok(descriptor.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Deref;
    use tempfile::TempDir;

    const DIFF: &str = "@@ -1,2 +1,2 @@\n <nav>\n-  Home\n+  <a href=\"/\">Home</a>\n";

    fn manager() -> PatchManager {
        PatchManager::new(Arc::new(BuiltinEngine))
    }

    #[test]
    fn test_idempotent_without_baseline() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index.rst");
        fs::write(&target, "<nav>\n  Home\n</nav>\n").unwrap();

        let mut first = PatchDescriptor::new(&target, DIFF);
        assert_eq!(manager().apply(&mut first).unwrap(), AppliedState::Applied);
        let once = fs::read_to_string(&target).unwrap();

        let mut second = PatchDescriptor::new(&target, DIFF);
        assert_eq!(manager().apply(&mut second).unwrap(), AppliedState::Applied);
        assert_eq!(fs::read_to_string(&target).unwrap(), once);
        assert_eq!(once, "<nav>\n  <a href=\"/\">Home</a>\n</nav>\n");
    }

    #[test]
    fn test_baseline_restored_before_each_run() {
        let dir = TempDir::new().unwrap();
        let baseline = dir.path().join("vendor/breadcrumbs.html");
        let target = dir.path().join("templates/breadcrumbs.html");
        fs::create_dir_all(baseline.parent().unwrap()).unwrap();
        fs::write(&baseline, "<nav>\n  Home\n</nav>\n").unwrap();

        for _ in 0..2 {
            let mut descriptor = PatchDescriptor::new(&target, DIFF).with_baseline(baseline.clone());
            assert_eq!(manager().apply(&mut descriptor).unwrap(), AppliedState::Applied);
        }
        assert_eq!(fs::read_to_string(&target).unwrap(), "<nav>\n  <a href=\"/\">Home</a>\n</nav>\n");
        // The vendor copy itself is never modified.
        assert_eq!(fs::read_to_string(&baseline).unwrap(), "<nav>\n  Home\n</nav>\n");
    }

    #[test]
    fn test_conflict_is_fatal_and_recorded() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("footer.html");
        fs::write(&target, "<nav>\n  Start\n</nav>\n").unwrap();

        let mut descriptor = PatchDescriptor::new(&target, DIFF);
        let err = manager().apply(&mut descriptor).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Conflict { .. }));
        assert_eq!(descriptor.state, AppliedState::Conflict);
        assert_eq!(fs::read_to_string(&target).unwrap(), "<nav>\n  Start\n</nav>\n");
    }

    #[test]
    fn test_missing_baseline() {
        let dir = TempDir::new().unwrap();
        let mut descriptor =
            PatchDescriptor::new(dir.path().join("footer.html"), DIFF).with_baseline(dir.path().join("missing.html"));
        let err = manager().apply(&mut descriptor).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::BaselineNotFound(_)));
        assert_eq!(descriptor.state, AppliedState::Unapplied);
    }
}
