use crate::error::{ErrorKind, Result};
use crate::{PatchEngine, PatchOutcome};
use exn::ResultExt;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;

/// Diagnostic GNU patch prints when `--forward` finds a hunk already applied.
const PREVIOUSLY_APPLIED: &str = "Reversed (or previously applied) patch detected";
/// Diagnostic GNU patch prints for every hunk it could not place.
const HUNK_FAILED: &str = "FAILED";

/// Drives the GNU `patch` executable.
///
/// Every application is a dry run first; the target is only touched once the
/// dry run reports a clean forward application. The "previously applied"
/// diagnostic is interpreted here and nowhere else.
pub struct GnuPatch {
    path: PathBuf,
}
impl GnuPatch {
    pub fn discover() -> Result<Self> {
        match which::which("patch") {
            Ok(path) => {
                tracing::trace!(patch = %path.display(), "Discovered GNU patch");
                Ok(Self { path })
            },
            Err(_) => exn::bail!(ErrorKind::EngineNotFound("patch")),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn run(&self, target: &Path, diff: &str, dry_run: bool) -> Result<Output> {
        let mut command = Command::new(&self.path);
        command
            .args(["--forward", "--batch", "--no-backup-if-mismatch", "--reject-file=-"])
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if dry_run {
            command.arg("--dry-run");
        }
        let mut child = command.spawn().map_err(ErrorKind::Io)?;
        let Some(mut stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            exn::bail!(ErrorKind::EngineFailed("patch stdin unavailable".to_string()));
        };
        // The diff is fed while stdout and stderr are drained; a large diff
        // would otherwise block on a full pipe.
        thread::scope(|scope| -> Result<Output> {
            let feeder = scope.spawn(move || stdin.write_all(diff.as_bytes()));
            let output =
                child.wait_with_output().or_raise(|| ErrorKind::EngineFailed("patch did not exit".to_string()))?;
            match feeder.join() {
                Ok(Ok(())) => Ok(output),
                // patch stopped reading early; its exit status carries the failure.
                Ok(Err(err)) if err.kind() == IoErrorKind::BrokenPipe => Ok(output),
                Ok(Err(err)) => Err(ErrorKind::Io(err).into()),
                Err(_) => exn::bail!(ErrorKind::EngineFailed("patch stdin writer panicked".to_string())),
            }
        })
    }
}

/// Maps GNU patch's exit status and diagnostics onto a [`PatchOutcome`].
fn classify(success: bool, stdout: &str, stderr: &str) -> PatchOutcome {
    if success {
        return PatchOutcome::Fresh;
    }
    let transcript = format!("{stdout}{stderr}");
    if transcript.contains(PREVIOUSLY_APPLIED) && !transcript.contains(HUNK_FAILED) {
        return PatchOutcome::AlreadyApplied;
    }
    PatchOutcome::Conflict(transcript.trim().to_string())
}

impl PatchEngine for GnuPatch {
    fn name(&self) -> &str {
        "gnu"
    }

    fn apply(&self, target: &Path, diff: &str) -> Result<PatchOutcome> {
        let dry = self.run(target, diff, true)?;
        let outcome = classify(
            dry.status.success(),
            &String::from_utf8_lossy(&dry.stdout),
            &String::from_utf8_lossy(&dry.stderr),
        );
        if outcome != PatchOutcome::Fresh {
            return Ok(outcome);
        }
        let real = self.run(target, diff, false)?;
        if !real.status.success() {
            exn::bail!(ErrorKind::EngineFailed(String::from_utf8_lossy(&real.stderr).trim().to_string()));
        }
        Ok(PatchOutcome::Fresh)
    }
}
