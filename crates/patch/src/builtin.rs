use crate::error::{ErrorKind, Result};
use crate::unified::{Application, Diff};
use crate::{PatchEngine, PatchOutcome};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Applies unified diffs without any external tooling.
///
/// Patched content is written to a sibling temporary file and renamed over
/// the target, so an interrupted run never leaves a half-written template.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinEngine;

impl PatchEngine for BuiltinEngine {
    fn name(&self) -> &str {
        "builtin"
    }

    fn apply(&self, target: &Path, diff: &str) -> Result<PatchOutcome> {
        let diff = Diff::parse(diff)?;
        let content = fs::read_to_string(target).map_err(ErrorKind::Io)?;
        match diff.apply(&content) {
            Application::AlreadyApplied => Ok(PatchOutcome::AlreadyApplied),
            Application::Conflict(hunk) => Ok(PatchOutcome::Conflict(format!("hunk #{} does not match", hunk + 1))),
            Application::Fresh(patched) => {
                let parent = target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
                let mut tmp = NamedTempFile::new_in(parent).map_err(ErrorKind::Io)?;
                tmp.write_all(patched.as_bytes()).map_err(ErrorKind::Io)?;
                tmp.persist(target).map_err(|e| ErrorKind::Io(e.error))?;
                Ok(PatchOutcome::Fresh)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reports_typed_outcomes() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("integreat_cms.rst");
        fs::write(&target, "Integreat CMS\n=============\n").unwrap();
        let diff = "@@ -1,2 +1,4 @@\n Integreat CMS\n =============\n+\n+.. include:: ../../README.rst\n";

        assert_eq!(BuiltinEngine.apply(&target, diff).unwrap(), PatchOutcome::Fresh);
        assert_eq!(BuiltinEngine.apply(&target, diff).unwrap(), PatchOutcome::AlreadyApplied);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "Integreat CMS\n=============\n\n.. include:: ../../README.rst\n"
        );

        fs::write(&target, "Something else entirely\n").unwrap();
        assert!(matches!(BuiltinEngine.apply(&target, diff).unwrap(), PatchOutcome::Conflict(_)));
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(BuiltinEngine.apply(&dir.path().join("nope.html"), "@@ -1 +1 @@\n-a\n+b\n").is_err());
    }
}
