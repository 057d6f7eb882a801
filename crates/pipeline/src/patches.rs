use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use refdoc_config::{PatchEntry, PatchPhase};
use refdoc_patch::error::ErrorKind as PatchErrorKind;
use refdoc_patch::{EngineHandle, PatchDescriptor, PatchManager};
use std::fs;
use std::io::Write;
use tracing::instrument;

/// The configured patches, applied one phase at a time.
pub struct PatchSet {
    manager: PatchManager,
    entries: Vec<PatchEntry>,
}
impl PatchSet {
    pub fn new(engine: EngineHandle, entries: Vec<PatchEntry>) -> Self {
        Self { manager: PatchManager::new(engine), entries }
    }

    /// Applies every patch of `phase` in configuration order. Patches marked
    /// for echo have their resulting content written to `out`. Returns the
    /// number of patches applied (freshly or previously).
    #[instrument(skip_all, fields(phase = ?phase))]
    pub fn apply(&self, phase: PatchPhase, out: &mut dyn Write) -> Result<usize> {
        let mut applied = 0;
        for entry in self.entries.iter().filter(|e| e.phase == phase) {
            let target = entry.target.clone();
            let mut descriptor = PatchDescriptor::load(&entry.target, &entry.diff)
                .or_raise(|| ErrorKind::Patch(target.clone()))?
                .with_baseline(entry.baseline.clone());
            if let Err(err) = self.manager.apply(&mut descriptor) {
                let kind = match &*err {
                    PatchErrorKind::Conflict { .. } => ErrorKind::PatchConflict(target),
                    _ => ErrorKind::Patch(target),
                };
                return Err(err.raise(kind));
            }
            applied += 1;
            if entry.echo {
                let content = fs::read_to_string(&entry.target).map_err(ErrorKind::Io)?;
                write!(out, "{content}").map_err(ErrorKind::Io)?;
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_patch::BuiltinEngine;
    use std::ops::Deref;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    const DIFF: &str = "@@ -1,2 +1,3 @@\n Integreat CMS\n =============\n+.. include:: ../README.rst\n";

    fn entry(dir: &Path, phase: PatchPhase, echo: bool) -> PatchEntry {
        let diff = dir.join("integreat_cms.diff");
        fs::write(&diff, DIFF).unwrap();
        PatchEntry { target: dir.join("integreat_cms.rst"), diff, baseline: None, phase, echo }
    }

    #[test]
    fn test_applies_matching_phase_and_echoes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("integreat_cms.rst"), "Integreat CMS\n=============\n").unwrap();
        let patches = PatchSet::new(Arc::new(BuiltinEngine), vec![entry(dir.path(), PatchPhase::Reference, true)]);

        let mut out = Vec::new();
        assert_eq!(patches.apply(PatchPhase::Template, &mut out).unwrap(), 0);
        assert!(out.is_empty());

        // Second application is a no-op, and still echoed.
        for _ in 0..2 {
            let mut out = Vec::new();
            assert_eq!(patches.apply(PatchPhase::Reference, &mut out).unwrap(), 1);
            assert_eq!(String::from_utf8(out).unwrap(), "Integreat CMS\n=============\n.. include:: ../README.rst\n");
        }
    }

    #[test]
    fn test_conflict_maps_to_pipeline_kind() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("integreat_cms.rst"), "Something else\n").unwrap();
        let patches = PatchSet::new(Arc::new(BuiltinEngine), vec![entry(dir.path(), PatchPhase::Template, false)]);
        let err = patches.apply(PatchPhase::Template, &mut Vec::new()).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::PatchConflict(_)));
    }
}
