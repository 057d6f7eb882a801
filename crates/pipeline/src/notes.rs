use crate::error::{ErrorKind, Result};
use crate::purge::remove;
use exn::ResultExt;
use refdoc_toolchain::ReleaseNotesHandle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;
use upon::{Engine, Template};

const PAGE: &str = "{{ title }}\n{{ underline }}\n\n{{ body }}\n";

/// Writes the changelog page before the build and removes it afterwards.
///
/// The page only exists for the duration of a build; it is never part of
/// the hand-authored sources.
pub struct ReleaseNotesInjector {
    source: ReleaseNotesHandle,
    title: String,
    path: PathBuf,
    engine: Engine<'static>,
    template: Template<'static>,
}
impl ReleaseNotesInjector {
    pub fn new(source: ReleaseNotesHandle, title: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let engine = Engine::new();
        let template = engine.compile(PAGE.to_string()).or_raise(|| ErrorKind::ReleaseNotes)?;
        Ok(Self { source, title: title.into(), path: path.into(), engine, template })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn inject(&self) -> Result<&Path> {
        let body = self.source.generate().or_raise(|| ErrorKind::ReleaseNotes)?;
        let page = self
            .template
            .render(
                &self.engine,
                upon::value! {
                    title: self.title.as_str(),
                    underline: "=".repeat(self.title.chars().count()),
                    body: body.trim_end(),
                },
            )
            .to_string()
            .or_raise(|| ErrorKind::ReleaseNotes)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(ErrorKind::Io)?;
        }
        fs::write(&self.path, page).map_err(ErrorKind::Io)?;
        tracing::debug!("Release notes injected");
        Ok(&self.path)
    }

    /// Deletes the page, returning `false` if it was already gone.
    pub fn retract(&self) -> Result<bool> {
        let removed = remove(&self.path)?;
        tracing::debug!(path = %self.path.display(), removed, "Release notes retracted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_toolchain::ReleaseNotesSource;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixed(&'static str);
    impl ReleaseNotesSource for Fixed {
        fn generate(&self) -> refdoc_toolchain::error::Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_inject_and_retract() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sphinx/release-notes.rst");
        let notes = Arc::new(Fixed("2024.1.0\n--------\n\n* Add POI categories\n\n"));
        let injector = ReleaseNotesInjector::new(notes, "Release Notes", &path).unwrap();

        assert_eq!(injector.inject().unwrap(), path);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Release Notes\n=============\n\n2024.1.0\n--------\n\n* Add POI categories\n"
        );
        assert!(injector.retract().unwrap());
        assert!(!path.exists());
        assert!(!injector.retract().unwrap());
    }
}
