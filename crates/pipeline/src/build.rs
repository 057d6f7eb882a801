use crate::error::{ErrorKind, Result};
use crate::mode::BuildMode;
use crate::purge::remove;
use refdoc_toolchain::error::ErrorKind as ToolErrorKind;
use refdoc_toolchain::{CompileSettings, CompilerHandle};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Compiler output that only serves incremental rebuilds and is not meant to
/// be published.
const INTERMEDIATES: [&str; 2] = [".buildinfo", ".doctrees"];
const ENTRY_PAGE: &str = "index.html";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Intermediate files stripped from the output (CI only).
    pub stripped: Vec<PathBuf>,
    /// The page to open in a browser (outside CI only).
    pub entry_page: Option<PathBuf>,
}

pub struct BuildOrchestrator {
    compiler: CompilerHandle,
    settings: CompileSettings,
}
impl BuildOrchestrator {
    pub fn new(compiler: CompilerHandle, settings: CompileSettings) -> Self {
        Self { compiler, settings }
    }

    #[instrument(skip_all, fields(compiler = self.compiler.name(), strict = self.settings.strict))]
    pub fn build(&self, source: &Path, output: &Path, mode: &BuildMode) -> Result<BuildOutcome> {
        if let Err(err) = self.compiler.compile(source, output, &self.settings) {
            // Only a compiler that ran and rejected the content is a strict-mode
            // failure; one that never started is not.
            let kind = match (&*err, self.settings.strict) {
                (ToolErrorKind::ToolFailed { .. }, true) => ErrorKind::StrictBuildFailure,
                _ => ErrorKind::BuildFailure,
            };
            return Err(err.raise(kind));
        }
        tracing::info!(output = %output.display(), "Documentation compiled");

        let mut outcome = BuildOutcome::default();
        if mode.strips_intermediates() {
            for name in INTERMEDIATES {
                let path = output.join(name);
                if remove(&path)? {
                    tracing::debug!(path = %path.display(), "Stripped build intermediate");
                    outcome.stripped.push(path);
                }
            }
        } else {
            outcome.entry_page = Some(output.join(ENTRY_PAGE));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Invocation;
    use refdoc_config::Jobs;
    use refdoc_toolchain::SiteCompiler;
    use refdoc_toolchain::error::Result as ToolResult;
    use rstest::rstest;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    enum Compiler {
        Writes,
        Rejects,
        Missing,
    }
    impl SiteCompiler for Compiler {
        fn name(&self) -> &str {
            "test-build"
        }

        fn compile(&self, _source: &Path, output: &Path, _settings: &CompileSettings) -> ToolResult<()> {
            match self {
                Self::Writes => {
                    fs::create_dir_all(output.join(".doctrees")).unwrap();
                    fs::write(output.join(".buildinfo"), "").unwrap();
                    fs::write(output.join(ENTRY_PAGE), "<html></html>").unwrap();
                    Ok(())
                },
                Self::Rejects => exn::bail!(ToolErrorKind::ToolFailed {
                    program: "test-build".to_string(),
                    status: "exit status: 2".to_string(),
                    stderr: "WARNING: undefined label".to_string(),
                }),
                Self::Missing => exn::bail!(ToolErrorKind::Spawn("test-build".to_string())),
            }
        }
    }

    fn orchestrator(compiler: Compiler, strict: bool) -> BuildOrchestrator {
        BuildOrchestrator::new(Arc::new(compiler), CompileSettings { strict, jobs: Jobs::Auto })
    }

    #[rstest]
    #[case(Compiler::Rejects, true, true)]
    #[case(Compiler::Rejects, false, false)]
    #[case(Compiler::Missing, true, false)]
    #[case(Compiler::Missing, false, false)]
    fn test_failure_kinds(#[case] compiler: Compiler, #[case] strict: bool, #[case] strict_failure: bool) {
        let dir = TempDir::new().unwrap();
        let mode = BuildMode::new(Invocation::Build, false);
        let err = orchestrator(compiler, strict).build(dir.path(), &dir.path().join("html"), &mode).unwrap_err();
        match strict_failure {
            true => assert!(matches!(&*err, ErrorKind::StrictBuildFailure)),
            false => assert!(matches!(&*err, ErrorKind::BuildFailure)),
        }
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, true)]
    fn test_intermediates_follow_mode(#[case] ci: bool, #[case] stripped: bool) {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("html");
        let mode = BuildMode::new(Invocation::Build, ci);
        let outcome = orchestrator(Compiler::Writes, true).build(dir.path(), &output, &mode).unwrap();
        assert_eq!(outcome.stripped.len(), if stripped { 2 } else { 0 });
        assert_eq!(output.join(".buildinfo").exists(), !stripped);
        assert_eq!(outcome.entry_page.is_some(), !stripped);
    }
}
