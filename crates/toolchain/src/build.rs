use crate::error::Result;
use crate::process::{discover, run};
use crate::{CompileSettings, SiteCompiler};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::instrument;

/// Compiles the documentation site with `sphinx-build`.
pub struct SphinxBuild {
    program: String,
    path: PathBuf,
}
impl SphinxBuild {
    pub fn discover(program: &str) -> Result<Self> {
        Ok(Self::at(program, discover(program)?))
    }

    pub fn at(program: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), path: path.into() }
    }

    fn command(&self, source: &Path, output: &Path, settings: &CompileSettings) -> Command {
        let mut command = Command::new(&self.path);
        if settings.strict {
            // Report every warning before failing, not just the first.
            command.args(["-W", "--keep-going"]);
        }
        command.arg("-j").arg(settings.jobs.to_string()).arg(source).arg(output);
        command
    }
}

impl SiteCompiler for SphinxBuild {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip_all, fields(source = %source.display(), output = %output.display(), jobs = %settings.jobs))]
    fn compile(&self, source: &Path, output: &Path, settings: &CompileSettings) -> Result<()> {
        let result = run(&self.program, &mut self.command(source, output, settings))?;
        for line in String::from_utf8_lossy(&result.stderr).lines() {
            tracing::warn!("{line}");
        }
        Ok(())
    }
}
