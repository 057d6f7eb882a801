use crate::SourceScanner;
use crate::error::Result;
use crate::process::{discover, run, stdout};
use refdoc_config::SourceTree;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::instrument;

/// Default `automodule` options are passed through the environment rather
/// than on the command line.
const OPTIONS_VARIABLE: &str = "SPHINX_APIDOC_OPTIONS";

/// Scans Python packages with `sphinx-apidoc`, one `.rst` page per module or
/// package.
pub struct SphinxApidoc {
    program: String,
    path: PathBuf,
}
impl SphinxApidoc {
    pub fn discover(program: &str) -> Result<Self> {
        Ok(Self::at(program, discover(program)?))
    }

    pub fn at(program: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), path: path.into() }
    }

    fn command(&self, tree: &SourceTree, options: &[String], out: &Path) -> Command {
        let mut command = Command::new(&self.path);
        command
            .env(OPTIONS_VARIABLE, options.join(","))
            // No table of contents: navigation is hand-authored, generated
            // pages are orphans.
            .args(["--force", "--no-toc", "--module-first", "-o"])
            .arg(out)
            .arg(&tree.root)
            .args(&tree.exclude);
        command
    }
}

impl SourceScanner for SphinxApidoc {
    fn name(&self) -> &str {
        &self.program
    }

    fn version(&self) -> Result<String> {
        let output = run(&self.program, Command::new(&self.path).arg("--version"))?;
        Ok(stdout(&self.program, output)?.trim().to_string())
    }

    #[instrument(skip_all, fields(root = %tree.root.display(), out = %out.display()))]
    fn scan(&self, tree: &SourceTree, options: &[String], out: &Path) -> Result<()> {
        run(&self.program, &mut self.command(tree, options, out))?;
        tracing::debug!(excluded = tree.exclude.len(), "Scanned source tree");
        Ok(())
    }
}
