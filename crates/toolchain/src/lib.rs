//! The external programs the documentation pipeline drives.
//!
//! Each collaborator sits behind an object-safe trait so the pipeline can be
//! exercised without Sphinx installed. The production implementations
//! discover their executable on `PATH` at construction time, so a missing
//! tool is reported before any work starts.

mod apidoc;
mod build;
pub mod error;
mod notes;
mod process;

use crate::error::Result;
use refdoc_config::{Config, Jobs, SourceTree};
use std::path::Path;
use std::sync::Arc;

pub use crate::apidoc::SphinxApidoc;
pub use crate::build::SphinxBuild;
pub use crate::notes::CommandReleaseNotes;

pub type ScannerHandle = Arc<dyn SourceScanner + Send + Sync>;
pub type CompilerHandle = Arc<dyn SiteCompiler + Send + Sync>;
pub type ReleaseNotesHandle = Arc<dyn ReleaseNotesSource + Send + Sync>;

/// Produces one reference document per module or package of a source tree.
pub trait SourceScanner {
    fn name(&self) -> &str;
    /// Identifies the scanner build; recorded in generation stamps so output
    /// from a different scanner is never mixed with ours.
    fn version(&self) -> Result<String>;
    /// Writes reference documents for `tree` into `out`. Must be
    /// deterministic: an unchanged tree yields byte-identical documents.
    fn scan(&self, tree: &SourceTree, options: &[String], out: &Path) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileSettings {
    /// Every warning fails the build.
    pub strict: bool,
    pub jobs: Jobs,
}

/// Renders the source directory into a browsable site.
pub trait SiteCompiler {
    fn name(&self) -> &str;
    fn compile(&self, source: &Path, output: &Path, settings: &CompileSettings) -> Result<()>;
}

/// Synthesizes the changelog page from project history.
pub trait ReleaseNotesSource {
    fn generate(&self) -> Result<String>;
}

/// The collaborator set a pipeline run needs.
#[derive(Clone)]
pub struct Toolchain {
    pub scanner: ScannerHandle,
    pub compiler: CompilerHandle,
    /// `None` when no release notes command is configured.
    pub release_notes: Option<ReleaseNotesHandle>,
}
impl Toolchain {
    pub fn discover(config: &Config) -> Result<Self> {
        let scanner: ScannerHandle = Arc::new(SphinxApidoc::discover(&config.scanner.program)?);
        let compiler: CompilerHandle = Arc::new(SphinxBuild::discover(&config.compiler.program)?);
        let release_notes = match &config.release_notes.command {
            Some(argv) => Some(Arc::new(CommandReleaseNotes::discover(argv)?) as ReleaseNotesHandle),
            None => None,
        };
        Ok(Self { scanner, compiler, release_notes })
    }
}
