use crate::advisor::FailureAdvisor;
use crate::build::{BuildOrchestrator, BuildOutcome};
use crate::error::{ErrorKind, Result};
use crate::mode::BuildMode;
use crate::notes::ReleaseNotesInjector;
use crate::patches::PatchSet;
use crate::purge::purge;
use crate::scan::ReferenceScanner;
use crate::stamp::Stamp;
use exn::ResultExt;
use refdoc_config::{Config, PatchEngineKind, PatchPhase};
use refdoc_patch::{BuiltinEngine, EngineHandle, GnuPatch};
use refdoc_reference::{Transformer, VariantSplitter, Variants, tag_orphans};
use refdoc_toolchain::{CompileSettings, Toolchain};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// What a run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub purged: Vec<PathBuf>,
    /// Reference documents in each of the verbose and curated sets.
    pub documents: usize,
    /// Documents newly marked as orphans.
    pub orphans: usize,
    /// Patches applied, freshly or previously.
    pub patches: usize,
    /// `None` for purge-only runs.
    pub build: Option<BuildOutcome>,
}
impl Report {
    pub fn entry_page(&self) -> Option<&Path> {
        self.build.as_ref().and_then(|b| b.entry_page.as_deref())
    }
}

/// The documentation synthesis pipeline.
///
/// Stages run strictly in sequence, each consuming the previous one's output:
///
/// 1. purge generated files (clean runs only; purge-only runs stop here),
/// 2. apply template patches,
/// 3. scan the source trees,
/// 4. normalize titles, split verbose and curated sets, tag orphans,
/// 5. write both sets and apply reference patches,
/// 6. inject release notes, compile, retract release notes,
/// 7. strip build intermediates (CI) or report the entry page.
pub struct Pipeline {
    config: Config,
    toolchain: Toolchain,
    engine: EngineHandle,
    mode: BuildMode,
}
impl Pipeline {
    pub fn new(config: Config, toolchain: Toolchain, engine: EngineHandle, mode: BuildMode) -> Self {
        Self { config, toolchain, engine, mode }
    }

    /// Locates every external tool the configuration asks for.
    pub fn discover(config: Config, mode: BuildMode) -> Result<Self> {
        let toolchain = Toolchain::discover(&config).or_raise(|| ErrorKind::ToolNotFound)?;
        let engine: EngineHandle = match config.patch.engine {
            PatchEngineKind::Builtin => Arc::new(BuiltinEngine),
            PatchEngineKind::Gnu => Arc::new(GnuPatch::discover().or_raise(|| ErrorKind::ToolNotFound)?),
        };
        Ok(Self::new(config, toolchain, engine, mode))
    }

    pub fn mode(&self) -> &BuildMode {
        &self.mode
    }

    /// Runs every stage. Operator-facing output (echoed patches, the
    /// remediation hint) is written to `out`.
    pub fn run(&self, out: &mut dyn Write) -> Result<Report> {
        let advisor = FailureAdvisor::for_mode(&self.mode);
        let result = self.stages(out);
        advisor.advise(result, out)
    }

    #[instrument(skip_all, fields(invocation = ?self.mode.invocation, ci = self.mode.ci))]
    fn stages(&self, out: &mut dyn Write) -> Result<Report> {
        let paths = &self.config.paths;
        let mut report = Report::default();
        if self.mode.is_clean() {
            report.purged = purge(&paths.generated())?;
        }
        if !self.mode.builds() {
            return Ok(report);
        }

        let patches = PatchSet::new(self.engine.clone(), self.config.patch.patches.clone());
        report.patches += patches.apply(PatchPhase::Template, out)?;

        let scanner = ReferenceScanner::new(self.toolchain.scanner.clone(), self.config.scanner.clone());
        let stamp = Stamp::compute(&self.config.scanner, &scanner.version()?);
        if !self.mode.is_clean() {
            stamp.verify(&paths.verbose())?;
        }
        let scanned = scanner.scan()?;

        let transformer = Transformer::standard(&self.config.transform.acronyms).or_raise(|| ErrorKind::Reference)?;
        let splitter = VariantSplitter::new(self.config.reference.private_members.iter().cloned());
        let Variants { mut verbose, curated } = splitter.split(transformer.transform_set(scanned));
        report.orphans = tag_orphans(&mut verbose);
        report.documents = verbose.len();
        verbose.write(&paths.verbose()).or_raise(|| ErrorKind::Reference)?;
        curated.write(&paths.curated()).or_raise(|| ErrorKind::Reference)?;
        stamp.write(&paths.verbose())?;
        report.patches += patches.apply(PatchPhase::Reference, out)?;

        let injector = match &self.toolchain.release_notes {
            Some(source) => {
                let injector =
                    ReleaseNotesInjector::new(source.clone(), &self.config.release_notes.title, paths.release_notes())?;
                injector.inject()?;
                Some(injector)
            },
            None => {
                tracing::debug!("No release notes command configured");
                None
            },
        };

        let settings = CompileSettings { strict: self.config.compiler.strict, jobs: self.config.compiler.jobs };
        let orchestrator = BuildOrchestrator::new(self.toolchain.compiler.clone(), settings);
        // A failed build leaves the release notes in place for inspection.
        let outcome = orchestrator.build(&paths.source_dir, &paths.output_dir, &self.mode)?;
        if let Some(injector) = &injector {
            injector.retract()?;
        }
        report.build = Some(outcome);
        Ok(report)
    }
}
