use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use refdoc_config::ScannerConfig;
use refdoc_reference::ReferenceSet;
use refdoc_toolchain::ScannerHandle;
use tempfile::TempDir;
use tracing::instrument;

/// Runs the source scanner over every configured tree and collects the
/// resulting documents.
///
/// Scanning happens in a private staging directory: the documents on disk in
/// the verbose tree are already normalized, and must never be fed back
/// through the transformer as if they were fresh scanner output.
pub struct ReferenceScanner {
    scanner: ScannerHandle,
    config: ScannerConfig,
}
impl ReferenceScanner {
    pub fn new(scanner: ScannerHandle, config: ScannerConfig) -> Self {
        Self { scanner, config }
    }

    /// The scanner's version string, for generation stamps.
    pub fn version(&self) -> Result<String> {
        self.scanner.version().or_raise(|| ErrorKind::ScanFailure)
    }

    #[instrument(skip_all, fields(scanner = self.scanner.name(), trees = self.config.trees.len()))]
    pub fn scan(&self) -> Result<ReferenceSet> {
        let staging = TempDir::new().map_err(ErrorKind::Io)?;
        for tree in &self.config.trees {
            self.scanner
                .scan(tree, &self.config.options, staging.path())
                .or_raise(|| ErrorKind::ScanFailure)?;
        }
        let set = ReferenceSet::load(staging.path()).or_raise(|| ErrorKind::Reference)?;
        tracing::info!(documents = set.len(), "Scanned source trees");
        Ok(set)
    }
}
