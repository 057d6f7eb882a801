//! Layered configuration for the documentation pipeline.
//!
//! Configuration is assembled with [figment] from, in increasing precedence:
//!
//! 1. Built-in defaults ([`Config::default`]), which describe the usual
//!    `sphinx/` source layout with `ref-ext/` (verbose) and `ref/` (curated)
//!    reference trees compiled into `docs/`.
//! 2. The first configuration file found (see [`Config::locate`]). TOML, YAML
//!    and JSON are recognised by extension.
//! 3. Environment variables prefixed with `REFDOC_`, where nested keys are
//!    separated by a double underscore (`REFDOC_PATHS__OUTPUT_DIR=site`).
//!
//! The result is validated once, then treated as immutable for the rest of
//! the run.

pub mod error;
mod jobs;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub use crate::jobs::Jobs;

pub const ENV_PREFIX: &str = "REFDOC_";
const LOCAL_CANDIDATES: [&str; 3] = ["refdoc.toml", "refdoc.yaml", "refdoc.json"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub scanner: ScannerConfig,
    pub compiler: CompilerConfig,
    pub release_notes: ReleaseNotesConfig,
    pub patch: PatchConfig,
    pub transform: TransformConfig,
    pub reference: ReferenceConfig,
    pub environment: EnvironmentConfig,
}

/// Filesystem layout. Everything except `source_dir` and `output_dir` is
/// relative to `source_dir`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Compiler input directory (hand-authored pages, `conf.py`, templates).
    pub source_dir: PathBuf,
    /// Generated verbose/external reference documents.
    pub verbose_dir: PathBuf,
    /// Generated curated reference documents.
    pub curated_dir: PathBuf,
    /// Compiled site.
    pub output_dir: PathBuf,
    /// Ephemeral changelog document.
    pub release_notes: PathBuf,
    /// Compiler cache kept between incremental builds.
    pub build_cache: PathBuf,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("sphinx"),
            verbose_dir: PathBuf::from("ref-ext"),
            curated_dir: PathBuf::from("ref"),
            output_dir: PathBuf::from("docs"),
            release_notes: PathBuf::from("release-notes.rst"),
            build_cache: PathBuf::from("_build"),
        }
    }
}
impl Paths {
    pub fn verbose(&self) -> PathBuf {
        self.source_dir.join(&self.verbose_dir)
    }

    pub fn curated(&self) -> PathBuf {
        self.source_dir.join(&self.curated_dir)
    }

    pub fn release_notes(&self) -> PathBuf {
        self.source_dir.join(&self.release_notes)
    }

    pub fn build_cache(&self) -> PathBuf {
        self.source_dir.join(&self.build_cache)
    }

    /// Every directory or file that `--clean` is allowed to remove.
    pub fn generated(&self) -> Vec<PathBuf> {
        vec![self.verbose(), self.curated(), self.build_cache(), self.output_dir.clone(), self.release_notes()]
    }
}

/// A source tree handed to the scanner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTree {
    pub root: PathBuf,
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
}
impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), exclude: Vec::new() }
    }

    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude.push(path.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub program: String,
    pub trees: Vec<SourceTree>,
    /// Inclusion flags the scanner attaches to every generated directive.
    pub options: Vec<String>,
}
impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            program: "sphinx-apidoc".to_string(),
            trees: vec![
                // Migrations are generated code, not authored API.
                SourceTree::new("integreat_cms").excluding("integreat_cms/cms/migrations"),
                SourceTree::new("tests"),
            ],
            options: ["members", "undoc-members", "inherited-members", "show-inheritance"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub program: String,
    pub jobs: Jobs,
    /// Treat every compiler warning as a build failure.
    pub strict: bool,
}
impl Default for CompilerConfig {
    fn default() -> Self {
        Self { program: "sphinx-build".to_string(), jobs: Jobs::Auto, strict: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseNotesConfig {
    /// Command (program followed by arguments) printing the changelog body to
    /// stdout. Without one, no release notes are injected.
    pub command: Option<Vec<String>>,
    pub title: String,
}
impl Default for ReleaseNotesConfig {
    fn default() -> Self {
        Self { command: None, title: "Release Notes".to_string() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchEngineKind {
    /// Pure-Rust unified diff application.
    #[default]
    Builtin,
    /// GNU `patch` found on the `PATH`.
    Gnu,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchPhase {
    /// Vendor template: restored from its baseline, patched before scanning.
    #[default]
    Template,
    /// Generated reference document: patched in place after generation.
    Reference,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchEntry {
    pub target: PathBuf,
    pub diff: PathBuf,
    /// Vendor-original copy of `target`, restored before every application.
    #[serde(default)]
    pub baseline: Option<PathBuf>,
    #[serde(default)]
    pub phase: PatchPhase,
    /// Print the patched content to stdout once applied.
    #[serde(default)]
    pub echo: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub engine: PatchEngineKind,
    pub patches: Vec<PatchEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Whole-word replacements applied to every reference title.
    pub acronyms: BTreeMap<String, String>,
}
impl Default for TransformConfig {
    fn default() -> Self {
        let acronyms = [
            ("Api", "API"),
            ("Cms", "CMS"),
            ("Csv", "CSV"),
            ("Dpa", "DPA"),
            ("Faq", "FAQ"),
            ("Gvz", "GVZ"),
            ("Html", "HTML"),
            ("Json", "JSON"),
            ("Mt", "MT"),
            ("Nlp", "NLP"),
            ("Pdf", "PDF"),
            ("Poi", "POI"),
            ("Rss", "RSS"),
            ("Sbs", "SBS"),
            ("Seo", "SEO"),
            ("Url", "URL"),
            ("Xliff", "XLIFF"),
        ];
        Self { acronyms: acronyms.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Modules documented with their private members in the verbose set.
    pub private_members: Vec<String>,
}
impl Default for ReferenceConfig {
    fn default() -> Self {
        Self { private_members: vec!["integreat_cms.sitemap.sitemaps".to_string()] }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Environment variable whose presence marks an automated CI run.
    pub ci_variable: String,
}
impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self { ci_variable: "CI".to_string() }
    }
}
impl EnvironmentConfig {
    /// Reads the CI indicator from the process environment. Empty values,
    /// `0` and `false` count as unset.
    pub fn is_ci(&self) -> bool {
        std::env::var(&self.ci_variable).is_ok_and(|v| is_truthy(&v))
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

impl Config {
    /// Loads defaults, the located configuration file and `REFDOC_*`
    /// environment overrides, then validates the result.
    #[instrument(skip_all, fields(explicit = ?explicit))]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = Self::locate(explicit)? {
            tracing::debug!(file = %file.display(), "Merging configuration file");
            figment = match file.extension().and_then(|e| e.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(&file)),
                Some("json") => figment.merge(Json::file(&file)),
                _ => figment.merge(Toml::file(&file)),
            };
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates a configuration from an assembled [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Finds the configuration file to merge.
    ///
    /// An explicit path must exist. Otherwise the working directory is
    /// searched for `refdoc.{toml,yaml,json}`, then the platform configuration
    /// directory for `config.toml`. No file at all is fine: defaults apply.
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            return Ok(Some(path.to_path_buf()));
        }
        if let Some(local) = LOCAL_CANDIDATES.iter().map(PathBuf::from).find(|p| p.is_file()) {
            return Ok(Some(local));
        }
        Ok(ProjectDirs::from("", "", "refdoc")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .filter(|p| p.is_file()))
    }

    fn validate(&self) -> Result<()> {
        if self.scanner.trees.is_empty() {
            exn::bail!(ErrorKind::Invalid("no source trees configured for scanning".to_string()));
        }
        if self.scanner.program.trim().is_empty() || self.compiler.program.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("scanner and compiler programs must be named".to_string()));
        }
        if self.paths.verbose() == self.paths.curated() {
            exn::bail!(ErrorKind::Invalid(format!(
                "verbose and curated references share a directory: {}",
                self.paths.verbose().display()
            )));
        }
        if let Some(command) = &self.release_notes.command
            && command.is_empty()
        {
            exn::bail!(ErrorKind::Invalid("release notes command is empty".to_string()));
        }
        if self.environment.ci_variable.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("CI indicator variable name is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn with_toml(toml: &str) -> Result<Config> {
        Config::from_figment(Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml)))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = with_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.paths.verbose(), Path::new("sphinx/ref-ext"));
        assert_eq!(config.paths.curated(), Path::new("sphinx/ref"));
        assert_eq!(config.compiler.jobs, Jobs::Auto);
        assert!(config.compiler.strict);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = with_toml(
            r#"
            [paths]
            output_dir = "site"

            [compiler]
            jobs = 4

            [[patch.patches]]
            target = "sphinx/templates/footer.html"
            diff = "sphinx/patches/footer.diff"
            baseline = "vendor/footer.html"
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.output_dir, Path::new("site"));
        // Untouched siblings keep their defaults.
        assert_eq!(config.paths.source_dir, Path::new("sphinx"));
        assert_eq!(config.compiler.jobs, Jobs::Count(std::num::NonZeroUsize::new(4).unwrap()));
        assert_eq!(config.patch.patches.len(), 1);
        assert_eq!(config.patch.patches[0].phase, PatchPhase::Template);
        assert!(!config.patch.patches[0].echo);
    }

    #[test]
    fn test_acronyms_extend_defaults() {
        let config = with_toml("[transform.acronyms]\nSql = \"SQL\"\n").unwrap();
        assert_eq!(config.transform.acronyms.get("Sql").map(String::as_str), Some("SQL"));
        assert_eq!(config.transform.acronyms.get("Api").map(String::as_str), Some("API"));
    }

    #[rstest]
    #[case("[scanner]\ntrees = []\n")]
    #[case("[paths]\ncurated_dir = \"ref-ext\"\n")]
    #[case("[release_notes]\ncommand = []\n")]
    #[case("[compiler]\njobs = 0\n")]
    #[case("[compiler]\njobs = \"lots\"\n")]
    #[case("[environment]\nci_variable = \" \"\n")]
    fn test_rejects_invalid(#[case] toml: &str) {
        assert!(with_toml(toml).is_err());
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let err = Config::locate(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "paths:\n  output_dir: public\nenvironment:\n  ci_variable: CIRCLECI").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.paths.output_dir, Path::new("public"));
        assert_eq!(config.environment.ci_variable, "CIRCLECI");
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("yes", true)]
    #[case("", false)]
    #[case("0", false)]
    #[case("FALSE", false)]
    fn test_ci_truthiness(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_truthy(value), expected);
    }
}
