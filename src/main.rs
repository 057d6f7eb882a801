//! `refdoc`: generate the reference documentation and build the site.
//!
//! Without flags an incremental build runs. `--clean` removes every
//! generated file first; `--make-clean` only removes them.

use clap::{ArgAction, Parser};
use refdoc_config::Config;
use refdoc_pipeline::{BuildMode, Invocation, Pipeline, Report, purge};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "refdoc", version, about = "Generate reference documentation and build the documentation site")]
struct Cli {
    /// Remove all generated files, then build from scratch
    #[arg(long, conflicts_with = "make_clean")]
    clean: bool,
    /// Remove all generated files and exit
    #[arg(long)]
    make_clean: bool,
    /// Configuration file [default: refdoc.toml, refdoc.yaml or refdoc.json
    /// in the working directory, then the user configuration directory]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// More log output (-v for debug, -vv for trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}
impl Cli {
    fn invocation(&self) -> Invocation {
        match (self.clean, self.make_clean) {
            (_, true) => Invocation::CleanOnly,
            (true, false) => Invocation::CleanBuild,
            (false, false) => Invocation::Build,
        }
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Logs go to stderr; stdout is for the operator.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:?}");
            return ExitCode::FAILURE;
        },
    };
    let mode = BuildMode::detect(cli.invocation(), &config.environment);
    tracing::debug!(?mode, "Build mode");

    let mut stdout = io::stdout().lock();
    match run(config, mode, &mut stdout) {
        Ok(report) => {
            if let Some(entry_page) = report.entry_page() {
                let _ = writeln!(stdout, "Documentation built: {}", absolute(entry_page).display());
            }
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(config: Config, mode: BuildMode, out: &mut dyn Write) -> refdoc_pipeline::error::Result<Report> {
    // Purging needs none of the external tools, so don't go looking for them.
    if !mode.builds() {
        let purged = purge(&config.paths.generated())?;
        return Ok(Report { purged, ..Report::default() });
    }
    Pipeline::discover(config, mode)?.run(out)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["refdoc"], Invocation::Build)]
    #[case(&["refdoc", "--clean"], Invocation::CleanBuild)]
    #[case(&["refdoc", "--make-clean"], Invocation::CleanOnly)]
    fn test_invocation(#[case] args: &[&str], #[case] expected: Invocation) {
        assert_eq!(Cli::try_parse_from(args).unwrap().invocation(), expected);
    }

    #[test]
    fn test_clean_flags_conflict() {
        assert!(Cli::try_parse_from(["refdoc", "--clean", "--make-clean"]).is_err());
    }

    #[rstest]
    #[case(&["refdoc"], "info")]
    #[case(&["refdoc", "-v"], "debug")]
    #[case(&["refdoc", "-vvv"], "trace")]
    fn test_log_level(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(Cli::try_parse_from(args).unwrap().log_level(), expected);
    }
}
