use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Resolves `program` against `PATH` (or as a path, if it contains a
/// separator).
pub(crate) fn discover(program: &str) -> Result<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            tracing::trace!(program, path = %path.display(), "Discovered executable");
            Ok(path)
        },
        Err(_) => {
            tracing::info!(program, "Executable not found in PATH");
            exn::bail!(ErrorKind::ToolNotFound(program.to_string()));
        },
    }
}

/// Runs `command` to completion with captured output. A non-zero exit is an
/// error carrying the tool's stderr verbatim.
pub(crate) fn run(program: &str, command: &mut Command) -> Result<Output> {
    tracing::debug!(?command, "Running {program}");
    let output = command
        .stdin(Stdio::null())
        .output()
        .or_raise(|| ErrorKind::Spawn(program.to_string()))?;
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        tracing::trace!(program, "{line}");
    }
    if !output.status.success() {
        exn::bail!(ErrorKind::ToolFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }
    Ok(output)
}

pub(crate) fn stdout(program: &str, output: Output) -> Result<String> {
    String::from_utf8(output.stdout).or_raise(|| ErrorKind::Encoding(program.to_string()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::ops::Deref;

    #[test]
    fn test_failure_carries_stderr() {
        let err = run("sh", Command::new("sh").args(["-c", "echo 'module not found' >&2; exit 3"])).unwrap_err();
        match err.deref() {
            ErrorKind::ToolFailed { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "module not found");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_success_returns_stdout() {
        let output = run("sh", Command::new("sh").args(["-c", "echo 7.4.7"])).unwrap();
        assert_eq!(stdout("sh", output).unwrap(), "7.4.7\n");
    }

    #[test]
    fn test_missing_executable() {
        let err = discover("refdoc-definitely-not-installed").unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::ToolNotFound(_)));
    }
}
