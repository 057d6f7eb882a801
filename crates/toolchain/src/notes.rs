use crate::ReleaseNotesSource;
use crate::error::{ErrorKind, Result};
use crate::process::{discover, run, stdout};
use exn::OptionExt;
use std::path::PathBuf;
use std::process::Command;

/// Release notes printed to stdout by an external command, already in RST.
pub struct CommandReleaseNotes {
    program: String,
    path: PathBuf,
    args: Vec<String>,
}
impl CommandReleaseNotes {
    /// `argv[0]` is resolved against `PATH`; the rest are passed verbatim.
    pub fn discover(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_raise(|| ErrorKind::ToolNotFound("release notes command".to_string()))?;
        Ok(Self { program: program.clone(), path: discover(program)?, args: args.to_vec() })
    }
}

impl ReleaseNotesSource for CommandReleaseNotes {
    fn generate(&self) -> Result<String> {
        let output = run(&self.program, Command::new(&self.path).args(&self.args))?;
        stdout(&self.program, output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::ops::Deref;

    #[test]
    fn test_generates_from_stdout() {
        let argv = ["sh", "-c", "printf '2024.1.0\\n--------\\n'"].map(String::from);
        let notes = CommandReleaseNotes::discover(&argv).unwrap();
        assert_eq!(notes.generate().unwrap(), "2024.1.0\n--------\n");
    }

    #[test]
    fn test_empty_command() {
        let err = CommandReleaseNotes::discover(&[]).err().unwrap();
        assert!(matches!(err.deref(), ErrorKind::ToolNotFound(_)));
    }
}
