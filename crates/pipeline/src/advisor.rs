use crate::error::Result;
use crate::mode::{BuildMode, Invocation};
use std::io::Write;

const REMEDIATION: &str = "\
The documentation build failed. If the error above is unexpected, stale generated
files may be the cause; try a clean rebuild with `refdoc --clean`.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvisorState {
    Armed,
    Disarmed,
}

/// Suggests a clean rebuild when an incremental, interactive run fails.
///
/// The advisor only ever adds a message: the failure it was handed is
/// returned unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailureAdvisor {
    state: AdvisorState,
}
impl FailureAdvisor {
    /// Armed for plain incremental builds outside CI. In CI nobody reads the
    /// hint, and clean runs already are the remedy.
    pub fn for_mode(mode: &BuildMode) -> Self {
        let state = match (mode.ci, mode.invocation) {
            (false, Invocation::Build) => AdvisorState::Armed,
            _ => AdvisorState::Disarmed,
        };
        Self { state }
    }

    pub fn state(&self) -> AdvisorState {
        self.state
    }

    pub fn advise<T>(&self, result: Result<T>, out: &mut dyn Write) -> Result<T> {
        if let Err(err) = &result
            && self.state == AdvisorState::Armed
        {
            tracing::debug!(error = %err, "Suggesting a clean rebuild");
            // The hint is best effort; the original failure is what matters.
            let _ = writeln!(out, "{REMEDIATION}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(Invocation::Build, false, AdvisorState::Armed)]
    #[case(Invocation::Build, true, AdvisorState::Disarmed)]
    #[case(Invocation::CleanBuild, false, AdvisorState::Disarmed)]
    #[case(Invocation::CleanOnly, false, AdvisorState::Disarmed)]
    fn test_state(#[case] invocation: Invocation, #[case] ci: bool, #[case] expected: AdvisorState) {
        assert_eq!(FailureAdvisor::for_mode(&BuildMode::new(invocation, ci)).state(), expected);
    }

    #[test]
    fn test_failure_passes_through() {
        let advisor = FailureAdvisor::for_mode(&BuildMode::default());
        let mut out = Vec::new();
        let result: Result<()> = Err(ErrorKind::StrictBuildFailure.into());
        let err = advisor.advise(result, &mut out).unwrap_err();
        assert!(matches!(&*err, ErrorKind::StrictBuildFailure));
        assert!(String::from_utf8(out).unwrap().contains("refdoc --clean"));
    }

    #[test]
    fn test_success_is_silent() {
        let advisor = FailureAdvisor::for_mode(&BuildMode::default());
        let mut out = Vec::new();
        assert_eq!(advisor.advise(Ok(3), &mut out).unwrap(), 3);
        assert!(out.is_empty());
    }

    #[test]
    fn test_disarmed_is_silent() {
        let advisor = FailureAdvisor::for_mode(&BuildMode::new(Invocation::Build, true));
        let mut out = Vec::new();
        let result: Result<()> = Err(ErrorKind::ScanFailure.into());
        assert!(advisor.advise(result, &mut out).is_err());
        assert!(out.is_empty());
    }
}
