use refdoc_config::EnvironmentConfig;

/// What the operator asked for on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Invocation {
    /// Incremental build, keeping previous output and compiler caches.
    #[default]
    Build,
    /// Purge everything generated, then build from scratch.
    CleanBuild,
    /// Purge everything generated and stop.
    CleanOnly,
}

/// The run's mode, computed once at start-up and handed to every stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildMode {
    pub invocation: Invocation,
    /// Running under automated CI.
    pub ci: bool,
}
impl BuildMode {
    pub fn new(invocation: Invocation, ci: bool) -> Self {
        Self { invocation, ci }
    }

    /// Reads the CI indicator from the environment, once.
    pub fn detect(invocation: Invocation, environment: &EnvironmentConfig) -> Self {
        Self::new(invocation, environment.is_ci())
    }

    /// Whether stale generated files are removed before anything else runs.
    pub fn is_clean(&self) -> bool {
        self.invocation != Invocation::Build
    }

    /// Whether the run continues past purging.
    pub fn builds(&self) -> bool {
        self.invocation != Invocation::CleanOnly
    }

    /// Whether compiler caches and build metadata are stripped from the
    /// output once the build succeeds.
    pub fn strips_intermediates(&self) -> bool {
        self.ci
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Invocation::Build, false, true)]
    #[case(Invocation::CleanBuild, true, true)]
    #[case(Invocation::CleanOnly, true, false)]
    fn test_invocation(#[case] invocation: Invocation, #[case] clean: bool, #[case] builds: bool) {
        let mode = BuildMode::new(invocation, false);
        assert_eq!(mode.is_clean(), clean);
        assert_eq!(mode.builds(), builds);
        assert!(!mode.strips_intermediates());
    }
}
