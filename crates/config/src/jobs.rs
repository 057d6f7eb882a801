use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Degree of parallelism handed to the site compiler.
///
/// Accepts `"auto"` (one job per available processing unit) or a positive
/// number, either as a string or as an integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJobs", into = "String")]
pub enum Jobs {
    #[default]
    Auto,
    Count(NonZeroUsize),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawJobs {
    Count(u64),
    Word(String),
}

impl TryFrom<RawJobs> for Jobs {
    type Error = String;
    fn try_from(raw: RawJobs) -> Result<Self, Self::Error> {
        match raw {
            RawJobs::Count(n) => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Self::Count)
                .ok_or_else(|| format!("invalid job count: {n}")),
            RawJobs::Word(s) => s.parse(),
        }
    }
}

impl FromStr for Jobs {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<NonZeroUsize>().map(Self::Count).map_err(|_| format!("invalid job count: {s}"))
    }
}

impl Display for Jobs {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

impl From<Jobs> for String {
    fn from(jobs: Jobs) -> Self {
        jobs.to_string()
    }
}
