use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A directive option controlling which members are documented
/// (inclusion flags) or how the result is indexed (visibility flags).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    Members,
    /// Include members without a docstring.
    UndocumentedMembers,
    /// Include members inherited from base classes.
    InheritedMembers,
    /// Show base classes below the class signature.
    ShowInheritance,
    /// Include underscore-prefixed members.
    PrivateMembers,
    /// Keep the documented objects out of the search index and cross-reference
    /// targets; used for secondary copies of content documented elsewhere.
    NoIndex,
    Other(String),
}
impl Flag {
    pub fn as_str(&self) -> &str {
        match self {
            Flag::Members => "members",
            Flag::UndocumentedMembers => "undoc-members",
            Flag::InheritedMembers => "inherited-members",
            Flag::ShowInheritance => "show-inheritance",
            Flag::PrivateMembers => "private-members",
            Flag::NoIndex => "noindex",
            Flag::Other(name) => name,
        }
    }
}
impl From<&str> for Flag {
    fn from(s: &str) -> Self {
        match s.trim() {
            "members" => Self::Members,
            "undoc-members" => Self::UndocumentedMembers,
            "inherited-members" => Self::InheritedMembers,
            "show-inheritance" => Self::ShowInheritance,
            "private-members" => Self::PrivateMembers,
            // Sphinx accepts both spellings.
            "noindex" | "no-index" => Self::NoIndex,
            other => Self::Other(other.to_string()),
        }
    }
}
impl FromStr for Flag {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}
impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("members", Flag::Members)]
    #[case("undoc-members", Flag::UndocumentedMembers)]
    #[case("inherited-members", Flag::InheritedMembers)]
    #[case("show-inheritance", Flag::ShowInheritance)]
    #[case("private-members", Flag::PrivateMembers)]
    #[case("noindex", Flag::NoIndex)]
    #[case("no-index", Flag::NoIndex)]
    #[case("member-order", Flag::Other("member-order".to_string()))]
    fn test_parse(#[case] input: &str, #[case] expected: Flag) {
        assert_eq!(Flag::from(input), expected);
    }

    #[test]
    fn test_known_flags_display_canonically() {
        assert_eq!(Flag::from("no-index").to_string(), "noindex");
        assert_eq!(Flag::UndocumentedMembers.to_string(), "undoc-members");
    }
}
