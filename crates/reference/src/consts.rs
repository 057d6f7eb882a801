use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Characters RST accepts as section adornment.
pub(crate) const ADORNMENT: &str = "=-`:'\"~^_*+#<>.";
/// File extension of generated reference documents.
pub(crate) const EXTENSION: &str = "rst";

// `.. automodule:: integreat_cms.cms.models`
regex!(DIRECTIVE_REGEX, r"^\.\. ([A-Za-z][\w:-]*?)::(?:[ \t]+(.*?))?[ \t]*$");
// `   :show-inheritance:` or `   :private-members: _urls`
regex!(OPTION_REGEX, r"^[ \t]+:([A-Za-z][\w-]*):(?:[ \t]+(.*?))?[ \t]*$");
regex!(ESCAPED_REGEX, r"\\(.)");
regex!(NEEDS_ESCAPE_REGEX, r"([\\*_`])");
