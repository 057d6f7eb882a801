use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// `@@ -12,7 +12,8 @@ optional section heading`
regex!(HUNK_HEADER_REGEX, r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@");
