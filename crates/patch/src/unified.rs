//! Unified diff parsing and in-memory application.
//!
//! Only single-file diffs are supported. Hunks are matched exactly (no fuzz,
//! no whitespace folding) and in order. Each hunk is searched for from the end
//! of the previous match; when it occurs more than once, the occurrence
//! nearest to the line its header names wins, so line-number drift above a
//! hunk is tolerated.

use crate::consts::HUNK_HEADER_REGEX;
use crate::error::{ErrorKind, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Context(String),
    Removed(String),
    Added(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hunk {
    lines: Vec<Line>,
    /// Zero-based line the pre-image starts at, per the hunk header.
    old_anchor: usize,
    /// Zero-based line the post-image starts at, per the hunk header.
    new_anchor: usize,
}
impl Hunk {
    /// Lines the file contains before this hunk is applied.
    fn before(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Context(s) | Line::Removed(s) => Some(s.as_str()),
                Line::Added(_) => None,
            })
            .collect()
    }

    /// Lines the file contains after this hunk is applied.
    fn after(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Context(s) | Line::Added(s) => Some(s.as_str()),
                Line::Removed(_) => None,
            })
            .collect()
    }

    fn side(&self, side: Side) -> Vec<&str> {
        match side {
            Side::Before => self.before(),
            Side::After => self.after(),
        }
    }

    fn anchor(&self, side: Side) -> usize {
        match side {
            Side::Before => self.old_anchor,
            Side::After => self.new_anchor,
        }
    }
}

/// Converts a one-based header line into a zero-based index. An empty range
/// names the line *after which* it sits, which is already the index.
fn anchor(start: usize, count: usize) -> usize {
    match count {
        0 => start,
        _ => start.saturating_sub(1),
    }
}

/// Finds `needle` in `lines` at or after `from`, preferring the occurrence
/// nearest to `expected`. An empty needle sits at `expected`.
fn locate(lines: &[&str], needle: &[&str], from: usize, expected: usize) -> Option<usize> {
    if from > lines.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(expected.clamp(from, lines.len()));
    }
    lines[from..]
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(offset, _)| from + offset)
        .min_by_key(|start| start.abs_diff(expected))
}

/// Result of applying a [`Diff`] to some content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Application {
    /// Every hunk applied; carries the patched content.
    Fresh(String),
    /// Every hunk's post-image is present and its pre-image is gone.
    AlreadyApplied,
    /// The pre-image of the given (zero-based) hunk could not be located.
    Conflict(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Diff {
    hunks: Vec<Hunk>,
}

impl Diff {
    pub(crate) fn parse(text: &str) -> Result<Self> {
        let mut hunks = Vec::new();
        let mut headers = 0usize;
        let mut lines = text.lines().peekable();
        while let Some(line) = lines.next() {
            if line.starts_with("--- ") {
                headers += 1;
                if headers > 1 {
                    exn::bail!(ErrorKind::MalformedDiff("diff touches more than one file".to_string()));
                }
                continue;
            }
            let Some(caps) = HUNK_HEADER_REGEX.captures(line) else {
                // Preamble: `diff -u` command lines, `+++` headers, index lines.
                continue;
            };
            let number = |i: usize| caps.get(i).map_or(Ok(1), |m| m.as_str().parse::<usize>());
            let (old_start, mut old, new_start, mut new) = match (number(1), number(2), number(3), number(4)) {
                (Ok(old_start), Ok(old), Ok(new_start), Ok(new)) => (old_start, old, new_start, new),
                _ => exn::bail!(ErrorKind::MalformedDiff(format!("bad hunk header: {line}"))),
            };
            let mut hunk =
                Hunk { lines: Vec::new(), old_anchor: anchor(old_start, old), new_anchor: anchor(new_start, new) };
            while old > 0 || new > 0 {
                let Some(body) = lines.next() else {
                    exn::bail!(ErrorKind::MalformedDiff(format!("truncated hunk: {line}")));
                };
                let mut chars = body.chars();
                let kind = chars.next();
                let rest = chars.as_str();
                match kind {
                    // Editors often strip the single space of an empty context line.
                    Some(' ') | None => {
                        hunk.lines.push(Line::Context(rest.to_string()));
                        old = old.saturating_sub(1);
                        new = new.saturating_sub(1);
                    },
                    Some('-') => {
                        hunk.lines.push(Line::Removed(rest.to_string()));
                        old = old.saturating_sub(1);
                    },
                    Some('+') => {
                        hunk.lines.push(Line::Added(rest.to_string()));
                        new = new.saturating_sub(1);
                    },
                    Some('\\') => {},
                    Some(_) => exn::bail!(ErrorKind::MalformedDiff(format!("unexpected line in hunk: {body}"))),
                }
            }
            // A trailing "\ No newline at end of file" belongs to this hunk.
            while lines.peek().is_some_and(|l| l.starts_with('\\')) {
                lines.next();
            }
            hunks.push(hunk);
        }
        if hunks.is_empty() {
            exn::bail!(ErrorKind::MalformedDiff("no hunks found".to_string()));
        }
        Ok(Self { hunks })
    }

    /// Applies the diff to `content`.
    ///
    /// The already-applied check runs first: a hunk that only appends lines
    /// keeps its pre-image intact, so forward application alone would apply
    /// it a second time.
    pub(crate) fn apply(&self, content: &str) -> Application {
        let trailing_newline = content.ends_with('\n');
        let lines: Vec<&str> = content.lines().collect();

        if self.is_applied(&lines) {
            return Application::AlreadyApplied;
        }
        let positions = match self.locate_all(&lines, Side::Before) {
            Ok(positions) => positions,
            Err(hunk) => return Application::Conflict(hunk),
        };

        let mut output: Vec<&str> = Vec::with_capacity(lines.len());
        let mut cursor = 0;
        for (hunk, start) in self.hunks.iter().zip(positions) {
            output.extend_from_slice(&lines[cursor..start]);
            output.extend(hunk.after());
            cursor = start + hunk.before().len();
        }
        output.extend_from_slice(&lines[cursor..]);

        let mut patched = output.join("\n");
        if trailing_newline || lines.is_empty() {
            patched.push('\n');
        }
        Application::Fresh(patched)
    }

    /// Every post-image is present, and no hunk's pre-image survives outside
    /// the span its post-image occupies. A pre-image inside that span is what
    /// an append-only hunk leaves behind.
    fn is_applied(&self, lines: &[&str]) -> bool {
        let Ok(positions) = self.locate_all(lines, Side::After) else {
            return false;
        };
        let mut from = 0;
        self.hunks.iter().zip(positions).all(|(hunk, start)| {
            let before = hunk.before();
            let end = start + hunk.after().len();
            let applied = before.is_empty()
                || match locate(lines, &before, from, start) {
                    Some(pre) => pre >= start && pre + before.len() <= end,
                    None => true,
                };
            from = end;
            applied
        })
    }

    /// Finds one side of every hunk in order, returning start offsets or the
    /// index of the first hunk that could not be found.
    fn locate_all(&self, lines: &[&str], side: Side) -> std::result::Result<Vec<usize>, usize> {
        let mut cursor = 0;
        let mut drift = 0isize;
        let mut positions = Vec::with_capacity(self.hunks.len());
        for (index, hunk) in self.hunks.iter().enumerate() {
            let needle = hunk.side(side);
            let expected = hunk.anchor(side).saturating_add_signed(drift);
            let Some(start) = locate(lines, &needle, cursor, expected) else {
                return Err(index);
            };
            positions.push(start);
            drift = start as isize - hunk.anchor(side) as isize;
            cursor = start + needle.len();
        }
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ORIGINAL: &str = "<footer>\n  <p>Copyright</p>\n  <p>Built with Sphinx</p>\n</footer>\n";
    const PATCHED: &str =
        "<footer>\n  <p><a href=\"/imprint\">Copyright</a></p>\n  <p>Built with Sphinx</p>\n</footer>\n";
    const DIFF: &str = "\
--- a/footer.html
+++ b/footer.html
@@ -1,3 +1,3 @@
 <footer>
-  <p>Copyright</p>
+  <p><a href=\"/imprint\">Copyright</a></p>
   <p>Built with Sphinx</p>
";

    #[test]
    fn test_applies_fresh() {
        let diff = Diff::parse(DIFF).unwrap();
        assert_eq!(diff.apply(ORIGINAL), Application::Fresh(PATCHED.to_string()));
    }

    #[test]
    fn test_detects_already_applied() {
        let diff = Diff::parse(DIFF).unwrap();
        assert_eq!(diff.apply(PATCHED), Application::AlreadyApplied);
    }

    #[test]
    fn test_detects_divergence() {
        let diff = Diff::parse(DIFF).unwrap();
        let diverged = "<footer>\n  <p>(c) Someone Else</p>\n  <p>Built with Sphinx</p>\n</footer>\n";
        assert_eq!(diff.apply(diverged), Application::Conflict(0));
    }

    #[test]
    fn test_append_only_hunk_is_not_applied_twice() {
        let diff = Diff::parse("@@ -1,2 +1,3 @@\n a\n b\n+c\n").unwrap();
        let Application::Fresh(once) = diff.apply("a\nb\n") else { panic!("expected fresh application") };
        assert_eq!(once, "a\nb\nc\n");
        assert_eq!(diff.apply(&once), Application::AlreadyApplied);
    }

    #[test]
    fn test_deletion_with_surviving_context_applies() {
        let diff = Diff::parse("@@ -1,2 +1 @@\n <footer>\n-  <p>Built with Sphinx</p>\n").unwrap();
        let Application::Fresh(once) = diff.apply("<footer>\n  <p>Built with Sphinx</p>\n") else {
            panic!("expected fresh application")
        };
        assert_eq!(once, "<footer>\n");
        assert_eq!(diff.apply(&once), Application::AlreadyApplied);
    }

    #[test]
    fn test_new_text_elsewhere_is_not_applied() {
        let diff = Diff::parse("@@ -2 +2 @@\n-<li>Docs</li>\n+<li>Home</li>\n").unwrap();
        let Application::Fresh(once) = diff.apply("<li>Home</li>\n<li>Docs</li>\n") else {
            panic!("expected fresh application")
        };
        assert_eq!(once, "<li>Home</li>\n<li>Home</li>\n");
        assert_eq!(diff.apply(&once), Application::AlreadyApplied);
    }

    #[rstest]
    #[case("@@ -0,0 +1 @@\n+header\n", "header\na\nb\n")]
    #[case("@@ -1,0 +2 @@\n+middle\n", "a\nmiddle\nb\n")]
    #[case("@@ -2,0 +3 @@\n+footer\n", "a\nb\nfooter\n")]
    fn test_pure_insertion_follows_header(#[case] text: &str, #[case] expected: &str) {
        let diff = Diff::parse(text).unwrap();
        assert_eq!(diff.apply("a\nb\n"), Application::Fresh(expected.to_string()));
        assert_eq!(diff.apply(expected), Application::AlreadyApplied);
    }

    #[test]
    fn test_repeated_block_nearest_to_header_wins() {
        let diff = Diff::parse("@@ -4 +4 @@\n-x\n+y\n").unwrap();
        assert_eq!(diff.apply("x\nsep\nsep\nx\n"), Application::Fresh("x\nsep\nsep\ny\n".to_string()));
    }

    #[test]
    fn test_tolerates_line_drift() {
        let diff = Diff::parse(DIFF).unwrap();
        let shifted = format!("<!-- vendor banner -->\n\n{ORIGINAL}");
        let Application::Fresh(patched) = diff.apply(&shifted) else { panic!("expected fresh application") };
        assert!(patched.ends_with(PATCHED));
    }

    #[test]
    fn test_multiple_hunks_in_order() {
        let diff = Diff::parse("@@ -1 +1 @@\n-one\n+ONE\n@@ -3 +3 @@\n-three\n+THREE\n").unwrap();
        assert_eq!(diff.apply("one\ntwo\nthree\n"), Application::Fresh("ONE\ntwo\nTHREE\n".to_string()));
        // Half-applied content is neither side: a conflict, not a silent skip.
        assert_eq!(diff.apply("ONE\ntwo\nthree\n"), Application::Conflict(0));
    }

    #[test]
    fn test_preserves_missing_trailing_newline() {
        let diff = Diff::parse("@@ -1 +1 @@\n-old\n+new\n\\ No newline at end of file\n").unwrap();
        assert_eq!(diff.apply("old"), Application::Fresh("new".to_string()));
    }

    #[rstest]
    #[case("")]
    #[case("just some text\n")]
    #[case("@@ -1,2 +1,2 @@\n a\n")]
    #[case("@@ -1 +1 @@\n?weird\n")]
    #[case("--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n--- a/y\n+++ b/y\n@@ -1 +1 @@\n-a\n+b\n")]
    fn test_rejects_malformed(#[case] text: &str) {
        assert!(Diff::parse(text).is_err());
    }
}
