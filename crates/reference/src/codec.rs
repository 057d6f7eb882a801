//! Reading and writing reference documents as reStructuredText.
//!
//! Only the constructs the scanner emits are understood structurally: a
//! leading `:orphan:` field, section headings (title plus underline), and
//! directives with their option lists. Every other line is carried through
//! verbatim, so `parse(render(doc)) == doc` holds for any document.

use crate::consts::{ADORNMENT, DIRECTIVE_REGEX, ESCAPED_REGEX, NEEDS_ESCAPE_REGEX, OPTION_REGEX};
use crate::models::{Block, Directive, DirectiveOption, Flag, Heading, ReferenceDocument};
use std::fmt::{Display, Formatter, Result as FmtResult};

const ORPHAN_FIELD: &str = ":orphan:";
const OPTION_INDENT: &str = "   ";

impl ReferenceDocument {
    /// Parses scanner output. Never fails: unrecognised lines become
    /// [`Block::Text`].
    pub fn parse(identifier: impl Into<String>, text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut doc = ReferenceDocument::new(identifier);
        let mut i = 0;
        if lines.first().is_some_and(|l| l.trim_end() == ORPHAN_FIELD) {
            doc.orphan = true;
            i = if lines.get(1).is_some_and(|l| l.trim().is_empty()) { 2 } else { 1 };
        }
        while i < lines.len() {
            if let Some(heading) = heading_at(&lines, i) {
                doc.blocks.push(Block::Heading(heading));
                i += 2;
                continue;
            }
            if let Some(caps) = DIRECTIVE_REGEX.captures(lines[i]) {
                let mut directive = Directive::new(&caps[1], caps.get(2).map_or("", |m| m.as_str()));
                i += 1;
                while let Some(option) = lines.get(i).and_then(|l| OPTION_REGEX.captures(l)) {
                    directive.options.push(DirectiveOption {
                        flag: Flag::from(&option[1]),
                        value: option.get(2).map(|m| m.as_str().to_string()).filter(|v| !v.is_empty()),
                    });
                    i += 1;
                }
                doc.blocks.push(Block::Directive(directive));
                continue;
            }
            doc.blocks.push(Block::Text(lines[i].to_string()));
            i += 1;
        }
        doc
    }
}

/// Recognises `lines[i]` as a title underlined by `lines[i + 1]`.
fn heading_at(lines: &[&str], i: usize) -> Option<Heading> {
    let title = lines[i].trim_end();
    let underline = lines.get(i + 1)?.trim_end();
    if title.is_empty() || title.starts_with(char::is_whitespace) || title.starts_with("..") || is_adornment(title) {
        return None;
    }
    if !is_adornment(underline) {
        return None;
    }
    let adornment = underline.chars().next()?;
    Some(Heading::new(ESCAPED_REGEX.replace_all(title, "$1"), adornment))
}

fn is_adornment(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some(first) if ADORNMENT.contains(first) => line.len() >= 2 && chars.all(|c| c == first),
        _ => false,
    }
}

fn escape(title: &str) -> String {
    NEEDS_ESCAPE_REGEX.replace_all(title, r"\$1").into_owned()
}

impl Display for ReferenceDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.orphan {
            writeln!(f, "{ORPHAN_FIELD}")?;
            writeln!(f)?;
        }
        for block in &self.blocks {
            match block {
                Block::Heading(heading) => {
                    let title = escape(&heading.title);
                    // RST needs the underline to be at least as wide as the title.
                    let width = title.chars().count().max(2);
                    writeln!(f, "{title}")?;
                    writeln!(f, "{}", heading.adornment.to_string().repeat(width))?;
                },
                Block::Directive(directive) => {
                    match directive.target.is_empty() {
                        true => writeln!(f, ".. {}::", directive.name)?,
                        false => writeln!(f, ".. {}:: {}", directive.name, directive.target)?,
                    }
                    for option in &directive.options {
                        match &option.value {
                            Some(value) => writeln!(f, "{OPTION_INDENT}:{}: {value}", option.flag)?,
                            None => writeln!(f, "{OPTION_INDENT}:{}:", option.flag)?,
                        }
                    }
                },
                Block::Text(line) => writeln!(f, "{line}")?,
            }
        }
        Ok(())
    }
}
