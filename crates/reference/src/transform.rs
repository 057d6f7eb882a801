//! Heading normalization.
//!
//! The scanner titles every page after its dotted module path
//! (`integreat_cms.cms.models.push_notifications package`). A [`Transformer`]
//! turns those into readable titles (`Push Notifications`) by folding an
//! ordered list of [`Rule`]s over each document. Rules are grouped into
//! [`Stage`]s and always run in stage order, whatever order they were
//! supplied in: acronym casing, for instance, only works on bare titles.

use crate::error::{ErrorKind, Result};
use crate::models::{Block, ReferenceDocument};
use crate::set::ReferenceSet;
use exn::ResultExt;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Remove structural "Submodules" / "Subpackages" headings.
    HeadingGroups,
    /// Remove trailing " module" / " package" qualifiers.
    Suffix,
    /// Reduce a dotted path to its last component, capitalized.
    PathCollapse,
    /// `push_notification` to `push Notification`.
    Separators,
    /// Canonical spelling of domain acronyms.
    Acronyms,
}
impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::HeadingGroups => "heading-groups",
            Self::Suffix => "suffix",
            Self::PathCollapse => "path-collapse",
            Self::Separators => "separators",
            Self::Acronyms => "acronyms",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Regex replacement template, `$1` style group references allowed.
    Template(String),
    /// Replaces the whole match with `prefix` followed by capture group 1
    /// with its first character upper-cased.
    Capitalize { prefix: String },
}
impl Replacement {
    fn apply(&self, pattern: &Regex, title: &str) -> String {
        match self {
            Self::Template(template) => pattern.replace_all(title, template.as_str()).into_owned(),
            Self::Capitalize { prefix } => pattern
                .replace_all(title, |caps: &Captures| {
                    let group = caps.get(1).map_or("", |m| m.as_str());
                    let mut chars = group.chars();
                    match chars.next() {
                        Some(first) => format!("{prefix}{}{}", first.to_uppercase(), chars.as_str()),
                        None => prefix.clone(),
                    }
                })
                .into_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Remove matching headings. The underline goes with the heading, and so
    /// does one blank line directly after it, so the page does not keep an
    /// empty gap where the section title was.
    Drop,
    Replace(Replacement),
}

/// A single pattern rule operating on heading titles.
#[derive(Debug, Clone)]
pub struct Rule {
    pub stage: Stage,
    pattern: Regex,
    action: Action,
}
impl Rule {
    pub fn new(stage: Stage, pattern: &str, action: Action) -> Result<Self> {
        let pattern = Regex::new(pattern).or_raise(|| ErrorKind::InvalidRule(pattern.to_string()))?;
        Ok(Self { stage, pattern, action })
    }

    pub fn drop_heading(stage: Stage, pattern: &str) -> Result<Self> {
        Self::new(stage, pattern, Action::Drop)
    }

    pub fn replace(stage: Stage, pattern: &str, template: impl Into<String>) -> Result<Self> {
        Self::new(stage, pattern, Action::Replace(Replacement::Template(template.into())))
    }

    pub fn capitalize(stage: Stage, pattern: &str, prefix: impl Into<String>) -> Result<Self> {
        Self::new(stage, pattern, Action::Replace(Replacement::Capitalize { prefix: prefix.into() }))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Applies the rule to a single title. Dropping rules leave titles alone.
    pub fn apply_title(&self, title: &str) -> String {
        match &self.action {
            Action::Drop => title.to_string(),
            Action::Replace(replacement) => replacement.apply(&self.pattern, title),
        }
    }

    fn apply(&self, mut doc: ReferenceDocument) -> ReferenceDocument {
        match &self.action {
            Action::Drop => {
                let mut blocks = Vec::with_capacity(doc.blocks.len());
                let mut dropped = false;
                for block in doc.blocks {
                    match &block {
                        Block::Heading(heading) if self.pattern.is_match(&heading.title) => {
                            dropped = true;
                            continue;
                        },
                        Block::Text(line) if dropped && line.trim().is_empty() => {},
                        _ => blocks.push(block),
                    }
                    dropped = false;
                }
                doc.blocks = blocks;
            },
            Action::Replace(replacement) => {
                for heading in doc.headings_mut() {
                    heading.title = replacement.apply(&self.pattern, &heading.title);
                }
            },
        }
        doc
    }
}

/// An ordered rule set, applied to every document as a single fold.
#[derive(Debug, Clone)]
pub struct Transformer {
    rules: Vec<Rule>,
}
impl Transformer {
    /// Rules are stably sorted by stage; within a stage, supply order wins.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(|r| r.stage);
        Self { rules }
    }

    /// The standard title pipeline followed by one whole-word rule per
    /// acronym.
    pub fn standard(acronyms: &BTreeMap<String, String>) -> Result<Self> {
        let mut rules = vec![
            Rule::drop_heading(Stage::HeadingGroups, r"^(?:Submodules|Subpackages)$")?,
            Rule::replace(Stage::Suffix, r" (?:module|package)$", "")?,
            Rule::capitalize(Stage::PathCollapse, r"^(?:\S*\.)?(\S+)$", "")?,
            Rule::capitalize(Stage::Separators, r"_(\p{Alphabetic})", " ")?,
        ];
        for (from, to) in acronyms {
            let pattern = format!(r"\b{}\b", regex::escape(from));
            // `$` in a literal replacement would read as a group reference.
            rules.push(Rule::replace(Stage::Acronyms, &pattern, to.replace('$', "$$"))?);
        }
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn transform(&self, doc: ReferenceDocument) -> ReferenceDocument {
        self.rules.iter().fold(doc, |doc, rule| rule.apply(doc))
    }

    /// Runs the title rules alone over a bare title.
    pub fn title(&self, title: &str) -> String {
        self.rules.iter().fold(title.to_string(), |title, rule| rule.apply_title(&title))
    }

    #[instrument(skip_all, fields(documents = set.len(), rules = self.rules.len()))]
    pub fn transform_set(&self, set: ReferenceSet) -> ReferenceSet {
        set.map(|doc| self.transform(doc))
    }
}
