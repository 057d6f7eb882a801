use super::{Directive, Flag};

/// A section title with its underline character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Title text with RST escapes removed.
    pub title: String,
    pub adornment: char,
}
impl Heading {
    pub fn new(title: impl Into<String>, adornment: char) -> Self {
        Self { title: title.into(), adornment }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(Heading),
    Directive(Directive),
    /// Any other line, kept verbatim.
    Text(String),
}

/// One generated reference page, e.g. `integreat_cms.cms.models.rst`.
///
/// The same identifier may exist in both the verbose and the curated set
/// with different flags; the two are independent values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDocument {
    /// Dotted module path, taken from the file name.
    pub identifier: String,
    /// Whether the page declares itself outside of every navigation tree.
    pub orphan: bool,
    pub blocks: Vec<Block>,
}
impl ReferenceDocument {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), orphan: false, blocks: Vec::new() }
    }

    pub fn with(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// The first heading's title.
    pub fn title(&self) -> Option<&str> {
        self.headings().next().map(|h| h.title.as_str())
    }

    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading(h) => Some(h),
            _ => None,
        })
    }

    pub fn headings_mut(&mut self) -> impl Iterator<Item = &mut Heading> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Heading(h) => Some(h),
            _ => None,
        })
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Directive(d) => Some(d),
            _ => None,
        })
    }

    pub fn directives_mut(&mut self) -> impl Iterator<Item = &mut Directive> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Directive(d) => Some(d),
            _ => None,
        })
    }

    /// Whether any directive in the document carries `flag`.
    pub fn carries(&self, flag: &Flag) -> bool {
        self.directives().any(|d| d.has(flag))
    }

    /// Marks the document as an orphan, returning `false` if it already was.
    pub fn tag_orphan(&mut self) -> bool {
        !std::mem::replace(&mut self.orphan, true)
    }
}
