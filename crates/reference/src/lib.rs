//! Reference documents produced by the source scanner.
//!
//! Scanner output is parsed into [`ReferenceDocument`]s (see
//! [`ReferenceDocument::parse`] and its `Display` impl), normalized by a
//! [`Transformer`], split into verbose and curated [`Variants`], and tagged
//! as orphans before being written back out as a [`ReferenceSet`].

mod codec;
mod consts;
pub mod error;
#[cfg(test)]
mod fixtures;
pub mod models;
mod orphan;
mod set;
mod transform;
mod variant;

pub use crate::models::{Block, Directive, DirectiveOption, Flag, Heading, ReferenceDocument};
pub use crate::orphan::tag_orphans;
pub use crate::set::ReferenceSet;
pub use crate::transform::{Action, Replacement, Rule, Stage, Transformer};
pub use crate::variant::{VariantSplitter, Variants};
