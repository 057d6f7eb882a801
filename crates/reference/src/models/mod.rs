mod directive;
mod document;
mod flag;

pub use self::directive::{Directive, DirectiveOption};
pub use self::document::{Block, Heading, ReferenceDocument};
pub use self::flag::Flag;
