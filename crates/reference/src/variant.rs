use crate::models::{Flag, ReferenceDocument};
use crate::set::ReferenceSet;
use std::collections::BTreeSet;
use tracing::instrument;

/// The two reference trees built from one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variants {
    /// Every member, undocumented and inherited ones included.
    pub verbose: ReferenceSet,
    /// Public, non-inherited members only; never indexed for search.
    pub curated: ReferenceSet,
}

/// Derives the curated reference set from the verbose one.
#[derive(Debug, Clone, Default)]
pub struct VariantSplitter {
    private_members: BTreeSet<String>,
}
impl VariantSplitter {
    /// `private_members` lists modules whose verbose page also documents
    /// private members.
    pub fn new<I, S>(private_members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { private_members: private_members.into_iter().map(Into::into).collect() }
    }

    #[instrument(skip_all, fields(documents = verbose.len()))]
    pub fn split(&self, verbose: ReferenceSet) -> Variants {
        let curated = verbose.clone().map(curate);
        let verbose = verbose.map(|doc| self.expose_private(doc));
        tracing::debug!(curated = curated.len(), "Derived curated reference set");
        Variants { verbose, curated }
    }

    fn expose_private(&self, mut doc: ReferenceDocument) -> ReferenceDocument {
        for directive in doc.directives_mut() {
            if self.private_members.contains(&directive.target) && directive.ensure(Flag::PrivateMembers) {
                tracing::debug!(module = %directive.target, "Documenting private members");
            }
        }
        doc
    }
}

fn curate(mut doc: ReferenceDocument) -> ReferenceDocument {
    for directive in doc.directives_mut() {
        directive.remove(&Flag::UndocumentedMembers);
        directive.remove(&Flag::InheritedMembers);
        directive.insert_after(&Flag::ShowInheritance, Flag::NoIndex);
    }
    doc
}
