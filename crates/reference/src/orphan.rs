use crate::set::ReferenceSet;
use tracing::instrument;

/// Marks every document in `set` as an orphan so the compiler does not warn
/// about pages outside the navigation tree. Returns how many documents were
/// newly tagged; documents already carrying the marker are left alone.
#[instrument(skip_all, fields(documents = set.len()))]
pub fn tag_orphans(set: &mut ReferenceSet) -> usize {
    let tagged = set.iter_mut().map(|doc| doc.tag_orphan()).filter(|&tagged| tagged).count();
    tracing::debug!(tagged, "Tagged orphan documents");
    tagged
}
