use crate::consts::EXTENSION;
use crate::error::{ErrorKind, Result};
use crate::models::ReferenceDocument;
use exn::OptionExt;
use std::collections::BTreeMap;
use std::collections::btree_map::{IntoValues, Values, ValuesMut};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The reference documents of one output directory, keyed and ordered by
/// identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    documents: BTreeMap<String, ReferenceDocument>,
}
impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&ReferenceDocument> {
        self.documents.get(identifier)
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut ReferenceDocument> {
        self.documents.get_mut(identifier)
    }

    /// Inserts a document, returning any previous one with the same
    /// identifier.
    pub fn insert(&mut self, doc: ReferenceDocument) -> Option<ReferenceDocument> {
        self.documents.insert(doc.identifier.clone(), doc)
    }

    pub fn iter(&self) -> Values<'_, String, ReferenceDocument> {
        self.documents.values()
    }

    pub fn iter_mut(&mut self) -> ValuesMut<'_, String, ReferenceDocument> {
        self.documents.values_mut()
    }

    /// Rebuilds the set with `f` applied to every document.
    pub fn map(self, f: impl FnMut(ReferenceDocument) -> ReferenceDocument) -> Self {
        self.into_iter().map(f).collect()
    }

    /// Where `identifier` lives below `dir`.
    pub fn path_of(dir: &Path, identifier: &str) -> PathBuf {
        dir.join(format!("{identifier}.{EXTENSION}"))
    }

    /// Reads every `.rst` file directly inside `dir`.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> Result<Self> {
        let mut set = Self::new();
        for path in reference_files(dir)? {
            let identifier = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_raise(|| ErrorKind::InvalidName(path.clone()))?;
            let text = fs::read_to_string(&path).map_err(ErrorKind::Io)?;
            set.insert(ReferenceDocument::parse(identifier, &text));
        }
        tracing::debug!(documents = set.len(), "Loaded reference documents");
        Ok(set)
    }

    /// Writes every document into `dir` and removes reference files there
    /// that no longer belong to the set.
    #[instrument(skip_all, fields(dir = %dir.display(), documents = self.len()))]
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(ErrorKind::Io)?;
        let mut written = Vec::with_capacity(self.len());
        for doc in self.iter() {
            let path = Self::path_of(dir, &doc.identifier);
            fs::write(&path, doc.to_string()).map_err(ErrorKind::Io)?;
            written.push(path);
        }
        for stale in reference_files(dir)?.into_iter().filter(|p| !written.contains(p)) {
            tracing::debug!(path = %stale.display(), "Removing stale reference document");
            fs::remove_file(&stale).map_err(ErrorKind::Io)?;
        }
        Ok(written)
    }
}

fn reference_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(ErrorKind::Io)? {
        let path = entry.map_err(ErrorKind::Io)?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl FromIterator<ReferenceDocument> for ReferenceSet {
    fn from_iter<T: IntoIterator<Item = ReferenceDocument>>(iter: T) -> Self {
        Self { documents: iter.into_iter().map(|doc| (doc.identifier.clone(), doc)).collect() }
    }
}

impl Extend<ReferenceDocument> for ReferenceSet {
    fn extend<T: IntoIterator<Item = ReferenceDocument>>(&mut self, iter: T) {
        for doc in iter {
            self.insert(doc);
        }
    }
}

impl IntoIterator for ReferenceSet {
    type Item = ReferenceDocument;
    type IntoIter = IntoValues<String, ReferenceDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_values()
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a ReferenceDocument;
    type IntoIter = Values<'a, String, ReferenceDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
