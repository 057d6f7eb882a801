use crate::error::{ErrorKind, Result};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Removes every path in `paths`, directories recursively. Paths that do not
/// exist are skipped. Returns the paths that were actually removed.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn purge(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in paths {
        if remove(path)? {
            tracing::info!(path = %path.display(), "Removed generated files");
            removed.push(path.clone());
        }
    }
    Ok(removed)
}

/// Removes a single file or directory tree, returning `false` if there was
/// nothing to remove.
pub(crate) fn remove(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(false),
        Err(err) => exn::bail!(ErrorKind::Io(err)),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(ErrorKind::Io)?;
    } else {
        fs::remove_file(path).map_err(ErrorKind::Io)?;
    }
    Ok(true)
}
