//! Generation stamps.
//!
//! The verbose reference directory records which scanner setup produced it.
//! An incremental run against a directory produced by a different setup
//! (other trees, excludes, options or scanner version) would mix stale pages
//! into the build, so it is refused.

use crate::error::{ErrorKind, Result};
use refdoc_config::ScannerConfig;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

pub const STAMP_FILE: &str = ".refdoc-stamp";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stamp(String);
impl Stamp {
    pub fn compute(scanner: &ScannerConfig, version: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        // Length-prefixed fields, so no two layouts hash the same input.
        let mut field = |value: &str| {
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        };
        field(version);
        for tree in &scanner.trees {
            field(&tree.root.to_string_lossy());
            for exclude in &tree.exclude {
                field(&exclude.to_string_lossy());
            }
            field("");
        }
        for option in &scanner.options {
            field(option);
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(STAMP_FILE)
    }

    /// Reads the stamp stored in `dir`, if any.
    pub fn read(dir: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(Self::path(dir)) {
            Ok(stamp) => Ok(Some(Self(stamp.trim().to_string()))),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(None),
            Err(err) => exn::bail!(ErrorKind::Io(err)),
        }
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(ErrorKind::Io)?;
        fs::write(Self::path(dir), format!("{}\n", self.0)).map_err(ErrorKind::Io)?;
        Ok(())
    }

    /// Fails if `dir` carries a stamp other than `self`. Unstamped
    /// directories are accepted.
    pub fn verify(&self, dir: &Path) -> Result<()> {
        match Self::read(dir)? {
            Some(stored) if &stored != self => {
                tracing::debug!(stored = %stored, expected = %self, "Generation stamp mismatch");
                exn::bail!(ErrorKind::EnvironmentMismatch(dir.to_path_buf()));
            },
            _ => Ok(()),
        }
    }
}
impl Display for Stamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_config::SourceTree;
    use std::ops::Deref;
    use tempfile::TempDir;

    #[test]
    fn test_stamp_tracks_layout() {
        let scanner = ScannerConfig::default();
        let base = Stamp::compute(&scanner, "sphinx-apidoc 7.4.7");
        assert_eq!(base, Stamp::compute(&scanner, "sphinx-apidoc 7.4.7"));
        assert_ne!(base, Stamp::compute(&scanner, "sphinx-apidoc 8.0.2"));

        let mut moved = scanner.clone();
        moved.trees.push(SourceTree::new("tools"));
        assert_ne!(base, Stamp::compute(&moved, "sphinx-apidoc 7.4.7"));

        let mut fewer = scanner;
        fewer.options.pop();
        assert_ne!(base, Stamp::compute(&fewer, "sphinx-apidoc 7.4.7"));
    }

    #[test]
    fn test_verify() {
        let dir = TempDir::new().unwrap();
        let stamp = Stamp::compute(&ScannerConfig::default(), "1");
        stamp.verify(dir.path()).unwrap();
        stamp.write(dir.path()).unwrap();
        stamp.verify(dir.path()).unwrap();

        let other = Stamp::compute(&ScannerConfig::default(), "2");
        let err = other.verify(dir.path()).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::EnvironmentMismatch(_)));
    }
}
