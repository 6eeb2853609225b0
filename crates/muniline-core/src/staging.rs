//! Scoped staging area for downloads and archive extraction.
//!
//! One staging area exists per extraction run. The whole tree is removed
//! when the value is dropped, on success and on failure alike.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Disposable filesystem scope holding `raw/` downloads and `extracted/`
/// archive contents for one run.
pub struct StagingArea {
    root: TempDir,
    raw: PathBuf,
    extracted: PathBuf,
}

impl StagingArea {
    pub fn new() -> io::Result<Self> {
        let root = tempfile::Builder::new().prefix("muniline-").tempdir()?;
        let raw = root.path().join("raw");
        let extracted = root.path().join("extracted");
        fs::create_dir_all(&raw)?;
        fs::create_dir_all(&extracted)?;
        Ok(Self {
            root,
            raw,
            extracted,
        })
    }

    /// Directory documents are downloaded into.
    pub fn raw_dir(&self) -> &Path {
        &self.raw
    }

    /// Directory archives are unpacked into, one subdirectory per archive.
    pub fn extracted_dir(&self) -> &Path {
        &self.extracted
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_raw_and_extracted() {
        let staging = StagingArea::new().unwrap();
        assert!(staging.raw_dir().is_dir());
        assert!(staging.extracted_dir().is_dir());
        assert!(staging.raw_dir().starts_with(staging.path()));
    }

    #[test]
    fn removed_on_drop() {
        let staging = StagingArea::new().unwrap();
        let root = staging.path().to_path_buf();
        std::fs::write(staging.raw_dir().join("leftover.zip"), b"data").unwrap();
        drop(staging);
        assert!(!root.exists());
    }
}
