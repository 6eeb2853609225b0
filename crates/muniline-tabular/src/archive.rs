//! Archive extraction with a path-containment boundary.
//!
//! Every entry is written strictly inside the destination directory.
//! Entries whose resolved path would land anywhere else are dropped
//! without a trace; this is a security boundary, not a parse error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

/// Error opening or reading an archive; the caller skips the document.
#[derive(Debug)]
pub enum ArchiveError {
    /// Container is corrupt or not a zip file
    Zip(String),
    Io(std::io::Error),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip(e) => write!(f, "zip error: {e}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

fn has_allowed_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| allowed.contains(&e.as_str()))
}

/// Unpack `zip_path` into `<extracted_dir>/<archive stem>/`.
///
/// Directory entries are skipped, as are entries whose extension is not
/// in `allowed_extensions`. An entry that would resolve outside the
/// destination directory is silently dropped. Returns the paths of the
/// files written, in archive order.
pub fn extract_zip(
    zip_path: &Path,
    extracted_dir: &Path,
    allowed_extensions: &[&str],
    overwrite: bool,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let stem = zip_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let destination = extracted_dir.join(stem);

    if destination.exists() && overwrite {
        let _ = fs::remove_dir_all(&destination);
    }
    fs::create_dir_all(&destination)?;

    let file = fs::File::open(zip_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ArchiveError::Zip(e.to_string()))?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ArchiveError::Zip(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }

        // enclosed_name rejects absolute paths and `..` components; the
        // containment check below is the boundary itself.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        if !has_allowed_extension(&relative, allowed_extensions) {
            continue;
        }

        let target = destination.join(&relative);
        if !target.starts_with(&destination) {
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        extracted.push(target);
    }

    Ok(extracted)
}
