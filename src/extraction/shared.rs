use crate::error::{ArchiveError, Error, Result};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use super::format::ArchiveFormat;

/// One non-directory entry an extractor is going to write
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Destination relative to the extraction directory (sanitized)
    pub relative_path: PathBuf,
    /// Uncompressed size in bytes (0 when unknown)
    pub size: u64,
}

/// Entries an archive will produce, read from its metadata before any output I/O
#[derive(Clone, Debug, Default)]
pub struct ExtractionPlan {
    /// Non-directory entries in archive order
    pub entries: Vec<PlannedEntry>,
    /// Whether sizes come from archive metadata (false for single streams)
    pub sizes_known: bool,
}

impl ExtractionPlan {
    /// Sum of uncompressed entry sizes
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Absolute output paths paired with their expected sizes
    pub fn outputs(&self, dest_path: &Path) -> Vec<(PathBuf, u64)> {
        self.entries
            .iter()
            .map(|e| (dest_path.join(&e.relative_path), e.size))
            .collect()
    }
}

/// Keep only normal path components so entries cannot escape the destination
///
/// Returns `None` for names with nothing left (e.g. `"../.."`).
pub(crate) fn sanitize_entry_path(name: &Path) -> Option<PathBuf> {
    let sanitized = name
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect::<PathBuf>();

    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Same as [`sanitize_entry_path`] for archive-internal string names, which may
/// use either separator
pub(crate) fn sanitize_entry_name(name: &str) -> Option<PathBuf> {
    sanitize_entry_path(Path::new(&name.replace('\\', "/")))
}

/// Write one entry to `file_path`, creating parent directories and replacing
/// any existing file
pub(crate) fn write_entry(reader: &mut dyn Read, file_path: &Path) -> Result<u64> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to create parent directories for {}: {}",
                file_path.display(),
                e
            )))
        })?;
    }

    let mut outfile = std::fs::File::create(file_path).map_err(|e| {
        Error::Io(std::io::Error::other(format!(
            "failed to create output file {}: {}",
            file_path.display(),
            e
        )))
    })?;

    std::io::copy(reader, &mut outfile).map_err(|e| {
        Error::Io(std::io::Error::other(format!(
            "failed to write {}: {}",
            file_path.display(),
            e
        )))
    })
}

/// Build a corrupt-archive error for `format`
pub(crate) fn corrupt(
    archive_path: &Path,
    format: ArchiveFormat,
    reason: impl std::fmt::Display,
) -> Error {
    Error::Archive(ArchiveError::Corrupt {
        archive: archive_path.to_path_buf(),
        format: format.name().to_string(),
        reason: reason.to_string(),
    })
}

/// Log and skip an entry whose name has no safe components
pub(crate) fn warn_unsafe_entry(archive_path: &Path, name: &str) {
    warn!(?archive_path, entry = name, "skipping entry with unsafe path");
}
