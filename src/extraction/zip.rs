use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::format::ArchiveFormat;
use super::shared::{
    ExtractionPlan, PlannedEntry, corrupt, sanitize_entry_path, warn_unsafe_entry, write_entry,
};

/// Archive extractor for ZIP files
pub struct ZipExtractor;

impl ZipExtractor {
    fn open(archive_path: &Path) -> Result<zip::ZipArchive<std::fs::File>> {
        let file = std::fs::File::open(archive_path).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to open ZIP archive {}: {}",
                archive_path.display(),
                e
            )))
        })?;

        zip::ZipArchive::new(file)
            .map_err(|e| corrupt(archive_path, ArchiveFormat::Zip, format!("failed to read ZIP archive: {e}")))
    }

    /// Read entry names and uncompressed sizes from the central directory
    pub fn plan(archive_path: &Path) -> Result<ExtractionPlan> {
        let mut archive = Self::open(archive_path)?;
        let mut entries = Vec::new();

        for i in 0..archive.len() {
            let file = archive.by_index(i).map_err(|e| {
                corrupt(archive_path, ArchiveFormat::Zip, format!("failed to read ZIP entry: {e}"))
            })?;

            if file.is_dir() {
                continue;
            }

            let Some(relative_path) = file.enclosed_name().and_then(sanitize_entry_path) else {
                continue;
            };

            entries.push(PlannedEntry {
                relative_path,
                size: file.size(),
            });
        }

        Ok(ExtractionPlan {
            entries,
            sizes_known: true,
        })
    }

    /// Extract every file entry into `dest_path`, overwriting existing files
    pub fn extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "extracting ZIP archive");

        let mut archive = Self::open(archive_path)?;
        let mut extracted_files = Vec::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| {
                corrupt(archive_path, ArchiveFormat::Zip, format!("failed to read ZIP entry: {e}"))
            })?;

            if file.is_dir() {
                continue;
            }

            let Some(relative_path) = file.enclosed_name().and_then(sanitize_entry_path) else {
                warn_unsafe_entry(archive_path, file.name());
                continue;
            };

            let file_path = dest_path.join(relative_path);
            write_entry(&mut file, &file_path)?;
            extracted_files.push(file_path);
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "ZIP extraction successful"
        );

        Ok(extracted_files)
    }
}
