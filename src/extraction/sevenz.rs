use crate::error::{Error, Result};
use sevenz_rust::{Password, SevenZReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::format::ArchiveFormat;
use super::shared::{
    ExtractionPlan, PlannedEntry, corrupt, sanitize_entry_name, warn_unsafe_entry, write_entry,
};

/// Archive extractor for 7z files
pub struct SevenZipExtractor;

impl SevenZipExtractor {
    fn open(archive_path: &Path) -> Result<SevenZReader<std::fs::File>> {
        SevenZReader::open(archive_path, Password::empty()).map_err(|e| {
            corrupt(
                archive_path,
                ArchiveFormat::SevenZip,
                format!("failed to open 7z archive: {e}"),
            )
        })
    }

    /// Read entry names and sizes from the archive header
    pub fn plan(archive_path: &Path) -> Result<ExtractionPlan> {
        let reader = Self::open(archive_path)?;

        let entries = reader
            .archive()
            .files
            .iter()
            .filter(|entry| !entry.is_directory())
            .filter_map(|entry| {
                sanitize_entry_name(entry.name()).map(|relative_path| PlannedEntry {
                    relative_path,
                    size: entry.size(),
                })
            })
            .collect();

        Ok(ExtractionPlan {
            entries,
            sizes_known: true,
        })
    }

    /// Extract every file entry into `dest_path`, overwriting existing files
    pub fn extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "extracting 7z archive");

        let mut reader = Self::open(archive_path)?;
        let mut extracted_files = Vec::new();
        // Write failures cannot be expressed as sevenz_rust errors; park them here
        // and stop iterating.
        let mut write_error: Option<Error> = None;

        reader
            .for_each_entries(|entry, data| {
                if entry.is_directory() {
                    return Ok(true);
                }

                let Some(relative_path) = sanitize_entry_name(entry.name()) else {
                    warn_unsafe_entry(archive_path, entry.name());
                    std::io::copy(data, &mut std::io::sink()).ok();
                    return Ok(true);
                };

                let file_path = dest_path.join(relative_path);
                match write_entry(data, &file_path) {
                    Ok(_) => {
                        extracted_files.push(file_path);
                        Ok(true)
                    }
                    Err(e) => {
                        write_error = Some(e);
                        Ok(false)
                    }
                }
            })
            .map_err(|e| {
                corrupt(
                    archive_path,
                    ArchiveFormat::SevenZip,
                    format!("failed to extract 7z archive: {e}"),
                )
            })?;

        if let Some(e) = write_error {
            return Err(e);
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "7z extraction successful"
        );

        Ok(extracted_files)
    }
}
