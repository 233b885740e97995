use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::format::ArchiveFormat;
use super::shared::{
    ExtractionPlan, PlannedEntry, corrupt, sanitize_entry_path, warn_unsafe_entry,
};

/// Archive extractor for RAR files
pub struct RarExtractor;

impl RarExtractor {
    fn convert_unrar_error(e: unrar::error::UnrarError, archive_path: &Path) -> Error {
        corrupt(archive_path, ArchiveFormat::Rar, e)
    }

    /// List file headers without decompressing anything
    pub fn plan(archive_path: &Path) -> Result<ExtractionPlan> {
        let listing = unrar::Archive::new(archive_path)
            .open_for_listing()
            .map_err(|e| Self::convert_unrar_error(e, archive_path))?;

        let mut entries = Vec::new();
        for header in listing {
            let header = header.map_err(|e| Self::convert_unrar_error(e, archive_path))?;
            if header.is_directory() {
                continue;
            }
            let Some(relative_path) = sanitize_entry_path(&header.filename) else {
                continue;
            };
            entries.push(PlannedEntry {
                relative_path,
                size: header.unpacked_size,
            });
        }

        Ok(ExtractionPlan {
            entries,
            sizes_known: true,
        })
    }

    /// Extract every file entry into `dest_path`, overwriting existing files
    pub fn extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "extracting RAR archive");

        let processor = unrar::Archive::new(archive_path)
            .open_for_processing()
            .map_err(|e| Self::convert_unrar_error(e, archive_path))?;

        let mut extracted_files = Vec::new();

        // Process each entry using the state machine interface
        let mut at_header = processor;
        loop {
            let at_file = match at_header.read_header() {
                Ok(Some(entry_processor)) => entry_processor,
                Ok(None) => break,
                Err(e) => return Err(Self::convert_unrar_error(e, archive_path)),
            };

            let header = at_file.entry();
            let sanitized = sanitize_entry_path(&header.filename);

            at_header = match sanitized {
                Some(relative_path) if !header.is_directory() => {
                    let file_path = dest_path.join(relative_path);
                    if let Some(parent) = file_path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    if file_path.exists() {
                        std::fs::remove_file(&file_path)?;
                    }
                    let next = at_file
                        .extract_to(&file_path)
                        .map_err(|e| Self::convert_unrar_error(e, archive_path))?;
                    extracted_files.push(file_path);
                    next
                }
                other => {
                    if other.is_none() {
                        warn_unsafe_entry(archive_path, &header.filename.to_string_lossy());
                    }
                    at_file
                        .skip()
                        .map_err(|e| Self::convert_unrar_error(e, archive_path))?
                }
            };
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "RAR extraction successful"
        );

        Ok(extracted_files)
    }
}
