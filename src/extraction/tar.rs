use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::format::{ArchiveFormat, TarCompression};
use super::shared::{
    ExtractionPlan, PlannedEntry, corrupt, sanitize_entry_path, warn_unsafe_entry, write_entry,
};

/// Archive extractor for tar files, plain or wrapped in gzip/bzip2/xz
pub struct TarExtractor;

impl TarExtractor {
    fn open(
        archive_path: &Path,
        compression: TarCompression,
    ) -> Result<tar::Archive<Box<dyn Read>>> {
        let file = BufReader::new(File::open(archive_path)?);
        let reader: Box<dyn Read> = match compression {
            TarCompression::None => Box::new(file),
            TarCompression::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
            TarCompression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
            TarCompression::Xz => Box::new(xz2::read::XzDecoder::new(file)),
        };
        Ok(tar::Archive::new(reader))
    }

    /// Walk the tar headers once to learn entry names and sizes
    ///
    /// Compressed tars have no index, so this decodes the whole stream without
    /// writing anything.
    pub fn plan(archive_path: &Path, compression: TarCompression) -> Result<ExtractionPlan> {
        let format = ArchiveFormat::Tar(compression);
        let mut archive = Self::open(archive_path, compression)?;
        let mut entries = Vec::new();

        for entry in archive.entries().map_err(|e| corrupt(archive_path, format, e))? {
            let entry = entry.map_err(|e| corrupt(archive_path, format, e))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = entry.path().map_err(|e| corrupt(archive_path, format, e))?;
            let Some(relative_path) = sanitize_entry_path(&path) else {
                continue;
            };
            entries.push(PlannedEntry {
                relative_path,
                size: entry.size(),
            });
        }

        Ok(ExtractionPlan {
            entries,
            sizes_known: true,
        })
    }

    /// Extract every regular file into `dest_path`, overwriting existing files
    ///
    /// Links, devices and other special entries are skipped.
    pub fn extract(
        archive_path: &Path,
        compression: TarCompression,
        dest_path: &Path,
    ) -> Result<Vec<PathBuf>> {
        let format = ArchiveFormat::Tar(compression);
        debug!(?archive_path, ?dest_path, %format, "extracting tar archive");

        let mut archive = Self::open(archive_path, compression)?;
        let mut extracted_files = Vec::new();

        for entry in archive.entries().map_err(|e| corrupt(archive_path, format, e))? {
            let mut entry = entry.map_err(|e| corrupt(archive_path, format, e))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let path = entry
                .path()
                .map_err(|e| corrupt(archive_path, format, e))?
                .into_owned();
            let Some(relative_path) = sanitize_entry_path(&path) else {
                warn_unsafe_entry(archive_path, &path.to_string_lossy());
                continue;
            };

            let file_path = dest_path.join(relative_path);
            write_entry(&mut entry, &file_path)?;
            extracted_files.push(file_path);
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            %format,
            "tar extraction successful"
        );

        Ok(extracted_files)
    }
}
