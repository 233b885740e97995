use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::format::{ArchiveFormat, StreamCodec};
use super::shared::{ExtractionPlan, PlannedEntry, corrupt, sanitize_entry_path, write_entry};

/// Extractor for single compressed streams (`.gz`, `.bz2`, `.xz`, `.lzma`)
///
/// These carry one file and no reliable size header, so the plan has a single
/// entry of unknown size named after the archive minus its compression suffix.
pub struct StreamExtractor;

impl StreamExtractor {
    fn output_name(archive_path: &Path) -> Option<PathBuf> {
        let stem = archive_path.file_stem()?;
        sanitize_entry_path(Path::new(stem))
    }

    fn decoder(file: BufReader<File>, codec: StreamCodec) -> Result<Box<dyn Read>> {
        Ok(match codec {
            StreamCodec::Gzip => Box::new(flate2::read::MultiGzDecoder::new(file)),
            StreamCodec::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(file)),
            StreamCodec::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(file)),
            StreamCodec::Lzma => {
                let stream = xz2::stream::Stream::new_lzma_decoder(u64::MAX)
                    .map_err(std::io::Error::from)?;
                Box::new(xz2::read::XzDecoder::new_stream(file, stream))
            }
        })
    }

    /// Single-entry plan; the size stays 0 because it is unknown up front
    pub fn plan(archive_path: &Path, codec: StreamCodec) -> Result<ExtractionPlan> {
        let relative_path = Self::output_name(archive_path).ok_or_else(|| {
            corrupt(
                archive_path,
                ArchiveFormat::Stream(codec),
                "archive name has no usable stem",
            )
        })?;

        Ok(ExtractionPlan {
            entries: vec![PlannedEntry {
                relative_path,
                size: 0,
            }],
            sizes_known: false,
        })
    }

    /// Decode the stream into `dest_path/<archive stem>`, overwriting any existing file
    pub fn extract(
        archive_path: &Path,
        codec: StreamCodec,
        dest_path: &Path,
    ) -> Result<Vec<PathBuf>> {
        let format = ArchiveFormat::Stream(codec);
        debug!(?archive_path, ?dest_path, %format, "decompressing single stream");

        let relative_path = Self::output_name(archive_path)
            .ok_or_else(|| corrupt(archive_path, format, "archive name has no usable stem"))?;
        let file_path = dest_path.join(relative_path);

        let file = BufReader::new(File::open(archive_path)?);
        let mut decoder = Self::decoder(file, codec)?;

        let written = write_entry(&mut decoder, &file_path).map_err(|e| {
            // Decoder failures surface here; drop the partial output
            std::fs::remove_file(&file_path).ok();
            corrupt(archive_path, format, e)
        })?;

        info!(
            ?archive_path,
            ?file_path,
            bytes = written,
            %format,
            "stream decompression successful"
        );

        Ok(vec![file_path])
    }
}
