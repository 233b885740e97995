//! Archive classification and extraction with progress reporting
//!
//! Classification ([`is_archive`], [`ArchiveFormat::detect`]) is pure. Extraction
//! runs the format's extractor on the blocking pool while a polling task
//! estimates progress from the sizes of the files being written.

mod format;
mod progress;
mod rar;
mod sevenz;
mod shared;
mod stream;
mod tar;
mod zip;


// Re-exports
pub use format::{
    ARCHIVE_EXTENSIONS, ArchiveFormat, StreamCodec, TarCompression, archive_base_name,
    archive_extension, asset_base_name, is_archive,
};
pub use progress::{
    COMPLETE_LABEL, MAX_IN_FLIGHT_PERCENTAGE, NoProgress, ProgressEstimator, ProgressSink,
};
pub use rar::RarExtractor;
pub use sevenz::SevenZipExtractor;
pub use shared::{ExtractionPlan, PlannedEntry};
pub use stream::StreamExtractor;
pub use tar::TarExtractor;
pub use zip::ZipExtractor;

use crate::error::{ArchiveError, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

impl ArchiveFormat {
    /// Read the entries this archive will produce without writing anything
    pub fn plan(&self, archive_path: &Path) -> Result<ExtractionPlan> {
        match *self {
            Self::Zip => ZipExtractor::plan(archive_path),
            Self::Rar => RarExtractor::plan(archive_path),
            Self::SevenZip => SevenZipExtractor::plan(archive_path),
            Self::Tar(compression) => TarExtractor::plan(archive_path, compression),
            Self::Stream(codec) => StreamExtractor::plan(archive_path, codec),
        }
    }

    /// Extract synchronously into `dest_path`, returning the written files
    pub fn extract(&self, archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        match *self {
            Self::Zip => ZipExtractor::extract(archive_path, dest_path),
            Self::Rar => RarExtractor::extract(archive_path, dest_path),
            Self::SevenZip => SevenZipExtractor::extract(archive_path, dest_path),
            Self::Tar(compression) => TarExtractor::extract(archive_path, compression, dest_path),
            Self::Stream(codec) => StreamExtractor::extract(archive_path, codec, dest_path),
        }
    }
}

fn task_failed(archive_path: &Path, e: tokio::task::JoinError) -> Error {
    Error::Archive(ArchiveError::TaskFailed {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Extract an archive into `dest_path`, reporting progress to `sink`
///
/// Existing files with the same names are overwritten. `sink` receives
/// non-decreasing percentages capped at 99.98 while the extraction runs and
/// exactly one final 100% value once it has finished, successfully or not.
/// Archives that fail to open are reported before any progress is emitted.
///
/// # Errors
/// * [`ArchiveError::UnsupportedFormat`] when no extractor handles the extension
/// * [`ArchiveError::Corrupt`] when the archive cannot be read
/// * [`Error::Io`] when an output file cannot be written
///
/// # Example
/// ```no_run
/// use rom_launcher::extraction::{extract_archive, NoProgress};
/// use std::path::Path;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> rom_launcher::Result<()> {
/// let files = extract_archive(
///     Path::new("/roms/snes/game.zip"),
///     Path::new("/roms/snes"),
///     Arc::new(NoProgress),
///     Duration::from_millis(300),
/// )
/// .await?;
/// println!("Extracted {} files", files.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_archive(
    archive_path: &Path,
    dest_path: &Path,
    sink: Arc<dyn ProgressSink>,
    poll_interval: Duration,
) -> Result<Vec<PathBuf>> {
    let format = ArchiveFormat::detect(archive_path).ok_or_else(|| {
        Error::Archive(ArchiveError::UnsupportedFormat {
            archive: archive_path.to_path_buf(),
            extension: archive_extension(archive_path),
        })
    })?;

    info!(?archive_path, ?dest_path, %format, "dispatching extraction");

    let archive = archive_path.to_path_buf();
    let plan = tokio::task::spawn_blocking(move || format.plan(&archive))
        .await
        .map_err(|e| task_failed(archive_path, e))??;

    let archive = archive_path.to_path_buf();
    let dest = dest_path.to_path_buf();
    progress::run_with_progress(
        archive_path,
        plan,
        dest_path,
        sink,
        poll_interval,
        move || format.extract(&archive, &dest),
    )
    .await
}
