//! Archive format classification
//!
//! Pure functions only: nothing here touches the filesystem.

use std::fmt;
use std::path::Path;

/// Extensions treated as archives (compared case-insensitively)
pub const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "rar", "7z", "tar", "gz", "gzip", "bz2", "bzip2", "lz", "lzma", "xz", "iso", "cab",
    "arj", "z",
];

/// Check if an extension denotes an archive
///
/// Any `tar.*` compound suffix is an archive; otherwise the extension must be
/// in [`ARCHIVE_EXTENSIONS`]. Leading dots are ignored.
///
/// ```
/// use rom_launcher::extraction::is_archive;
///
/// assert!(is_archive("tar.gz"));
/// assert!(is_archive("ZIP"));
/// assert!(!is_archive("sfc"));
/// ```
pub fn is_archive(extension: &str) -> bool {
    let ext = extension.trim_start_matches('.').to_lowercase();
    if ext.starts_with("tar.") {
        return true;
    }
    ARCHIVE_EXTENSIONS.contains(&ext.as_str())
}

/// Extension of a path including a compound `tar.` segment, lowercased
///
/// `game.tar.gz` yields `"tar.gz"`, `game.zip` yields `"zip"`, `README` yields `""`.
pub fn archive_extension(path: &Path) -> String {
    let Some(ext) = path.extension() else {
        return String::new();
    };
    let ext = ext.to_string_lossy().to_lowercase();

    let stem_is_tar = path
        .file_stem()
        .map(Path::new)
        .and_then(Path::extension)
        .is_some_and(|e| e.eq_ignore_ascii_case("tar"));

    if stem_is_tar && ext != "tar" {
        format!("tar.{ext}")
    } else {
        ext
    }
}

/// Base name of an archive: file name minus its extension and any trailing
/// `.tar` segment
///
/// `game.tar.gz` and `game.tar` both yield `"game"`.
pub fn archive_base_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.len().checked_sub(4) {
        Some(cut) if stem.is_char_boundary(cut) && stem[cut..].eq_ignore_ascii_case(".tar") => {
            stem[..cut].to_string()
        }
        _ => stem,
    }
}

/// Base name of an asset: file name minus its final extension
pub fn asset_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compression applied around a tar stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCompression {
    /// Plain `.tar`
    None,
    /// `.tar.gz`
    Gzip,
    /// `.tar.bz2`
    Bzip2,
    /// `.tar.xz`
    Xz,
}

/// Single-stream compressors without entry metadata
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamCodec {
    /// `.gz` / `.gzip`
    Gzip,
    /// `.bz2` / `.bzip2`
    Bzip2,
    /// `.xz`
    Xz,
    /// `.lzma` (legacy LZMA-alone)
    Lzma,
}

/// Container format with a dedicated extractor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// ZIP archive
    Zip,
    /// RAR archive
    Rar,
    /// 7-Zip archive
    SevenZip,
    /// Tar archive, optionally compressed
    Tar(TarCompression),
    /// Single compressed stream holding exactly one file
    Stream(StreamCodec),
}

impl ArchiveFormat {
    /// Pick the extractor for a path from its (compound) extension
    ///
    /// Returns `None` for archive extensions without an extractor (`lz`, `iso`,
    /// `cab`, `arj`, `z`) and for non-archives.
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = archive_extension(path);

        if let Some(compression) = ext.strip_prefix("tar.") {
            let compression = match compression {
                "gz" | "gzip" => TarCompression::Gzip,
                "bz2" | "bzip2" => TarCompression::Bzip2,
                "xz" => TarCompression::Xz,
                _ => return None,
            };
            return Some(Self::Tar(compression));
        }

        match ext.as_str() {
            "zip" => Some(Self::Zip),
            "rar" => Some(Self::Rar),
            "7z" => Some(Self::SevenZip),
            "tar" => Some(Self::Tar(TarCompression::None)),
            "gz" | "gzip" => Some(Self::Stream(StreamCodec::Gzip)),
            "bz2" | "bzip2" => Some(Self::Stream(StreamCodec::Bzip2)),
            "xz" => Some(Self::Stream(StreamCodec::Xz)),
            "lzma" => Some(Self::Stream(StreamCodec::Lzma)),
            _ => None,
        }
    }

    /// Short format name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Rar => "rar",
            Self::SevenZip => "7z",
            Self::Tar(TarCompression::None) => "tar",
            Self::Tar(TarCompression::Gzip) => "tar.gz",
            Self::Tar(TarCompression::Bzip2) => "tar.bz2",
            Self::Tar(TarCompression::Xz) => "tar.xz",
            Self::Stream(StreamCodec::Gzip) => "gzip",
            Self::Stream(StreamCodec::Bzip2) => "bzip2",
            Self::Stream(StreamCodec::Xz) => "xz",
            Self::Stream(StreamCodec::Lzma) => "lzma",
        }
    }

    /// Whether entry sizes are known before extraction starts
    pub fn has_entry_metadata(&self) -> bool {
        !matches!(self, Self::Stream(_))
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
