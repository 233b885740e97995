//! Candidate asset scanning
//!
//! Recursively lists files under a directory whose extension is one of a
//! launcher's accepted extensions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Normalize a user-entered extension: trim whitespace, strip leading dots and
/// wildcards, lowercase
///
/// ```
/// use rom_launcher::scanner::normalize_extension;
///
/// assert_eq!(normalize_extension(" *.SFC "), "sfc");
/// assert_eq!(normalize_extension(".nes"), "nes");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    ext.trim()
        .trim_start_matches(['.', '*'])
        .to_lowercase()
}

/// Normalized extension of a path (empty when the path has none)
pub fn path_extension(path: &Path) -> String {
    path.extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default()
}

/// Lazy, restartable scan for assets under a directory
///
/// Iterating walks the directory tree afresh each time, so the same scan can be
/// consumed more than once. Order is filesystem-dependent.
#[derive(Clone, Debug)]
pub struct AssetScan {
    root: PathBuf,
    extensions: HashSet<String>,
}

impl AssetScan {
    /// Directory the scan starts from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalized extension set the scan filters on
    pub fn extensions(&self) -> &HashSet<String> {
        &self.extensions
    }

    /// Start a fresh walk over the directory tree
    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(root = ?self.root, error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| {
                let ext = path_extension(path);
                !ext.is_empty() && self.extensions.contains(&ext)
            })
    }
}

impl<'a> IntoIterator for &'a AssetScan {
    type Item = PathBuf;
    type IntoIter = Box<dyn Iterator<Item = PathBuf> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Find every file under `directory` (recursively) whose extension is accepted
///
/// Accepted extensions are normalized with [`normalize_extension`] first, so
/// `"*.NES"`, `".nes"` and `"nes"` are equivalent. Blank entries are ignored.
pub fn find_assets<I, S>(directory: &Path, accepted_extensions: I) -> AssetScan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let extensions = accepted_extensions
        .into_iter()
        .map(|e| normalize_extension(e.as_ref()))
        .filter(|e| !e.is_empty())
        .collect();

    AssetScan {
        root: directory.to_path_buf(),
        extensions,
    }
}
