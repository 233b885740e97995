//! Archive intake
//!
//! Turns a selected path into a single runnable asset. Non-archives pass
//! through untouched. Archives are matched against assets already sitting next
//! to them (so repeated launches never re-extract), otherwise the decision
//! policy is consulted and the archive is extracted in place.

mod policy;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use policy::{DecisionPolicy, FixedDecision, PromptDecision};

use crate::config::ExtractionConfig;
use crate::error::{Error, IntakeError, Result};
use crate::extraction::{
    ArchiveFormat, ProgressSink, archive_base_name, archive_extension, asset_base_name,
    extract_archive, is_archive,
};
use crate::scanner::{find_assets, normalize_extension, path_extension};
use crate::types::{ArchiveResolution, ExtractDecision};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Archive intake engine
///
/// Stateless apart from its decision policy and polling interval; one instance
/// can serve any number of sequential intakes. Two concurrent intakes of the
/// same archive are not synchronized.
#[derive(Clone)]
pub struct ArchiveIntake {
    policy: Arc<dyn DecisionPolicy>,
    poll_interval: Duration,
}

impl std::fmt::Debug for ArchiveIntake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveIntake")
            .field("policy", &self.policy.name())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl ArchiveIntake {
    /// Create an intake engine with the given decision policy
    pub fn new(policy: Arc<dyn DecisionPolicy>, poll_interval: Duration) -> Self {
        Self {
            policy,
            poll_interval,
        }
    }

    /// Create an intake engine using the configured polling interval
    pub fn from_config(policy: Arc<dyn DecisionPolicy>, config: &ExtractionConfig) -> Self {
        Self::new(policy, config.poll_interval)
    }

    /// Resolve `archive_path` to a single runnable asset
    ///
    /// `accepted_extensions` are the launcher's extensions; only files with one
    /// of them can be selected as the asset. Progress of any extraction is
    /// reported to `sink`.
    ///
    /// # Errors
    /// * [`IntakeError::ClassificationAmbiguous`] when several assets share the
    ///   archive's base name, before or after extraction (nothing is renamed)
    /// * [`IntakeError::UserAborted`] when the policy aborts
    /// * [`IntakeError::ExtractionFailed`] wrapping the decompression error
    /// * [`IntakeError::NoCompatibleAsset`] when extraction produced no match
    pub async fn handle_archive(
        &self,
        archive_path: &Path,
        accepted_extensions: &[String],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<ArchiveResolution> {
        let extension = archive_extension(archive_path);
        if !is_archive(&extension) {
            debug!(?archive_path, "not an archive, using as-is");
            return Ok(ArchiveResolution::original(archive_path));
        }

        // Scan results are joined onto the directory, so compare in absolute form
        let archive_path = std::path::absolute(archive_path)?;
        let archive_path = archive_path.as_path();

        let base_name = archive_base_name(archive_path);
        let directory = containing_dir(archive_path);

        let existing =
            scan_for_matches(archive_path, &directory, accepted_extensions, &base_name).await?;
        if let Some(asset) = single_match(archive_path, &base_name, existing)? {
            info!(?archive_path, ?asset, "archive already extracted");
            sync_archive_name(archive_path, &asset).await;
            return Ok(ArchiveResolution::extracted(asset));
        }

        let decision = self.policy.decide(archive_path).await;
        debug!(?archive_path, ?decision, policy = self.policy.name(), "extraction decision");

        match decision {
            ExtractDecision::UseArchive => return Ok(ArchiveResolution::original(archive_path)),
            ExtractDecision::Abort => {
                return Err(IntakeError::UserAborted {
                    archive: archive_path.to_path_buf(),
                }
                .into());
            }
            ExtractDecision::Extract => {}
        }

        let extracted = extract_archive(archive_path, &directory, sink, self.poll_interval)
            .await
            .map_err(|e| IntakeError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                format: ArchiveFormat::detect(archive_path)
                    .map(|f| f.name().to_string())
                    .unwrap_or_else(|| extension.clone()),
                source: Box::new(e),
            })?;

        let accepted = normalized_set(accepted_extensions);
        let mut matches: Vec<PathBuf> = extracted
            .into_iter()
            .filter(|path| is_candidate(path, &accepted, &base_name))
            .collect();
        matches.sort();

        match single_match(archive_path, &base_name, matches)? {
            Some(asset) => {
                info!(?archive_path, ?asset, "resolved extracted asset");
                sync_archive_name(archive_path, &asset).await;
                Ok(ArchiveResolution::extracted(asset))
            }
            None => Err(IntakeError::NoCompatibleAsset {
                archive: archive_path.to_path_buf(),
                base_name,
            }
            .into()),
        }
    }
}

fn containing_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn normalized_set(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| normalize_extension(e))
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_candidate(path: &Path, accepted: &HashSet<String>, base_name: &str) -> bool {
    accepted.contains(&path_extension(path))
        && asset_base_name(path).to_lowercase() == base_name.to_lowercase()
}

/// `Ok(None)` for no match, the asset for one, ambiguity otherwise
fn single_match(
    archive_path: &Path,
    base_name: &str,
    mut matches: Vec<PathBuf>,
) -> Result<Option<PathBuf>> {
    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(IntakeError::ClassificationAmbiguous {
            archive: archive_path.to_path_buf(),
            base_name: base_name.to_string(),
            matches,
        }
        .into()),
    }
}

/// Assets under the archive's directory sharing its base name
///
/// The archive itself never counts, even when the launcher accepts its
/// extension.
async fn scan_for_matches(
    archive_path: &Path,
    directory: &Path,
    accepted_extensions: &[String],
    base_name: &str,
) -> Result<Vec<PathBuf>> {
    let archive_path = archive_path.to_path_buf();
    let directory = directory.to_path_buf();
    let accepted_extensions = accepted_extensions.to_vec();
    let base_name = base_name.to_string();

    tokio::task::spawn_blocking(move || {
        let scan = find_assets(&directory, &accepted_extensions);
        let accepted = scan.extensions().clone();
        let mut matches: Vec<PathBuf> = scan
            .iter()
            .filter(|path| *path != archive_path && is_candidate(path, &accepted, &base_name))
            .collect();
        matches.sort();
        matches
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(format!("asset scan task failed: {e}"))))
}

/// Archive path after renaming it to `<asset base name><archive suffix>`
///
/// The suffix keeps its original spelling, including a compound `.tar.` part.
pub fn synced_archive_path(archive_path: &Path, asset_path: &Path) -> Option<PathBuf> {
    let archive_base = archive_base_name(archive_path);
    let asset_base = asset_base_name(asset_path);
    if archive_base == asset_base {
        return None;
    }

    let file_name = archive_path.file_name()?.to_string_lossy().into_owned();
    let suffix = file_name.get(archive_base.len()..)?;
    Some(archive_path.with_file_name(format!("{asset_base}{suffix}")))
}

/// Best-effort rename of the archive so its base name matches the asset
///
/// An existing file at the target is replaced, unless the names differ only
/// in case (on case-insensitive filesystems that file is the archive itself).
/// Failures are logged and swallowed.
async fn sync_archive_name(archive_path: &Path, asset_path: &Path) {
    let Some(target) = synced_archive_path(archive_path, asset_path) else {
        return;
    };

    let same_name_ignoring_case = target.to_string_lossy().to_lowercase()
        == archive_path.to_string_lossy().to_lowercase();

    let result = async {
        if !same_name_ignoring_case && tokio::fs::try_exists(&target).await? {
            tokio::fs::remove_file(&target).await?;
        }
        tokio::fs::rename(archive_path, &target).await
    }
    .await;

    match result {
        Ok(()) => info!(from = ?archive_path, to = ?target, "renamed archive to match asset"),
        Err(e) => {
            let err = IntakeError::RenameFailed {
                from: archive_path.to_path_buf(),
                to: target,
                reason: e.to_string(),
            };
            warn!(error = %err, "could not rename archive, continuing");
        }
    }
}
