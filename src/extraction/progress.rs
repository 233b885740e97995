//! Polling-based extraction progress
//!
//! None of the decompression libraries report byte-level progress, so progress
//! is estimated by a second task that periodically stats the output files while
//! the extraction task runs. The estimate under-counts files that are still
//! being flushed; only monotonicity and the terminal 100% are guaranteed.

use crate::error::{ArchiveError, Error, Result};
use crate::types::ExtractionProgress;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::shared::ExtractionPlan;

/// Highest percentage reported before the extraction task has finished
pub const MAX_IN_FLIGHT_PERCENTAGE: f64 = 99.98;

/// Label of the terminal progress value
pub const COMPLETE_LABEL: &str = "Extraction complete";

/// Receiver of progress samples
///
/// Called from the polling task; implementations must not block.
pub trait ProgressSink: Send + Sync {
    /// Accept one progress sample
    fn report(&self, progress: ExtractionProgress);
}

impl ProgressSink for mpsc::UnboundedSender<ExtractionProgress> {
    fn report(&self, progress: ExtractionProgress) {
        // Receiver gone means nobody is watching; extraction carries on
        self.send(progress).ok();
    }
}

/// Sink that discards every sample
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: ExtractionProgress) {}
}

/// Estimates progress from on-disk sizes of the expected output files
#[derive(Debug)]
pub struct ProgressEstimator {
    outputs: Vec<(PathBuf, u64)>,
    total_bytes: u64,
    last_percentage: f64,
}

impl ProgressEstimator {
    /// Create an estimator for `(output path, expected size)` pairs
    pub fn new(outputs: Vec<(PathBuf, u64)>) -> Self {
        let total_bytes = outputs.iter().map(|(_, size)| size).sum();
        Self {
            outputs,
            total_bytes,
            last_percentage: 0.0,
        }
    }

    /// Sum of the expected sizes
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Take one sample
    ///
    /// Missing files count as zero bytes. Files that cannot be stat'ed for any
    /// other reason are skipped for this sample. The percentage never decreases
    /// and never exceeds [`MAX_IN_FLIGHT_PERCENTAGE`].
    pub async fn sample(&mut self) -> ExtractionProgress {
        let mut current_bytes = 0u64;
        let mut pending = Vec::new();

        for (path, expected) in &self.outputs {
            match tokio::fs::metadata(path).await {
                Ok(meta) => {
                    current_bytes += meta.len();
                    if meta.len() < *expected {
                        pending.push(display_name(path));
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    pending.push(display_name(path));
                }
                Err(e) => {
                    debug!(?path, error = %e, "output not readable yet, skipping for this sample");
                    pending.push(display_name(path));
                }
            }
        }

        let raw = if self.total_bytes == 0 {
            0.0
        } else {
            100.0 * current_bytes as f64 / self.total_bytes as f64
        };
        let percentage = raw
            .clamp(0.0, MAX_IN_FLIGHT_PERCENTAGE)
            .max(self.last_percentage);
        self.last_percentage = percentage;

        let label = if pending.is_empty() {
            self.outputs
                .iter()
                .map(|(path, _)| display_name(path))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            pending.join(", ")
        };

        ExtractionProgress {
            percentage,
            current_file: label,
            current_bytes: current_bytes.min(self.total_bytes),
            total_bytes: self.total_bytes,
        }
    }

    /// Terminal value: exactly 100% with `current_bytes == total_bytes`
    pub fn complete(total_bytes: u64) -> ExtractionProgress {
        ExtractionProgress {
            percentage: 100.0,
            current_file: COMPLETE_LABEL.to_string(),
            current_bytes: total_bytes,
            total_bytes,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn poll_progress(
    mut estimator: ProgressEstimator,
    sink: Arc<dyn ProgressSink>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let progress = estimator.sample().await;
                sink.report(progress);
            }
        }
    }
}

async fn written_bytes(paths: &[PathBuf]) -> u64 {
    let mut total = 0;
    for path in paths {
        if let Ok(meta) = tokio::fs::metadata(path).await {
            total += meta.len();
        }
    }
    total
}

/// Run `extract_fn` on the blocking pool while a polling task reports progress
///
/// The poller is stopped as soon as the extraction task finishes, both tasks are
/// joined, and a final 100% value is reported whether or not extraction
/// succeeded. Failures come only from the extraction task.
pub(crate) async fn run_with_progress<F>(
    archive_path: &Path,
    plan: ExtractionPlan,
    dest_path: &Path,
    sink: Arc<dyn ProgressSink>,
    poll_interval: Duration,
    extract_fn: F,
) -> Result<Vec<PathBuf>>
where
    F: FnOnce() -> Result<Vec<PathBuf>> + Send + 'static,
{
    let estimator = ProgressEstimator::new(plan.outputs(dest_path));
    let planned_total = estimator.total_bytes();
    let cancel = CancellationToken::new();

    let extraction = tokio::task::spawn_blocking(extract_fn);

    let poller = if plan.sizes_known {
        Some(tokio::spawn(poll_progress(
            estimator,
            Arc::clone(&sink),
            poll_interval,
            cancel.clone(),
        )))
    } else {
        // No size metadata: report a placeholder instead of polling
        let label = plan
            .entries
            .first()
            .map(|e| display_name(&e.relative_path))
            .unwrap_or_default();
        sink.report(ExtractionProgress {
            percentage: 0.0,
            current_file: label,
            current_bytes: 0,
            total_bytes: 0,
        });
        None
    };

    let joined = extraction.await;
    cancel.cancel();

    if let Some(poller) = poller
        && let Err(e) = poller.await
    {
        warn!(?archive_path, error = %e, "progress poller ended abnormally");
    }

    let result = joined.unwrap_or_else(|e| {
        Err(Error::Archive(ArchiveError::TaskFailed {
            archive: archive_path.to_path_buf(),
            reason: e.to_string(),
        }))
    });

    let final_total = match (&result, plan.sizes_known) {
        (_, true) => planned_total,
        (Ok(files), false) => written_bytes(files).await,
        (Err(_), false) => 0,
    };
    sink.report(ProgressEstimator::complete(final_total));

    result
}
