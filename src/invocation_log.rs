//! Append-only log of default-launcher invocations
//!
//! Each line is `<RFC 3339 timestamp>\t<launcher id>\t<folder>\t<asset path>`.
//! The log location comes from configuration; without one nothing is written.

use crate::Result;
use crate::types::LauncherId;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Invocation log handle
#[derive(Clone, Debug, Default)]
pub struct InvocationLog {
    path: Option<PathBuf>,
}

impl InvocationLog {
    /// Log to `path`, or nowhere when `None`
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// A log that discards every entry
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Configured log file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one invocation
    pub async fn record(
        &self,
        launcher_id: LauncherId,
        folder: &str,
        asset_path: &Path,
    ) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let line = format!(
            "{}\t{}\t{}\t{}\n",
            chrono::Utc::now().to_rfc3339(),
            launcher_id,
            folder,
            asset_path.display()
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
