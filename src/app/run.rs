//! Running assets with an explicit or default launcher.

use crate::error::{Error, Result};
use crate::extraction::ProgressSink;
use crate::launch::LaunchedProcess;
use crate::resolver::normalize_folder_path;
use crate::types::LauncherId;
use std::path::Path;
use std::sync::Arc;

use super::App;

impl App {
    /// Run `path` with launcher `launcher_id`
    ///
    /// Archives go through intake first, using the launcher's extensions to
    /// pick the asset; the resolved asset (or the archive itself when the
    /// policy says so) is then dispatched.
    pub async fn run(
        &self,
        path: &Path,
        launcher_id: LauncherId,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<LaunchedProcess> {
        let launcher = self.require_launcher(launcher_id).await?;

        let resolution = self
            .intake
            .handle_archive(path, &launcher.extensions, sink)
            .await?;

        tracing::debug!(
            launcher_id = launcher.id.get(),
            asset = ?resolution.asset_path,
            use_original_archive = resolution.use_original_archive,
            "asset resolved"
        );

        self.dispatcher.dispatch(&resolution.asset_path, &launcher)
    }

    /// Run `path` with the default launcher of its folder
    ///
    /// The folder's own record wins, then the nearest ancestor's. Every
    /// resolved invocation is appended to the invocation log.
    ///
    /// # Errors
    /// [`Error::NoDefaultLauncher`] when neither the folder nor any ancestor
    /// has a default.
    pub async fn run_default(
        &self,
        path: &Path,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<LaunchedProcess> {
        let path = std::path::absolute(path)?;
        let path = path.as_path();
        let folder = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let launcher_id = self
            .store
            .get_default(&folder)
            .await?
            .filter(|id| !id.is_unsaved())
            .ok_or_else(|| Error::NoDefaultLauncher {
                folder: normalize_folder_path(&folder),
            })?;

        if let Err(e) = self.invocation_log.record(launcher_id, &folder, path).await {
            tracing::warn!(error = %e, log = ?self.invocation_log.path(), "failed to write invocation log");
        }

        self.run(path, launcher_id, sink).await
    }
}
