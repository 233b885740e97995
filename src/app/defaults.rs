//! Folder default-launcher records.

use crate::Result;
use crate::types::{DefaultLauncherRecord, LauncherId};

use super::App;

impl App {
    /// Make `launcher_id` the default for `folder` and everything below it
    ///
    /// Fails with [`crate::error::LaunchError::LauncherNotFound`] when the
    /// launcher does not exist.
    pub async fn set_default(&self, folder: &str, launcher_id: LauncherId) -> Result<()> {
        let launcher = self.require_launcher(launcher_id).await?;
        self.store.set_default(folder, launcher.id).await?;

        tracing::info!(folder, launcher_id = launcher.id.get(), launcher = %launcher.name, "default launcher set");
        Ok(())
    }

    /// Clear the default recorded for exactly `folder`
    ///
    /// Returns whether a record existed. Ancestor records keep applying.
    pub async fn remove_default(&self, folder: &str) -> Result<bool> {
        let removed = self.store.remove_default(folder).await?;
        tracing::info!(folder, removed, "default launcher removed");
        Ok(removed)
    }

    /// Every default record, ordered by folder path
    pub async fn list_defaults(&self) -> Result<Vec<DefaultLauncherRecord>> {
        self.store.list_defaults().await
    }
}
