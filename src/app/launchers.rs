//! Launcher management and the shell menu plan.

use crate::Result;
use crate::launcher::LauncherConfig;
use crate::shell::{ShellMenu, ShellRegistrar};
use crate::types::LauncherId;
use std::path::Path;

use super::App;

impl App {
    /// Every launcher, ordered by id
    pub async fn list_launchers(&self) -> Result<Vec<LauncherConfig>> {
        self.store.load_launchers().await
    }

    /// Normalize, validate and persist a launcher
    ///
    /// An unsaved id inserts a new record, any other id updates in place.
    /// Invalid configurations are refused with
    /// [`crate::Error::InvalidLauncher`] and nothing is written.
    pub async fn save_launcher(&self, launcher: &LauncherConfig) -> Result<LauncherId> {
        let launcher = launcher.normalized();
        launcher.validate(&self.launch_rules)?;

        let id = self.store.save_launcher(&launcher).await?;
        tracing::info!(launcher_id = id.get(), name = %launcher.name, "launcher saved");
        Ok(id)
    }

    /// Delete a launcher along with the default records that point at it
    pub async fn delete_launcher(&self, id: LauncherId) -> Result<bool> {
        let deleted = self.store.delete_launcher(id).await?;
        tracing::info!(launcher_id = id.get(), deleted, "launcher deleted");
        Ok(deleted)
    }

    /// Menu plan for the current launchers
    pub async fn shell_menu(&self, app_executable: &Path) -> Result<ShellMenu> {
        let launchers = self.store.load_launchers().await?;
        Ok(ShellMenu::build(app_executable, &launchers))
    }

    /// Build the menu plan and hand it to `registrar`
    pub async fn register_shell(
        &self,
        registrar: &dyn ShellRegistrar,
        app_executable: &Path,
    ) -> Result<ShellMenu> {
        let menu = self.shell_menu(app_executable).await?;
        registrar.register(&menu).await?;
        Ok(menu)
    }
}
