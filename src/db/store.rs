//! [`LauncherStore`] backed by SQLite.

use crate::Result;
use crate::launcher::LauncherConfig;
use crate::resolver::resolve_default;
use crate::types::{DefaultLauncherRecord, LauncherId};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;

use super::{Database, LauncherStore};

#[async_trait]
impl LauncherStore for Database {
    async fn load_launchers(&self) -> Result<Vec<LauncherConfig>> {
        let rows = self.list_launcher_rows().await?;
        Ok(rows.into_iter().map(LauncherConfig::from).collect())
    }

    async fn get_launcher(&self, id: LauncherId) -> Result<Option<LauncherConfig>> {
        Ok(self.get_launcher_row(id).await?.map(LauncherConfig::from))
    }

    async fn save_launcher(&self, launcher: &LauncherConfig) -> Result<LauncherId> {
        if launcher.id.is_unsaved() {
            self.insert_launcher(launcher).await
        } else {
            self.update_launcher(launcher).await?;
            Ok(launcher.id)
        }
    }

    async fn delete_launcher(&self, id: LauncherId) -> Result<bool> {
        self.delete_launcher_row(id).await
    }

    async fn set_default(&self, folder_path: &str, launcher_id: LauncherId) -> Result<()> {
        self.upsert_default_launcher(folder_path, launcher_id).await
    }

    async fn get_default(&self, folder_path: &str) -> Result<Option<LauncherId>> {
        let records = self.list_default_records().await?;
        Ok(resolve_default(folder_path, &records))
    }

    async fn remove_default(&self, folder_path: &str) -> Result<bool> {
        self.delete_default_launcher(folder_path).await
    }

    async fn list_defaults(&self) -> Result<Vec<DefaultLauncherRecord>> {
        self.list_default_records().await
    }

    fn list_default_folder_paths(&self) -> BoxStream<'_, Result<String>> {
        self.stream_default_folder_paths().boxed()
    }
}
