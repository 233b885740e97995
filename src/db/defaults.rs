//! Folder default-launcher records.
//!
//! Folder paths are stored normalized so lookups and the prefix walk agree on
//! one spelling per folder.

use crate::error::DatabaseError;
use crate::resolver::normalize_folder_path;
use crate::types::{DefaultLauncherRecord, LauncherId};
use crate::{Error, Result};
use futures::{Stream, TryStreamExt};

use super::Database;

impl Database {
    /// Insert or replace the default launcher for a folder
    ///
    /// Fails with [`DatabaseError::ConstraintViolation`] when `launcher_id`
    /// does not exist.
    pub async fn upsert_default_launcher(
        &self,
        folder_path: &str,
        launcher_id: LauncherId,
    ) -> Result<()> {
        let folder_path = normalize_folder_path(folder_path);
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO default_launchers (folder_path, launcher_id, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(folder_path) DO UPDATE SET
                launcher_id = excluded.launcher_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&folder_path)
        .bind(launcher_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let is_fk_violation = e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation());
            if is_fk_violation {
                Error::Database(DatabaseError::ConstraintViolation(format!(
                    "launcher {} does not exist",
                    launcher_id
                )))
            } else {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to set default launcher: {}",
                    e
                )))
            }
        })?;

        tracing::debug!(%folder_path, launcher_id = launcher_id.0, "default launcher set");
        Ok(())
    }

    /// Delete the record for exactly this folder (ancestors are untouched)
    pub async fn delete_default_launcher(&self, folder_path: &str) -> Result<bool> {
        let folder_path = normalize_folder_path(folder_path);

        let result = sqlx::query("DELETE FROM default_launchers WHERE folder_path = ?")
            .bind(&folder_path)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to remove default launcher: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// All default records ordered by folder path
    pub async fn list_default_records(&self) -> Result<Vec<DefaultLauncherRecord>> {
        let rows = sqlx::query_as::<_, DefaultLauncherRecord>(
            "SELECT folder_path, launcher_id FROM default_launchers ORDER BY folder_path ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list default launchers: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Stream folder paths with a default record without loading them all
    pub fn stream_default_folder_paths(&self) -> impl Stream<Item = Result<String>> + Send + '_ {
        sqlx::query_scalar::<_, String>(
            "SELECT folder_path FROM default_launchers ORDER BY folder_path ASC",
        )
        .fetch(&self.pool)
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to read default launcher folders: {}",
                e
            )))
        })
    }
}
