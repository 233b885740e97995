//! Launcher CRUD operations.

use crate::error::DatabaseError;
use crate::launcher::{LauncherConfig, join_extensions};
use crate::types::LauncherId;
use crate::{Error, Result};

use super::{Database, LauncherRow};

impl Database {
    /// Insert a new launcher record, ignoring `launcher.id`
    pub async fn insert_launcher(&self, launcher: &LauncherConfig) -> Result<LauncherId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO launchers (
                name, path, file_extensions, execution_arguments,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&launcher.name)
        .bind(launcher.path.to_string_lossy().into_owned())
        .bind(join_extensions(&launcher.extensions))
        .bind(&launcher.arguments)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert launcher: {}",
                e
            )))
        })?;

        let id = LauncherId(result.last_insert_rowid());
        tracing::debug!(launcher_id = id.0, name = %launcher.name, "launcher inserted");
        Ok(id)
    }

    /// Overwrite an existing launcher record
    ///
    /// Fails with [`DatabaseError::NotFound`] if no launcher has `launcher.id`.
    pub async fn update_launcher(&self, launcher: &LauncherConfig) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE launchers
            SET name = ?, path = ?, file_extensions = ?, execution_arguments = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&launcher.name)
        .bind(launcher.path.to_string_lossy().into_owned())
        .bind(join_extensions(&launcher.extensions))
        .bind(&launcher.arguments)
        .bind(now)
        .bind(launcher.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update launcher: {}",
                e
            )))
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "launcher {} does not exist",
                launcher.id
            ))));
        }

        Ok(())
    }

    /// Get a launcher by ID
    pub async fn get_launcher_row(&self, id: LauncherId) -> Result<Option<LauncherRow>> {
        let row = sqlx::query_as::<_, LauncherRow>(
            r#"
            SELECT id, name, path, file_extensions, execution_arguments,
                   created_at, updated_at
            FROM launchers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get launcher: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List all launchers ordered by id
    pub async fn list_launcher_rows(&self) -> Result<Vec<LauncherRow>> {
        let rows = sqlx::query_as::<_, LauncherRow>(
            r#"
            SELECT id, name, path, file_extensions, execution_arguments,
                   created_at, updated_at
            FROM launchers
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list launchers: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Delete a launcher; its default records go with it (ON DELETE CASCADE)
    pub async fn delete_launcher_row(&self, id: LauncherId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM launchers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete launcher: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
