//! Database layer for rom-launcher
//!
//! SQLite persistence for launchers and folder default-launcher records.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`launchers`] — Launcher CRUD
//! - [`defaults`] — Folder default-launcher records
//! - [`store`] — [`LauncherStore`] implementation used by the application layer

use crate::Result;
use crate::launcher::{LauncherConfig, parse_extensions};
use crate::types::{DefaultLauncherRecord, LauncherId};
use async_trait::async_trait;
use futures::stream::BoxStream;
use sqlx::{FromRow, sqlite::SqlitePool};
use std::path::PathBuf;

mod defaults;
mod launchers;
mod migrations;
mod store;

/// Launcher record from database
#[derive(Debug, Clone, FromRow)]
pub struct LauncherRow {
    /// Unique database ID
    pub id: LauncherId,
    /// Display name
    pub name: String,
    /// Executable path
    pub path: String,
    /// Accepted extensions, `;`-separated
    pub file_extensions: String,
    /// Argument template
    pub execution_arguments: String,
    /// Unix timestamp when the launcher was created
    pub created_at: i64,
    /// Unix timestamp of the last update
    pub updated_at: i64,
}

impl From<LauncherRow> for LauncherConfig {
    fn from(row: LauncherRow) -> Self {
        LauncherConfig {
            id: row.id,
            name: row.name,
            path: PathBuf::from(row.path),
            extensions: parse_extensions(&row.file_extensions),
            arguments: row.execution_arguments,
        }
    }
}

/// Async record store for launchers and default-launcher records
///
/// Implemented by [`Database`]; the application layer only talks to this
/// trait so it can run against any backing store.
#[async_trait]
pub trait LauncherStore: Send + Sync {
    /// Every launcher, ordered by id
    async fn load_launchers(&self) -> Result<Vec<LauncherConfig>>;

    /// One launcher by id
    async fn get_launcher(&self, id: LauncherId) -> Result<Option<LauncherConfig>>;

    /// Insert (unsaved id) or update a launcher, returning its id
    async fn save_launcher(&self, launcher: &LauncherConfig) -> Result<LauncherId>;

    /// Delete a launcher and every default record pointing at it
    ///
    /// Returns whether a launcher was deleted.
    async fn delete_launcher(&self, id: LauncherId) -> Result<bool>;

    /// Make `launcher_id` the default for `folder_path` and its descendants
    async fn set_default(&self, folder_path: &str, launcher_id: LauncherId) -> Result<()>;

    /// Launcher configured for `folder_path` or its nearest ancestor
    async fn get_default(&self, folder_path: &str) -> Result<Option<LauncherId>>;

    /// Remove the record for exactly `folder_path`; returns whether one existed
    async fn remove_default(&self, folder_path: &str) -> Result<bool>;

    /// Every default record, ordered by folder path
    async fn list_defaults(&self) -> Result<Vec<DefaultLauncherRecord>>;

    /// Folder paths with a default record, fetched lazily
    fn list_default_folder_paths(&self) -> BoxStream<'_, Result<String>>;
}

/// Database handle for rom-launcher
pub struct Database {
    pool: SqlitePool,
}
