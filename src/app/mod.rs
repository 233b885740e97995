//! Application layer wiring the record store, archive intake and dispatch.
//!
//! The [`App`] struct and its methods are organized by domain:
//! - [`run`] - Running assets with an explicit or default launcher
//! - [`defaults`] - Folder default-launcher records
//! - [`launchers`] - Launcher management and the shell menu plan
//! - [`command`] - Raw invocation parsing and execution

mod command;
mod defaults;
mod launchers;
mod run;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use command::{Command, CommandOutcome};

use crate::config::{Config, LaunchConfig};
use crate::db::{Database, LauncherStore};
use crate::error::{LaunchError, Result};
use crate::intake::{ArchiveIntake, DecisionPolicy};
use crate::invocation_log::InvocationLog;
use crate::launch::Dispatcher;
use crate::launcher::LauncherConfig;
use crate::types::LauncherId;
use std::sync::Arc;

/// Entry point for every command-line operation
///
/// Holds no per-invocation state; cloning is cheap.
#[derive(Clone)]
pub struct App {
    store: Arc<dyn LauncherStore>,
    intake: ArchiveIntake,
    dispatcher: Dispatcher,
    invocation_log: InvocationLog,
    launch_rules: LaunchConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("intake", &self.intake)
            .field("invocation_log", &self.invocation_log)
            .field("launch_rules", &self.launch_rules)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Assemble an application from its parts
    pub fn new(
        store: Arc<dyn LauncherStore>,
        intake: ArchiveIntake,
        dispatcher: Dispatcher,
        invocation_log: InvocationLog,
        launch_rules: LaunchConfig,
    ) -> Self {
        Self {
            store,
            intake,
            dispatcher,
            invocation_log,
            launch_rules,
        }
    }

    /// Open the configured database and build an application around it
    ///
    /// Processes are started with the operating system spawner.
    pub async fn open(config: &Config, policy: Arc<dyn DecisionPolicy>) -> Result<Self> {
        let db = Database::new(&config.persistence.database_path).await?;
        tracing::debug!(database = ?config.persistence.database_path, "record store opened");

        Ok(Self::new(
            Arc::new(db),
            ArchiveIntake::from_config(policy, &config.extraction),
            Dispatcher::default(),
            InvocationLog::new(config.logging.invocation_log.clone()),
            config.launch.clone(),
        ))
    }

    /// The record store behind this application
    pub fn store(&self) -> &dyn LauncherStore {
        self.store.as_ref()
    }

    /// Look up a launcher, failing with [`LaunchError::LauncherNotFound`]
    async fn require_launcher(&self, id: LauncherId) -> Result<LauncherConfig> {
        if id.is_unsaved() {
            return Err(LaunchError::LauncherNotFound { id }.into());
        }

        self.store
            .get_launcher(id)
            .await?
            .ok_or_else(|| LaunchError::LauncherNotFound { id }.into())
    }
}
