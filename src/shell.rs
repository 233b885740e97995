//! Shell context-menu plan
//!
//! [`ShellMenu`] describes the file and folder context-menu entries that
//! route back into the command-line surface. Writing them into a platform
//! shell is left to a [`ShellRegistrar`]; the bundled [`ManifestRegistrar`]
//! emits the plan as JSON for an installer to consume.

use crate::Result;
use crate::launcher::LauncherConfig;
use crate::types::LauncherId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder the shell replaces with the selected file or folder
pub const SELECTION_PLACEHOLDER: &str = "%V";

/// Label of the file submenu listing every launcher
pub const RUN_WITH_LAUNCHER_LABEL: &str = "Run with Launcher...";

/// Label of the file entry that uses the folder's default launcher
pub const RUN_WITH_DEFAULT_LABEL: &str = "Run with Default Launcher";

/// Label of the folder submenu listing every launcher
pub const SET_DEFAULT_LABEL: &str = "Set Default Launcher";

/// Label of the folder entry that clears the folder's default launcher
pub const REMOVE_DEFAULT_LABEL: &str = "Remove Default Launcher";

/// One clickable menu entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Stable key (launcher id, or a fixed name for the fixed entries)
    pub key: String,
    /// Text shown in the menu
    pub label: String,
    /// Full command line the shell runs
    pub command: String,
    /// Executable whose icon decorates the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
}

/// A submenu of entries
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submenu {
    /// Stable key
    pub key: String,
    /// Text shown in the menu
    pub label: String,
    /// Entries in display order
    pub entries: Vec<MenuEntry>,
}

/// Complete context-menu plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellMenu {
    /// The rom-launcher executable every command invokes
    pub app_executable: PathBuf,
    /// File submenu: run with a specific launcher
    pub file_launchers: Submenu,
    /// File entry: run with the folder's default launcher
    pub file_default: MenuEntry,
    /// Folder submenu: set or remove the folder's default launcher
    pub folder_defaults: Submenu,
}

impl ShellMenu {
    /// Build the menu plan for `launchers`
    ///
    /// Launchers keep their given order. An entry's icon is the launcher's
    /// executable when that file exists.
    pub fn build(app_executable: &Path, launchers: &[LauncherConfig]) -> Self {
        let command = |verb: &str, launcher_id: Option<LauncherId>| {
            let mut line = format!(
                "\"{}\" {verb} \"{SELECTION_PLACEHOLDER}\"",
                app_executable.display()
            );
            if let Some(id) = launcher_id {
                line.push_str(&format!(" {id}"));
            }
            line
        };

        let per_launcher = |verb: &str| -> Vec<MenuEntry> {
            launchers
                .iter()
                .map(|launcher| MenuEntry {
                    key: launcher.id.to_string(),
                    label: launcher.name.clone(),
                    command: command(verb, Some(launcher.id)),
                    icon: launcher
                        .path
                        .is_file()
                        .then(|| launcher.path.clone()),
                })
                .collect()
        };

        let mut folder_entries = per_launcher("setdefault");
        folder_entries.push(MenuEntry {
            key: "remove".to_string(),
            label: REMOVE_DEFAULT_LABEL.to_string(),
            command: command("removedefault", None),
            icon: None,
        });

        Self {
            app_executable: app_executable.to_path_buf(),
            file_launchers: Submenu {
                key: "RomLauncher".to_string(),
                label: RUN_WITH_LAUNCHER_LABEL.to_string(),
                entries: per_launcher("run"),
            },
            file_default: MenuEntry {
                key: "RomLauncherDefault".to_string(),
                label: RUN_WITH_DEFAULT_LABEL.to_string(),
                command: command("rundefault", None),
                icon: None,
            },
            folder_defaults: Submenu {
                key: "RomLauncher".to_string(),
                label: SET_DEFAULT_LABEL.to_string(),
                entries: folder_entries,
            },
        }
    }

    /// Every clickable entry, file menu first
    pub fn entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.file_launchers
            .entries
            .iter()
            .chain(std::iter::once(&self.file_default))
            .chain(self.folder_defaults.entries.iter())
    }
}

/// Write-only sink for a [`ShellMenu`]
#[async_trait]
pub trait ShellRegistrar: Send + Sync {
    /// Install `menu`, replacing whatever was registered before
    async fn register(&self, menu: &ShellMenu) -> Result<()>;

    /// Remove every registered entry
    async fn unregister(&self) -> Result<()>;
}

/// Registrar that writes the menu plan to a JSON manifest
#[derive(Clone, Debug)]
pub struct ManifestRegistrar {
    path: PathBuf,
}

impl ManifestRegistrar {
    /// Registrar writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manifest location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ShellRegistrar for ManifestRegistrar {
    async fn register(&self, menu: &ShellMenu) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(menu)?;
        tokio::fs::write(&self.path, json).await?;

        tracing::info!(
            manifest = ?self.path,
            entries = menu.entries().count(),
            "shell menu manifest written"
        );
        Ok(())
    }

    async fn unregister(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!(manifest = ?self.path, "shell menu manifest removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
