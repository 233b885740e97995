//! Launch dispatch
//!
//! Checks the asset against the launcher's extensions, fills in the argument
//! template and starts the launcher without waiting for it.

use crate::error::{LaunchError, Result};
use crate::launcher::{EXE_PATH_PLACEHOLDER, LauncherConfig, ROM_PATH_PLACEHOLDER};
use crate::scanner::path_extension;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tracing::{info, warn};

/// Starts external processes
///
/// The dispatcher only ever needs "start this and let go"; the seam exists so
/// tests can observe launches without running anything.
pub trait ProcessSpawner: Send + Sync {
    /// Start `executable` with the rendered argument string, returning its pid
    fn spawn(&self, executable: &Path, arguments: &str) -> std::io::Result<Option<u32>>;
}

/// Spawner backed by the operating system
///
/// On Windows the argument string is passed through verbatim, exactly as
/// rendered. Elsewhere it is split into arguments honoring double quotes.
/// The child's standard streams are detached and it is never awaited.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, executable: &Path, arguments: &str) -> std::io::Result<Option<u32>> {
        let mut command = tokio::process::Command::new(executable);

        #[cfg(windows)]
        command.raw_arg(arguments);
        #[cfg(not(windows))]
        command.args(split_arguments(arguments));

        if let Some(dir) = executable.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn()?;

        Ok(child.id())
    }
}

/// A started launcher process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchedProcess {
    /// Process id, when the platform reports one
    pub pid: Option<u32>,
    /// The launcher executable
    pub executable: PathBuf,
    /// Rendered argument string
    pub arguments: String,
}

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Substitute `{exePath}` and `{romPath}` in `template` with quoted paths
///
/// Substitution is a single left-to-right pass, so placeholder text inside the
/// substituted paths is never expanded again. Any other `{...}` is left
/// verbatim.
///
/// ```
/// use rom_launcher::launch::render_arguments;
/// use std::path::Path;
///
/// let args = render_arguments(
///     "-L {exePath} {romPath}",
///     Path::new(r"C:\e.exe"),
///     Path::new(r"C:\g.rom"),
/// );
/// assert_eq!(args, r#"-L "C:\e.exe" "C:\g.rom""#);
/// ```
pub fn render_arguments(template: &str, exe_path: &Path, asset_path: &Path) -> String {
    let exe = quoted(exe_path);
    let asset = quoted(asset_path);

    let mut rendered = String::with_capacity(template.len() + exe.len() + asset.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(EXE_PATH_PLACEHOLDER) {
            rendered.push_str(&exe);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(ROM_PATH_PLACEHOLDER) {
            rendered.push_str(&asset);
            rest = after;
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }
    rendered.push_str(rest);
    rendered
}

/// Split a rendered argument string on whitespace, keeping double-quoted runs
/// together and dropping the quotes
///
/// Backslashes are literal so Windows paths survive unchanged.
pub fn split_arguments(arguments: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in arguments.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }
    args
}

/// Validates assets against launchers and starts them
#[derive(Clone)]
pub struct Dispatcher {
    spawner: Arc<dyn ProcessSpawner>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(SystemSpawner))
    }
}

impl Dispatcher {
    /// Create a dispatcher using `spawner` to start processes
    pub fn new(spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self { spawner }
    }

    /// Start `launcher` on `asset_path`
    ///
    /// Returns as soon as the process has been started; its output is not
    /// captured and its exit is not awaited.
    ///
    /// # Errors
    /// * [`LaunchError::UnsupportedFormat`] when the asset's extension is not
    ///   accepted (nothing is started)
    /// * [`LaunchError::SpawnFailed`] when the executable cannot be started
    pub fn dispatch(&self, asset_path: &Path, launcher: &LauncherConfig) -> Result<LaunchedProcess> {
        let extension = path_extension(asset_path);
        if !launcher.accepts(&extension) {
            return Err(LaunchError::UnsupportedFormat {
                launcher: launcher.name.clone(),
                extension,
                asset: asset_path.to_path_buf(),
            }
            .into());
        }

        let arguments = render_arguments(&launcher.arguments, &launcher.path, asset_path);

        let pid = self
            .spawner
            .spawn(&launcher.path, &arguments)
            .map_err(|e| {
                warn!(
                    launcher_id = launcher.id.get(),
                    executable = ?launcher.path,
                    error = %e,
                    "failed to start launcher"
                );
                LaunchError::SpawnFailed {
                    launcher: launcher.name.clone(),
                    executable: launcher.path.clone(),
                    reason: e.to_string(),
                }
            })?;

        info!(
            launcher_id = launcher.id.get(),
            launcher = %launcher.name,
            ?asset_path,
            ?pid,
            "launcher started"
        );

        Ok(LaunchedProcess {
            pid,
            executable: launcher.path.clone(),
            arguments,
        })
    }
}
