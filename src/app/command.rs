//! Raw invocation parsing and execution.
//!
//! Shell menu entries call back into the binary as
//! `run <path> <id>`, `rundefault <path>`, `setdefault <path> <id>` and
//! `removedefault <path>`. Verbs are matched case-insensitively.

use crate::error::{Error, Result};
use crate::extraction::ProgressSink;
use crate::launch::LaunchedProcess;
use crate::types::LauncherId;
use std::path::PathBuf;
use std::sync::Arc;

use super::App;

/// One core operation requested by an invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run a file with a specific launcher
    Run {
        /// Selected file
        path: PathBuf,
        /// Launcher to use
        launcher_id: LauncherId,
    },
    /// Run a file with its folder's default launcher
    RunDefault {
        /// Selected file
        path: PathBuf,
    },
    /// Set a folder's default launcher
    SetDefault {
        /// Selected folder
        folder: String,
        /// Launcher to record
        launcher_id: LauncherId,
    },
    /// Clear a folder's default launcher
    RemoveDefault {
        /// Selected folder
        folder: String,
    },
}

/// What an executed [`Command`] did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A launcher process was started
    Launched(LaunchedProcess),
    /// A default record was written
    DefaultSet {
        /// Folder in absolute form
        folder: String,
        /// Recorded launcher
        launcher_id: LauncherId,
    },
    /// A default record was (or was not) removed
    DefaultRemoved {
        /// Folder in absolute form
        folder: String,
        /// Whether a record existed
        removed: bool,
    },
}

impl Command {
    /// Canonical verbs, lowercase
    pub const VERBS: [&'static str; 4] = ["run", "rundefault", "setdefault", "removedefault"];

    /// Canonical spelling of `verb`, if it is one of [`Command::VERBS`]
    pub fn canonical_verb(verb: &str) -> Option<&'static str> {
        Self::VERBS
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(verb))
    }

    /// Parse `<verb> <args...>`
    ///
    /// ```
    /// use rom_launcher::app::Command;
    /// use rom_launcher::types::LauncherId;
    ///
    /// let cmd = Command::parse(&["RunDefault", "/roms/snes/game.sfc"]).unwrap();
    /// assert_eq!(cmd, Command::RunDefault { path: "/roms/snes/game.sfc".into() });
    ///
    /// let cmd = Command::parse(&["setdefault", "/roms/snes", "3"]).unwrap();
    /// assert_eq!(
    ///     cmd,
    ///     Command::SetDefault { folder: "/roms/snes".into(), launcher_id: LauncherId(3) }
    /// );
    /// ```
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let (verb, rest) = args
            .split_first()
            .ok_or_else(|| invalid("missing command".to_string()))?;
        let verb = verb.as_ref();
        let canonical =
            Self::canonical_verb(verb).ok_or_else(|| invalid(format!("unknown command '{verb}'")))?;

        let rest: Vec<&str> = rest.iter().map(AsRef::as_ref).collect();
        match (canonical, rest.as_slice()) {
            ("run", [path, id]) => Ok(Command::Run {
                path: PathBuf::from(path),
                launcher_id: parse_launcher_id(id)?,
            }),
            ("rundefault", [path]) => Ok(Command::RunDefault {
                path: PathBuf::from(path),
            }),
            ("setdefault", [folder, id]) => Ok(Command::SetDefault {
                folder: folder.to_string(),
                launcher_id: parse_launcher_id(id)?,
            }),
            ("removedefault", [folder]) => Ok(Command::RemoveDefault {
                folder: folder.to_string(),
            }),
            (verb, args) => Err(invalid(format!(
                "wrong number of arguments for '{verb}' (got {})",
                args.len()
            ))),
        }
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidCommand { message }
}

fn absolute_folder(folder: &str) -> Result<String> {
    Ok(std::path::absolute(folder)?.to_string_lossy().into_owned())
}

fn parse_launcher_id(raw: &str) -> Result<LauncherId> {
    raw.parse()
        .map_err(|_| invalid(format!("'{raw}' is not a launcher id")))
}

impl App {
    /// Execute one parsed command
    ///
    /// Relative paths are resolved against the current directory first.
    pub async fn execute(
        &self,
        command: Command,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<CommandOutcome> {
        tracing::debug!(?command, "executing command");

        match command {
            Command::Run { path, launcher_id } => self
                .run(&path, launcher_id, sink)
                .await
                .map(CommandOutcome::Launched),
            Command::RunDefault { path } => self
                .run_default(&path, sink)
                .await
                .map(CommandOutcome::Launched),
            Command::SetDefault {
                folder,
                launcher_id,
            } => {
                let folder = absolute_folder(&folder)?;
                self.set_default(&folder, launcher_id).await?;
                Ok(CommandOutcome::DefaultSet {
                    folder,
                    launcher_id,
                })
            }
            Command::RemoveDefault { folder } => {
                let folder = absolute_folder(&folder)?;
                let removed = self.remove_default(&folder).await?;
                Ok(CommandOutcome::DefaultRemoved { folder, removed })
            }
        }
    }
}
