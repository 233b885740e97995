//! rom-launcher command-line front end
//!
//! Shell menu entries invoke `run`, `rundefault`, `setdefault` and
//! `removedefault`; the remaining subcommands manage launchers and the menu.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rom_launcher::app::{App, Command, CommandOutcome};
use rom_launcher::config::Config;
use rom_launcher::error::ToExitCode;
use rom_launcher::extraction::ProgressSink;
use rom_launcher::intake::{DecisionPolicy, FixedDecision, PromptDecision};
use rom_launcher::launcher::{LauncherConfig, join_extensions, parse_extensions};
use rom_launcher::shell::{ManifestRegistrar, ShellRegistrar};
use rom_launcher::types::{ExtractDecision, ExtractionProgress, LauncherId};
use rom_launcher::{Error, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Bar length; positions are hundredths of a percent
const BAR_RESOLUTION: u64 = 10_000;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] {wide_bar:.cyan/blue} {percent:>3}% {wide_msg}";

#[derive(Debug, Parser)]
#[command(name = "rom-launcher", version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON); defaults apply when it does not exist
    #[arg(long, global = true, default_value = "rom-launcher.json")]
    config: PathBuf,

    /// What to do with an archive that has not been extracted yet
    #[arg(long, global = true, value_enum, default_value_t = OnArchive::Ask)]
    on_archive: OnArchive,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OnArchive {
    /// Prompt on the terminal
    Ask,
    /// Extract next to the archive
    Extract,
    /// Hand the archive to the launcher as-is
    Direct,
    /// Stop without launching
    Abort,
}

impl OnArchive {
    fn policy(self) -> Arc<dyn DecisionPolicy> {
        match self {
            OnArchive::Ask => Arc::new(PromptDecision),
            OnArchive::Extract => Arc::new(FixedDecision(ExtractDecision::Extract)),
            OnArchive::Direct => Arc::new(FixedDecision(ExtractDecision::UseArchive)),
            OnArchive::Abort => Arc::new(FixedDecision(ExtractDecision::Abort)),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a file with a specific launcher
    Run {
        /// File to run (archives are resolved first)
        path: PathBuf,
        /// Launcher id
        launcher_id: LauncherId,
    },
    /// Run a file with its folder's default launcher
    #[command(name = "rundefault")]
    RunDefault {
        /// File to run (archives are resolved first)
        path: PathBuf,
    },
    /// Set the default launcher for a folder and its subfolders
    #[command(name = "setdefault")]
    SetDefault {
        /// Folder
        folder: String,
        /// Launcher id
        launcher_id: LauncherId,
    },
    /// Remove the default launcher recorded for a folder
    #[command(name = "removedefault")]
    RemoveDefault {
        /// Folder
        folder: String,
    },
    /// List launchers
    List,
    /// Add a launcher, or update one with --id
    Add {
        /// Existing launcher to update
        #[arg(long)]
        id: Option<LauncherId>,
        /// Display name
        #[arg(long)]
        name: String,
        /// Launcher executable
        #[arg(long)]
        path: PathBuf,
        /// Accepted extensions, separated by ';'
        #[arg(long)]
        extensions: String,
        /// Argument template; {romPath} and {exePath} are replaced with quoted paths
        #[arg(long, default_value = "{romPath}")]
        arguments: String,
    },
    /// Delete a launcher and the folder defaults that use it
    Remove {
        /// Launcher id
        launcher_id: LauncherId,
    },
    /// List folder default launchers
    Defaults,
    /// Write (or remove) the shell menu manifest
    Register {
        /// Manifest location
        #[arg(long, default_value = "rom-launcher-menu.json")]
        manifest: PathBuf,
        /// Remove the manifest instead
        #[arg(long)]
        unregister: bool,
    },
}

/// Renders extraction progress on stderr
struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    fn new() -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        Self {
            bar: ProgressBar::new(BAR_RESOLUTION).with_style(style),
        }
    }

    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ProgressSink for ProgressBarSink {
    fn report(&self, progress: ExtractionProgress) {
        let position = (progress.percentage * 100.0).round() as u64;
        self.bar.set_position(position.min(BAR_RESOLUTION));

        if progress.is_complete() {
            self.bar.finish_with_message(progress.current_file);
        } else {
            self.bar.set_message(progress.current_file);
        }
    }
}

/// Lowercase the subcommand so shell invocations like `RunDefault` parse
fn canonicalize_verb(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    let mut expects_value = false;

    for arg in args.iter_mut().skip(1) {
        if expects_value {
            expects_value = false;
            continue;
        }
        let Some(text) = arg.to_str() else { break };
        if text == "--config" || text == "--on-archive" {
            expects_value = true;
            continue;
        }
        if text.starts_with('-') {
            continue;
        }
        if let Some(verb) = Command::canonical_verb(text) {
            *arg = OsString::from(verb);
        }
        break;
    }

    args
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_outcome(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Launched(process) => match process.pid {
            Some(pid) => println!("started {} (pid {pid})", process.executable.display()),
            None => println!("started {}", process.executable.display()),
        },
        CommandOutcome::DefaultSet {
            folder,
            launcher_id,
        } => println!("default launcher for {folder} set to {launcher_id}"),
        CommandOutcome::DefaultRemoved { folder, removed } => {
            if *removed {
                println!("default launcher for {folder} removed");
            } else {
                println!("no default launcher was recorded for {folder}");
            }
        }
    }
}

async fn execute(cli: Cli, config: Config) -> Result<()> {
    let app = App::open(&config, cli.on_archive.policy()).await?;

    let command = match cli.command {
        Commands::Run { path, launcher_id } => Command::Run { path, launcher_id },
        Commands::RunDefault { path } => Command::RunDefault { path },
        Commands::SetDefault {
            folder,
            launcher_id,
        } => Command::SetDefault {
            folder,
            launcher_id,
        },
        Commands::RemoveDefault { folder } => Command::RemoveDefault { folder },
        Commands::List => {
            for launcher in app.list_launchers().await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    launcher.id,
                    launcher.name,
                    launcher.path.display(),
                    join_extensions(&launcher.extensions),
                    launcher.arguments
                );
            }
            return Ok(());
        }
        Commands::Add {
            id,
            name,
            path,
            extensions,
            arguments,
        } => {
            let launcher = LauncherConfig {
                id: id.unwrap_or(LauncherId::UNSAVED),
                name,
                path,
                extensions: parse_extensions(&extensions),
                arguments,
            };
            let id = app.save_launcher(&launcher).await?;
            println!("saved launcher {id}");
            return Ok(());
        }
        Commands::Remove { launcher_id } => {
            if app.delete_launcher(launcher_id).await? {
                println!("removed launcher {launcher_id}");
            } else {
                println!("launcher {launcher_id} does not exist");
            }
            return Ok(());
        }
        Commands::Defaults => {
            for record in app.list_defaults().await? {
                println!("{}\t{}", record.folder_path, record.launcher_id);
            }
            return Ok(());
        }
        Commands::Register {
            manifest,
            unregister,
        } => {
            let registrar = ManifestRegistrar::new(manifest);
            if unregister {
                registrar.unregister().await?;
                println!("removed {}", registrar.path().display());
            } else {
                let app_executable = std::env::current_exe()?;
                let menu = app.register_shell(&registrar, &app_executable).await?;
                println!(
                    "wrote {} menu entries to {}",
                    menu.entries().count(),
                    registrar.path().display()
                );
            }
            return Ok(());
        }
    };

    let sink = Arc::new(ProgressBarSink::new());
    let result = app.execute(command, sink.clone()).await;
    sink.clear();

    print_outcome(&result?);
    Ok(())
}

fn exit_code(error: &Error) -> ExitCode {
    ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(1))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(canonicalize_verb(std::env::args_os()));

    let config = match Config::load(&cli.config).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_code(&e);
        }
    };

    init_tracing(&config.logging.filter);

    match execute(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, code = e.error_code(), "command failed");
            eprintln!("error: {e}");
            exit_code(&e)
        }
    }
}
