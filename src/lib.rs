//! # rom-launcher
//!
//! Associates asset files (ROMs) with external launcher programs (emulators),
//! unpacks archives on demand and starts the right launcher for a file.
//!
//! ## Design Philosophy
//!
//! rom-launcher is designed to be:
//! - **Idempotent** - An archive is extracted once; later launches reuse the asset
//! - **Headless** - The only interactive point is an injectable [`intake::DecisionPolicy`]
//! - **Store-agnostic** - The application talks to a [`db::LauncherStore`] trait
//! - **Fire-and-forget** - Launchers are started and never awaited
//!
//! ## Quick Start
//!
//! ```no_run
//! use rom_launcher::app::App;
//! use rom_launcher::extraction::NoProgress;
//! use rom_launcher::intake::FixedDecision;
//! use rom_launcher::launcher::LauncherConfig;
//! use rom_launcher::types::ExtractDecision;
//! use rom_launcher::Config;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let app = App::open(&config, Arc::new(FixedDecision(ExtractDecision::Extract))).await?;
//!
//!     let snes9x = LauncherConfig::new(
//!         "Snes9x",
//!         "C:/Emulators/snes9x.exe",
//!         &["sfc", "smc"],
//!         "-fullscreen {romPath}",
//!     );
//!     let id = app.save_launcher(&snes9x).await?;
//!     app.set_default("C:/Roms/SNES", id).await?;
//!
//!     // Extracts the archive next to itself if needed, then starts Snes9x
//!     app.run_default(Path::new("C:/Roms/SNES/Chrono Trigger.zip"), Arc::new(NoProgress))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Application command layer
pub mod app;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Archive classification and extraction
pub mod extraction;
/// Archive intake engine
pub mod intake;
/// Default-launcher invocation log
pub mod invocation_log;
/// Launch dispatch
pub mod launch;
/// Launcher configuration and validation
pub mod launcher;
/// Default-launcher resolution
pub mod resolver;
/// Candidate asset scanning
pub mod scanner;
/// Shell context-menu plan
pub mod shell;
/// Core types
pub mod types;

// Re-export commonly used types
pub use app::{App, Command, CommandOutcome};
pub use config::Config;
pub use db::{Database, LauncherStore};
pub use error::{
    ArchiveError, DatabaseError, Error, IntakeError, LaunchError, Result, ToExitCode,
};
pub use intake::{ArchiveIntake, DecisionPolicy, FixedDecision, PromptDecision};
pub use launch::{Dispatcher, LaunchedProcess, ProcessSpawner, SystemSpawner};
pub use launcher::LauncherConfig;
pub use types::{
    ArchiveResolution, DefaultLauncherRecord, ExtractDecision, ExtractionProgress, LauncherId,
};
