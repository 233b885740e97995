//! Error types for rom-launcher
//!
//! This module provides the error taxonomy for the library:
//! - Domain-specific error types (Intake, Launch, Archive, Database)
//! - Exit code mapping for the command-line front end
//! - Machine-readable error codes so presentation layers can pick their own wording
//! - Context information (archive path, extension, launcher name, etc.)

use crate::types::LauncherId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rom-launcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rom-launcher
///
/// Each variant carries enough context for a human-facing layer to render a
/// useful message. The library never shows UI itself.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "extraction.poll_interval")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Archive intake failed (ambiguous match, aborted, extraction error, ...)
    #[error("archive intake error: {0}")]
    Intake(#[from] IntakeError),

    /// Launcher dispatch failed
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Archive decompression failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Launcher configuration failed validation
    #[error("launcher '{name}' is invalid: {}", format_issues(.issues))]
    InvalidLauncher {
        /// Display name of the rejected launcher (may be empty)
        name: String,
        /// Every problem found, one per field
        issues: Vec<ValidationIssue>,
    },

    /// No default launcher is configured for the folder or any of its ancestors
    #[error("no default launcher configured for {folder}")]
    NoDefaultLauncher {
        /// The folder that was resolved
        folder: String,
    },

    /// Command-line invocation could not be parsed
    #[error("invalid command: {message}")]
    InvalidCommand {
        /// What was wrong with the invocation
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single launcher validation problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field the problem belongs to ("name", "path", "extensions", "arguments")
    pub field: &'static str,
    /// Human-readable description
    pub message: String,
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., unknown launcher id in a default record)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Archive intake failures
#[derive(Debug, Error)]
pub enum IntakeError {
    /// More than one asset shares the archive's base name
    #[error("{} assets named '{base_name}' found for {archive}; run the desired one directly", .matches.len())]
    ClassificationAmbiguous {
        /// The archive being resolved
        archive: PathBuf,
        /// The archive's base name (compound `.tar` suffix stripped)
        base_name: String,
        /// Every candidate that matched
        matches: Vec<PathBuf>,
    },

    /// Extraction succeeded but produced no asset with the archive's base name
    #[error("no compatible asset named '{base_name}' was extracted from {archive}")]
    NoCompatibleAsset {
        /// The archive that was extracted
        archive: PathBuf,
        /// The base name that was searched for
        base_name: String,
    },

    /// Underlying decompression failed
    #[error("failed to extract {format} archive {archive}: {source}")]
    ExtractionFailed {
        /// The archive that failed to extract
        archive: PathBuf,
        /// Format name (e.g. "zip", "tar.gz")
        format: String,
        /// The original cause
        #[source]
        source: Box<Error>,
    },

    /// The decision policy chose to abort
    #[error("intake of {archive} was aborted")]
    UserAborted {
        /// The archive the user declined to process
        archive: PathBuf,
    },

    /// Archive rename failed (non-fatal, logged only)
    #[error("failed to rename {from} to {to}: {reason}")]
    RenameFailed {
        /// Current archive path
        from: PathBuf,
        /// Desired archive path
        to: PathBuf,
        /// The reason the rename failed
        reason: String,
    },
}

/// Launch dispatch failures
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Asset extension is not accepted by the launcher
    #[error("launcher '{launcher}' does not accept '.{extension}' files ({asset})")]
    UnsupportedFormat {
        /// Launcher display name
        launcher: String,
        /// Normalized extension of the asset (may be empty)
        extension: String,
        /// The asset that was rejected
        asset: PathBuf,
    },

    /// Referenced launcher id does not exist
    #[error("launcher {id} not found")]
    LauncherNotFound {
        /// The missing id
        id: LauncherId,
    },

    /// The launcher executable could not be started
    #[error("failed to start launcher '{launcher}' ({executable}): {reason}")]
    SpawnFailed {
        /// Launcher display name
        launcher: String,
        /// Executable that was started
        executable: PathBuf,
        /// The reason the process could not be started
        reason: String,
    },
}

/// Per-format decompression failures
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive could not be read or decoded
    #[error("corrupt {format} archive {archive}: {reason}")]
    Corrupt {
        /// The archive being read
        archive: PathBuf,
        /// Format name
        format: String,
        /// Decoder error text
        reason: String,
    },

    /// The extension classifies as an archive but no extractor exists for it
    #[error("no extractor available for '.{extension}' archives ({archive})")]
    UnsupportedFormat {
        /// The archive being read
        archive: PathBuf,
        /// The archive's extension
        extension: String,
    },

    /// The blocking extraction task panicked or was cancelled
    #[error("extraction task for {archive} failed: {reason}")]
    TaskFailed {
        /// The archive being extracted
        archive: PathBuf,
        /// Join error text
        reason: String,
    },
}

/// Map errors to process exit codes for the command-line front end
///
/// The CLI counterpart of an HTTP status mapping: presentation layers pick the
/// wording, the library only guarantees the kind.
pub trait ToExitCode {
    /// Process exit code for this error
    fn exit_code(&self) -> i32;

    /// Machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> i32 {
        match self {
            // 2: invalid input or configuration
            Error::Config { .. } => 2,
            Error::InvalidLauncher { .. } => 2,
            Error::InvalidCommand { .. } => 2,

            // 3: nothing to run
            Error::NoDefaultLauncher { .. } => 3,
            Error::Launch(LaunchError::LauncherNotFound { .. }) => 3,

            // 4: asset rejected by the launcher
            Error::Launch(LaunchError::UnsupportedFormat { .. }) => 4,

            // 5: intake could not settle on a single asset
            Error::Intake(IntakeError::ClassificationAmbiguous { .. }) => 5,
            Error::Intake(IntakeError::NoCompatibleAsset { .. }) => 5,

            // 6: extraction failures
            Error::Intake(IntakeError::ExtractionFailed { .. }) => 6,
            Error::Archive(_) => 6,

            // 130: user cancelled (same as SIGINT convention)
            Error::Intake(IntakeError::UserAborted { .. }) => 130,

            // 1: everything else
            Error::Intake(IntakeError::RenameFailed { .. }) => 1,
            Error::Launch(LaunchError::SpawnFailed { .. }) => 1,
            Error::Database(_) => 1,
            Error::Sqlx(_) => 1,
            Error::Io(_) => 1,
            Error::Serialization(_) => 1,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) => "database_error",
            Error::Sqlx(_) => "database_error",
            Error::Intake(e) => match e {
                IntakeError::ClassificationAmbiguous { .. } => "classification_ambiguous",
                IntakeError::NoCompatibleAsset { .. } => "no_compatible_asset",
                IntakeError::ExtractionFailed { .. } => "extraction_failed",
                IntakeError::UserAborted { .. } => "user_aborted",
                IntakeError::RenameFailed { .. } => "rename_failed",
            },
            Error::Launch(e) => match e {
                LaunchError::UnsupportedFormat { .. } => "unsupported_format",
                LaunchError::LauncherNotFound { .. } => "launcher_not_found",
                LaunchError::SpawnFailed { .. } => "spawn_failed",
            },
            Error::Archive(e) => match e {
                ArchiveError::Corrupt { .. } => "corrupt_archive",
                ArchiveError::UnsupportedFormat { .. } => "unsupported_archive",
                ArchiveError::TaskFailed { .. } => "extraction_task_failed",
            },
            Error::InvalidLauncher { .. } => "invalid_launcher",
            Error::InvalidCommand { .. } => "invalid_command",
            Error::NoDefaultLauncher { .. } => "no_default_launcher",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}
