//! Launcher configuration and validation

use crate::config::LaunchConfig;
use crate::error::{Error, Result, ValidationIssue};
use crate::scanner::normalize_extension;
use crate::types::LauncherId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder replaced with the quoted launcher executable path
pub const EXE_PATH_PLACEHOLDER: &str = "{exePath}";

/// Placeholder replaced with the quoted asset path
pub const ROM_PATH_PLACEHOLDER: &str = "{romPath}";

/// Separator used when an extension list is stored as one string
pub const EXTENSION_SEPARATOR: char = ';';

/// An external program that runs assets
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Record id ([`LauncherId::UNSAVED`] until first save)
    #[serde(default)]
    pub id: LauncherId,
    /// Display name
    pub name: String,
    /// Absolute path to the executable
    pub path: PathBuf,
    /// Accepted asset extensions, normalized (no dots, lowercase)
    pub extensions: Vec<String>,
    /// Argument template containing `{romPath}` and optionally `{exePath}`
    pub arguments: String,
}

/// `^[a-zA-Z0-9]+$`
fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Split a stored or user-entered extension list on `\r`, `\n` and `;`
///
/// Each entry is normalized; blank entries are dropped and duplicates removed
/// with the first occurrence kept.
///
/// ```
/// use rom_launcher::launcher::parse_extensions;
///
/// assert_eq!(parse_extensions("*.SFC; .smc\r\nsfc;;"), vec!["sfc", "smc"]);
/// ```
pub fn parse_extensions(raw: &str) -> Vec<String> {
    normalize_extensions(raw.split(['\r', '\n', EXTENSION_SEPARATOR]))
}

/// Join extensions into the stored `;`-separated form
pub fn join_extensions(extensions: &[String]) -> String {
    extensions.join(&EXTENSION_SEPARATOR.to_string())
}

fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for ext in extensions {
        let ext = normalize_extension(ext.as_ref());
        if !ext.is_empty() && !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }
    normalized
}

impl LauncherConfig {
    /// Create an unsaved launcher
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        extensions: &[&str],
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: LauncherId::UNSAVED,
            name: name.into(),
            path: path.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            arguments: arguments.into(),
        }
    }

    /// Copy with the name trimmed and the extension list normalized and deduplicated
    pub fn normalized(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.trim().to_string(),
            path: self.path.clone(),
            extensions: normalize_extensions(&self.extensions),
            arguments: self.arguments.trim().to_string(),
        }
    }

    /// Whether `extension` (in any spelling) is accepted
    pub fn accepts(&self, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        !ext.is_empty()
            && self
                .extensions
                .iter()
                .any(|accepted| normalize_extension(accepted) == ext)
    }

    /// Every problem with this launcher, at most one per field
    pub fn validation_issues(&self, rules: &LaunchConfig) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut issue = |field: &'static str, message: &str| {
            issues.push(ValidationIssue {
                field,
                message: message.to_string(),
            })
        };

        let name = self.name.trim();
        if name.is_empty() {
            issue("name", "name is required");
        } else if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
            issue("name", "name must contain at least one alphanumeric character");
        }

        let path = self.path.to_string_lossy();
        let required_suffix = format!(".{}", rules.executable_suffix.trim_start_matches('.'));
        if path.trim().is_empty() {
            issue("path", "executable path is required");
        } else if rules.require_exe_suffix
            && !path.to_lowercase().ends_with(&required_suffix.to_lowercase())
        {
            issue("path", &format!("path must point to a {required_suffix} file"));
        } else if !self.path.is_file() {
            issue("path", "executable file does not exist");
        }

        let extensions: Vec<String> = self
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches(['.', '*']).to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if extensions.is_empty() {
            issue("extensions", "at least one file extension is required");
        } else if extensions.iter().any(|e| !is_valid_extension(e)) {
            issue("extensions", "extensions must contain only alphanumeric characters");
        }

        if self.arguments.trim().is_empty() {
            issue("arguments", "execution arguments are required");
        } else if !self.arguments.contains(ROM_PATH_PLACEHOLDER) {
            issue(
                "arguments",
                "arguments must contain the {romPath} placeholder; if unsure, use just {romPath}",
            );
        }

        issues
    }

    /// Check every rule, failing with [`Error::InvalidLauncher`] listing all issues
    pub fn validate(&self, rules: &LaunchConfig) -> Result<()> {
        let issues = self.validation_issues(rules);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidLauncher {
                name: self.name.clone(),
                issues,
            })
        }
    }
}
