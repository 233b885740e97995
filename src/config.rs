//! Configuration types for rom-launcher

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration
///
/// Fields are organized into sub-configs:
/// - [`persistence`](PersistenceConfig) — record store location
/// - [`extraction`](ExtractionConfig) — archive extraction behavior
/// - [`launch`](LaunchConfig) — launcher validation rules
/// - [`logging`](LoggingConfig) — log filter and invocation log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record store settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Archive extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Launcher validation settings
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// A missing file yields the default configuration. The loaded value is
    /// validated before it is returned.
    pub async fn load(path: &Path) -> Result<Self> {
        let config = match tokio::fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str::<Config>(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(?path, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(Error::Io(e)),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if self.extraction.poll_interval.is_zero() {
            return Err(Error::Config {
                message: "poll interval must be greater than zero".to_string(),
                key: Some("extraction.poll_interval".to_string()),
            });
        }

        if self.launch.require_exe_suffix
            && self
                .launch
                .executable_suffix
                .trim_start_matches('.')
                .is_empty()
        {
            return Err(Error::Config {
                message: "executable suffix must not be empty when it is required".to_string(),
                key: Some("launch.executable_suffix".to_string()),
            });
        }

        if self.persistence.database_path.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "database path must not be empty".to_string(),
                key: Some("persistence.database_path".to_string()),
            });
        }

        Ok(())
    }
}

/// Record store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path (default: "rom-launcher.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Archive extraction configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Interval between on-disk size samples while extracting (default: 300 ms)
    #[serde(default = "default_poll_interval", with = "duration_millis_serde")]
    pub poll_interval: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

/// Launcher validation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Reject launcher executables without the executable suffix (default: true)
    #[serde(default = "default_true")]
    pub require_exe_suffix: bool,

    /// Required executable suffix, without the dot (default: "exe")
    #[serde(default = "default_executable_suffix")]
    pub executable_suffix: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            require_exe_suffix: true,
            executable_suffix: default_executable_suffix(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// File that records every default-launcher invocation (disabled when None)
    #[serde(default)]
    pub invocation_log: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            invocation_log: None,
        }
    }
}

// Default value functions
fn default_database_path() -> PathBuf {
    PathBuf::from("rom-launcher.db")
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(300)
}

fn default_true() -> bool {
    true
}

fn default_executable_suffix() -> String {
    "exe".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

// Duration serialization helper (milliseconds)
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
