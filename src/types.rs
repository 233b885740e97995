//! Core types for rom-launcher

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unique identifier for a launcher
///
/// `0` means the launcher has not been saved yet; the record store assigns a
/// real id on first save.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LauncherId(pub i64);

impl LauncherId {
    /// Id carried by launchers that have never been persisted
    pub const UNSAVED: LauncherId = LauncherId(0);

    /// Create a new LauncherId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Whether this id has not been assigned by the record store
    pub fn is_unsaved(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for LauncherId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<LauncherId> for i64 {
    fn from(id: LauncherId) -> Self {
        id.0
    }
}

impl std::fmt::Display for LauncherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LauncherId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for LauncherId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for LauncherId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for LauncherId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Folder-path to launcher association used for longest-prefix resolution
///
/// `folder_path` is always stored in normalized forward-slash form
/// (see [`crate::resolver::normalize_folder_path`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DefaultLauncherRecord {
    /// Normalized folder path (unique key)
    pub folder_path: String,
    /// Launcher used for every descendant without a more specific record
    pub launcher_id: LauncherId,
}

/// Outcome of a successful archive intake
///
/// Failures are reported through [`crate::error::IntakeError`] instead of a flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveResolution {
    /// The single runnable asset (owned by the filesystem, not the engine)
    pub asset_path: PathBuf,
    /// Whether the selected file itself should be handed to the launcher
    pub use_original_archive: bool,
}

impl ArchiveResolution {
    /// Resolution that hands the selected file to the launcher unchanged
    pub fn original(path: impl Into<PathBuf>) -> Self {
        Self {
            asset_path: path.into(),
            use_original_archive: true,
        }
    }

    /// Resolution pointing at an extracted (or previously extracted) asset
    pub fn extracted(path: impl Into<PathBuf>) -> Self {
        Self {
            asset_path: path.into(),
            use_original_archive: false,
        }
    }
}

/// Snapshot of an in-flight extraction
///
/// Transient: superseded by the next sample and discarded once extraction ends.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtractionProgress {
    /// Estimated completion in [0, 100]; below 100 until completion is confirmed
    pub percentage: f64,
    /// Name(s) of the file(s) still being written
    pub current_file: String,
    /// Bytes found on disk so far
    pub current_bytes: u64,
    /// Bytes expected once extraction completes
    pub total_bytes: u64,
}

impl ExtractionProgress {
    /// Whether this is the terminal sample of an extraction
    pub fn is_complete(&self) -> bool {
        self.percentage >= 100.0
    }
}

/// Answer from the decision policy when an archive has no extracted asset yet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractDecision {
    /// Extract next to the archive, then resolve the asset
    Extract,
    /// Hand the archive itself to the launcher
    UseArchive,
    /// Stop without launching anything
    Abort,
}
