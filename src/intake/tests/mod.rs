use crate::error::{ArchiveError, Error, IntakeError};
use crate::extraction::NoProgress;
use crate::intake::*;
use crate::types::{ArchiveResolution, ExtractDecision};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Policy that records how often it was consulted
struct CountingPolicy {
    decision: ExtractDecision,
    calls: AtomicUsize,
}

impl CountingPolicy {
    fn new(decision: ExtractDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionPolicy for CountingPolicy {
    async fn decide(&self, _archive_path: &Path) -> ExtractDecision {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.decision
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn intake(policy: Arc<dyn DecisionPolicy>) -> ArchiveIntake {
    ArchiveIntake::new(policy, Duration::from_millis(5))
}

fn extensions(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

async fn handle(
    engine: &ArchiveIntake,
    archive_path: &Path,
    accepted: &[&str],
) -> crate::Result<ArchiveResolution> {
    engine
        .handle_archive(archive_path, &extensions(accepted), Arc::new(NoProgress))
        .await
}

// ---------------------------------------------------------------------------
// Pass-through and short-circuit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_archive_is_used_as_is_without_touching_disk() {
    let policy = CountingPolicy::new(ExtractDecision::Extract);
    let engine = intake(policy.clone());
    let path = Path::new("/does/not/exist/game.sfc");

    let resolution = handle(&engine, path, &["sfc"]).await.unwrap();

    assert_eq!(resolution, ArchiveResolution::original(path));
    assert!(resolution.use_original_archive);
    assert_eq!(policy.calls(), 0);
}

#[tokio::test]
async fn existing_asset_short_circuits_extraction() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("Game.zip");
    // Not a valid zip: any extraction attempt would fail
    std::fs::write(&archive, b"not a zip").unwrap();
    std::fs::write(temp_dir.path().join("Game.sfc"), b"rom").unwrap();

    let policy = CountingPolicy::new(ExtractDecision::Extract);
    let engine = intake(policy.clone());

    let resolution = handle(&engine, &archive, &["sfc"]).await.unwrap();

    assert_eq!(
        resolution,
        ArchiveResolution::extracted(temp_dir.path().join("Game.sfc"))
    );
    assert_eq!(policy.calls(), 0);
    assert!(archive.exists());
}

#[tokio::test]
async fn existing_asset_in_subdirectory_matches() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("disc.7z");
    std::fs::write(&archive, b"7z").unwrap();
    std::fs::create_dir(temp_dir.path().join("disc")).unwrap();
    std::fs::write(temp_dir.path().join("disc").join("disc.cue"), b"cue").unwrap();

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Abort)));

    let resolution = handle(&engine, &archive, &["cue"]).await.unwrap();

    assert_eq!(resolution.asset_path, temp_dir.path().join("disc").join("disc.cue"));
}

#[tokio::test]
async fn existing_asset_with_other_case_renames_archive() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("mario.zip");
    std::fs::write(&archive, b"zip").unwrap();
    std::fs::write(temp_dir.path().join("Mario.sfc"), b"rom").unwrap();

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Abort)));

    let resolution = handle(&engine, &archive, &["sfc"]).await.unwrap();

    assert_eq!(resolution.asset_path, temp_dir.path().join("Mario.sfc"));
    let names: Vec<String> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"Mario.zip".to_string()), "{names:?}");
    assert!(!names.contains(&"mario.zip".to_string()), "{names:?}");
}

#[tokio::test]
async fn archive_itself_is_never_a_candidate() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    std::fs::write(&archive, b"zip").unwrap();

    let policy = CountingPolicy::new(ExtractDecision::UseArchive);
    let engine = intake(policy.clone());

    let resolution = handle(&engine, &archive, &["zip"]).await.unwrap();

    assert_eq!(resolution, ArchiveResolution::original(&archive));
    assert_eq!(policy.calls(), 1);
}

#[tokio::test]
async fn multiple_existing_assets_are_ambiguous() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    std::fs::write(&archive, b"zip").unwrap();
    std::fs::write(temp_dir.path().join("game.nes"), b"rom").unwrap();
    std::fs::write(temp_dir.path().join("GAME.sfc"), b"rom").unwrap();

    let policy = CountingPolicy::new(ExtractDecision::Extract);
    let engine = intake(policy.clone());

    let err = handle(&engine, &archive, &["nes", "sfc"]).await.unwrap_err();

    match err {
        Error::Intake(IntakeError::ClassificationAmbiguous {
            base_name, matches, ..
        }) => {
            assert_eq!(base_name, "game");
            assert_eq!(matches.len(), 2);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(policy.calls(), 0);
    assert!(archive.exists(), "no rename on ambiguity");
}

#[tokio::test]
async fn other_extensions_do_not_count_as_matches() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    std::fs::write(&archive, b"zip").unwrap();
    std::fs::write(temp_dir.path().join("game.txt"), b"notes").unwrap();

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::UseArchive)));

    let resolution = handle(&engine, &archive, &["sfc"]).await.unwrap();

    assert!(resolution.use_original_archive);
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn abort_decision_fails_with_user_aborted() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    create_zip_archive(&archive, &[("game.sfc", &b"rom"[..])]);

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Abort)));

    let err = handle(&engine, &archive, &["sfc"]).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Intake(IntakeError::UserAborted { .. })
    ));
    assert!(!temp_dir.path().join("game.sfc").exists());
}

#[tokio::test]
async fn use_archive_decision_returns_archive() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    create_zip_archive(&archive, &[("game.sfc", &b"rom"[..])]);

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::UseArchive)));

    let resolution = handle(&engine, &archive, &["sfc"]).await.unwrap();

    assert_eq!(resolution, ArchiveResolution::original(&archive));
    assert!(!temp_dir.path().join("game.sfc").exists());
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extract_then_resolve_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("Game (USA).zip");
    create_zip_archive(
        &archive,
        &[("Game (USA).sfc", &b"rom"[..]), ("readme.txt", &b"hi"[..])],
    );

    let policy = CountingPolicy::new(ExtractDecision::Extract);
    let engine = intake(policy.clone());

    let first = handle(&engine, &archive, &["sfc"]).await.unwrap();
    let second = handle(&engine, &archive, &["sfc"]).await.unwrap();

    let expected = ArchiveResolution::extracted(temp_dir.path().join("Game (USA).sfc"));
    assert_eq!(first, expected);
    assert_eq!(second, expected);
    assert_eq!(policy.calls(), 1, "second intake must not re-extract");
}

#[tokio::test]
async fn extracted_asset_with_other_case_renames_archive() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("zelda.tar.gz");
    {
        let file = std::fs::File::create(&archive).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = ::tar::Builder::new(encoder);
        let mut header = ::tar::Header::new_gnu();
        header.set_size(3);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, "Zelda.nes", &b"rom"[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Extract)));

    let resolution = handle(&engine, &archive, &["nes"]).await.unwrap();

    assert_eq!(resolution.asset_path, temp_dir.path().join("Zelda.nes"));
    assert!(!resolution.use_original_archive);
    assert!(temp_dir.path().join("Zelda.tar.gz").exists());
}

#[tokio::test]
async fn extraction_without_matching_asset_fails() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    create_zip_archive(&archive, &[("other.sfc", &b"rom"[..])]);

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Extract)));

    let err = handle(&engine, &archive, &["sfc"]).await.unwrap_err();

    match err {
        Error::Intake(IntakeError::NoCompatibleAsset { base_name, .. }) => {
            assert_eq!(base_name, "game")
        }
        other => panic!("expected no compatible asset, got {other:?}"),
    }
}

#[tokio::test]
async fn extraction_with_several_matches_is_ambiguous() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    create_zip_archive(
        &archive,
        &[("game.sfc", &b"rom"[..]), ("alt/game.sfc", &b"rom"[..])],
    );

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Extract)));

    let err = handle(&engine, &archive, &["sfc"]).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Intake(IntakeError::ClassificationAmbiguous { .. })
    ));
    assert!(archive.exists());
}

#[tokio::test]
async fn corrupt_archive_fails_with_extraction_error() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.zip");
    std::fs::write(&archive, b"garbage").unwrap();

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Extract)));

    let err = handle(&engine, &archive, &["sfc"]).await.unwrap_err();

    match err {
        Error::Intake(IntakeError::ExtractionFailed { format, source, .. }) => {
            assert_eq!(format, "zip");
            assert!(matches!(
                *source,
                Error::Archive(ArchiveError::Corrupt { .. })
            ));
        }
        other => panic!("expected extraction failure, got {other:?}"),
    }
}

#[tokio::test]
async fn archive_without_extractor_fails_with_extraction_error() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("game.cab");
    std::fs::write(&archive, b"cab").unwrap();

    let engine = intake(Arc::new(FixedDecision(ExtractDecision::Extract)));

    let err = handle(&engine, &archive, &["sfc"]).await.unwrap_err();

    match err {
        Error::Intake(IntakeError::ExtractionFailed { format, source, .. }) => {
            assert_eq!(format, "cab");
            assert!(matches!(
                *source,
                Error::Archive(ArchiveError::UnsupportedFormat { .. })
            ));
        }
        other => panic!("expected extraction failure, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Name synchronization
// ---------------------------------------------------------------------------

#[test]
fn synced_archive_path_keeps_compound_suffix() {
    assert_eq!(
        synced_archive_path(Path::new("/roms/game.TAR.GZ"), Path::new("/roms/Game.bin")),
        Some(PathBuf::from("/roms/Game.TAR.GZ"))
    );
    assert_eq!(
        synced_archive_path(Path::new("/roms/mario.zip"), Path::new("/roms/x/Mario.sfc")),
        Some(PathBuf::from("/roms/Mario.zip"))
    );
    assert_eq!(
        synced_archive_path(Path::new("mario.zip"), Path::new("Mario.sfc")),
        Some(PathBuf::from("Mario.zip"))
    );
}

#[test]
fn synced_archive_path_is_none_when_names_agree() {
    assert_eq!(
        synced_archive_path(Path::new("/roms/Game.7z"), Path::new("/roms/Game.n64")),
        None
    );
}
