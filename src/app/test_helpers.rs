//! Shared test helpers for building App instances in tests.

use crate::app::App;
use crate::config::LaunchConfig;
use crate::db::Database;
use crate::intake::{ArchiveIntake, FixedDecision};
use crate::invocation_log::InvocationLog;
use crate::launch::{Dispatcher, ProcessSpawner};
use crate::launcher::LauncherConfig;
use crate::types::{ExtractDecision, LauncherId};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Spawner that records launches instead of starting processes
#[derive(Default)]
pub(crate) struct RecordingSpawner {
    pub(crate) launches: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingSpawner {
    pub(crate) fn launches(&self) -> Vec<(PathBuf, String)> {
        self.launches.lock().unwrap().clone()
    }
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn(&self, executable: &Path, arguments: &str) -> std::io::Result<Option<u32>> {
        self.launches
            .lock()
            .unwrap()
            .push((executable.to_path_buf(), arguments.to_string()));
        Ok(Some(4242))
    }
}

pub(crate) struct TestApp {
    pub(crate) app: App,
    pub(crate) spawner: Arc<RecordingSpawner>,
    pub(crate) roms: PathBuf,
    pub(crate) invocation_log: PathBuf,
    pub(crate) temp_dir: TempDir,
}

/// App backed by a fresh database in a temp dir, a recording spawner and a
/// fixed extraction decision
pub(crate) async fn create_test_app(decision: ExtractDecision) -> TestApp {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = Database::new(&temp_dir.path().join("launchers.db"))
        .await
        .unwrap();

    let roms = temp_dir.path().join("roms");
    std::fs::create_dir_all(&roms).unwrap();

    let invocation_log = temp_dir.path().join("logs").join("invocations.log");
    let spawner = Arc::new(RecordingSpawner::default());

    let app = App::new(
        Arc::new(db),
        ArchiveIntake::new(Arc::new(FixedDecision(decision)), Duration::from_millis(10)),
        Dispatcher::new(spawner.clone()),
        InvocationLog::new(Some(invocation_log.clone())),
        LaunchConfig::default(),
    );

    TestApp {
        app,
        spawner,
        roms,
        invocation_log,
        temp_dir,
    }
}

impl TestApp {
    /// Save a valid launcher whose executable exists in the temp dir
    pub(crate) async fn add_launcher(&self, name: &str, extensions: &[&str]) -> LauncherId {
        let exe = self
            .temp_dir
            .path()
            .join("emulators")
            .join(format!("{}.exe", name.to_lowercase()));
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        std::fs::write(&exe, b"").unwrap();

        let launcher = LauncherConfig::new(name, exe, extensions, "-f {romPath}");
        self.app.save_launcher(&launcher).await.unwrap()
    }

    /// Create a file under the roms directory
    pub(crate) fn rom(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.roms.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }
}

/// Write a zip archive with the given entries
pub(crate) fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    use std::io::Write;

    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}
