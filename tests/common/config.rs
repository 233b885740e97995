//! Test application setup: temp database, recording spawner, fixed decision

use rom_launcher::config::LaunchConfig;
use rom_launcher::{
    App, ArchiveIntake, Config, Database, Dispatcher, ExtractDecision, FixedDecision,
    LauncherConfig, LauncherId, ProcessSpawner,
};
use rom_launcher::invocation_log::InvocationLog;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Spawner that records every launch instead of starting a process
#[derive(Default)]
pub struct RecordingSpawner {
    launches: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingSpawner {
    /// Every (executable, arguments) pair seen so far
    pub fn launches(&self) -> Vec<(PathBuf, String)> {
        self.launches.lock().unwrap().clone()
    }
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn(&self, executable: &Path, arguments: &str) -> std::io::Result<Option<u32>> {
        self.launches
            .lock()
            .unwrap()
            .push((executable.to_path_buf(), arguments.to_string()));
        Ok(None)
    }
}

/// A test application and the directories it works in
pub struct TestEnv {
    pub app: App,
    pub spawner: Arc<RecordingSpawner>,
    pub config: Config,
    pub roms: PathBuf,
    pub temp_dir: TempDir,
}

/// Config pointing every path into `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.persistence.database_path = root.join("data").join("launchers.db");
    config.extraction.poll_interval = Duration::from_millis(5);
    config.logging.invocation_log = Some(root.join("data").join("invocations.log"));
    config
}

/// Build a test application whose decision policy always answers `decision`
pub async fn create_test_env(decision: ExtractDecision) -> TestEnv {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = test_config(temp_dir.path());

    let db = Database::new(&config.persistence.database_path)
        .await
        .unwrap();
    let spawner = Arc::new(RecordingSpawner::default());

    let app = App::new(
        Arc::new(db),
        ArchiveIntake::from_config(Arc::new(FixedDecision(decision)), &config.extraction),
        Dispatcher::new(spawner.clone()),
        InvocationLog::new(config.logging.invocation_log.clone()),
        LaunchConfig::default(),
    );

    let roms = temp_dir.path().join("roms");
    std::fs::create_dir_all(&roms).unwrap();

    TestEnv {
        app,
        spawner,
        config,
        roms,
        temp_dir,
    }
}

impl TestEnv {
    /// Save a launcher whose executable exists on disk
    pub async fn add_launcher(&self, name: &str, extensions: &[&str]) -> LauncherId {
        let exe = create_executable(self.temp_dir.path(), name);
        let launcher = LauncherConfig::new(name, exe, extensions, "{romPath}");
        self.app.save_launcher(&launcher).await.unwrap()
    }

    /// The roms directory as a string, for default-launcher records
    pub fn roms_folder(&self) -> String {
        self.roms.to_string_lossy().into_owned()
    }
}

/// Create an empty `<name>.exe` under `root/emulators`
pub fn create_executable(root: &Path, name: &str) -> PathBuf {
    let exe = root
        .join("emulators")
        .join(format!("{}.exe", name.to_lowercase()));
    std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
    std::fs::write(&exe, b"").unwrap();
    exe
}
