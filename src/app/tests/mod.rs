use super::test_helpers::*;
use crate::app::{Command, CommandOutcome};
use crate::error::{Error, IntakeError, LaunchError};
use crate::extraction::NoProgress;
use crate::launcher::LauncherConfig;
use crate::types::{ExtractDecision, LauncherId};
use std::path::Path;
use std::sync::Arc;


fn no_progress() -> Arc<NoProgress> {
    Arc::new(NoProgress)
}

fn folder_of(path: &Path) -> String {
    path.parent().unwrap().to_string_lossy().into_owned()
}
