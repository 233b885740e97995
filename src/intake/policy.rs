//! Extraction decision sources

use crate::types::ExtractDecision;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

/// Source of the extract / use-archive / abort decision for an archive that
/// has no extracted asset next to it
///
/// This is the only point where intake waits on a person or an injected
/// decision source.
///
/// # Examples
///
/// ```
/// use rom_launcher::intake::{DecisionPolicy, FixedDecision};
/// use rom_launcher::types::ExtractDecision;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() {
/// let policy = FixedDecision(ExtractDecision::Extract);
/// assert_eq!(policy.decide(Path::new("game.zip")).await, ExtractDecision::Extract);
/// # }
/// ```
#[async_trait]
pub trait DecisionPolicy: Send + Sync {
    /// Decide what to do with `archive_path`
    async fn decide(&self, archive_path: &Path) -> ExtractDecision;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Policy that always returns the same decision (scripted and headless use)
#[derive(Clone, Copy, Debug)]
pub struct FixedDecision(pub ExtractDecision);

#[async_trait]
impl DecisionPolicy for FixedDecision {
    async fn decide(&self, _archive_path: &Path) -> ExtractDecision {
        self.0
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Policy that asks on the terminal
///
/// `y`/`yes` extracts, `n`/`no` hands the archive to the launcher as-is,
/// anything else (including end of input) aborts.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptDecision;

impl PromptDecision {
    /// Interpret one line of user input
    pub fn parse_answer(answer: &str) -> ExtractDecision {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => ExtractDecision::Extract,
            "n" | "no" => ExtractDecision::UseArchive,
            _ => ExtractDecision::Abort,
        }
    }
}

#[async_trait]
impl DecisionPolicy for PromptDecision {
    async fn decide(&self, archive_path: &Path) -> ExtractDecision {
        let name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive_path.display().to_string());

        let prompt = format!(
            "'{name}' is an archive. Extract it before launching?\n\
             [y] extract  [n] run the archive directly  [c] cancel: "
        );
        let mut stderr = tokio::io::stderr();
        if stderr.write_all(prompt.as_bytes()).await.is_err() || stderr.flush().await.is_err() {
            return ExtractDecision::Abort;
        }

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(0) | Err(_) => ExtractDecision::Abort,
            Ok(_) => {
                let decision = Self::parse_answer(&line);
                debug!(?archive_path, ?decision, "prompt answered");
                decision
            }
        }
    }

    fn name(&self) -> &str {
        "prompt"
    }
}
