// Execution Log
// The single append-only file that captures every script's combined output

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-run log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionLog {
    path: PathBuf,
}

impl ExecutionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove any log left by a previous run and start an empty one
    pub fn reset(&self) -> io::Result<()> {
        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "removing stale execution log");
            fs::remove_file(&self.path)?;
        }
        fs::File::create(&self.path)?;
        Ok(())
    }

    /// Open the log for appending
    pub async fn open_append(&self) -> io::Result<tokio::fs::File> {
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
    }

    /// Full log contents
    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}
