//! Artifact persistence behind a pluggable trait.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Destination for fetched artifact bytes
///
/// Saving is fire-and-forget from the coordinator's point of view: a failed
/// save fails the item, it is never retried.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist artifact bytes under the suggested filename
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<()>;
}

/// Sink that writes artifacts into a directory on the local filesystem
///
/// The directory is created on first use. Existing files with the same name
/// are overwritten; artifact names are deterministic per certificate, so a
/// re-run replaces stale copies instead of accumulating duplicates.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this sink writes into
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    self.dir.display(),
                    e
                ),
            ))
        })?;

        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write artifact '{}': {}", path.display(), e),
            ))
        })?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Artifact saved");
        Ok(())
    }
}
