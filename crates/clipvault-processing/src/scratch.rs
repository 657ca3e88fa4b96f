//! Scratch files owned by a single ingest run.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A transient file that is deleted when the guard is dropped.
///
/// The guard exists from the moment the path is chosen, so the file is
/// removed on every way out of the owning scope: early returns, panics and
/// a cancelled request future all run `Drop`.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Take ownership of `path`, whether or not it exists yet.
    ///
    /// Used for files another process is about to write.
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write `data` to `dir/name`.
    ///
    /// The guard is registered as soon as the file is created, so a failed
    /// write still removes the partial file.
    pub async fn create(dir: &Path, name: &str, data: &[u8]) -> io::Result<Self> {
        let path = dir.join(name);

        // create_new: names are random, an existing file belongs to someone else
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        let scratch = Self::adopt(path);
        file.write_all(data).await?;
        file.flush().await?;

        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        // Synchronous so the file is gone by the time the owning call returns.
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed scratch file");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove scratch file"
                );
            }
        }
    }
}
