use crate::error::{Error, Result};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Substring marking in-flight temp files; directory scans skip names
/// carrying it.
pub(crate) const TMP_FILE_MARKER: &str = ".tmp";

pub(crate) const FILE_MODE: u32 = 0o600;
pub(crate) const DIR_MODE: u32 = 0o700;

/// Atomic create/read/update/delete of small JSON documents.
///
/// Every write lands in a sibling temp file, is flushed, and is renamed into
/// place; readers observe either no file or a complete one.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Fails with `EntityAlreadyExists` when the path is already occupied.
    pub async fn create(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if fs::try_exists(path).await.map_err(|e| Error::from_io(e, &display_name(path)))? {
            return Err(Error::EntityAlreadyExists(display_name(path)));
        }
        self.write_atomic(path, bytes).await
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(|e| Error::from_io(e, &display_name(path)))
    }

    /// Replaces an existing file atomically; the target must already exist.
    pub async fn update(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if !fs::try_exists(path).await.map_err(|e| Error::from_io(e, &display_name(path)))? {
            return Err(Error::NoSuchEntity(display_name(path)));
        }
        self.write_atomic(path, bytes).await
    }

    pub async fn delete(&self, path: &Path, missing_ok: bool) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if missing_ok && e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from_io(e, &display_name(path))),
        }
    }

    /// write-to-temp, fsync, rename, fsync the directory.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::ServiceFailure(format!("path '{}' has no parent directory", path.display())))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::ServiceFailure(format!("path '{}' has no file name", path.display())))?;

        let suffix: String = rand::rng().sample_iter(&Alphanumeric).take(8).map(char::from).collect();
        let tmp_path = parent.join(format!("{file_name}{TMP_FILE_MARKER}.{suffix}"));

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let write = async {
            let mut file = options.open(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, path).await?;
            Ok::<_, std::io::Error>(())
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(Error::from_io(e, &display_name(path)));
        }

        // Make the rename itself durable.
        if let Ok(dir) = fs::File::open(parent).await {
            let _ = dir.sync_all().await;
        }

        debug!(path = %path.display(), bytes = bytes.len(), "wrote config file");
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| path.display().to_string())
}
