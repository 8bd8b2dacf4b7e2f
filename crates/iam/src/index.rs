use crate::error::{Error, Result};
use crate::paths::IamPaths;
use tokio::fs;
use tracing::debug;

/// The by-access-key index: one relative symlink per key, named by the key
/// itself, resolving to the canonical account file. The symlink filename is
/// the uniqueness witness for access-key identifiers.
#[derive(Debug, Clone)]
pub(crate) struct SymlinkIndex {
    paths: IamPaths,
}

impl SymlinkIndex {
    pub fn new(paths: IamPaths) -> Self {
        Self { paths }
    }

    /// Creates `access_keys/<key>.symlink -> ../accounts/<name>.json`.
    /// Fails if the key is already indexed.
    pub async fn link(&self, access_key: &str, account_name: &str) -> Result<()> {
        let link_path = self.paths.access_key_path(access_key);
        let target = self.paths.symlink_target(account_name);
        fs::symlink(&target, &link_path)
            .await
            .map_err(|e| Error::from_io(e, access_key))?;
        debug!(access_key, account = account_name, "indexed access key");
        Ok(())
    }

    pub async fn unlink(&self, access_key: &str, missing_ok: bool) -> Result<()> {
        let link_path = self.paths.access_key_path(access_key);
        match fs::remove_file(&link_path).await {
            Ok(()) => Ok(()),
            Err(e) if missing_ok && e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from_io(e, access_key)),
        }
    }

    /// Reads the account document through the symlink. A missing or dangling
    /// entry surfaces as `NoSuchEntity` on the key.
    pub async fn read_through(&self, access_key: &str) -> Result<Vec<u8>> {
        let link_path = self.paths.access_key_path(access_key);
        fs::read(&link_path).await.map_err(|e| Error::from_io(e, access_key))
    }

    /// Whether an index entry exists for the key, dangling or not.
    pub async fn entry_exists(&self, access_key: &str) -> Result<bool> {
        let link_path = self.paths.access_key_path(access_key);
        match fs::symlink_metadata(&link_path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::from_io(e, access_key)),
        }
    }
}
