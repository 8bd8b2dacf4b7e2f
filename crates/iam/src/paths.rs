use std::path::{Path, PathBuf};

pub(crate) const ACCOUNTS_DIR: &str = "accounts";
pub(crate) const ACCESS_KEYS_DIR: &str = "access_keys";
pub(crate) const ACCOUNT_EXT: &str = ".json";
pub(crate) const SYMLINK_EXT: &str = ".symlink";

/// Maps entity identifiers to on-disk locations under the configuration
/// root. Names arrive pre-validated from the request parser and are used
/// verbatim.
#[derive(Debug, Clone)]
pub struct IamPaths {
    root: PathBuf,
}

impl IamPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn accounts_dir(&self) -> PathBuf {
        self.root.join(ACCOUNTS_DIR)
    }

    pub fn access_keys_dir(&self) -> PathBuf {
        self.root.join(ACCESS_KEYS_DIR)
    }

    pub fn account_path(&self, name: &str) -> PathBuf {
        self.accounts_dir().join(format!("{name}{ACCOUNT_EXT}"))
    }

    pub fn access_key_path(&self, access_key: &str) -> PathBuf {
        self.access_keys_dir().join(format!("{access_key}{SYMLINK_EXT}"))
    }

    /// Relative symlink target, so the index survives relocation of the
    /// configuration root.
    pub fn symlink_target(&self, account_name: &str) -> PathBuf {
        PathBuf::from(format!("../{ACCOUNTS_DIR}/{account_name}{ACCOUNT_EXT}"))
    }
}
