use crate::cache::AccountCache;
use crate::error::{Error, Result};
use crate::index::SymlinkIndex;
use crate::master_key::MasterKeyStore;
use crate::paths::{ACCOUNT_EXT, IamPaths, SYMLINK_EXT};
use crate::store::{ConfigStore, TMP_FILE_MARKER};
use crate::types::Account;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;
use tracing::info;

/// Upper bound on in-flight account reads during directory scans.
pub(crate) const MAX_CONCURRENT_READS: usize = 10;

/// The identity store. One instance per configuration root; operations are
/// fully asynchronous and carry no in-process locks, so concurrent writers
/// to the same account race on the final rename and the loser's write is
/// dropped.
#[derive(Clone)]
pub struct IamSys {
    pub(crate) paths: IamPaths,
    pub(crate) store: ConfigStore,
    pub(crate) index: SymlinkIndex,
    pub(crate) master_keys: Arc<dyn MasterKeyStore>,
    pub(crate) cache: Arc<dyn AccountCache>,
}

impl IamSys {
    /// Opens the store, creating `accounts/` and `access_keys/` under the
    /// configuration root when absent.
    pub async fn new(
        config_root: impl Into<PathBuf>,
        master_keys: Arc<dyn MasterKeyStore>,
        cache: Arc<dyn AccountCache>,
    ) -> Result<Self> {
        let paths = IamPaths::new(config_root);

        for dir in [paths.accounts_dir(), paths.access_keys_dir()] {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(crate::store::DIR_MODE);
            builder
                .create(&dir)
                .await
                .map_err(|e| Error::from_io(e, &dir.display().to_string()))?;
        }

        info!(root = %paths.root().display(), "opened identity store");

        Ok(Self {
            store: ConfigStore::new(),
            index: SymlinkIndex::new(paths.clone()),
            paths,
            master_keys,
            cache,
        })
    }

    pub fn paths(&self) -> &IamPaths {
        &self.paths
    }

    pub(crate) fn parse_account(bytes: &[u8]) -> Result<Account> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub(crate) async fn load_account(&self, name: &str) -> Result<Account> {
        let bytes = self.store.read(&self.paths.account_path(name)).await.map_err(|e| match e {
            Error::NoSuchEntity(_) => Error::NoSuchEntity(format!("user '{name}'")),
            other => other,
        })?;
        Self::parse_account(&bytes)
    }

    pub(crate) async fn account_exists(&self, name: &str) -> Result<bool> {
        fs::try_exists(self.paths.account_path(name))
            .await
            .map_err(|e| Error::from_io(e, name))
    }

    pub(crate) async fn create_account(&self, account: &Account) -> Result<()> {
        account.validate()?;
        let bytes = serde_json::to_vec_pretty(account)?;
        self.store
            .create(&self.paths.account_path(&account.name), &bytes)
            .await
            .map_err(|e| match e {
                Error::EntityAlreadyExists(_) => Error::EntityAlreadyExists(format!("user '{}'", account.name)),
                other => other,
            })
    }

    pub(crate) async fn update_account(&self, account: &Account) -> Result<()> {
        account.validate()?;
        let bytes = serde_json::to_vec_pretty(account)?;
        self.store.update(&self.paths.account_path(&account.name), &bytes).await
    }

    pub(crate) async fn delete_account_file(&self, name: &str) -> Result<()> {
        self.store.delete(&self.paths.account_path(name), false).await
    }

    pub(crate) async fn invalidate_access_keys(&self, keys: &[String]) {
        for key in keys {
            self.cache.invalidate(key).await;
        }
    }

    /// Account names present on disk, temp files excluded.
    pub(crate) async fn list_account_names(&self) -> Result<Vec<String>> {
        let dir = self.paths.accounts_dir();
        let mut entries = fs::read_dir(&dir).await.map_err(|e| Error::from_io(e, "accounts directory"))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::from_io(e, "accounts directory"))? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if name.contains(TMP_FILE_MARKER) {
                continue;
            }
            let Some(stem) = name.strip_suffix(ACCOUNT_EXT) else { continue };
            names.push(stem.to_owned());
        }
        Ok(names)
    }

    /// Reads every account document with bounded concurrency; the first
    /// failing read aborts the whole scan.
    pub(crate) async fn read_all_accounts(&self) -> Result<Vec<Account>> {
        let names = self.list_account_names().await?;

        let mut join_set = JoinSet::new();
        let mut accounts = Vec::with_capacity(names.len());

        for name in names {
            let sys = self.clone();
            join_set.spawn(async move { sys.load_account(&name).await });

            if join_set.len() >= MAX_CONCURRENT_READS {
                if let Some(res) = join_set.join_next().await {
                    accounts.push(res.map_err(|e| Error::ServiceFailure(format!("account read task failed: {e}")))??);
                }
            }
        }

        while let Some(res) = join_set.join_next().await {
            accounts.push(res.map_err(|e| Error::ServiceFailure(format!("account read task failed: {e}")))??);
        }

        Ok(accounts)
    }

    /// Maintenance pass healing both directions of the two-index scheme:
    /// recreates symlinks missing for keys recorded in account files, and
    /// removes symlinks that dangle or whose target no longer lists the key.
    pub async fn reconcile_index(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for account in self.read_all_accounts().await? {
            for key in &account.access_keys {
                if !self.index.entry_exists(&key.access_key).await? {
                    self.index.link(&key.access_key, &account.name).await?;
                    report.relinked += 1;
                }
            }
        }

        let dir = self.paths.access_keys_dir();
        let mut entries = fs::read_dir(&dir).await.map_err(|e| Error::from_io(e, "access_keys directory"))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::from_io(e, "access_keys directory"))? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if name.contains(TMP_FILE_MARKER) {
                continue;
            }
            let Some(access_key) = name.strip_suffix(SYMLINK_EXT) else { continue };

            match self.index.read_through(access_key).await {
                Ok(bytes) => {
                    let account = Self::parse_account(&bytes)?;
                    if account.find_access_key(access_key).is_none() {
                        self.index.unlink(access_key, true).await?;
                        report.removed += 1;
                    }
                }
                Err(Error::NoSuchEntity(_)) => {
                    self.index.unlink(access_key, true).await?;
                    report.removed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(relinked = report.relinked, removed = report.removed, "reconciled access-key index");
        Ok(report)
    }
}

/// Outcome of [`IamSys::reconcile_index`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Symlinks recreated for keys present in account files.
    pub relinked: usize,
    /// Dangling or stale symlinks removed.
    pub removed: usize,
}
