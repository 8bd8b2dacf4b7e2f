use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;
use tidefs_iam::{Account, AccountCache, IamSys, LocalMasterKeys, NsfsAccountConfig, Session};
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Records every invalidation pushed by the store.
#[derive(Default)]
pub struct RecordingCache {
    pub invalidated: Mutex<Vec<String>>,
}

#[async_trait]
impl AccountCache for RecordingCache {
    async fn invalidate(&self, access_key: &str) {
        self.invalidated.lock().await.push(access_key.to_owned());
    }
}

pub struct Harness {
    // Held for its Drop; the store lives inside it.
    pub root_dir: TempDir,
    pub sys: IamSys,
    pub master_keys: Arc<LocalMasterKeys>,
    pub cache: Arc<RecordingCache>,
}

pub async fn harness() -> Harness {
    let root_dir = TempDir::new().expect("temp dir");
    let master_keys = Arc::new(LocalMasterKeys::new());
    let cache = Arc::new(RecordingCache::default());
    let sys = IamSys::new(root_dir.path(), master_keys.clone(), cache.clone())
        .await
        .expect("open store");
    Harness {
        root_dir,
        sys,
        master_keys,
        cache,
    }
}

pub fn root_account(id: &str, name: &str) -> Account {
    Account {
        id: id.to_owned(),
        name: name.to_owned(),
        email: name.to_owned(),
        creation_date: OffsetDateTime::now_utc(),
        owner: None,
        creator: None,
        iam_path: Some("/".to_owned()),
        master_key_id: None,
        allow_bucket_creation: true,
        force_md5_etag: false,
        access_keys: Vec::new(),
        nsfs_account_config: NsfsAccountConfig {
            uid: Some(1000),
            gid: Some(1000),
            ..Default::default()
        },
    }
}

/// Roots predate the store and are written directly, emulating external
/// bootstrap.
pub async fn bootstrap_root(harness: &Harness, id: &str, name: &str) -> Session {
    let account = root_account(id, name);
    write_account(harness, &account).await;
    Session::new(account)
}

pub async fn write_account(harness: &Harness, account: &Account) {
    let bytes = serde_json::to_vec_pretty(account).expect("serialize account");
    tokio::fs::write(harness.sys.paths().account_path(&account.name), bytes)
        .await
        .expect("write account file");
}

pub async fn read_account(harness: &Harness, name: &str) -> Account {
    let bytes = tokio::fs::read(harness.sys.paths().account_path(name))
        .await
        .expect("read account file");
    serde_json::from_slice(&bytes).expect("parse account file")
}

/// Reloads an on-disk user record into a fresh session, as the session
/// layer would after authenticating that user.
pub async fn session_as(harness: &Harness, name: &str) -> Session {
    Session::new(read_account(harness, name).await)
}

pub const ROOT_1: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";
pub const ROOT_2: &str = "bbbbbbbbbbbbbbbbbbbbbbbb";
