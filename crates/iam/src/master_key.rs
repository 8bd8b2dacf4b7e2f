use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Narrow interface to the master-key manager. The active key rotates over
/// time; every ciphertext records the id of the key that produced it, so
/// decryption never depends on the current active key.
#[async_trait]
pub trait MasterKeyStore: Send + Sync {
    /// Idempotent; called before first use.
    async fn init(&self) -> Result<()>;
    async fn active_key_id(&self) -> Result<String>;
    async fn encrypt(&self, plaintext: &str, key_id: &str) -> Result<String>;
    async fn decrypt(&self, ciphertext: &str, key_id: &str) -> Result<String>;
}

/// In-process master-key manager holding a rotating set of named symmetric
/// keys. Old keys are retained for decryption after rotation.
#[derive(Default)]
pub struct LocalMasterKeys {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    keys: HashMap<String, [u8; 32]>,
    active: Option<String>,
}

impl LocalMasterKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a new active key, keeping previous keys available.
    pub async fn rotate(&self) -> Result<String> {
        let mut inner = self.inner.write().await;
        let id = mint_key_id();
        let material: [u8; 32] = rand::rng().random();
        inner.keys.insert(id.clone(), material);
        inner.active = Some(id.clone());
        info!(key_id = %id, "rotated active master key");
        Ok(id)
    }

    async fn key_material(&self, key_id: &str) -> Result<[u8; 32]> {
        let inner = self.inner.read().await;
        inner
            .keys
            .get(key_id)
            .copied()
            .ok_or_else(|| Error::ServiceFailure(format!("unknown master key id '{key_id}'")))
    }
}

fn mint_key_id() -> String {
    let mut rng = rand::rng();
    format!("{:016x}", rng.random::<u64>())
}

#[async_trait]
impl MasterKeyStore for LocalMasterKeys {
    async fn init(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.active.is_none() {
            let id = mint_key_id();
            let material: [u8; 32] = rand::rng().random();
            inner.keys.insert(id.clone(), material);
            inner.active = Some(id);
        }
        Ok(())
    }

    async fn active_key_id(&self) -> Result<String> {
        let inner = self.inner.read().await;
        inner
            .active
            .clone()
            .ok_or_else(|| Error::ServiceFailure("master key manager is not initialized".to_owned()))
    }

    async fn encrypt(&self, plaintext: &str, key_id: &str) -> Result<String> {
        let material = self.key_material(key_id).await?;
        let sealed = tidefs_crypto::encrypt_data(&material, plaintext.as_bytes())?;
        Ok(base64_simd::STANDARD.encode_to_string(&sealed))
    }

    async fn decrypt(&self, ciphertext: &str, key_id: &str) -> Result<String> {
        let material = self.key_material(key_id).await?;
        let sealed = base64_simd::STANDARD.decode_to_vec(ciphertext).map_err(Error::other)?;
        let plaintext = tidefs_crypto::decrypt_data(&material, &sealed)?;
        String::from_utf8(plaintext).map_err(Error::other)
    }
}
