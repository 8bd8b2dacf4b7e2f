// Access-key lifecycle operations on IamSys.

use crate::auth;
use crate::credentials::{generate_credentials, is_secret_key_valid, validate_access_key_id};
use crate::error::{Error, Result};
use crate::sys::IamSys;
use crate::types::{
    AccessKey, AccessKeyLastUsed, AccessKeyStatus, AccessKeyView, Account, AccountKind, CreateAccessKeyResponse,
    CreatorIdentity, ListAccessKeysResponse, MAX_ACCESS_KEYS, Session,
};
use time::OffsetDateTime;
use tracing::info;

impl IamSys {
    /// Mints a key pair for the target user, encrypts the secret under the
    /// active master key, and indexes the key. The plaintext secret exists
    /// only in the returned payload.
    pub async fn create_access_key(&self, session: &Session, username: Option<&str>) -> Result<CreateAccessKeyResponse> {
        let requester = &session.requesting_account;
        let (mut account, creator) = self.resolve_mutable_key_target(session, username, "CreateAccessKey").await?;

        if account.access_keys.len() >= MAX_ACCESS_KEYS {
            return Err(Error::LimitExceeded(format!(
                "user '{}' already has {MAX_ACCESS_KEYS} access keys",
                account.name
            )));
        }

        let (access_key, secret_key) = generate_credentials();
        if self.index.entry_exists(&access_key).await? {
            return Err(Error::ServiceFailure(format!("access key id collision on '{access_key}'")));
        }

        self.master_keys.init().await?;
        let active_key_id = self.master_keys.active_key_id().await?;
        let encrypted_secret_key = self.master_keys.encrypt(&secret_key, &active_key_id).await?;

        let create_date = OffsetDateTime::now_utc();
        account.access_keys.push(AccessKey {
            access_key: access_key.clone(),
            encrypted_secret_key,
            creation_date: create_date,
            is_active: true,
            creator_identity: creator,
            master_key_id: active_key_id.clone(),
        });
        account.master_key_id = Some(active_key_id);

        // Account file first, then the index entry; the reverse order could
        // leave a symlink pointing at a key no account records.
        self.update_account(&account).await?;
        self.index
            .link(&access_key, &account.name)
            .await
            .map_err(|e| Error::ServiceFailure(format!("access-key index update failed: {e}")))?;

        let key_names: Vec<String> = account.access_keys.iter().map(|k| k.access_key.clone()).collect();
        self.invalidate_access_keys(&key_names).await;

        info!(user = %account.name, access_key = %access_key, requester = %requester.name, "created access key");

        Ok(CreateAccessKeyResponse {
            username: account.name,
            access_key,
            secret_key,
            status: AccessKeyStatus::Active,
            create_date,
        })
    }

    /// Toggles a key between `Active` and `Inactive`. Setting the current
    /// status is a silent no-op; a real change re-encrypts the secret under
    /// the active master key, keeping ciphertexts aligned with rotation.
    pub async fn update_access_key(
        &self,
        session: &Session,
        username: Option<&str>,
        access_key: &str,
        status: AccessKeyStatus,
    ) -> Result<()> {
        validate_access_key_id(access_key)?;
        let mut account = self
            .resolve_account_by_key(session, username, access_key, "UpdateAccessKey")
            .await?;
        let requester = &session.requesting_account;

        let slot = account
            .find_access_key(access_key)
            .ok_or_else(|| auth::denied_access_key(requester, "UpdateAccessKey", access_key))?;

        if account.access_keys[slot].is_active == status.is_active() {
            return Ok(());
        }

        self.master_keys.init().await?;
        let current = &account.access_keys[slot];
        let secret = self.master_keys.decrypt(&current.encrypted_secret_key, &current.master_key_id).await?;
        if !is_secret_key_valid(&secret) {
            return Err(Error::ServiceFailure(format!(
                "recovered secret for access key '{access_key}' is malformed"
            )));
        }
        let active_key_id = self.master_keys.active_key_id().await?;
        let encrypted_secret_key = self.master_keys.encrypt(&secret, &active_key_id).await?;

        let entry = &mut account.access_keys[slot];
        entry.encrypted_secret_key = encrypted_secret_key;
        entry.is_active = status.is_active();
        entry.master_key_id = active_key_id.clone();
        account.master_key_id = Some(active_key_id);

        self.update_account(&account).await?;

        let key_names: Vec<String> = account.access_keys.iter().map(|k| k.access_key.clone()).collect();
        self.invalidate_access_keys(&key_names).await;

        info!(user = %account.name, access_key, ?status, "updated access key status");
        Ok(())
    }

    /// Removes the key from the account, then unlinks its index entry.
    pub async fn delete_access_key(&self, session: &Session, username: Option<&str>, access_key: &str) -> Result<()> {
        validate_access_key_id(access_key)?;
        let mut account = self
            .resolve_account_by_key(session, username, access_key, "DeleteAccessKey")
            .await?;
        let requester = &session.requesting_account;

        let slot = account
            .find_access_key(access_key)
            .ok_or_else(|| auth::denied_access_key(requester, "DeleteAccessKey", access_key))?;

        let key_names: Vec<String> = account.access_keys.iter().map(|k| k.access_key.clone()).collect();

        account.access_keys.remove(slot);
        self.update_account(&account).await?;
        self.index
            .unlink(access_key, false)
            .await
            .map_err(|e| Error::ServiceFailure(format!("access-key index removal failed: {e}")))?;

        self.invalidate_access_keys(&key_names).await;

        info!(user = %account.name, access_key, "deleted access key");
        Ok(())
    }

    /// Last-use telemetry is not tracked; region, service, and date are
    /// placeholders, the username is authoritative.
    pub async fn get_access_key_last_used(&self, session: &Session, access_key: &str) -> Result<AccessKeyLastUsed> {
        validate_access_key_id(access_key)?;
        let requester = &session.requesting_account;
        let account = self.read_account_via_index(requester, access_key, "GetAccessKeyLastUsed").await?;
        auth::ensure_same_root(requester, &account, "GetAccessKeyLastUsed", access_key)?;

        if account.find_access_key(access_key).is_none() {
            return Err(auth::denied_access_key(requester, "GetAccessKeyLastUsed", access_key));
        }

        Ok(AccessKeyLastUsed {
            username: account.name,
            region: "us-east-1".to_owned(),
            service_name: "s3".to_owned(),
            last_used_date: OffsetDateTime::now_utc(),
        })
    }

    /// Keys of the target user (or the requester itself), sorted by key id.
    pub async fn list_access_keys(&self, session: &Session, username: Option<&str>) -> Result<ListAccessKeysResponse> {
        let requester = &session.requesting_account;

        let account = match requester.kind() {
            AccountKind::Root => {
                let name = username.unwrap_or(&requester.name);
                let target = self.load_account(name).await?;
                match target.kind() {
                    AccountKind::Root if target.id == requester.id => target,
                    AccountKind::Root => return Err(Error::NoSuchEntity(format!("user '{name}'"))),
                    AccountKind::IamUser { ref owner } if *owner == requester.id => target,
                    AccountKind::IamUser { .. } => return Err(Error::NoSuchEntity(format!("user '{name}'"))),
                }
            }
            AccountKind::IamUser { .. } => {
                if let Some(name) = username {
                    if name != requester.name {
                        return Err(auth::denied(
                            requester,
                            "ListAccessKeys",
                            &crate::arn::user_arn(requester.root_id(), "/", name),
                        ));
                    }
                }
                self.load_account(&requester.name).await?
            }
        };

        let mut members: Vec<AccessKeyView> = account
            .access_keys
            .iter()
            .map(|k| AccessKeyView {
                username: account.name.clone(),
                access_key: k.access_key.clone(),
                status: k.status(),
                create_date: k.creation_date,
            })
            .collect();
        members.sort_by(|a, b| a.access_key.cmp(&b.access_key));

        Ok(ListAccessKeysResponse {
            username: account.name,
            members,
            is_truncated: false,
        })
    }

    /// Resolves the account a key mutation targets when the target is named
    /// by username (create/list): roots act on users they own, users only on
    /// themselves. Mutating a root record is always denied.
    async fn resolve_mutable_key_target(
        &self,
        session: &Session,
        username: Option<&str>,
        action: &str,
    ) -> Result<(Account, CreatorIdentity)> {
        let requester = &session.requesting_account;

        match requester.kind() {
            AccountKind::Root => {
                let name = username.unwrap_or(&requester.name);
                if name == requester.name {
                    return Err(auth::denied(
                        requester,
                        action,
                        &crate::arn::root_arn(&requester.id),
                    ));
                }
                let target = self.load_account(name).await?;
                auth::ensure_owned_iam_user(requester, &target, action)?;
                Ok((target, auth::classify(requester)))
            }
            AccountKind::IamUser { .. } => {
                if let Some(name) = username {
                    if name != requester.name {
                        return Err(auth::denied(
                            requester,
                            action,
                            &crate::arn::user_arn(requester.root_id(), "/", name),
                        ));
                    }
                }
                let account = self.load_account(&requester.name).await?;
                Ok((account, auth::classify(requester)))
            }
        }
    }

    /// Resolves the account a key mutation targets when the target is named
    /// by access-key id: reads through the symlink index. Unknown key ids
    /// and cross-root keys surface as `AccessDenied`, never `NoSuchEntity`.
    async fn resolve_account_by_key(
        &self,
        session: &Session,
        username: Option<&str>,
        access_key: &str,
        action: &str,
    ) -> Result<Account> {
        let requester = &session.requesting_account;

        if let AccountKind::IamUser { .. } = requester.kind() {
            if let Some(name) = username {
                if name != requester.name {
                    return Err(auth::denied(
                        requester,
                        action,
                        &crate::arn::user_arn(requester.root_id(), "/", name),
                    ));
                }
            }
        }

        let account = self.read_account_via_index(requester, access_key, action).await?;
        auth::ensure_same_root(requester, &account, action, access_key)?;

        if account.is_root() {
            return Err(auth::denied_access_key(requester, action, access_key));
        }

        if let Some(name) = username {
            if name != account.name {
                return Err(auth::denied_access_key(requester, action, access_key));
            }
        }

        if let AccountKind::IamUser { .. } = requester.kind() {
            if account.name != requester.name {
                return Err(auth::denied_access_key(requester, action, access_key));
            }
        }

        Ok(account)
    }

    async fn read_account_via_index(&self, requester: &Account, access_key: &str, action: &str) -> Result<Account> {
        match self.index.read_through(access_key).await {
            Ok(bytes) => Self::parse_account(&bytes),
            Err(Error::NoSuchEntity(_)) => Err(auth::denied_access_key(requester, action, access_key)),
            Err(e) => Err(e),
        }
    }
}
