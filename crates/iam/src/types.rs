use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Upper bound on access keys per account.
pub const MAX_ACCESS_KEYS: usize = 2;

/// The single persisted entity: a root account or an IAM user.
///
/// Stored as `<root>/accounts/<name>.json`. Root accounts are bootstrapped
/// externally and carry either no `owner` or a self-referential one; IAM
/// users point `owner` at their root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_key_id: Option<String>,
    #[serde(default)]
    pub allow_bucket_creation: bool,
    #[serde(default)]
    pub force_md5_etag: bool,
    #[serde(default)]
    pub access_keys: Vec<AccessKey>,
    pub nsfs_account_config: NsfsAccountConfig,
}

/// Normalized ownership view; the on-disk `owner == id` sentinel for roots
/// is folded into `Root` at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    Root,
    IamUser { owner: String },
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        match &self.owner {
            None => AccountKind::Root,
            Some(owner) if owner == &self.id => AccountKind::Root,
            Some(owner) => AccountKind::IamUser { owner: owner.clone() },
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind(), AccountKind::Root)
    }

    /// Id of the root account this record belongs to (itself, for roots).
    pub fn root_id(&self) -> &str {
        match &self.owner {
            Some(owner) if owner != &self.id => owner,
            _ => &self.id,
        }
    }

    pub fn iam_path_or_default(&self) -> &str {
        self.iam_path.as_deref().unwrap_or("/")
    }

    pub fn find_access_key(&self, access_key: &str) -> Option<usize> {
        self.access_keys.iter().position(|k| k.access_key == access_key)
    }

    /// Schema validation run before every write.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("account name is empty".to_owned()));
        }
        if self.name.contains('/') {
            return Err(Error::Validation(format!("account name '{}' contains a path separator", self.name)));
        }
        if self.id.len() != 24 || !self.id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::Validation(format!("account id '{}' is not a 24-hex identifier", self.id)));
        }
        if let Some(path) = &self.iam_path {
            if !path.starts_with('/') {
                return Err(Error::Validation(format!("iam path '{path}' does not start with '/'")));
            }
        }
        if self.access_keys.len() > MAX_ACCESS_KEYS {
            return Err(Error::Validation(format!(
                "account '{}' carries {} access keys, maximum is {MAX_ACCESS_KEYS}",
                self.name,
                self.access_keys.len()
            )));
        }
        for key in &self.access_keys {
            key.validate()?;
        }
        self.nsfs_account_config.validate()
    }
}

/// An access key embedded in an account document.
///
/// The secret appears only as ciphertext; `master_key_id` names the key that
/// produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessKey {
    pub access_key: String,
    pub encrypted_secret_key: String,
    #[serde(with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,
    pub is_active: bool,
    pub creator_identity: CreatorIdentity,
    pub master_key_id: String,
}

impl AccessKey {
    pub fn status(&self) -> AccessKeyStatus {
        if self.is_active {
            AccessKeyStatus::Active
        } else {
            AccessKeyStatus::Inactive
        }
    }

    fn validate(&self) -> Result<()> {
        if self.access_key.len() != crate::credentials::ACCESS_KEY_LENGTH {
            return Err(Error::Validation(format!(
                "access key '{}' is not {} characters",
                self.access_key,
                crate::credentials::ACCESS_KEY_LENGTH
            )));
        }
        if self.encrypted_secret_key.is_empty() {
            return Err(Error::Validation(format!("access key '{}' has an empty ciphertext", self.access_key)));
        }
        if self.master_key_id.is_empty() {
            return Err(Error::Validation(format!("access key '{}' records no master key id", self.access_key)));
        }
        Ok(())
    }
}

/// Wire form of an access-key status. Persisted internally as `is_active`;
/// no third spelling exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessKeyStatus {
    Active,
    Inactive,
}

impl AccessKeyStatus {
    pub fn is_active(self) -> bool {
        matches!(self, AccessKeyStatus::Active)
    }
}

impl std::str::FromStr for AccessKeyStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Active" => Ok(AccessKeyStatus::Active),
            "Inactive" => Ok(AccessKeyStatus::Inactive),
            other => Err(Error::Validation(format!("unknown access key status '{other}'"))),
        }
    }
}

/// Who minted an access key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatorIdentity {
    RootAccount,
    User,
}

/// POSIX identity the data plane impersonates for this account. Exactly one
/// of the uid/gid pair or the distinguished name must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NsfsAccountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinguished_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_buckets_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_backend: Option<String>,
}

impl NsfsAccountConfig {
    pub fn validate(&self) -> Result<()> {
        let has_ids = self.uid.is_some() && self.gid.is_some();
        let has_dn = self.distinguished_name.is_some();
        match (has_ids, has_dn) {
            (true, false) | (false, true) => Ok(()),
            (true, true) => Err(Error::Validation(
                "nsfs_account_config carries both uid/gid and distinguished_name".to_owned(),
            )),
            (false, false) => Err(Error::Validation(
                "nsfs_account_config carries neither uid/gid nor distinguished_name".to_owned(),
            )),
        }
    }
}

/// Caller context handed in by the session layer. The requesting account has
/// already been authenticated by the signature verifier.
#[derive(Debug, Clone)]
pub struct Session {
    pub requesting_account: Account,
}

impl Session {
    pub fn new(requesting_account: Account) -> Self {
        Self { requesting_account }
    }
}

/// User record as rendered on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub user_id: String,
    pub username: String,
    pub iam_path: String,
    pub arn: String,
    #[serde(with = "time::serde::rfc3339")]
    pub create_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub password_last_used: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUsersResponse {
    pub members: Vec<UserView>,
    pub is_truncated: bool,
}

/// Returned by create-access-key; the only place the plaintext secret exists.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAccessKeyResponse {
    pub username: String,
    pub access_key: String,
    pub secret_key: String,
    pub status: AccessKeyStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub create_date: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessKeyView {
    pub username: String,
    pub access_key: String,
    pub status: AccessKeyStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub create_date: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAccessKeysResponse {
    pub username: String,
    pub members: Vec<AccessKeyView>,
    pub is_truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessKeyLastUsed {
    pub username: String,
    pub region: String,
    pub service_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_used_date: OffsetDateTime,
}
