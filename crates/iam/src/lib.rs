//! Filesystem-backed account and access-key identity store.
//!
//! Accounts (root accounts and their IAM users) persist as JSON documents
//! under `<root>/accounts/`, and access keys resolve through relative
//! symlinks in `<root>/access_keys/`. The store services the IAM user and
//! access-key operations behind TideFS's AWS-compatible control surface;
//! the HTTP/XML front end, signature verification, and the object data
//! plane live elsewhere.

pub mod arn;
mod auth;
pub mod cache;
pub mod credentials;
pub mod error;
mod index;
mod manager;
pub mod master_key;
pub mod paths;
mod store;
pub mod sys;
pub mod types;

pub use cache::{AccountCache, NoopAccountCache};
pub use error::{Error, Result};
pub use master_key::{LocalMasterKeys, MasterKeyStore};
pub use paths::IamPaths;
pub use sys::{IamSys, ReconcileReport};
pub use types::{
    AccessKey, AccessKeyLastUsed, AccessKeyStatus, AccessKeyView, Account, AccountKind, CreateAccessKeyResponse,
    CreatorIdentity, ListAccessKeysResponse, ListUsersResponse, NsfsAccountConfig, Session, UserView,
};
