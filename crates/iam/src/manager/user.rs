// User CRUD operations on IamSys.

use crate::arn::user_arn;
use crate::auth;
use crate::credentials::{generate_account_id, validate_username};
use crate::error::{Error, Result};
use crate::sys::IamSys;
use crate::types::{Account, AccountKind, ListUsersResponse, Session, UserView};
use time::OffsetDateTime;
use tracing::info;

impl IamSys {
    /// Creates an IAM user under the requesting root. Defaults are copied
    /// from the root: master key id, bucket-creation flag, etag flag, and
    /// the POSIX identity config.
    pub async fn create_user(&self, session: &Session, username: &str, iam_path: Option<&str>) -> Result<UserView> {
        let requester = &session.requesting_account;
        let path = iam_path.unwrap_or("/");
        auth::ensure_root(requester, "CreateUser", &user_arn(requester.root_id(), path, username))?;
        validate_username(username)?;

        if self.account_exists(username).await? {
            return Err(Error::EntityAlreadyExists(format!("user '{username}'")));
        }

        let account = Account {
            id: generate_account_id(),
            name: username.to_owned(),
            email: username.to_owned(),
            creation_date: OffsetDateTime::now_utc(),
            owner: Some(requester.id.clone()),
            creator: Some(requester.id.clone()),
            iam_path: Some(path.to_owned()),
            master_key_id: requester.master_key_id.clone(),
            allow_bucket_creation: requester.allow_bucket_creation,
            force_md5_etag: requester.force_md5_etag,
            access_keys: Vec::new(),
            nsfs_account_config: requester.nsfs_account_config.clone(),
        };

        self.create_account(&account).await?;
        info!(user = username, root = %requester.id, "created user");

        Ok(user_view(&account, false))
    }

    /// Without a username, returns the requester's own record.
    pub async fn get_user(&self, session: &Session, username: Option<&str>) -> Result<UserView> {
        let requester = &session.requesting_account;
        auth::ensure_root(
            requester,
            "GetUser",
            &user_arn(requester.root_id(), "/", username.unwrap_or(&requester.name)),
        )?;

        let Some(name) = username else {
            return Ok(user_view(requester, true));
        };

        if name == requester.name {
            return Ok(user_view(requester, true));
        }

        let target = self.load_account(name).await?;
        auth::ensure_owned_iam_user(requester, &target, "GetUser")?;

        Ok(user_view(&target, true))
    }

    /// Applies an iam-path patch and/or the username-rename protocol.
    ///
    /// A rename writes the record under the new name, re-points every
    /// access-key symlink at the new file, then deletes the old file. The
    /// new name is visible before the old one disappears; a crash in the
    /// middle is healed by the index reconciler.
    pub async fn update_user(
        &self,
        session: &Session,
        username: &str,
        new_username: Option<&str>,
        new_iam_path: Option<&str>,
    ) -> Result<UserView> {
        let requester = &session.requesting_account;
        auth::ensure_root(requester, "UpdateUser", &user_arn(requester.root_id(), "/", username))?;

        let mut account = self.load_account(username).await?;
        auth::ensure_owned_iam_user(requester, &account, "UpdateUser")?;

        let mut changed = false;
        if let Some(path) = new_iam_path {
            if account.iam_path.as_deref() != Some(path) {
                account.iam_path = Some(path.to_owned());
                changed = true;
            }
        }

        let rename = new_username.filter(|n| *n != username);
        let key_names: Vec<String> = account.access_keys.iter().map(|k| k.access_key.clone()).collect();

        if let Some(new_name) = rename {
            validate_username(new_name)?;
            if self.account_exists(new_name).await? {
                return Err(Error::EntityAlreadyExists(format!("user '{new_name}'")));
            }

            account.name = new_name.to_owned();
            account.email = new_name.to_owned();

            self.create_account(&account).await?;
            for key in &key_names {
                self.index.unlink(key, true).await?;
                self.index.link(key, new_name).await?;
            }
            self.delete_account_file(username).await?;

            info!(user = username, new_user = new_name, "renamed user");
        } else if changed {
            self.update_account(&account).await?;
        }

        self.invalidate_access_keys(&key_names).await;

        Ok(user_view(&account, false))
    }

    /// Refuses while the user still holds access keys.
    pub async fn delete_user(&self, session: &Session, username: &str) -> Result<()> {
        let requester = &session.requesting_account;
        auth::ensure_root(requester, "DeleteUser", &user_arn(requester.root_id(), "/", username))?;

        let account = self.load_account(username).await?;
        auth::ensure_owned_iam_user(requester, &account, "DeleteUser")?;

        if !account.access_keys.is_empty() {
            return Err(Error::DeleteConflict(format!(
                "cannot delete user '{username}', must delete access keys first"
            )));
        }

        self.delete_account_file(username).await?;
        info!(user = username, "deleted user");
        Ok(())
    }

    /// Users owned by the requesting root, sorted by username. With a
    /// non-default path prefix, users without an `iam_path` are elided.
    pub async fn list_users(&self, session: &Session, iam_path_prefix: Option<&str>) -> Result<ListUsersResponse> {
        let requester = &session.requesting_account;
        auth::ensure_root(requester, "ListUsers", &user_arn(requester.root_id(), "/", "*"))?;

        let mut owned: Vec<Account> = self
            .read_all_accounts()
            .await?
            .into_iter()
            .filter(|a| matches!(a.kind(), AccountKind::IamUser { owner } if owner == requester.id))
            .collect();

        if let Some(prefix) = iam_path_prefix.filter(|p| !p.is_empty() && *p != "/") {
            owned.retain(|a| a.iam_path.as_deref().is_some_and(|p| p.starts_with(prefix)));
        }

        owned.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ListUsersResponse {
            members: owned.iter().map(|a| user_view(a, true)).collect(),
            is_truncated: false,
        })
    }
}

fn user_view(account: &Account, with_password_last_used: bool) -> UserView {
    let arn = match account.kind() {
        AccountKind::Root => crate::arn::root_arn(&account.id),
        AccountKind::IamUser { ref owner } => user_arn(owner, account.iam_path_or_default(), &account.name),
    };
    UserView {
        user_id: account.id.clone(),
        username: account.name.clone(),
        iam_path: account.iam_path_or_default().to_owned(),
        arn,
        create_date: account.creation_date,
        // Synthetic: real last-use tracking is not implemented.
        password_last_used: with_password_last_used.then_some(account.creation_date),
    }
}
