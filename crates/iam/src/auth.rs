use crate::arn::{root_arn, user_arn};
use crate::error::{Error, Result};
use crate::types::{Account, AccountKind, CreatorIdentity};
use tracing::warn;

/// ARN of the requesting account as embedded in denial messages.
pub(crate) fn requester_arn(account: &Account) -> String {
    match account.kind() {
        AccountKind::Root => root_arn(&account.id),
        AccountKind::IamUser { owner } => user_arn(&owner, account.iam_path_or_default(), &account.name),
    }
}

/// Gate classification of the requester, recorded on keys it mints.
pub(crate) fn classify(account: &Account) -> CreatorIdentity {
    if account.is_root() {
        CreatorIdentity::RootAccount
    } else {
        CreatorIdentity::User
    }
}

/// AWS-shaped denial carrying the requester and target ARNs.
pub(crate) fn denied(requester: &Account, action: &str, target: &str) -> Error {
    let source = requester_arn(requester);
    warn!(requester = %source, action, target, "access denied");
    Error::AccessDenied(format!(
        "User: {source} is not authorized to perform: iam:{action} on resource: {target}"
    ))
}

/// Denial for an access-key identifier the caller may not see. Unknown key
/// ids take this form too, never `NoSuchEntity`.
pub(crate) fn denied_access_key(requester: &Account, action: &str, access_key: &str) -> Error {
    denied(requester, action, &format!("access key {access_key}"))
}

/// User CRUD is root-only.
pub(crate) fn ensure_root(requester: &Account, action: &str, target: &str) -> Result<()> {
    if requester.is_root() {
        Ok(())
    } else {
        Err(denied(requester, action, target))
    }
}

/// The target of a user mutation must be an IAM user under the requesting
/// root. A root-account target is untouchable; a foreign user is invisible.
pub(crate) fn ensure_owned_iam_user(requester: &Account, target: &Account, action: &str) -> Result<()> {
    match target.kind() {
        AccountKind::Root => Err(denied(
            requester,
            action,
            &user_arn(target.root_id(), target.iam_path_or_default(), &target.name),
        )),
        AccountKind::IamUser { owner } if owner == requester.id => Ok(()),
        AccountKind::IamUser { .. } => Err(Error::NoSuchEntity(format!("user '{}'", target.name))),
    }
}

/// Key-identified operations require the target account and the requester to
/// share a root.
pub(crate) fn ensure_same_root(requester: &Account, target: &Account, action: &str, access_key: &str) -> Result<()> {
    if requester.root_id() == target.root_id() {
        Ok(())
    } else {
        Err(denied_access_key(requester, action, access_key))
    }
}
