pub const ARN_PARTITION: &str = "aws";
pub const ARN_SERVICE: &str = "iam";

/// `arn:aws:iam:<account_id>:user[/<path>]/<username>`. The path always
/// begins with `/`, so the default path renders as `user/<name>`.
pub fn user_arn(root_account_id: &str, iam_path: &str, username: &str) -> String {
    let mut path = iam_path;
    if path.is_empty() {
        path = "/";
    }
    if path.ends_with('/') {
        format!("arn:{ARN_PARTITION}:{ARN_SERVICE}:{root_account_id}:user{path}{username}")
    } else {
        format!("arn:{ARN_PARTITION}:{ARN_SERVICE}:{root_account_id}:user{path}/{username}")
    }
}

pub fn root_arn(root_account_id: &str) -> String {
    format!("arn:{ARN_PARTITION}:{ARN_SERVICE}:{root_account_id}:root")
}
