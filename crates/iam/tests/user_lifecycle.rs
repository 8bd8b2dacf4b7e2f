mod common;

use common::{ROOT_1, ROOT_2, bootstrap_root, harness, read_account, root_account, session_as, write_account};
use tidefs_iam::{AccessKeyStatus, Error};

#[tokio::test]
async fn create_user_builds_arn_and_copies_root_defaults() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;

    let view = h.sys.create_user(&root, "Bob", None).await.unwrap();
    assert_eq!(view.username, "Bob");
    assert_eq!(view.iam_path, "/");
    assert_eq!(view.arn, format!("arn:aws:iam:{ROOT_1}:user/Bob"));

    let stored = read_account(&h, "Bob").await;
    assert_eq!(stored.name, "Bob");
    assert_eq!(stored.email, "Bob");
    assert_eq!(stored.owner.as_deref(), Some(ROOT_1));
    assert_eq!(stored.creator.as_deref(), Some(ROOT_1));
    assert!(stored.access_keys.is_empty());
    assert!(stored.allow_bucket_creation);
    assert_eq!(stored.nsfs_account_config.uid, Some(1000));
}

#[tokio::test]
async fn create_user_with_iam_path() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;

    let view = h.sys.create_user(&root, "Bob", Some("/staff/")).await.unwrap();
    assert_eq!(view.iam_path, "/staff/");
    assert_eq!(view.arn, format!("arn:aws:iam:{ROOT_1}:user/staff/Bob"));
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;

    h.sys.create_user(&root, "Bob", None).await.unwrap();
    let err = h.sys.create_user(&root, "Bob", None).await.unwrap_err();
    assert_eq!(err.aws_code(), "EntityAlreadyExists");
}

#[tokio::test]
async fn non_root_requester_is_denied() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;
    h.sys.create_user(&root, "Alice", None).await.unwrap();

    let alice = session_as(&h, "Alice").await;
    let err = h.sys.create_user(&alice, "Eve", None).await.unwrap_err();
    assert_eq!(err.aws_code(), "AccessDeniedException");
    assert!(err.to_string().contains("iam:CreateUser"));

    let err = h.sys.delete_user(&alice, "Alice").await.unwrap_err();
    assert_eq!(err.aws_code(), "AccessDeniedException");

    let err = h.sys.list_users(&alice, None).await.unwrap_err();
    assert_eq!(err.aws_code(), "AccessDeniedException");
}

#[tokio::test]
async fn cross_tenant_user_is_invisible() {
    let h = harness().await;
    let root1 = bootstrap_root(&h, ROOT_1, "acme").await;
    let root2 = bootstrap_root(&h, ROOT_2, "globex").await;
    h.sys.create_user(&root1, "Bob", None).await.unwrap();

    let err = h.sys.get_user(&root2, Some("Bob")).await.unwrap_err();
    assert_eq!(err.aws_code(), "NoSuchEntity");

    let err = h.sys.create_access_key(&root2, Some("Bob")).await.unwrap_err();
    assert_eq!(err.aws_code(), "NoSuchEntity");
}

#[tokio::test]
async fn rename_moves_the_account_file() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;
    h.sys.create_user(&root, "Robert", None).await.unwrap();

    h.sys.update_user(&root, "Robert", Some("Roberta"), None).await.unwrap();

    assert!(!tokio::fs::try_exists(h.sys.paths().account_path("Robert")).await.unwrap());
    assert!(tokio::fs::try_exists(h.sys.paths().account_path("Roberta")).await.unwrap());
    let view = h.sys.get_user(&root, Some("Roberta")).await.unwrap();
    assert_eq!(view.username, "Roberta");
}

#[tokio::test]
async fn rename_round_trip_preserves_the_record() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;
    h.sys.create_user(&root, "A", None).await.unwrap();
    let original = read_account(&h, "A").await;

    h.sys.update_user(&root, "A", Some("B"), None).await.unwrap();
    h.sys.update_user(&root, "B", Some("A"), None).await.unwrap();

    let restored = read_account(&h, "A").await;
    assert_eq!(restored.id, original.id);
    assert_eq!(restored.name, original.name);
    assert_eq!(restored.email, original.email);
    assert_eq!(restored.creation_date, original.creation_date);
    assert_eq!(restored.owner, original.owner);
    assert!(!tokio::fs::try_exists(h.sys.paths().account_path("B")).await.unwrap());
}

#[tokio::test]
async fn rename_repoints_access_key_symlinks() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;
    h.sys.create_user(&root, "Robert", None).await.unwrap();
    let created = h.sys.create_access_key(&root, Some("Robert")).await.unwrap();

    h.sys.update_user(&root, "Robert", Some("Roberta"), None).await.unwrap();

    let link = h.sys.paths().access_key_path(&created.access_key);
    let resolved = tokio::fs::read(&link).await.expect("symlink resolves after rename");
    let account: tidefs_iam::Account = serde_json::from_slice(&resolved).unwrap();
    assert_eq!(account.name, "Roberta");
    assert!(account.find_access_key(&created.access_key).is_some());
}

#[tokio::test]
async fn update_iam_path_in_place() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;
    h.sys.create_user(&root, "Bob", None).await.unwrap();

    let view = h.sys.update_user(&root, "Bob", None, Some("/ops/")).await.unwrap();
    assert_eq!(view.iam_path, "/ops/");
    assert_eq!(read_account(&h, "Bob").await.iam_path.as_deref(), Some("/ops/"));
}

#[tokio::test]
async fn delete_guard_and_cleanup() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;
    h.sys.create_user(&root, "Alice", None).await.unwrap();
    let k1 = h.sys.create_access_key(&root, Some("Alice")).await.unwrap();
    let k2 = h.sys.create_access_key(&root, Some("Alice")).await.unwrap();

    let err = h.sys.delete_user(&root, "Alice").await.unwrap_err();
    assert_eq!(err.aws_code(), "DeleteConflict");
    assert!(tokio::fs::try_exists(h.sys.paths().account_path("Alice")).await.unwrap());

    h.sys.delete_access_key(&root, Some("Alice"), &k1.access_key).await.unwrap();
    h.sys.delete_access_key(&root, Some("Alice"), &k2.access_key).await.unwrap();
    h.sys.delete_user(&root, "Alice").await.unwrap();
    assert!(!tokio::fs::try_exists(h.sys.paths().account_path("Alice")).await.unwrap());
}

#[tokio::test]
async fn list_users_scopes_sorts_and_filters() {
    let h = harness().await;
    let root1 = bootstrap_root(&h, ROOT_1, "acme").await;
    let root2 = bootstrap_root(&h, ROOT_2, "globex").await;

    h.sys.create_user(&root1, "carol", Some("/ops/")).await.unwrap();
    h.sys.create_user(&root1, "alice", None).await.unwrap();
    h.sys.create_user(&root2, "bob", None).await.unwrap();

    let listed = h.sys.list_users(&root1, None).await.unwrap();
    assert!(!listed.is_truncated);
    let names: Vec<&str> = listed.members.iter().map(|m| m.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "carol"]);

    let ops = h.sys.list_users(&root1, Some("/ops/")).await.unwrap();
    let names: Vec<&str> = ops.members.iter().map(|m| m.username.as_str()).collect();
    assert_eq!(names, vec!["carol"]);

    let none = h.sys.list_users(&root1, Some("/missing/")).await.unwrap();
    assert!(none.members.is_empty());
    assert!(!none.is_truncated);
}

#[tokio::test]
async fn listing_skips_temp_files() {
    let h = harness().await;
    let root = bootstrap_root(&h, ROOT_1, "acme").await;
    h.sys.create_user(&root, "alice", None).await.unwrap();

    tokio::fs::write(
        h.sys.paths().accounts_dir().join("alice.json.tmp.abc123"),
        b"half-written",
    )
    .await
    .unwrap();

    let listed = h.sys.list_users(&root, None).await.unwrap();
    assert_eq!(listed.members.len(), 1);
}

#[tokio::test]
async fn invalid_nsfs_config_fails_validation_and_touches_nothing() {
    let h = harness().await;
    let mut bad_root = root_account(ROOT_1, "acme");
    bad_root.nsfs_account_config.uid = None;
    bad_root.nsfs_account_config.gid = None;
    write_account(&h, &bad_root).await;
    let session = tidefs_iam::Session::new(bad_root);

    let err = h.sys.create_user(&session, "Bob", None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(err.aws_code(), "ValidationError");
    assert!(!tokio::fs::try_exists(h.sys.paths().account_path("Bob")).await.unwrap());
}

#[tokio::test]
async fn status_wire_spelling_is_stable() {
    // Guard against a third spelling sneaking into the wire layer.
    assert_eq!(serde_json::to_string(&AccessKeyStatus::Active).unwrap(), "\"Active\"");
    assert_eq!(serde_json::to_string(&AccessKeyStatus::Inactive).unwrap(), "\"Inactive\"");
}
