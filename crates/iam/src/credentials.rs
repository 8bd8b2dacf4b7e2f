use crate::error::{Error, Result};
use rand::Rng;

pub const ACCESS_KEY_LENGTH: usize = 20;
pub const SECRET_KEY_LENGTH: usize = 40;

const ACCESS_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SECRET_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Mints a fresh `(access_key, secret_key)` pair. The access key doubles as
/// the symlink-index filename, which is the uniqueness witness for the store.
pub fn generate_credentials() -> (String, String) {
    let mut rng = rand::rng();

    let access_key: String = (0..ACCESS_KEY_LENGTH)
        .map(|_| ACCESS_KEY_CHARSET[rng.random_range(0..ACCESS_KEY_CHARSET.len())] as char)
        .collect();
    let secret_key: String = (0..SECRET_KEY_LENGTH)
        .map(|_| SECRET_KEY_CHARSET[rng.random_range(0..SECRET_KEY_CHARSET.len())] as char)
        .collect();

    (access_key, secret_key)
}

/// Opaque 24-hex account identifier.
pub fn generate_account_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 12] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn is_access_key_valid(access_key: &str) -> bool {
    access_key.len() == ACCESS_KEY_LENGTH && access_key.bytes().all(|b| ACCESS_KEY_CHARSET.contains(&b))
}

pub fn is_secret_key_valid(secret_key: &str) -> bool {
    secret_key.len() == SECRET_KEY_LENGTH && secret_key.bytes().all(|b| SECRET_KEY_CHARSET.contains(&b))
}

/// Access-key ids arrive from the wire and become index filenames; reject
/// anything that is not a generated-shape id before a path is built from it.
pub fn validate_access_key_id(access_key: &str) -> Result<()> {
    if is_access_key_valid(access_key) {
        Ok(())
    } else {
        Err(Error::Validation(format!("access key id '{access_key}' is malformed")))
    }
}

/// Usernames become filenames; reject anything that cannot be one.
pub fn validate_username(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("username is empty".to_owned()));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(Error::Validation(format!("username '{name}' contains a path separator")));
    }
    if name.contains('=') || name.contains(',') {
        return Err(Error::Validation(format!("username '{name}' contains reserved characters =,")));
    }
    if name == "." || name == ".." {
        return Err(Error::Validation(format!("username '{name}' is reserved")));
    }
    Ok(())
}
