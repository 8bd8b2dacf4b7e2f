use crate::encdec::id::ID;
use crate::encdec::native_aes;
use crate::error::Error;

/// Encrypts `data` under a key derived from `password` and a fresh salt.
///
/// Output layout: `salt(32) || id(1) || nonce(12) || ciphertext`.
pub fn encrypt_data(password: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    use aes_gcm::Aes256Gcm;
    use aes_gcm::KeyInit as _;
    use chacha20poly1305::ChaCha20Poly1305;
    use rand::random;

    let salt: [u8; 32] = random();

    let id = if native_aes() {
        ID::Argon2idAESGCM
    } else {
        ID::Argon2idChaCHa20Poly1305
    };

    let key = id.get_key(password, &salt)?;

    match id {
        ID::Argon2idAESGCM => encrypt(
            Aes256Gcm::new_from_slice(&key).map_err(|_| Error::ErrInvalidKeyLength)?,
            &salt,
            id,
            data,
        ),
        ID::Argon2idChaCHa20Poly1305 => encrypt(
            ChaCha20Poly1305::new_from_slice(&key).map_err(|_| Error::ErrInvalidKeyLength)?,
            &salt,
            id,
            data,
        ),
    }
}

fn encrypt<T: aes_gcm::aead::Aead>(stream: T, salt: &[u8], id: ID, data: &[u8]) -> Result<Vec<u8>, Error> {
    use aes_gcm::AeadCore;
    use aes_gcm::aead::array::Array;
    use rand::RngCore;

    let mut nonce: Array<u8, <T as AeadCore>::NonceSize> = Array::default();
    rand::rng().fill_bytes(&mut nonce);

    let sealed = stream.encrypt(&nonce, data).map_err(Error::ErrEncryptFailed)?;

    let mut ciphertext = Vec::with_capacity(salt.len() + 1 + nonce.len() + sealed.len());
    ciphertext.extend_from_slice(salt);
    ciphertext.push(id as u8);
    ciphertext.extend_from_slice(&nonce);
    ciphertext.extend_from_slice(&sealed);

    Ok(ciphertext)
}
