#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unexpected ciphertext header")]
    ErrUnexpectedHeader,

    #[error("unknown cipher id {0}")]
    ErrUnknownCipherId(u8),

    #[error("key derivation failed")]
    ErrKeyDerivationFailed,

    #[error("invalid key length")]
    ErrInvalidKeyLength,

    #[error("encrypt failed: {0}")]
    ErrEncryptFailed(aes_gcm::aead::Error),

    #[error("decrypt failed: {0}")]
    ErrDecryptFailed(aes_gcm::aead::Error),
}
