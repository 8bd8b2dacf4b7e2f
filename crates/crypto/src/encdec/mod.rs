mod decrypt;
mod encrypt;
mod id;

pub use decrypt::decrypt_data;
pub use encrypt::encrypt_data;

#[cfg(target_arch = "x86_64")]
pub(crate) fn native_aes() -> bool {
    std::arch::is_x86_feature_detected!("aes")
}

#[cfg(target_arch = "aarch64")]
pub(crate) fn native_aes() -> bool {
    std::arch::is_aarch64_feature_detected!("aes")
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub(crate) fn native_aes() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = b"0123456789abcdef0123456789abcdef";
        let plaintext = b"forty-character-secret-key-material-0000";

        let ciphertext = encrypt_data(key, plaintext).unwrap();
        assert_ne!(&ciphertext[45..], plaintext.as_slice());

        let decrypted = decrypt_data(key, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn distinct_nonces() {
        let key = b"0123456789abcdef0123456789abcdef";
        let a = encrypt_data(key, b"same input").unwrap();
        let b = encrypt_data(key, b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let ciphertext = encrypt_data(b"key one", b"payload").unwrap();
        assert!(decrypt_data(b"key two", &ciphertext).is_err());
    }

    #[test]
    fn truncated_header_rejected() {
        let err = decrypt_data(b"key", &[0u8; 12]).unwrap_err();
        assert!(matches!(err, crate::Error::ErrUnexpectedHeader));
    }
}
