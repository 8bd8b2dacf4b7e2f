/// Cipher/KDF combination recorded in the ciphertext header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum ID {
    Argon2idAESGCM = 0x00,
    Argon2idChaCHa20Poly1305 = 0x01,
}

impl TryFrom<u8> for ID {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ID::Argon2idAESGCM),
            0x01 => Ok(ID::Argon2idChaCHa20Poly1305),
            other => Err(crate::Error::ErrUnknownCipherId(other)),
        }
    }
}

impl ID {
    /// Derives the 32-byte AEAD key from the master-key material and salt.
    pub(crate) fn get_key(&self, password: &[u8], salt: &[u8]) -> Result<[u8; 32], crate::Error> {
        let mut key = [0u8; 32];
        argon2::Argon2::default()
            .hash_password_into(password, salt, &mut key)
            .map_err(|_| crate::Error::ErrKeyDerivationFailed)?;
        Ok(key)
    }
}
