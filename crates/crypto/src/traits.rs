//! Cipher trait shared by the legacy and authenticated backends.

use crate::{
    error::CryptoError,
    key::SecretKey,
    token::{EncryptedSecret, Scheme},
};

/// Symmetric encryption of short secrets under a [`SecretKey`].
///
/// Each implementation owns one [`Scheme`]; [`decrypt`](Self::decrypt) must
/// reject tokens of any other scheme with [`CryptoError::UnsupportedScheme`].
pub trait Cipher: Send + Sync {
    fn scheme(&self) -> Scheme;

    /// Encrypt `plaintext` under `key` with a fresh random IV or nonce.
    fn encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<EncryptedSecret, CryptoError>;

    /// Decrypt a token previously produced by [`encrypt`](Self::encrypt).
    fn decrypt(&self, key: &SecretKey, secret: &EncryptedSecret) -> Result<Vec<u8>, CryptoError>;
}

/// Shared scheme guard for [`Cipher::decrypt`] implementations.
pub(crate) fn ensure_scheme(expected: Scheme, secret: &EncryptedSecret) -> Result<(), CryptoError> {
    if secret.scheme != expected {
        return Err(CryptoError::UnsupportedScheme(format!(
            "{} token given to {expected} cipher",
            secret.scheme
        )));
    }
    Ok(())
}
