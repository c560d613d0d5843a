//! XChaCha20-Poly1305 implementation of the [`Cipher`] trait.

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

use crate::{
    error::CryptoError,
    key::SecretKey,
    rng,
    token::{EncryptedSecret, Scheme},
    traits::{Cipher, ensure_scheme},
};

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag appended to every ciphertext.
const TAG_LEN: usize = 16;

/// XChaCha20-Poly1305 AEAD cipher.
///
/// Token layout: `xc20p1:<nonceHex>:<ciphertext + tag hex>`.
pub struct XChaCha20Poly1305Cipher;

impl Cipher for XChaCha20Poly1305Cipher {
    fn scheme(&self) -> Scheme {
        Scheme::XChaCha20Poly1305
    }

    #[allow(deprecated)]
    fn encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<EncryptedSecret, CryptoError> {
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        let nonce_bytes = rng::random_array::<NONCE_LEN>()?;
        let nonce = XNonce::from_slice(&nonce_bytes);

        // Only fails when the plaintext exceeds the AEAD length limit.
        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        Ok(EncryptedSecret::new(
            Scheme::XChaCha20Poly1305,
            nonce_bytes.to_vec(),
            ciphertext,
        ))
    }

    #[allow(deprecated)]
    fn decrypt(&self, key: &SecretKey, secret: &EncryptedSecret) -> Result<Vec<u8>, CryptoError> {
        ensure_scheme(Scheme::XChaCha20Poly1305, secret)?;

        if secret.nonce.len() != NONCE_LEN {
            return Err(CryptoError::MalformedToken(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                secret.nonce.len()
            )));
        }
        if secret.ciphertext.len() < TAG_LEN {
            return Err(CryptoError::DecryptionFailed);
        }

        let nonce = XNonce::from_slice(&secret.nonce);
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        cipher
            .decrypt(nonce, secret.ciphertext.as_slice())
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}
