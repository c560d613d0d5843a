//! Key-holding front end over the [`Cipher`] backends.
//!
//! A [`SecretBox`] writes with one scheme and reads tokens of every scheme,
//! so legacy AES-256-CBC values keep working while new values are written
//! with XChaCha20-Poly1305. [`SecretBox::reencrypt`] moves a stored value to
//! the write scheme, and [`SecretBox::reencrypt_to`] to another key as well.

use zeroize::Zeroizing;

use crate::{
    aes_cbc::Aes256CbcCipher,
    error::CryptoError,
    key::SecretKey,
    token::{EncryptedSecret, Scheme},
    traits::Cipher,
    xchacha20::XChaCha20Poly1305Cipher,
};

/// Backend for a scheme.
pub fn cipher_for(scheme: Scheme) -> &'static dyn Cipher {
    match scheme {
        Scheme::Aes256Cbc => &Aes256CbcCipher,
        Scheme::XChaCha20Poly1305 => &XChaCha20Poly1305Cipher,
    }
}

/// An encryption key plus the scheme used for new tokens.
#[derive(Debug, Clone)]
pub struct SecretBox {
    key: SecretKey,
    scheme: Scheme,
}

impl SecretBox {
    /// Box writing XChaCha20-Poly1305 tokens.
    pub fn new(key: SecretKey) -> Self {
        Self::with_scheme(key, Scheme::default())
    }

    pub fn with_scheme(key: SecretKey, scheme: Scheme) -> Self {
        Self { key, scheme }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedSecret, CryptoError> {
        cipher_for(self.scheme).encrypt(&self.key, plaintext)
    }

    /// Decrypt a token of any supported scheme.
    pub fn decrypt(&self, secret: &EncryptedSecret) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        cipher_for(secret.scheme)
            .decrypt(&self.key, secret)
            .map(Zeroizing::new)
            .inspect_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::debug!(scheme = %secret.scheme, error = %_e, "secret decryption failed");
            })
    }

    pub fn encrypt_string(&self, plaintext: &str) -> Result<String, CryptoError> {
        Ok(self.encrypt(plaintext.as_bytes())?.to_string())
    }

    pub fn decrypt_string(&self, token: &str) -> Result<String, CryptoError> {
        let secret: EncryptedSecret = token.parse()?;
        let plaintext = self.decrypt(&secret)?;
        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Whether `token` was written with a scheme other than this box's.
    pub fn needs_reencrypt(&self, token: &str) -> bool {
        EncryptedSecret::scheme_of(token) != self.scheme
    }

    /// Re-encrypt `token` with this box's write scheme.
    pub fn reencrypt(&self, token: &str) -> Result<String, CryptoError> {
        self.reencrypt_to(token, self)
    }

    /// Decrypt `token` with this box and encrypt it again with `target`.
    ///
    /// Used for key rotation: `old.reencrypt_to(token, &new)`.
    pub fn reencrypt_to(&self, token: &str, target: &SecretBox) -> Result<String, CryptoError> {
        let secret: EncryptedSecret = token.parse()?;
        let plaintext = self.decrypt(&secret)?;
        let rewrapped = target.encrypt(&plaintext)?;

        #[cfg(feature = "tracing")]
        tracing::info!(from = %secret.scheme, to = %target.scheme, "re-encrypted secret");

        Ok(rewrapped.to_string())
    }
}
