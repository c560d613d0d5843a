//! AES-256-CBC implementation of the [`Cipher`] trait.
//!
//! This is the format the web application has always written:
//! `<ivHex>:<cipherHex>`, PKCS#7 padding, no MAC. Tampering that leaves the
//! padding valid is not detected; prefer [`crate::XChaCha20Poly1305Cipher`]
//! for anything new.

use {
    aes::Aes256,
    cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7},
};

use crate::{
    error::CryptoError,
    key::SecretKey,
    rng,
    token::{EncryptedSecret, Scheme},
    traits::{Cipher, ensure_scheme},
};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size, and therefore the IV length.
pub const IV_LEN: usize = 16;

/// AES-256-CBC cipher with PKCS#7 padding.
pub struct Aes256CbcCipher;

impl Aes256CbcCipher {
    pub(crate) fn encrypt_with_iv(
        key: &SecretKey,
        iv: [u8; IV_LEN],
        plaintext: &[u8],
    ) -> EncryptedSecret {
        let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), (&iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        EncryptedSecret::new(Scheme::Aes256Cbc, iv.to_vec(), ciphertext)
    }
}

impl Cipher for Aes256CbcCipher {
    fn scheme(&self) -> Scheme {
        Scheme::Aes256Cbc
    }

    fn encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<EncryptedSecret, CryptoError> {
        let iv = rng::random_array::<IV_LEN>()?;
        Ok(Self::encrypt_with_iv(key, iv, plaintext))
    }

    fn decrypt(&self, key: &SecretKey, secret: &EncryptedSecret) -> Result<Vec<u8>, CryptoError> {
        ensure_scheme(Scheme::Aes256Cbc, secret)?;

        let decryptor = Aes256CbcDec::new_from_slices(key.as_bytes(), &secret.nonce).map_err(|_| {
            CryptoError::MalformedToken(format!(
                "iv must be {IV_LEN} bytes, got {}",
                secret.nonce.len()
            ))
        })?;

        decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(&secret.ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

/// Encrypt a UTF-8 string into a `<ivHex>:<cipherHex>` token.
///
/// Two calls with the same input return different tokens.
pub fn encrypt(plaintext: &str, key: &SecretKey) -> Result<String, CryptoError> {
    let secret = Aes256CbcCipher.encrypt(key, plaintext.as_bytes())?;
    Ok(secret.to_string())
}

/// Decrypt a `<ivHex>:<cipherHex>` token produced by [`encrypt`].
pub fn decrypt(token: &str, key: &SecretKey) -> Result<String, CryptoError> {
    let secret: EncryptedSecret = token.parse()?;
    let plaintext = Aes256CbcCipher.decrypt(key, &secret)?;
    String::from_utf8(plaintext).map_err(|_| {
        #[cfg(feature = "tracing")]
        tracing::debug!("decrypted secret is not valid UTF-8");
        CryptoError::DecryptionFailed
    })
}
