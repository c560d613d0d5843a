//! Salted scrypt hashes for passwords and other verify-only secrets.
//!
//! Format: `<saltHex>:<derivedKeyHex>`, 16-byte salt, 64-byte derived key.
//! The salt goes into scrypt as its hex text, not its raw bytes, which keeps
//! hashes written by the web application verifiable.

use crate::{
    digest::constant_time_eq,
    error::CryptoError,
    kdf::{self, ScryptParams},
    rng,
};

/// Random salt length in bytes (32 hex characters).
pub const SALT_LEN: usize = 16;

/// Hash `secret` with a fresh salt and the default scrypt parameters.
pub fn hash_secret(secret: &str) -> Result<String, CryptoError> {
    hash_secret_with(secret, &ScryptParams::default())
}

/// Hash `secret` with a fresh salt and explicit scrypt parameters.
pub fn hash_secret_with(secret: &str, params: &ScryptParams) -> Result<String, CryptoError> {
    let salt = hex::encode(rng::random_array::<SALT_LEN>()?);
    let derived = kdf::derive_key(secret.as_bytes(), salt.as_bytes(), params)?;
    Ok(format!("{salt}:{}", hex::encode(*derived)))
}

/// Check `secret` against a stored salted hash using the default parameters.
pub fn verify_secret(secret: &str, stored: &str) -> Result<bool, CryptoError> {
    verify_secret_with(secret, stored, &ScryptParams::default())
}

/// Check `secret` against a stored salted hash.
///
/// Returns `Ok(false)` on mismatch and [`CryptoError::MalformedHashFormat`]
/// when `stored` is not `salt:key` with a hex key.
pub fn verify_secret_with(
    secret: &str,
    stored: &str,
    params: &ScryptParams,
) -> Result<bool, CryptoError> {
    let (salt, expected_hex) = stored
        .split_once(':')
        .ok_or(CryptoError::MalformedHashFormat)?;
    let expected = hex::decode(expected_hex).map_err(|_| CryptoError::MalformedHashFormat)?;

    let derived = kdf::derive_key(secret.as_bytes(), salt.as_bytes(), params)?;
    let matches = constant_time_eq(derived.as_slice(), &expected);

    #[cfg(feature = "tracing")]
    {
        if !matches {
            tracing::debug!("salted hash mismatch");
        }
    }

    Ok(matches)
}
