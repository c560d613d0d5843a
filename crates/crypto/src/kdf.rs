//! scrypt key derivation for stored password hashes.

use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Length of the derived key stored in a salted hash.
pub const DERIVED_KEY_LEN: usize = 64;

/// scrypt cost parameters.
///
/// The stored hash format does not record them, so every deployment must
/// verify with the parameters it hashed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScryptParams {
    /// log2 of the CPU/memory cost N (default: 14, N = 16384).
    pub log_n: u8,
    /// Block size (default: 8).
    pub r: u32,
    /// Parallelism (default: 1).
    pub p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        // Node's `scryptSync` defaults, which produced the existing hashes.
        Self {
            log_n: 14,
            r: 8,
            p: 1,
        }
    }
}

impl ScryptParams {
    fn to_scrypt(self) -> Result<scrypt::Params, CryptoError> {
        scrypt::Params::new(self.log_n, self.r, self.p, DERIVED_KEY_LEN)
            .map_err(|e| CryptoError::Kdf(format!("invalid scrypt params: {e}")))
    }

    /// Check the parameters are accepted by scrypt without deriving anything.
    pub fn validate(&self) -> Result<(), CryptoError> {
        self.to_scrypt().map(|_| ())
    }
}

/// Derive a 64-byte key from `secret` and `salt`.
pub fn derive_key(
    secret: &[u8],
    salt: &[u8],
    params: &ScryptParams,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, CryptoError> {
    let scrypt_params = params.to_scrypt()?;

    let mut output = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    scrypt::scrypt(secret, salt, &scrypt_params, &mut output[..])
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    Ok(output)
}
