//! OS-backed randomness for IVs, nonces, salts and tokens.

use rand::{TryRngCore, rngs::OsRng};

use crate::error::CryptoError;

/// Fill `dest` from the operating system CSPRNG.
pub fn fill_random(dest: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|e| CryptoError::RandomSourceExhausted(e.to_string()))
}

/// Return `N` fresh random bytes.
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}
