//! Crypto error types.

/// Errors produced by encryption, hashing and key handling.
///
/// Every variant means "reject the input". None of them is transient, so
/// callers must not retry an operation that returned one.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Key material does not have the length the cipher requires.
    #[error("invalid key length: expected {expected} bytes, got {found}")]
    InvalidKeyLength { expected: usize, found: usize },

    /// Key material could not be decoded with the configured encoding.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// The token is not of the form `<ivHex>:<cipherHex>`.
    #[error("malformed encrypted token: {0}")]
    MalformedToken(String),

    /// The cipher refused the plaintext.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key, bad padding, failed authentication or corrupted ciphertext.
    #[error("decryption failed")]
    DecryptionFailed,

    /// A stored salted hash is missing its `salt:key` delimiter.
    #[error("malformed salted hash")]
    MalformedHashFormat,

    /// The token was produced by a scheme this cipher cannot open.
    #[error("unsupported cipher scheme: {0}")]
    UnsupportedScheme(String),

    /// scrypt rejected its parameters or output length.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// The operating system random source failed. Not recoverable.
    #[error("random source exhausted: {0}")]
    RandomSourceExhausted(String),
}
