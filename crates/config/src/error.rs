//! Config error types.

use std::path::PathBuf;

/// Errors produced while loading or applying configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed in its format.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: .{0}")]
    UnsupportedFormat(String),

    /// A value (usually from an env override) is not valid for its field.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// `secrets.encryption_key` is unset and `CAPTABLE_ENCRYPTION_KEY` is empty.
    #[error("no encryption key configured (set secrets.encryption_key or CAPTABLE_ENCRYPTION_KEY)")]
    MissingEncryptionKey,

    #[error(transparent)]
    Crypto(#[from] captable_crypto::CryptoError),
}
