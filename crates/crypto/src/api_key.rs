//! API keys for the public REST API.
//!
//! The raw key is shown to the user once. Only its SHA-256 digest is stored,
//! so a lookup by `hash` finds the key without keeping it recoverable.

use crate::{
    digest::{constant_time_eq, create_token, digest},
    error::CryptoError,
};

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "cap";

/// Random characters kept in [`IssuedApiKey::display_prefix`].
const DISPLAY_CHARS: usize = 8;

/// A newly issued API key.
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    /// `<prefix>_<token>`. Hand to the user and drop.
    pub raw: String,
    /// `<prefix>_` plus the first 8 token characters, safe to list in the UI.
    pub display_prefix: String,
    /// Hex SHA-256 of `raw`; the value to persist and look up by.
    pub hash: String,
}

/// Issue a new API key with the given prefix (e.g. `"cap"`).
pub fn issue_api_key(prefix: &str) -> Result<IssuedApiKey, CryptoError> {
    let raw = format!("{prefix}_{}", create_token()?);
    let display_len = (prefix.len() + 1 + DISPLAY_CHARS).min(raw.len());
    let display_prefix = raw[..display_len].to_string();
    let hash = digest(&raw);

    #[cfg(feature = "tracing")]
    tracing::debug!(prefix = %display_prefix, "issued api key");

    Ok(IssuedApiKey {
        raw,
        display_prefix,
        hash,
    })
}

/// Check a presented API key against its stored digest.
pub fn verify_api_key(raw: &str, stored_hash: &str) -> bool {
    let presented = digest(raw);
    constant_time_eq(presented.as_bytes(), stored_hash.trim().as_bytes())
}

/// Extract the credential from an `Authorization` header value.
///
/// Accepts `Bearer <token>` with any casing of the scheme. Returns `None`
/// for other schemes or an empty credential.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, credential) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let credential = credential.trim();
    (!credential.is_empty()).then_some(credential)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn issued_key_shape() {
        let key = issue_api_key(DEFAULT_PREFIX).unwrap();
        assert!(key.raw.starts_with("cap_"));
        assert_eq!(key.raw.len(), "cap_".len() + 43);
        assert_eq!(key.display_prefix.len(), "cap_".len() + 8);
        assert!(key.raw.starts_with(&key.display_prefix));
        assert_eq!(key.hash, digest(&key.raw));
    }

    #[test]
    fn verify_matches_only_the_issued_key() {
        let key = issue_api_key("test").unwrap();
        assert!(verify_api_key(&key.raw, &key.hash));

        let other = issue_api_key("test").unwrap();
        assert!(!verify_api_key(&other.raw, &key.hash));
        assert!(!verify_api_key("", &key.hash));
    }

    #[test]
    fn keys_are_unique() {
        let a = issue_api_key(DEFAULT_PREFIX).unwrap();
        let b = issue_api_key(DEFAULT_PREFIX).unwrap();
        assert_ne!(a.raw, b.raw);
        assert_ne!(a.hash, b.hash);
    }

    #[rstest]
    #[case("Bearer abc123", Some("abc123"))]
    #[case("bearer   abc123  ", Some("abc123"))]
    #[case("BEARER abc", Some("abc"))]
    #[case("Basic dXNlcjpwYXNz", None)]
    #[case("Bearer ", None)]
    #[case("Bearer", None)]
    #[case("", None)]
    fn parses_bearer_header(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(bearer_token(header), expected);
    }
}
