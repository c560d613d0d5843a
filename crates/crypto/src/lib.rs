//! Secret encryption, digests and password hashing for Captable.
//!
//! Stored secrets (integration credentials, bank details, signing keys) are
//! encrypted under a 32-byte [`SecretKey`] into hex tokens. Login and API
//! credentials are never encrypted; they are hashed with scrypt
//! ([`hash_secret`]) or digested with SHA-256 ([`digest`]) for lookup.
//!
//! The free [`encrypt`]/[`decrypt`] pair keeps the `"<ivHex>:<cipherHex>"`
//! AES-256-CBC format already present in the database. New writes should go
//! through [`SecretBox`], which defaults to XChaCha20-Poly1305 and can
//! re-encrypt legacy tokens in place.

pub mod aes_cbc;
pub mod api_key;
pub mod digest;
pub mod error;
pub mod kdf;
pub mod key;
pub mod password;
pub mod rng;
pub mod secret_box;
pub mod token;
pub mod traits;
pub mod xchacha20;

pub use {
    aes_cbc::{Aes256CbcCipher, decrypt, encrypt},
    api_key::{IssuedApiKey, bearer_token, issue_api_key, verify_api_key},
    digest::{constant_time_eq, create_token, digest},
    error::CryptoError,
    kdf::ScryptParams,
    key::{KeyEncoding, SecretKey},
    password::{hash_secret, hash_secret_with, verify_secret, verify_secret_with},
    secret_box::SecretBox,
    token::{EncryptedSecret, Scheme},
    traits::Cipher,
    xchacha20::XChaCha20Poly1305Cipher,
};
