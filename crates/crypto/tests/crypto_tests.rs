#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Cross-module properties of the public API.

use captable_crypto::{
    CryptoError, EncryptedSecret, Scheme, ScryptParams, SecretBox, SecretKey, create_token,
    decrypt, digest, encrypt, hash_secret_with, issue_api_key, verify_api_key, verify_secret_with,
};

const KEY: &str = "0123456789abcdef0123456789abcdef";

fn key() -> SecretKey {
    SecretKey::from_latin1(KEY).unwrap()
}

fn fast_scrypt() -> ScryptParams {
    ScryptParams {
        log_n: 4,
        r: 8,
        p: 1,
    }
}

#[test]
fn hello_world_example() {
    let token = encrypt("hello world", &key()).unwrap();
    assert_eq!(decrypt(&token, &key()).unwrap(), "hello world");
}

#[test]
fn round_trip_across_plaintexts() {
    let samples = [
        "a",
        "sk_live_51H8xK2eZvKYlo2C",
        "IBAN DE89 3704 0044 0532 0130 00",
        "exactly sixteen!",
        "line\nbreaks\tand tabs",
        "Ω≈ç√∫˜µ≤≥÷ 日本語 🙂",
    ];
    for plaintext in samples {
        let token = encrypt(plaintext, &key()).unwrap();
        assert_eq!(decrypt(&token, &key()).unwrap(), plaintext);
    }
}

#[test]
fn encryption_is_not_deterministic() {
    let tokens: Vec<String> = (0..16)
        .map(|_| encrypt("same", &key()).unwrap())
        .collect();
    for (i, a) in tokens.iter().enumerate() {
        for b in &tokens[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn key_of_wrong_length_is_rejected_before_encrypting() {
    let err = SecretKey::from_latin1("0123456789abcdef").unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKeyLength {
        expected: 32,
        found: 16
    }));
}

#[test]
fn malformed_tokens_are_errors_not_panics() {
    for token in ["", ":", "nocolon", "zz:zz", "00:00", "xc20p1:", "xc20p1::"] {
        assert!(decrypt(token, &key()).is_err(), "{token}");
    }
    assert!(matches!(
        decrypt("nocolon", &key()),
        Err(CryptoError::MalformedToken(_))
    ));
}

#[test]
fn legacy_free_function_rejects_aead_tokens() {
    let token = SecretBox::new(key()).encrypt_string("x").unwrap();
    assert_eq!(EncryptedSecret::scheme_of(&token), Scheme::XChaCha20Poly1305);
    assert!(matches!(
        decrypt(&token, &key()),
        Err(CryptoError::UnsupportedScheme(_))
    ));
}

#[test]
fn digest_properties() {
    assert_eq!(digest("x"), digest("x"));
    assert_ne!(digest("x"), digest("y"));
    assert!(
        digest("x")
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    );
}

#[test]
fn hash_and_verify_properties() {
    let stored = hash_secret_with("s1", &fast_scrypt()).unwrap();
    assert!(verify_secret_with("s1", &stored, &fast_scrypt()).unwrap());
    assert!(!verify_secret_with("s2", &stored, &fast_scrypt()).unwrap());

    let again = hash_secret_with("s1", &fast_scrypt()).unwrap();
    assert_ne!(stored.split_once(':').unwrap().0, again.split_once(':').unwrap().0);

    assert!(matches!(
        verify_secret_with("s1", "nodelimiter", &fast_scrypt()),
        Err(CryptoError::MalformedHashFormat)
    ));
}

#[test]
fn api_key_flow() {
    let issued = issue_api_key("cap").unwrap();
    let header = format!("Bearer {}", issued.raw);
    let presented = captable_crypto::bearer_token(&header).unwrap();
    assert!(verify_api_key(presented, &issued.hash));
    assert!(!verify_api_key(&create_token().unwrap(), &issued.hash));
}

#[test]
fn usable_from_many_threads() {
    let sb = SecretBox::new(key());
    std::thread::scope(|s| {
        for i in 0..8 {
            let sb = &sb;
            s.spawn(move || {
                let value = format!("secret-{i}");
                let token = sb.encrypt_string(&value).unwrap();
                assert_eq!(sb.decrypt_string(&token).unwrap(), value);
            });
        }
    });
}
