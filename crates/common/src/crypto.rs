//! Client-side bin encryption.
//!
//! AES-256-GCM with a fresh random 12-byte IV per bin. The service only ever
//! sees base64 ciphertext (GCM tag appended) and the base64 IV; the key
//! travels in the share link as `?key=<base64url>`.
//!
//! Encodings match the browser client byte for byte: ciphertext and IV use
//! standard padded base64, the key uses standard base64 with `+` and `/`
//! swapped for `-` and `_` and the padding kept.

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use rand::Rng;

pub const KEY_SIZE: usize = 32;
pub const IV_SIZE: usize = 12;

/// Standard alphabet that also takes input with its padding stripped
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("key must be 32 bytes, got {0}")]
    KeyLength(usize),
    #[error("iv must be 12 bytes, got {0}")]
    IvLength(usize),
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed: wrong key or corrupted bin")]
    Decrypt,
    #[error("decrypted content is not utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A raw AES-256 key
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; KEY_SIZE]);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl SecretKey {
    pub fn generate() -> Self {
        Self(rand::rng().random())
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// The form carried in share links
    pub fn to_link_param(&self) -> String {
        STANDARD.encode(self.0).replace('+', "-").replace('/', "_")
    }

    /// Parse a key from a share link. Accepts either base64 alphabet, with
    /// or without padding.
    pub fn from_link_param(param: &str) -> Result<Self, CryptoError> {
        let normalized = param.trim().replace('-', "+").replace('_', "/");
        let bytes = LENIENT.decode(normalized)?;
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CryptoError::KeyLength(b.len()))?;
        Ok(Self(bytes))
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl FromStr for SecretKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_link_param(s)
    }
}

/// Ciphertext and IV as they are sent to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub content: String,
    pub iv: String,
}

/// Encrypt `plaintext` under `key` with a fresh random IV
pub fn encrypt(key: &SecretKey, plaintext: &str) -> Result<Sealed, CryptoError> {
    let iv: [u8; IV_SIZE] = rand::rng().random();
    encrypt_with_iv(key, &iv, plaintext)
}

fn encrypt_with_iv(
    key: &SecretKey,
    iv: &[u8; IV_SIZE],
    plaintext: &str,
) -> Result<Sealed, CryptoError> {
    let ciphertext = key
        .cipher()
        .encrypt(Nonce::from_slice(iv), plaintext.as_bytes())
        .map_err(|_| CryptoError::Encrypt)?;

    Ok(Sealed {
        content: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(iv),
    })
}

/// Decrypt base64 `content` with the base64 `iv` it was stored with
pub fn decrypt(key: &SecretKey, content: &str, iv: &str) -> Result<String, CryptoError> {
    let iv = LENIENT.decode(iv.trim())?;
    if iv.len() != IV_SIZE {
        return Err(CryptoError::IvLength(iv.len()));
    }
    let ciphertext = LENIENT.decode(content.trim())?;

    let plaintext = key
        .cipher()
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| CryptoError::Decrypt)?;

    Ok(String::from_utf8(plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Produced the way the browser client does it: WebCrypto AES-GCM,
    // `btoa` for ciphertext and IV, `btoa` plus `+/` -> `-_` for the key
    const FIXTURE_KEY: &str = "-_-_-_-_-_-_-_-_-_-_-_-_-_-_-_-_-_-_-_-_Pv8=";
    const FIXTURE_IV: &str = "AQIDBAUGBwgJCgsM";
    const FIXTURE_CONTENT: &str = "ZiWlQNyvfB4XVn6zgxO5/Do5phXD1AIBKMYdGa67r59vkg9MJRLJnmgMEc2P26z8Nlf0tw7dtKxRl8mZtZyJ87XgeA==";
    const FIXTURE_PLAINTEXT: &str = "fn main() {\n    println!(\"héllo, 世界 🦀\");\n}\n";

    fn fixture_key_bytes() -> [u8; KEY_SIZE] {
        let mut bytes = [0u8; KEY_SIZE];
        for (i, b) in bytes.iter_mut().enumerate().take(30) {
            *b = [0xfb, 0xff, 0xbf][i % 3];
        }
        bytes[30] = 0x3e;
        bytes[31] = 0xff;
        bytes
    }

    #[test]
    fn test_decrypts_browser_fixture() {
        let key = SecretKey::from_link_param(FIXTURE_KEY).unwrap();
        assert_eq!(key.as_bytes(), &fixture_key_bytes());

        let plaintext = decrypt(&key, FIXTURE_CONTENT, FIXTURE_IV).unwrap();
        assert_eq!(plaintext, FIXTURE_PLAINTEXT);
    }

    #[test]
    fn test_encrypts_like_browser_for_same_iv() {
        let key = SecretKey::from_bytes(fixture_key_bytes());
        let iv: [u8; IV_SIZE] = core::array::from_fn(|i| i as u8 + 1);

        let sealed = encrypt_with_iv(&key, &iv, FIXTURE_PLAINTEXT).unwrap();
        assert_eq!(sealed.content, FIXTURE_CONTENT);
        assert_eq!(sealed.iv, FIXTURE_IV);
        assert_eq!(key.to_link_param(), FIXTURE_KEY);
    }

    #[test]
    fn test_round_trip_with_fresh_key_and_iv() {
        let key = SecretKey::generate();
        let first = encrypt(&key, "secret notes").unwrap();
        let second = encrypt(&key, "secret notes").unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.content, second.content);
        assert_eq!(STANDARD.decode(&first.iv).unwrap().len(), IV_SIZE);

        assert_eq!(decrypt(&key, &first.content, &first.iv).unwrap(), "secret notes");
        assert_eq!(decrypt(&key, &second.content, &second.iv).unwrap(), "secret notes");
    }

    #[test]
    fn test_empty_plaintext_is_just_the_tag() {
        let key = SecretKey::generate();
        let sealed = encrypt(&key, "").unwrap();

        assert_eq!(STANDARD.decode(&sealed.content).unwrap().len(), 16);
        assert_eq!(decrypt(&key, &sealed.content, &sealed.iv).unwrap(), "");
    }

    #[test]
    fn test_link_param_round_trip_and_leniency() {
        let key = SecretKey::generate();
        let param = key.to_link_param();
        assert!(!param.contains('+') && !param.contains('/'));
        assert_eq!(param.len(), 44);

        assert_eq!(SecretKey::from_link_param(&param).unwrap(), key);
        assert_eq!(
            SecretKey::from_link_param(param.trim_end_matches('=')).unwrap(),
            key
        );
        assert_eq!(param.parse::<SecretKey>().unwrap(), key);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = encrypt(&SecretKey::generate(), "private").unwrap();
        let err = decrypt(&SecretKey::generate(), &sealed.content, &sealed.iv).unwrap_err();
        assert!(matches!(err, CryptoError::Decrypt));
    }

    #[test]
    fn test_tampered_content_fails() {
        let key = SecretKey::generate();
        let sealed = encrypt(&key, "private").unwrap();

        let mut bytes = STANDARD.decode(&sealed.content).unwrap();
        bytes[0] ^= 1;
        let tampered = STANDARD.encode(bytes);

        assert!(matches!(
            decrypt(&key, &tampered, &sealed.iv),
            Err(CryptoError::Decrypt)
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            SecretKey::from_link_param("AAAA"),
            Err(CryptoError::KeyLength(3))
        ));
        assert!(matches!(
            SecretKey::from_link_param("not base64!"),
            Err(CryptoError::Base64(_))
        ));

        let key = SecretKey::generate();
        let sealed = encrypt(&key, "x").unwrap();
        assert!(matches!(
            decrypt(&key, &sealed.content, "AAAA"),
            Err(CryptoError::IvLength(3))
        ));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = SecretKey::from_bytes([7u8; KEY_SIZE]);
        assert_eq!(format!("{:?}", key), "SecretKey(..)");
    }
}
