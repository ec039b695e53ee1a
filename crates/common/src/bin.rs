//! Wire and storage shape of a bin

use serde::{Deserialize, Serialize};

use crate::crypto::{self, CryptoError, SecretKey};

/// The payload a client submits and later reads back.
///
/// All three fields are opaque to the service: `content` is usually
/// ciphertext (or a URL for short links), `language` is a highlighting hint
/// and `iv` is the client's initialization vector. An absent `language` or
/// `iv` is treated as the empty string so unencrypted bins round-trip as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bin {
    pub content: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub iv: String,
}

impl Bin {
    pub fn new(
        content: impl Into<String>,
        language: impl Into<String>,
        iv: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            language: language.into(),
            iv: iv.into(),
        }
    }

    /// Whether the client encrypted the content (it sent an IV along)
    pub fn is_encrypted(&self) -> bool {
        !self.iv.is_empty()
    }

    /// Encrypt `plaintext` under `key` into a bin ready for upload
    pub fn encrypt(
        plaintext: &str,
        language: impl Into<String>,
        key: &SecretKey,
    ) -> Result<Self, CryptoError> {
        let sealed = crypto::encrypt(key, plaintext)?;
        Ok(Self::new(sealed.content, language, sealed.iv))
    }

    /// Recover the plaintext of an encrypted bin
    pub fn decrypt(&self, key: &SecretKey) -> Result<String, CryptoError> {
        crypto::decrypt(key, &self.content, &self.iv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let bin: Bin = serde_json::from_str(r#"{"content":"https://example.com"}"#).unwrap();
        assert_eq!(bin.content, "https://example.com");
        assert_eq!(bin.language, "");
        assert_eq!(bin.iv, "");
        assert!(!bin.is_encrypted());
    }

    #[test]
    fn test_missing_content_is_rejected() {
        let result = serde_json::from_str::<Bin>(r#"{"language":"rust","iv":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_every_field() {
        let bin = Bin::new("Zm9v", "python", "abcd1234");
        let value = serde_json::to_value(&bin).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"content": "Zm9v", "language": "python", "iv": "abcd1234"})
        );
        assert!(bin.is_encrypted());
    }

    #[test]
    fn test_encrypted_bin_round_trip() {
        let key = SecretKey::generate();
        let bin = Bin::encrypt("let x = 1;", "rust", &key).unwrap();

        assert!(bin.is_encrypted());
        assert_eq!(bin.language, "rust");
        assert_ne!(bin.content, "let x = 1;");
        assert_eq!(bin.decrypt(&key).unwrap(), "let x = 1;");
        assert!(bin.decrypt(&SecretKey::generate()).is_err());
    }
}
