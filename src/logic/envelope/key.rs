//! Envelope Key Material
//!
//! Pre-shared AES-256 key, injected at construction. The codec never
//! generates, rotates or persists keys.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};

use super::error::{EnvelopeError, EnvelopeResult};

/// Required key length in bytes (256 bits)
pub const KEY_LEN: usize = 32;

/// Hex chars of the SHA-256 digest shown as fingerprint
const FINGERPRINT_LEN: usize = 16;

/// Key material as configured.
///
/// Holds whatever the configuration decoded to, even when the length is
/// wrong, so `is_valid()` can report it at startup instead of the cipher
/// failing later.
#[derive(Clone)]
pub struct KeyMaterial {
    bytes: Option<Vec<u8>>,
}

impl KeyMaterial {
    /// Decode Base64 configuration text (surrounding whitespace ignored)
    pub fn from_base64(encoded: &str) -> Self {
        let bytes = match BASE64.decode(encoded.trim()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Envelope key is not valid base64: {}", e);
                None
            }
        };
        Self { bytes }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: Some(bytes.to_vec()),
        }
    }

    /// True iff the material decoded to exactly 256 bits
    pub fn is_valid(&self) -> bool {
        self.len() == Some(KEY_LEN)
    }

    /// Decoded length, `None` when the configuration was not Base64
    pub fn len(&self) -> Option<usize> {
        self.bytes.as_ref().map(Vec::len)
    }

    /// Short SHA-256 fingerprint, safe to log
    pub fn fingerprint(&self) -> Option<String> {
        self.bytes.as_ref().map(|bytes| {
            let digest = Sha256::digest(bytes);
            let mut hex = hex::encode(digest);
            hex.truncate(FINGERPRINT_LEN);
            hex
        })
    }

    /// Raw bytes for cipher setup
    pub(crate) fn bytes(&self) -> EnvelopeResult<&[u8]> {
        self.bytes.as_deref().ok_or_else(|| {
            EnvelopeError::CipherFailure("key material is not valid base64".to_string())
        })
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len", &self.len())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_32: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";
    const KEY_16: &str = "AAECAwQFBgcICQoLDA0ODw==";
    const KEY_31: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHg==";
    const KEY_33: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8g";

    #[test]
    fn test_valid_key_length() {
        let key = KeyMaterial::from_base64(KEY_32);
        assert!(key.is_valid());
        assert_eq!(key.len(), Some(32));
        assert_eq!(key.bytes().unwrap(), (0u8..32).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_wrong_lengths_are_invalid() {
        for encoded in [KEY_16, KEY_31, KEY_33, ""] {
            let key = KeyMaterial::from_base64(encoded);
            assert!(!key.is_valid(), "{} should be invalid", encoded);
        }
    }

    #[test]
    fn test_non_base64_is_invalid() {
        let key = KeyMaterial::from_base64("not*base64!");
        assert!(!key.is_valid());
        assert_eq!(key.len(), None);
        assert!(matches!(key.bytes(), Err(EnvelopeError::CipherFailure(_))));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let key = KeyMaterial::from_base64(&format!("  {}\n", KEY_32));
        assert!(key.is_valid());
    }

    #[test]
    fn test_debug_does_not_leak_bytes() {
        let key = KeyMaterial::from_bytes(&[0xAB; 32]);
        let debug = format!("{:?}", key);
        assert!(!debug.contains("171"));
        assert!(!debug.to_lowercase().contains("abab"));
        assert!(debug.contains("fingerprint"));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = KeyMaterial::from_base64(KEY_32);
        let b = KeyMaterial::from_bytes(&(0u8..32).collect::<Vec<_>>());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().map(|f| f.len()), Some(FINGERPRINT_LEN));
        assert_ne!(a.fingerprint(), KeyMaterial::from_bytes(&[0u8; 32]).fingerprint());
    }
}
