//! Key material held in memory, zeroed on drop

use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// AES-256 key - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    key: [u8; 32],
}

impl EncryptionKey {
    /// Create a new key from raw bytes
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != 32 {
            return None;
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(slice);
        Some(Self { key })
    }

    /// Parse a raw key written as 64 hex characters or as base64 of 32 bytes.
    ///
    /// Returns `None` when the text is not a raw key, in which case callers
    /// treat it as a passphrase.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        let decoded = if text.len() == 64 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
            hex::decode(text).ok()
        } else {
            base64::engine::general_purpose::STANDARD.decode(text).ok()
        };
        decoded
            .map(Zeroizing::new)
            .and_then(|bytes| Self::from_slice(&bytes))
    }
}

impl Clone for EncryptionKey {
    fn clone(&self) -> Self {
        Self { key: self.key }
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_slice() {
        let bytes = [42u8; 32];
        let key = EncryptionKey::from_slice(&bytes).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn test_key_from_invalid_slice() {
        let bytes = [42u8; 16];
        assert!(EncryptionKey::from_slice(&bytes).is_none());
    }

    #[test]
    fn test_key_from_hex_and_base64() {
        let bytes = [7u8; 32];
        let from_hex = EncryptionKey::from_text(&hex::encode(bytes)).unwrap();
        let from_b64 = EncryptionKey::from_text(
            &base64::engine::general_purpose::STANDARD.encode(bytes),
        )
        .unwrap();

        assert_eq!(from_hex.as_bytes(), &bytes);
        assert_eq!(from_b64.as_bytes(), &bytes);
    }

    #[test]
    fn test_passphrase_is_not_a_raw_key() {
        assert!(EncryptionKey::from_text("correct horse battery staple").is_none());
        // valid base64, wrong length
        assert!(EncryptionKey::from_text("c2hvcnQ=").is_none());
    }

    #[test]
    fn test_debug_redacted() {
        let key = EncryptionKey::new([0u8; 32]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains('0'));
    }
}
