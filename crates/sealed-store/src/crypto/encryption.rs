//! AES-256-GCM authenticated encryption
//!
//! Text format: `base64(iv || ciphertext || auth_tag)`
//! - IV: 12 bytes (96 bits) - standard for GCM
//! - Ciphertext: variable length
//! - Auth tag: 16 bytes (128 bits)

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::Engine;
use rand::RngCore;

use super::EncryptionKey;
use crate::error::{Result, StoreError};

/// GCM nonce length in bytes
pub const IV_LEN: usize = 12;

/// GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Encrypted data with IV and auth tag
#[derive(Debug, Clone)]
pub struct EncryptedData {
    /// Initialization vector (12 bytes for GCM)
    pub iv: [u8; IV_LEN],
    /// Authentication tag (16 bytes)
    pub auth_tag: [u8; TAG_LEN],
    /// Encrypted ciphertext
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for EncryptedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bytes = Vec::with_capacity(IV_LEN + self.ciphertext.len() + TAG_LEN);
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes.extend_from_slice(&self.auth_tag);
        f.write_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

impl EncryptedData {
    /// Parse from the text format: `base64(iv || ciphertext || auth_tag)`
    pub fn from_string(s: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s.trim())
            .map_err(|e| StoreError::Crypto(format!("Invalid ciphertext encoding: {}", e)))?;

        if bytes.len() < IV_LEN + TAG_LEN {
            return Err(StoreError::Crypto(format!(
                "Ciphertext too short: expected at least {} bytes, got {}",
                IV_LEN + TAG_LEN,
                bytes.len()
            )));
        }

        let tag_start = bytes.len() - TAG_LEN;

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[..IV_LEN]);

        let mut auth_tag = [0u8; TAG_LEN];
        auth_tag.copy_from_slice(&bytes[tag_start..]);

        Ok(Self {
            iv,
            auth_tag,
            ciphertext: bytes[IV_LEN..tag_start].to_vec(),
        })
    }
}

/// Generate a random 96-bit IV
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

/// Encrypt plaintext using AES-256-GCM under the given IV
///
/// Reusing an IV with the same key leaks the XOR of plaintexts; callers pass
/// [`generate_iv`] unless an explicit IV was configured.
pub fn encrypt_with_iv(
    plaintext: &[u8],
    key: &EncryptionKey,
    iv: [u8; IV_LEN],
) -> Result<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| StoreError::Crypto(e.to_string()))?;

    let nonce = Nonce::from_slice(&iv);

    // aes-gcm appends the auth tag to the ciphertext
    let ciphertext_with_tag = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| StoreError::Crypto(format!("Encryption failed: {}", e)))?;

    if ciphertext_with_tag.len() < TAG_LEN {
        return Err(StoreError::Crypto("Ciphertext too short".to_string()));
    }

    let tag_start = ciphertext_with_tag.len() - TAG_LEN;
    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&ciphertext_with_tag[tag_start..]);

    Ok(EncryptedData {
        iv,
        auth_tag,
        ciphertext: ciphertext_with_tag[..tag_start].to_vec(),
    })
}

/// Encrypt plaintext using AES-256-GCM with a fresh random IV
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> Result<EncryptedData> {
    encrypt_with_iv(plaintext, key, generate_iv())
}

/// Decrypt ciphertext using AES-256-GCM
///
/// Fails if the key is wrong or any byte of IV, ciphertext or tag was altered.
pub fn decrypt(encrypted: &EncryptedData, key: &EncryptionKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| StoreError::Crypto(e.to_string()))?;

    let nonce = Nonce::from_slice(&encrypted.iv);

    let mut ciphertext_with_tag = encrypted.ciphertext.clone();
    ciphertext_with_tag.extend_from_slice(&encrypted.auth_tag);

    cipher
        .decrypt(nonce, ciphertext_with_tag.as_slice())
        .map_err(|e| StoreError::Crypto(format!("Decryption failed: {}", e)))
}

/// Decrypt from the text format and return as string
pub fn decrypt_string(encrypted_str: &str, key: &EncryptionKey) -> Result<String> {
    let encrypted = EncryptedData::from_string(encrypted_str)?;
    let plaintext = decrypt(&encrypted, key)?;
    String::from_utf8(plaintext)
        .map_err(|e| StoreError::Crypto(format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> EncryptionKey {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        EncryptionKey::new(bytes)
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"Hello, World!";

        let encrypted = encrypt(plaintext, &key).unwrap();
        let decrypted = decrypt(&encrypted, &key).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_text_format_roundtrip() {
        let key = test_key();

        let encrypted = encrypt(b"test data", &key).unwrap();
        let text = encrypted.to_string();
        let parsed = EncryptedData::from_string(&text).unwrap();

        assert_eq!(encrypted.iv, parsed.iv);
        assert_eq!(encrypted.auth_tag, parsed.auth_tag);
        assert_eq!(encrypted.ciphertext, parsed.ciphertext);
        assert_eq!(decrypt_string(&text, &key).unwrap(), "test data");
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let key = test_key();

        let text = encrypt(b"", &key).unwrap().to_string();

        assert_eq!(decrypt_string(&text, &key).unwrap(), "");
    }

    #[test]
    fn test_different_ivs_produce_different_ciphertext() {
        let key = test_key();
        let plaintext = b"same plaintext";

        let encrypted1 = encrypt(plaintext, &key).unwrap();
        let encrypted2 = encrypt(plaintext, &key).unwrap();

        assert_ne!(encrypted1.iv, encrypted2.iv);
        assert_ne!(encrypted1.ciphertext, encrypted2.ciphertext);
    }

    #[test]
    fn test_fixed_iv_is_deterministic() {
        let key = test_key();
        let iv = [9u8; IV_LEN];

        let a = encrypt_with_iv(b"same", &key, iv).unwrap().to_string();
        let b = encrypt_with_iv(b"same", &key, iv).unwrap().to_string();

        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let encrypted = encrypt(b"secret data", &test_key()).unwrap();
        let result = decrypt(&encrypted, &test_key());

        assert!(matches!(result, Err(StoreError::Crypto(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails_decryption() {
        let key = test_key();

        let mut encrypted = encrypt(b"secret data", &key).unwrap();
        encrypted.ciphertext[0] ^= 0xFF;

        assert!(decrypt(&encrypted, &key).is_err());
    }

    #[test]
    fn test_tampered_auth_tag_fails_decryption() {
        let key = test_key();

        let mut encrypted = encrypt(b"secret data", &key).unwrap();
        encrypted.auth_tag[0] ^= 0xFF;

        assert!(decrypt(&encrypted, &key).is_err());
    }

    #[test]
    fn test_invalid_format_parsing() {
        assert!(EncryptedData::from_string("not base64 at all!").is_err());
        // valid base64 but shorter than iv + tag
        assert!(EncryptedData::from_string("c2hvcnQ=").is_err());
    }
}
