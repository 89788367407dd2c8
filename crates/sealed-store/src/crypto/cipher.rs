//! The symmetric cipher capability consumed by [`EncryptedStore`](crate::EncryptedStore)

use async_trait::async_trait;
use tracing::{debug, warn};

use super::encryption::{decrypt_string, encrypt, encrypt_with_iv, IV_LEN};
use super::key_derivation::{derive_key, KeyDerivationParams, DEFAULT_SALT};
use super::EncryptionKey;
use crate::error::{Result, StoreError};
use crate::settings::StoreOptions;

/// Text-in, text-out symmetric cipher
///
/// Implementations own their algorithm and key material; the store never
/// inspects either.
#[async_trait]
pub trait Cipher: Send + Sync {
    /// Encrypt plaintext into a text-safe ciphertext
    async fn encrypt_to_text(&self, plaintext: &str) -> Result<String>;

    /// Decrypt text produced by [`Cipher::encrypt_to_text`]
    ///
    /// Must fail with [`StoreError::Crypto`] rather than return altered plaintext.
    async fn decrypt_from_text(&self, ciphertext: &str) -> Result<String>;
}

/// AES-256-GCM cipher with base64 text encoding
#[derive(Debug, Clone)]
pub struct AesGcmCipher {
    key: EncryptionKey,
    fixed_iv: Option<[u8; IV_LEN]>,
}

impl AesGcmCipher {
    /// Create a cipher that draws a random IV for every encryption
    pub fn new(key: EncryptionKey) -> Self {
        Self {
            key,
            fixed_iv: None,
        }
    }

    /// Create a cipher that encrypts every value under one explicit IV
    ///
    /// Equal plaintexts then produce equal ciphertexts.
    pub fn with_fixed_iv(key: EncryptionKey, iv: [u8; IV_LEN]) -> Self {
        warn!("Cipher configured with a fixed initialization vector; ciphertexts are deterministic");
        Self {
            key,
            fixed_iv: Some(iv),
        }
    }

    /// Build a cipher from store options
    ///
    /// The encryption key is used directly when it is a 32-byte raw key and no
    /// iteration count is set; otherwise it is a passphrase run through Argon2id.
    pub fn from_options(options: &StoreOptions) -> Result<Self> {
        options.validate()?;

        let raw_key = match options.iterations {
            None => EncryptionKey::from_text(&options.encryption_key),
            Some(_) => None,
        };

        let key = match raw_key {
            Some(key) => {
                debug!("Using raw 256-bit encryption key");
                key
            }
            None => {
                let params = options
                    .iterations
                    .map(KeyDerivationParams::with_iterations)
                    .unwrap_or_default();
                let salt = options.salt.as_deref().unwrap_or(DEFAULT_SALT);
                debug!(iterations = params.time_cost, "Deriving encryption key from passphrase");
                derive_key(&options.encryption_key, salt, Some(params))?
            }
        };

        match options.initialization_vector.as_deref() {
            Some(iv) => Ok(Self::with_fixed_iv(key, parse_iv(iv)?)),
            None => Ok(Self::new(key)),
        }
    }
}

#[async_trait]
impl Cipher for AesGcmCipher {
    async fn encrypt_to_text(&self, plaintext: &str) -> Result<String> {
        let encrypted = match self.fixed_iv {
            Some(iv) => encrypt_with_iv(plaintext.as_bytes(), &self.key, iv)?,
            None => encrypt(plaintext.as_bytes(), &self.key)?,
        };
        Ok(encrypted.to_string())
    }

    async fn decrypt_from_text(&self, ciphertext: &str) -> Result<String> {
        decrypt_string(ciphertext, &self.key)
    }
}

/// Parse an explicit IV given as hex or base64
fn parse_iv(text: &str) -> Result<[u8; IV_LEN]> {
    use base64::Engine;

    let text = text.trim();
    let bytes = if text.len() == IV_LEN * 2 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        hex::decode(text).ok()
    } else {
        base64::engine::general_purpose::STANDARD.decode(text).ok()
    }
    .ok_or_else(|| StoreError::Config("Initialization vector must be hex or base64".to_string()))?;

    <[u8; IV_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        StoreError::Config(format!(
            "Initialization vector must be {} bytes, got {}",
            IV_LEN,
            bytes.len()
        ))
    })
}
