//! Cryptographic primitives for value encryption
//!
//! This module provides:
//! - The [`Cipher`] capability and its AES-256-GCM implementation
//! - Argon2id key derivation from passphrases
//! - Key material that is zeroized on drop

mod cipher;
mod encryption;
mod key_derivation;
mod secure_memory;

pub use cipher::{AesGcmCipher, Cipher};
pub use encryption::{decrypt, decrypt_string, encrypt, encrypt_with_iv, generate_iv, EncryptedData, IV_LEN, TAG_LEN};
pub use key_derivation::{derive_key, KeyDerivationParams, DEFAULT_ITERATIONS, DEFAULT_SALT};
pub use secure_memory::EncryptionKey;
