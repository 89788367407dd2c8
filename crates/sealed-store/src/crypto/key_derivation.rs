//! Passphrase-based key derivation using Argon2id

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};

use super::EncryptionKey;
use crate::error::{Result, StoreError};

/// Salt used when the configuration does not name one.
///
/// Passphrase keys must derive identically across sessions, so the salt is
/// fixed rather than random.
pub const DEFAULT_SALT: &str = "sealed-store.v1";

/// Default Argon2 time cost when no iteration count is configured
pub const DEFAULT_ITERATIONS: u32 = 3;

/// Parameters for Argon2id key derivation
#[derive(Debug, Clone)]
pub struct KeyDerivationParams {
    /// Memory cost in KiB (default: 65536 = 64MB)
    pub memory_cost: u32,
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 1)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: DEFAULT_ITERATIONS,
            parallelism: 1,
        }
    }
}

impl KeyDerivationParams {
    /// Default parameters with a configured iteration count
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            time_cost: iterations,
            ..Self::default()
        }
    }
}

/// Derive a 256-bit key from a passphrase using Argon2id
///
/// # Arguments
/// * `passphrase` - The configured passphrase
/// * `salt` - Arbitrary salt text (at least 8 bytes); see [`DEFAULT_SALT`]
/// * `params` - Optional key derivation parameters
pub fn derive_key(
    passphrase: &str,
    salt: &str,
    params: Option<KeyDerivationParams>,
) -> Result<EncryptionKey> {
    let params = params.unwrap_or_default();

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| StoreError::Config(format!("Invalid key derivation parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    if salt.len() < argon2::MIN_SALT_LEN {
        return Err(StoreError::Config(format!(
            "Salt must be at least {} bytes",
            argon2::MIN_SALT_LEN
        )));
    }

    let salt = SaltString::encode_b64(salt.as_bytes())
        .map_err(|e| StoreError::Config(format!("Invalid salt: {}", e)))?;

    let password_hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| StoreError::Crypto(format!("Key derivation failed: {}", e)))?;

    let hash = password_hash
        .hash
        .ok_or_else(|| StoreError::Crypto("Key derivation produced no output".to_string()))?;

    EncryptionKey::from_slice(hash.as_bytes())
        .ok_or_else(|| StoreError::Crypto("Key derivation output has wrong length".to_string()))
}
