//! Store configuration
//!
//! Options only shape how the cipher is built. They can be filled in through a
//! callback on [`StoreBuilder`](crate::StoreBuilder), read from a structured
//! JSON source, or taken from the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Section name looked up in structured configuration sources
pub const CONFIG_SECTION: &str = "SealedStore";

/// Environment variable holding the encryption key or passphrase
pub const ENV_ENCRYPTION_KEY: &str = "SEALED_STORE_ENCRYPTION_KEY";
/// Environment variable holding the key derivation iteration count
pub const ENV_ITERATIONS: &str = "SEALED_STORE_ITERATIONS";
/// Environment variable holding an explicit initialization vector
pub const ENV_IV: &str = "SEALED_STORE_IV";
/// Environment variable holding the key derivation salt
pub const ENV_SALT: &str = "SEALED_STORE_SALT";

/// Cipher configuration
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct StoreOptions {
    /// A raw 256-bit key (hex or base64) or a passphrase
    pub encryption_key: String,
    /// Explicit 12-byte IV (hex or base64); random per value when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialization_vector: Option<String>,
    /// Argon2 time cost; setting it forces passphrase derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    /// Key derivation salt (at least 8 bytes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl StoreOptions {
    /// Options with only an encryption key set
    pub fn new(encryption_key: impl Into<String>) -> Self {
        Self {
            encryption_key: encryption_key.into(),
            ..Self::default()
        }
    }

    /// Parse options from JSON text
    ///
    /// Reads the `SealedStore` section when present, else the root object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut root: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| StoreError::Config(format!("Invalid configuration JSON: {}", e)))?;

        let section = root
            .get_mut(CONFIG_SECTION)
            .map(serde_json::Value::take)
            .unwrap_or(root);

        let options: Self = serde_json::from_value(section)
            .map_err(|e| StoreError::Config(format!("Invalid store options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&contents)?;
        debug!("Loaded store options from {:?}", path);
        Ok(options)
    }

    /// Read options from `SEALED_STORE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let encryption_key = std::env::var(ENV_ENCRYPTION_KEY)
            .map_err(|_| StoreError::Config(format!("{} is not set", ENV_ENCRYPTION_KEY)))?;

        let iterations = match std::env::var(ENV_ITERATIONS) {
            Ok(value) => Some(value.parse::<u32>().map_err(|e| {
                StoreError::Config(format!("{} is not a number: {}", ENV_ITERATIONS, e))
            })?),
            Err(_) => None,
        };

        let options = Self {
            encryption_key,
            initialization_vector: std::env::var(ENV_IV).ok(),
            iterations,
            salt: std::env::var(ENV_SALT).ok(),
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the options are usable
    pub fn validate(&self) -> Result<()> {
        if self.encryption_key.trim().is_empty() {
            return Err(StoreError::Config("EncryptionKey must not be empty".to_string()));
        }
        if self.iterations == Some(0) {
            return Err(StoreError::Config("Iterations must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOptions")
            .field("encryption_key", &"[REDACTED]")
            .field("initialization_vector", &self.initialization_vector.as_ref().map(|_| "[REDACTED]"))
            .field("iterations", &self.iterations)
            .field("salt", &self.salt)
            .finish()
    }
}

/// Serializer knobs for object values
///
/// Member naming follows the value type's own serde attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Indent the JSON text
    pub pretty: bool,
    /// Drop object members whose value is `null`
    pub omit_nulls: bool,
}

impl SerializeOptions {
    /// Serialize a value to JSON text under these options
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.omit_nulls {
            let mut tree = serde_json::to_value(value).map_err(StoreError::Serialization)?;
            strip_nulls(&mut tree);
            if self.pretty {
                serde_json::to_string_pretty(&tree)
            } else {
                serde_json::to_string(&tree)
            }
        } else if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.map_err(StoreError::Serialization)
    }
}

fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_structured_section() {
        let json = r#"{
            "Logging": { "Level": "Debug" },
            "SealedStore": { "EncryptionKey": "passphrase", "Iterations": 10000 }
        }"#;

        let options = StoreOptions::from_json_str(json).unwrap();
        assert_eq!(options.encryption_key, "passphrase");
        assert_eq!(options.iterations, Some(10000));
        assert_eq!(options.initialization_vector, None);
    }

    #[test]
    fn test_root_object() {
        let json = r#"{ "EncryptionKey": "k", "InitializationVector": "000102030405060708090a0b" }"#;

        let options = StoreOptions::from_json_str(json).unwrap();
        assert_eq!(options.encryption_key, "k");
        assert!(options.initialization_vector.is_some());
    }

    #[test]
    fn test_missing_key_rejected() {
        assert!(matches!(
            StoreOptions::from_json_str(r#"{ "Iterations": 5 }"#),
            Err(StoreError::Config(_))
        ));
        assert!(matches!(
            StoreOptions::from_json_str(r#"{ "EncryptionKey": "  " }"#),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let options = StoreOptions {
            iterations: Some(0),
            ..StoreOptions::new("k")
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("appsettings.json");
        std::fs::write(&path, r#"{ "SealedStore": { "EncryptionKey": "from-file" } }"#).unwrap();

        let options = StoreOptions::from_file(&path).unwrap();
        assert_eq!(options.encryption_key, "from-file");
    }

    #[test]
    fn test_from_env() {
        // Every case lives in this one test so no other test sees these variables
        std::env::set_var(ENV_ENCRYPTION_KEY, "env-passphrase");
        std::env::set_var(ENV_ITERATIONS, "4");
        std::env::set_var(ENV_IV, "000102030405060708090a0b");
        std::env::set_var(ENV_SALT, "env-salt-value");

        let options = StoreOptions::from_env().unwrap();
        assert_eq!(options.encryption_key, "env-passphrase");
        assert_eq!(options.iterations, Some(4));
        assert_eq!(options.initialization_vector.as_deref(), Some("000102030405060708090a0b"));
        assert_eq!(options.salt.as_deref(), Some("env-salt-value"));

        std::env::remove_var(ENV_IV);
        std::env::remove_var(ENV_SALT);
        std::env::set_var(ENV_ITERATIONS, "many");
        assert!(matches!(StoreOptions::from_env(), Err(StoreError::Config(_))));

        std::env::remove_var(ENV_ITERATIONS);
        let options = StoreOptions::from_env().unwrap();
        assert_eq!(options.iterations, None);
        assert_eq!(options.initialization_vector, None);

        std::env::set_var(ENV_ITERATIONS, "0");
        assert!(matches!(StoreOptions::from_env(), Err(StoreError::Config(_))));
        std::env::remove_var(ENV_ITERATIONS);

        std::env::remove_var(ENV_ENCRYPTION_KEY);
        assert!(matches!(StoreOptions::from_env(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", StoreOptions::new("super-secret"));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-secret"));
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Profile {
        user_name: String,
        nickname: Option<String>,
    }

    #[test]
    fn test_omit_nulls() {
        let profile = Profile {
            user_name: "john".to_string(),
            nickname: None,
        };

        let plain = SerializeOptions::default().to_json(&profile).unwrap();
        assert_eq!(plain, r#"{"userName":"john","nickname":null}"#);

        let options = SerializeOptions {
            omit_nulls: true,
            ..SerializeOptions::default()
        };
        assert_eq!(options.to_json(&profile).unwrap(), r#"{"userName":"john"}"#);
    }

    #[test]
    fn test_pretty() {
        let options = SerializeOptions {
            pretty: true,
            ..SerializeOptions::default()
        };
        let text = options.to_json(&vec![1, 2]).unwrap();
        assert!(text.contains('\n'));
    }
}
