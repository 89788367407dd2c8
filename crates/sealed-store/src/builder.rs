//! Composition of an [`EncryptedStore`] from its collaborators

use std::sync::Arc;
use tracing::info;

use crate::crypto::{AesGcmCipher, Cipher};
use crate::encrypted_store::EncryptedStore;
use crate::error::{Result, StoreError};
use crate::settings::{SerializeOptions, StoreOptions};
use crate::storage::RawStore;

/// Builder wiring a raw store and a cipher into an [`EncryptedStore`]
///
/// The cipher is either injected directly or built from [`StoreOptions`];
/// an injected cipher wins.
#[derive(Default)]
pub struct StoreBuilder {
    raw: Option<Arc<dyn RawStore>>,
    cipher: Option<Arc<dyn Cipher>>,
    options: Option<StoreOptions>,
    serialize_options: SerializeOptions,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The host store values are written to
    pub fn raw_store(mut self, raw: Arc<dyn RawStore>) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Inject a ready-made cipher
    pub fn cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Configure the cipher through a callback
    pub fn with_options<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut StoreOptions),
    {
        let mut options = self.options.take().unwrap_or_default();
        configure(&mut options);
        self.options = Some(options);
        self
    }

    /// Configure the cipher from already-bound options
    pub fn with_config(mut self, options: StoreOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Default serializer options for object values
    pub fn serialize_options(mut self, options: SerializeOptions) -> Self {
        self.serialize_options = options;
        self
    }

    pub fn build(self) -> Result<EncryptedStore> {
        let raw = self
            .raw
            .ok_or_else(|| StoreError::Config("No raw store configured".to_string()))?;

        let cipher = match (self.cipher, self.options) {
            (Some(cipher), _) => cipher,
            (None, Some(options)) => Arc::new(AesGcmCipher::from_options(&options)?) as Arc<dyn Cipher>,
            (None, None) => {
                return Err(StoreError::Config(
                    "No cipher or encryption key configured".to_string(),
                ))
            }
        };

        info!(backend = raw.backend_name(), "Encrypted store ready");
        Ok(EncryptedStore::new(raw, cipher).with_serialize_options(self.serialize_options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_build_with_options_callback() {
        let store = StoreBuilder::new()
            .raw_store(Arc::new(MemoryStore::new()))
            .with_options(|options| {
                options.encryption_key = hex::encode([5u8; 32]);
            })
            .build()
            .unwrap();
        let cancel = CancellationToken::new();

        store.save_string("username", "john.doe", &cancel).await.unwrap();
        assert_eq!(
            store.get_string("username", &cancel).await.unwrap(),
            Some("john.doe".to_string())
        );
    }

    #[tokio::test]
    async fn test_build_with_structured_config() {
        let options = StoreOptions::from_json_str(
            r#"{ "SealedStore": { "EncryptionKey": "passphrase", "Iterations": 1 } }"#,
        )
        .unwrap();
        let raw = MemoryStore::new();

        let writer = StoreBuilder::new()
            .raw_store(Arc::new(raw.clone()))
            .with_config(options.clone())
            .build()
            .unwrap();
        let reader = StoreBuilder::new()
            .raw_store(Arc::new(raw))
            .with_config(options)
            .build()
            .unwrap();
        let cancel = CancellationToken::new();

        writer.save_string("k", "v", &cancel).await.unwrap();
        assert_eq!(reader.get_string("k", &cancel).await.unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_missing_pieces_rejected() {
        assert!(matches!(
            StoreBuilder::new().with_options(|o| o.encryption_key = "k".into()).build(),
            Err(StoreError::Config(_))
        ));
        assert!(matches!(
            StoreBuilder::new().raw_store(Arc::new(MemoryStore::new())).build(),
            Err(StoreError::Config(_))
        ));
        assert!(matches!(
            StoreBuilder::new()
                .raw_store(Arc::new(MemoryStore::new()))
                .with_options(|_| {})
                .build(),
            Err(StoreError::Config(_))
        ));
    }
}
