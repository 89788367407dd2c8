//! Encrypted view over a raw store
//!
//! Values are encrypted on the way in and decrypted on the way out; keys are
//! stored as given. Object accessors are layered on [`EncryptedStore::save_string`]
//! and [`EncryptedStore::get_string`], so there is exactly one encrypt path and
//! one decrypt path.
//!
//! The raw store's namespace is the whole origin. [`EncryptedStore::len`],
//! [`EncryptedStore::keys`] and [`EncryptedStore::clear`] see and affect keys
//! written by anyone at that origin, not only keys written through this store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::crypto::Cipher;
use crate::error::{Result, StoreError};
use crate::settings::SerializeOptions;
use crate::storage::RawStore;

/// Transparent value encryption over a [`RawStore`]
#[derive(Clone)]
pub struct EncryptedStore {
    raw: Arc<dyn RawStore>,
    cipher: Arc<dyn Cipher>,
    serialize_options: SerializeOptions,
}

impl EncryptedStore {
    /// Compose a store from its two collaborators
    pub fn new(raw: Arc<dyn RawStore>, cipher: Arc<dyn Cipher>) -> Self {
        Self {
            raw,
            cipher,
            serialize_options: SerializeOptions::default(),
        }
    }

    /// Set the serializer options used when a call passes none
    pub fn with_serialize_options(mut self, options: SerializeOptions) -> Self {
        self.serialize_options = options;
        self
    }

    /// Name of the underlying raw store backend
    pub fn backend_name(&self) -> &'static str {
        self.raw.backend_name()
    }

    /// Delete `key`. Succeeds whether or not the key exists.
    ///
    /// Cancellation is honoured until the raw store is called; a started
    /// removal runs to completion.
    pub async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.raw.remove(key).await?;
        debug!("Removed key: {}", key);
        Ok(())
    }

    /// Encrypt `value` and store it under `key`, replacing any previous value
    ///
    /// Cancellation is honoured until the raw store is called; a started
    /// write runs to completion, so `Cancelled` always means nothing was written.
    pub async fn save_string(&self, key: &str, value: &str, cancel: &CancellationToken) -> Result<()> {
        let ciphertext = cancel.run(self.cipher.encrypt_to_text(value)).await?;
        // A save cancelled while encrypting must not write
        cancel.check()?;
        self.raw.set(key, &ciphertext).await?;
        debug!("Saved key: {}", key);
        Ok(())
    }

    /// Read and decrypt the value under `key`
    ///
    /// An absent key and a key holding an empty string both read as `None`.
    pub async fn get_string(&self, key: &str, cancel: &CancellationToken) -> Result<Option<String>> {
        let ciphertext = match cancel.run(self.raw.get(key)).await? {
            Some(ciphertext) if !ciphertext.is_empty() => ciphertext,
            _ => {
                debug!("Key not found: {}", key);
                return Ok(None);
            }
        };

        let plaintext = cancel.run(self.cipher.decrypt_from_text(&ciphertext)).await?;
        debug!("Read key: {}", key);
        Ok(Some(plaintext))
    }

    /// Serialize `value` to JSON and save it encrypted under `key`
    ///
    /// Serialization happens before the cipher or the raw store is touched.
    pub async fn save_object<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        options: Option<&SerializeOptions>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let json = options.unwrap_or(&self.serialize_options).to_json(value)?;
        self.save_string(key, &json, cancel).await
    }

    /// Read, decrypt and deserialize the value under `key`
    pub async fn get_object<T: DeserializeOwned>(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        match self.get_string(key, cancel).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(StoreError::Deserialization),
            None => Ok(None),
        }
    }

    /// Whether an entry exists for `key`. Never decrypts.
    pub async fn contains_key(&self, key: &str, cancel: &CancellationToken) -> Result<bool> {
        cancel.run(self.raw.contains_key(key)).await
    }

    /// Key at `index` in the raw store's native order
    ///
    /// The order is host-defined and may shift after any mutation.
    pub async fn key_at(&self, index: i64, cancel: &CancellationToken) -> Result<String> {
        let len = self.len(cancel).await?;
        let out_of_range = || StoreError::IndexOutOfRange { index, len };

        let position = usize::try_from(index).map_err(|_| out_of_range())?;
        if position >= len {
            return Err(out_of_range());
        }

        // The store can shrink between the two calls
        cancel.run(self.raw.key(position)).await?.ok_or_else(out_of_range)
    }

    /// Snapshot of every key at the origin, in native order
    pub async fn keys(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        cancel.run(self.raw.keys()).await
    }

    /// Number of keys at the origin
    pub async fn len(&self, cancel: &CancellationToken) -> Result<usize> {
        cancel.run(self.raw.len()).await
    }

    /// Whether the origin holds no keys at all
    pub async fn is_empty(&self, cancel: &CancellationToken) -> Result<bool> {
        Ok(self.len(cancel).await? == 0)
    }

    /// Delete every key at the origin, including keys this store never wrote
    pub async fn clear(&self, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        warn!(backend = self.raw.backend_name(), "Clearing every key at this origin");
        self.raw.clear().await
    }
}

impl std::fmt::Debug for EncryptedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("backend", &self.raw.backend_name())
            .field("serialize_options", &self.serialize_options)
            .finish_non_exhaustive()
    }
}
