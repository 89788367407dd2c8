//! Raw store trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// A host key/value store: unordered, string keys, string values
///
/// All keys of one origin share a single flat namespace. Failures are
/// reported as [`StoreError::Storage`](crate::StoreError::Storage).
#[async_trait]
pub trait RawStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    ///
    /// The write either lands whole or not at all.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting an absent key succeeds
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every key at the origin
    async fn clear(&self) -> Result<()>;

    /// Key name at `index` in the host's native order
    async fn key(&self, index: usize) -> Result<Option<String>>;

    /// Snapshot of all keys in native order
    async fn keys(&self) -> Result<Vec<String>>;

    /// Number of keys at the origin
    async fn len(&self) -> Result<usize>;

    /// Whether an entry exists for `key`
    async fn contains_key(&self, key: &str) -> Result<bool>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}

/// Size of an entry as browsers count it against quota: UTF-16 code units
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.encode_utf16().count() + value.encode_utf16().count()
}
