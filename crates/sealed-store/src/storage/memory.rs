//! In-memory raw store
//!
//! Behaves like a browser origin's storage area without a browser: keys keep
//! insertion order and an optional quota rejects oversized writes. Clones
//! share the same entries, the way every handle to one origin's storage does.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::entries::Entries;
use super::RawStore;
use crate::error::Result;

/// In-memory storage backend
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryStore {
    /// Create an empty store without a quota
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `quota` UTF-16 code units of keys and values
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::with_quota(Some(quota)))),
        }
    }
}

#[async_trait]
impl RawStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().await.set(key, value)?;
        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.entries.write().await.remove(key) {
            debug!("Deleted key: {}", key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        debug!("Cleared all entries");
        Ok(())
    }

    async fn key(&self, index: usize) -> Result<Option<String>> {
        Ok(self.entries.read().await.key(index))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().await.keys())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    async fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    fn backend_name(&self) -> &'static str {
        "In-Memory Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();

        store.set("test-key", "test-value").await.unwrap();

        assert_eq!(store.get("test-key").await.unwrap(), Some("test-value".to_string()));
        assert_eq!(store.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("shared", "v").await.unwrap();

        assert!(other.contains_key("shared").await.unwrap());
    }

    #[tokio::test]
    async fn test_native_order() {
        let store = MemoryStore::new();
        store.set("b", "1").await.unwrap();
        store.set("a", "2").await.unwrap();
        store.set("c", "3").await.unwrap();
        store.remove("a").await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["b", "c"]);
        assert_eq!(store.key(1).await.unwrap(), Some("c".to_string()));
        assert_eq!(store.key(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quota_rejects_without_changing_state() {
        let store = MemoryStore::with_quota(10);
        store.set("key", "value").await.unwrap();

        let result = store.set("key", "a much longer value").await;

        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert_eq!(store.get("key").await.unwrap(), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        store.set("key1", "value1").await.unwrap();
        store.set("key2", "value2").await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
        assert!(store.keys().await.unwrap().is_empty());
    }
}
