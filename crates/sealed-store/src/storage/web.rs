//! Browser `localStorage` backend
//!
//! The storage handle is looked up from `window` on every call rather than
//! held, so the backend stays `Send + Sync` like every other [`RawStore`].

use async_trait::async_trait;
use tracing::debug;
use wasm_bindgen::JsValue;

use super::RawStore;
use crate::error::{Result, StoreError};

/// The current origin's `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Handle to the current origin's local storage
    pub fn new() -> Self {
        Self
    }

    /// Check that local storage is reachable in this context
    pub fn is_available() -> bool {
        storage().is_ok()
    }
}

fn storage() -> Result<web_sys::Storage> {
    let window = web_sys::window()
        .ok_or_else(|| StoreError::Storage("No window in this context".to_string()))?;
    window
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| StoreError::Storage("localStorage is not available".to_string()))
}

fn js_error(value: JsValue) -> StoreError {
    StoreError::Storage(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

fn length(storage: &web_sys::Storage) -> Result<usize> {
    Ok(storage.length().map_err(js_error)? as usize)
}

#[async_trait]
impl RawStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        storage()?.get_item(key).map_err(js_error)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // Throws QuotaExceededError without writing when the origin is full
        storage()?.set_item(key, value).map_err(js_error)?;
        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        storage()?.remove_item(key).map_err(js_error)
    }

    async fn clear(&self) -> Result<()> {
        storage()?.clear().map_err(js_error)?;
        debug!("Cleared all entries");
        Ok(())
    }

    async fn key(&self, index: usize) -> Result<Option<String>> {
        let index = u32::try_from(index)
            .map_err(|_| StoreError::Storage(format!("Index {} exceeds host range", index)))?;
        storage()?.key(index).map_err(js_error)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let storage = storage()?;
        let mut keys = Vec::with_capacity(length(&storage)?);
        for index in 0..storage.length().map_err(js_error)? {
            if let Some(key) = storage.key(index).map_err(js_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    async fn len(&self) -> Result<usize> {
        length(&storage()?)
    }

    async fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(storage()?.get_item(key).map_err(js_error)?.is_some())
    }

    fn backend_name(&self) -> &'static str {
        "Browser localStorage"
    }
}
