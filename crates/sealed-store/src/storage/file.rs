//! File-backed raw store
//!
//! Persists one origin's entries as a JSON file in the user's data directory,
//! so values survive across sessions on native targets. Every mutation is
//! written through atomically; a failed write leaves both the file and the
//! in-memory view unchanged.

use async_trait::async_trait;
use directories::ProjectDirs;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::entries::Entries;
use super::RawStore;
use crate::error::{Result, StoreError};

const STORE_FILE_NAME: &str = "store.json";
const FILE_VERSION: u32 = 1;

/// File format for persistent storage
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: IndexMap<String, String>,
}

/// File storage backend
#[derive(Clone)]
pub struct FileStore {
    /// Directory holding the store file
    storage_dir: PathBuf,
    /// In-memory view of the file
    entries: Arc<RwLock<Entries>>,
}

impl FileStore {
    /// Open the store in the default data directory
    pub async fn open_default() -> Result<Self> {
        Self::open(&Self::default_dir()?).await
    }

    /// Open (or create) the store in `storage_dir`
    pub async fn open(storage_dir: &Path) -> Result<Self> {
        Self::open_with_quota(storage_dir, None).await
    }

    /// Open the store, rejecting writes beyond `quota` UTF-16 code units
    pub async fn open_with_quota(storage_dir: &Path, quota: Option<usize>) -> Result<Self> {
        tokio::fs::create_dir_all(storage_dir)
            .await
            .map_err(|e| StoreError::Storage(format!("Cannot create {:?}: {}", storage_dir, e)))?;

        let path = storage_dir.join(STORE_FILE_NAME);
        let map = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::Storage(format!("Cannot read {:?}: {}", path, e)))?;
            let file: StoreFile = serde_json::from_str(&contents)
                .map_err(|e| StoreError::Storage(format!("Corrupt store file {:?}: {}", path, e)))?;
            if file.version != FILE_VERSION {
                return Err(StoreError::Storage(format!(
                    "Unsupported store file version {}",
                    file.version
                )));
            }
            debug!("Loaded {} entries from {:?}", file.entries.len(), path);
            file.entries
        } else {
            debug!("No existing store file found at {:?}", path);
            IndexMap::new()
        };

        Ok(Self {
            storage_dir: storage_dir.to_path_buf(),
            entries: Arc::new(RwLock::new(Entries::from_map(map, quota))),
        })
    }

    /// Get the default storage directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("org", "sealed-store", "sealed-store")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| StoreError::Storage("Could not determine data directory".to_string()))
    }

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn store_file_path(&self) -> PathBuf {
        self.storage_dir.join(STORE_FILE_NAME)
    }

    /// Apply `change` to a copy of the entries, persist the copy, then publish it.
    ///
    /// Persist and publish run in their own task holding the write lock, so a
    /// caller that stops waiting cannot leave the file and the in-memory view
    /// disagreeing.
    async fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Entries) -> Result<()> + Send,
    {
        let mut entries = self.entries.clone().write_owned().await;
        let mut next = entries.clone();
        change(&mut next)?;

        let path = self.store_file_path();
        tokio::spawn(async move {
            persist(&path, &next).await?;
            *entries = next;
            Ok::<_, StoreError>(())
        })
        .await
        .map_err(|e| StoreError::Storage(format!("Store write task failed: {}", e)))?
    }
}

async fn persist(path: &Path, entries: &Entries) -> Result<()> {
    let file = StoreFile {
        version: FILE_VERSION,
        entries: entries.map().clone(),
    };
    let contents = serde_json::to_string_pretty(&file)
        .map_err(|e| StoreError::Storage(format!("Cannot encode store file: {}", e)))?;

    // Write atomically using a temp file
    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, &contents)
        .await
        .map_err(|e| StoreError::Storage(format!("Cannot write {:?}: {}", temp_path, e)))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| StoreError::Storage(format!("Cannot replace {:?}: {}", path, e)))?;

    debug!("Saved {} entries to storage", entries.len());
    Ok(())
}

#[async_trait]
impl RawStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|entries| entries.set(key, value)).await?;
        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if !self.entries.read().await.contains_key(key) {
            return Ok(());
        }
        self.mutate(|entries| {
            entries.remove(key);
            Ok(())
        })
        .await?;
        debug!("Deleted key: {}", key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.mutate(|entries| {
            entries.clear();
            Ok(())
        })
        .await?;
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
        "File Storage"
    }
}
