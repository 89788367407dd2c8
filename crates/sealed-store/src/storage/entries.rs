//! Ordered entry table shared by the in-process backends

use indexmap::IndexMap;
use tracing::warn;

use super::traits::entry_size;
use crate::error::{Result, StoreError};

/// Entries in insertion order with an optional size quota
#[derive(Debug, Default, Clone)]
pub(crate) struct Entries {
    map: IndexMap<String, String>,
    quota: Option<usize>,
    used: usize,
}

impl Entries {
    pub(crate) fn with_quota(quota: Option<usize>) -> Self {
        Self {
            quota,
            ..Self::default()
        }
    }

    pub(crate) fn from_map(map: IndexMap<String, String>, quota: Option<usize>) -> Self {
        let used = map.iter().map(|(k, v)| entry_size(k, v)).sum();
        Self { map, quota, used }
    }

    pub(crate) fn map(&self) -> &IndexMap<String, String> {
        &self.map
    }

    pub(crate) fn get(&self, key: &str) -> Option<&String> {
        self.map.get(key)
    }

    /// Insert or overwrite in place; an overwrite keeps the key's position.
    /// Rejected writes leave the table untouched.
    pub(crate) fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.map.get(key).map(|old| entry_size(key, old)).unwrap_or(0);
        let used = self.used - previous + entry_size(key, value);

        if let Some(quota) = self.quota {
            if used > quota {
                warn!(key, used, quota, "Write rejected: quota exceeded");
                return Err(StoreError::Storage(format!(
                    "quota exceeded: writing '{}' needs {} of {} units",
                    key, used, quota
                )));
            }
        }

        self.map.insert(key.to_string(), value.to_string());
        self.used = used;
        Ok(())
    }

    /// Returns whether the key was present
    pub(crate) fn remove(&mut self, key: &str) -> bool {
        match self.map.shift_remove(key) {
            Some(old) => {
                self.used -= entry_size(key, &old);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.used = 0;
    }

    pub(crate) fn key(&self, index: usize) -> Option<String> {
        self.map.get_index(index).map(|(k, _)| k.clone())
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut entries = Entries::default();
        entries.set("a", "1").unwrap();
        entries.set("b", "2").unwrap();
        entries.set("a", "3").unwrap();

        assert_eq!(entries.keys(), vec!["a", "b"]);
        assert_eq!(entries.get("a").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let mut entries = Entries::with_quota(Some(6));
        entries.set("k", "12345").unwrap();
        // replacing frees the old value first
        entries.set("k", "54321").unwrap();

        let err = entries.set("other", "x").unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_remove_frees_quota() {
        let mut entries = Entries::with_quota(Some(4));
        entries.set("ab", "cd").unwrap();
        assert!(entries.set("ef", "gh").is_err());

        assert!(entries.remove("ab"));
        entries.set("ef", "gh").unwrap();
        assert!(!entries.remove("ab"));
    }
}
