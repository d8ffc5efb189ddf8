//! Durable, string-keyed storage capability.

use crate::error::StorageError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt::Debug;

/// A synchronous string-keyed string store, the host's "local storage".
///
/// Keys are storage keys (domain names); values are opaque strings the caller has already
/// encoded. Implementations must be safe to share between handles.
pub trait LocalStorage: Send + Sync + Debug {
    /// Returns the stored value, or `None` when the key was never written or was removed.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process [`LocalStorage`] with an optional byte quota.
///
/// Useful for tests and for hosts without a durable medium. Any non-empty key is accepted.
/// The quota mirrors the
/// per-origin limits of browser storage: a write that would push the total size of keys
/// and values over the quota is rejected and leaves the previous value intact.
#[derive(Debug, Default)]
pub struct MemoryLocalStorage {
    items: RwLock<FxHashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryLocalStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that refuses writes beyond `bytes` of keys plus values.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self { items: RwLock::default(), quota: Some(bytes) }
    }

    /// Total bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.items.read().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                message: "EMPTY".into(),
                context: Some("Storage key cannot be empty".into()),
            });
        }
        let mut items = self.items.write();

        if let Some(quota) = self.quota {
            let current: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = current + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    message: format!("{needed} > {quota} bytes").into(),
                    context: Some(key.to_owned().into()),
                });
            }
        }

        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().remove(key);
        Ok(())
    }
}
