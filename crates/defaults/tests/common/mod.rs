#![allow(dead_code, unreachable_pub)]

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use strata_storage::{Host, LocalStorage, MemoryCookieJar, MemoryLocalStorage, StorageError};

/// Local storage that counts writes per key.
#[derive(Debug, Default)]
pub struct CountingStorage {
    inner: MemoryLocalStorage,
    writes: Mutex<BTreeMap<String, usize>>,
}

impl CountingStorage {
    pub fn writes(&self, key: &str) -> usize {
        self.writes.lock().get(key).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        self.writes.lock().values().sum()
    }
}

impl LocalStorage for CountingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        *self.writes.lock().entry(key.to_owned()).or_default() += 1;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

pub fn counting_host() -> (Host, Arc<CountingStorage>) {
    let storage = Arc::new(CountingStorage::default());
    let host = Host::new(
        "localhost",
        Some(Arc::clone(&storage) as Arc<dyn LocalStorage>),
        Arc::new(MemoryCookieJar::new("localhost")),
    );
    (host, storage)
}
