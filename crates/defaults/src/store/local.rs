use super::{PersistentStore, StoreKind, decode, encode, unbound, unsupported_local};
use crate::error::{DefaultsError, DefaultsErrorExt};
use std::sync::Arc;
use strata_storage::{Host, LocalStorage};
use tracing::debug;

/// Keeps a domain's archive in the host's local storage under the domain's storage key.
#[derive(Debug)]
pub struct LocalPersistentStore {
    storage: Arc<dyn LocalStorage>,
    key: Option<String>,
}

impl LocalPersistentStore {
    /// # Errors
    /// Returns [`DefaultsError::UnsupportedFeature`] when `host` has no local storage.
    pub fn new(host: &Host) -> Result<Self, DefaultsError> {
        let storage = host.local_storage().cloned().ok_or_else(unsupported_local)?;
        Ok(Self { storage, key: None })
    }
}

impl PersistentStore for LocalPersistentStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Local
    }

    fn data(&self) -> Result<Option<Vec<u8>>, DefaultsError> {
        let Some(key) = &self.key else {
            return Ok(None);
        };
        let stored = self.storage.get_item(key).context(format!("Reading {key}"))?;
        Ok(decode(stored))
    }

    fn set_data(&self, bytes: &[u8]) -> Result<(), DefaultsError> {
        let key = self.key.as_deref().ok_or_else(unbound)?;
        let encoded = encode(bytes);
        self.storage.set_item(key, &encoded).context(format!("Writing {key}"))?;
        debug!(key, bytes = bytes.len(), stored = encoded.len(), "Local store written");
        Ok(())
    }

    fn bind_to_domain(&mut self, name: &str) {
        self.key = Some(name.to_owned());
    }

    fn domain(&self) -> Option<&str> {
        self.key.as_deref()
    }
}
