//! Persistent stores: one opaque byte payload per domain, kept in a host capability.

mod cookie;
mod local;

pub use cookie::CookiePersistentStore;
pub use local::LocalPersistentStore;

use crate::error::DefaultsError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Debug};
use strata_domain::config::StorePreference;
use strata_storage::Host;

/// Synchronous get/set of the archived bytes of one domain.
///
/// A store is bound to a single storage key at a time. Reading from an unbound store
/// yields no data.
pub trait PersistentStore: Send + Sync + Debug {
    fn kind(&self) -> StoreKind;

    /// The stored payload, or `None` when nothing (or an empty value) is stored.
    fn data(&self) -> Result<Option<Vec<u8>>, DefaultsError>;

    fn set_data(&self, bytes: &[u8]) -> Result<(), DefaultsError>;

    /// Binds the store to `name`, resetting any state scoped to the previous key.
    fn bind_to_domain(&mut self, name: &str);

    fn domain(&self) -> Option<&str>;
}

/// The available [`PersistentStore`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Local,
    Cookie,
}

impl StoreKind {
    /// Whether `host` offers the capability this kind needs.
    #[must_use]
    pub const fn is_supported(self, host: &Host) -> bool {
        match self {
            Self::Local => host.supports_local_storage(),
            Self::Cookie => true,
        }
    }

    /// Instantiates an unbound store of this kind over `host`.
    ///
    /// # Errors
    /// Returns [`DefaultsError::UnsupportedFeature`] when the host lacks the capability.
    pub fn create(self, host: &Host) -> Result<Box<dyn PersistentStore>, DefaultsError> {
        match self {
            Self::Local => Ok(Box::new(LocalPersistentStore::new(host)?)),
            Self::Cookie => Ok(Box::new(CookiePersistentStore::new(host))),
        }
    }

    /// Resolves a configured preference against what `host` supports.
    ///
    /// # Errors
    /// Returns [`DefaultsError::UnsupportedFeature`] when local storage is demanded but absent.
    pub fn select(preference: StorePreference, host: &Host) -> Result<Self, DefaultsError> {
        match preference {
            StorePreference::Auto if Self::Local.is_supported(host) => Ok(Self::Local),
            StorePreference::Auto | StorePreference::Cookie => Ok(Self::Cookie),
            StorePreference::Local if Self::Local.is_supported(host) => Ok(Self::Local),
            StorePreference::Local => Err(unsupported_local()),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn unsupported_local() -> DefaultsError {
    DefaultsError::UnsupportedFeature {
        message: "local storage".into(),
        context: Some("Host offers no local storage capability".into()),
    }
}

pub(crate) fn unbound() -> DefaultsError {
    DefaultsError::Internal { message: "store is not bound to a domain".into(), context: None }
}

/// Percent-encodes an archive so it survives string-only storage.
pub(crate) fn encode(bytes: &[u8]) -> String {
    urlencoding::encode_binary(bytes).into_owned()
}

/// Reverses [`encode`]. An empty value means nothing is stored.
pub(crate) fn decode(stored: Option<String>) -> Option<Vec<u8>> {
    stored.filter(|s| !s.is_empty()).map(|s| match urlencoding::decode_binary(s.as_bytes()) {
        Cow::Borrowed(bytes) => bytes.to_vec(),
        Cow::Owned(bytes) => bytes,
    })
}
