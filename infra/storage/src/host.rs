use crate::cookie::{CookieJar, MemoryCookieJar};
use crate::local::{LocalStorage, MemoryLocalStorage};
use std::sync::Arc;

const DEFAULT_HOSTNAME: &str = "localhost";

/// The storage capabilities an environment offers.
///
/// Local storage is optional; a cookie jar is always present.
#[derive(Debug, Clone)]
pub struct Host {
    local_storage: Option<Arc<dyn LocalStorage>>,
    cookies: Arc<dyn CookieJar>,
    hostname: String,
}

impl Host {
    #[must_use]
    pub fn new(
        hostname: impl Into<String>,
        local_storage: Option<Arc<dyn LocalStorage>>,
        cookies: Arc<dyn CookieJar>,
    ) -> Self {
        Self { local_storage, cookies, hostname: hostname.into() }
    }

    /// A host with in-process local storage and a cookie jar for `localhost`.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            DEFAULT_HOSTNAME,
            Some(Arc::new(MemoryLocalStorage::new())),
            Arc::new(MemoryCookieJar::new(DEFAULT_HOSTNAME)),
        )
    }

    /// A host without local storage, like a browser with storage disabled.
    #[must_use]
    pub fn cookie_only() -> Self {
        Self::new(DEFAULT_HOSTNAME, None, Arc::new(MemoryCookieJar::new(DEFAULT_HOSTNAME)))
    }

    #[must_use]
    pub fn with_local_storage(mut self, storage: Arc<dyn LocalStorage>) -> Self {
        self.local_storage = Some(storage);
        self
    }

    #[must_use]
    pub fn with_cookie_jar(mut self, jar: Arc<dyn CookieJar>) -> Self {
        self.cookies = jar;
        self
    }

    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    #[must_use]
    pub const fn supports_local_storage(&self) -> bool {
        self.local_storage.is_some()
    }

    #[must_use]
    pub fn local_storage(&self) -> Option<&Arc<dyn LocalStorage>> {
        self.local_storage.as_ref()
    }

    #[must_use]
    pub fn cookies(&self) -> &Arc<dyn CookieJar> {
        &self.cookies
    }

    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::in_memory()
    }
}
