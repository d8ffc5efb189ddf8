use super::{PersistentStore, StoreKind, decode, encode, unbound};
use crate::error::{DefaultsError, DefaultsErrorExt};
use std::sync::Arc;
use strata_storage::{Cookie, CookieJar, Host};
use tracing::debug;

/// Keeps a domain's archive in a host cookie named after the domain's storage key.
///
/// Cookies never expire in practice and are scoped to the host name and path `/`.
/// Jars that cap cookie size may truncate large archives, which then read back as no data.
#[derive(Debug)]
pub struct CookiePersistentStore {
    jar: Arc<dyn CookieJar>,
    hostname: String,
    /// Attributes of the bound cookie; its value is replaced on every write.
    cookie: Option<Cookie>,
}

impl CookiePersistentStore {
    #[must_use]
    pub fn new(host: &Host) -> Self {
        Self {
            jar: Arc::clone(host.cookies()),
            hostname: host.hostname().to_owned(),
            cookie: None,
        }
    }
}

impl PersistentStore for CookiePersistentStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Cookie
    }

    fn data(&self) -> Result<Option<Vec<u8>>, DefaultsError> {
        let Some(cookie) = &self.cookie else {
            return Ok(None);
        };
        let stored =
            self.jar.cookie(&cookie.name).context(format!("Reading cookie {}", cookie.name))?;
        Ok(decode(stored.map(|c| c.value)))
    }

    fn set_data(&self, bytes: &[u8]) -> Result<(), DefaultsError> {
        let template = self.cookie.as_ref().ok_or_else(unbound)?;
        let cookie = Cookie { value: encode(bytes), ..template.clone() };
        let (name, stored) = (cookie.name.clone(), cookie.value.len());
        self.jar.set_cookie(cookie).context(format!("Writing cookie {name}"))?;
        debug!(name, bytes = bytes.len(), stored, "Cookie store written");
        Ok(())
    }

    fn bind_to_domain(&mut self, name: &str) {
        self.cookie = Some(
            Cookie::new(name, "")
                .expires(Cookie::far_future())
                .domain(self.hostname.as_str())
                .path("/"),
        );
    }

    fn domain(&self) -> Option<&str> {
        self.cookie.as_ref().map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_storage::MemoryCookieJar;

    #[test]
    fn writes_a_long_lived_host_cookie() {
        let host = Host::cookie_only();
        let mut store = CookiePersistentStore::new(&host);
        store.bind_to_domain("GlobalDomain");
        store.set_data(b"a b").unwrap();

        let cookie = host.cookies().cookie("GlobalDomain").unwrap().unwrap();
        assert_eq!(cookie.value, "a%20b");
        assert_eq!(cookie.domain.as_deref(), Some("localhost"));
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.expires, Some(Cookie::far_future()));
        assert_eq!(store.data().unwrap(), Some(b"a b".to_vec()));
    }

    #[test]
    fn missing_cookie_is_no_data() {
        let mut store = CookiePersistentStore::new(&Host::cookie_only());
        assert_eq!(store.data().unwrap(), None);
        store.bind_to_domain("ApplicationDomain");
        assert_eq!(store.data().unwrap(), None);
    }

    #[test]
    fn jar_truncation_is_not_defended_against() {
        let jar = Arc::new(MemoryCookieJar::with_max_size("localhost", 8));
        let host = Host::new("localhost", None, jar);
        let mut store = CookiePersistentStore::new(&host);
        store.bind_to_domain("k");
        store.set_data(b"0123456789").unwrap();

        assert_eq!(store.data().unwrap(), Some(b"0123456".to_vec()));
    }
}
