//! Host-scoped cookie mechanism.

use crate::error::StorageError;
use chrono::{DateTime, NaiveDate, Utc};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt::{self, Debug};

/// Per-cookie ceiling most user agents enforce on name plus value.
pub const DEFAULT_MAX_COOKIE_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// `None` makes a session cookie.
    pub expires: Option<DateTime<Utc>>,
    pub domain: Option<String>,
    pub path: String,
}

impl Cookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            domain: None,
            path: "/".to_owned(),
        }
    }

    #[must_use]
    pub const fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at);
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// An expiration far enough away to never matter (`9999-12-31T23:59:59Z`).
    #[must_use]
    pub fn far_future() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(9999, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map_or(DateTime::<Utc>::MAX_UTC, |dt| dt.and_utc())
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// Renders the cookie the way a `Set-Cookie` header would carry it.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(expires) = self.expires {
            out.push_str("; expires=");
            out.push_str(&expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string());
        }
        if let Some(domain) = &self.domain {
            out.push_str("; domain=");
            out.push_str(domain);
        }
        out.push_str("; path=");
        out.push_str(&self.path);
        out
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value())
    }
}

/// The host's cookie capability. Synchronous and shared between handles.
pub trait CookieJar: Send + Sync + Debug {
    /// Returns the live cookie called `name`, if any.
    fn cookie(&self, name: &str) -> Result<Option<Cookie>, StorageError>;

    /// Stores a cookie. Setting an already-expired cookie deletes it.
    fn set_cookie(&self, cookie: Cookie) -> Result<(), StorageError>;

    fn remove_cookie(&self, name: &str) -> Result<(), StorageError>;
}

/// In-process [`CookieJar`] bound to one host.
///
/// Behaves like a browser jar for a single origin: cookies for foreign domains are
/// dropped silently, values longer than the size ceiling are cut short silently,
/// and expired cookies are invisible.
#[derive(Debug)]
pub struct MemoryCookieJar {
    host: String,
    max_size: usize,
    cookies: RwLock<FxHashMap<String, Cookie>>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_max_size(host, DEFAULT_MAX_COOKIE_SIZE)
    }

    /// Creates a jar that truncates `name + value` to `max_size` bytes.
    #[must_use]
    pub fn with_max_size(host: impl Into<String>, max_size: usize) -> Self {
        Self { host: host.into(), max_size, cookies: RwLock::default() }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Number of live cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.cookies.read().values().filter(|c| !c.is_expired(now)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn accepts_domain(&self, domain: Option<&str>) -> bool {
        domain.is_none_or(|d| {
            let d = d.trim_start_matches('.');
            self.host == d || self.host.ends_with(&format!(".{d}"))
        })
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie(&self, name: &str) -> Result<Option<Cookie>, StorageError> {
        let now = Utc::now();
        Ok(self.cookies.read().get(name).filter(|c| !c.is_expired(now)).cloned())
    }

    fn set_cookie(&self, mut cookie: Cookie) -> Result<(), StorageError> {
        if cookie.name.is_empty() {
            return Err(StorageError::InvalidKey {
                message: "EMPTY".into(),
                context: Some("Cookie name cannot be empty".into()),
            });
        }

        if !self.accepts_domain(cookie.domain.as_deref()) {
            tracing::debug!(name = %cookie.name, domain = ?cookie.domain, host = %self.host, "Foreign cookie ignored");
            return Ok(());
        }

        if cookie.is_expired(Utc::now()) {
            self.cookies.write().remove(&cookie.name);
            return Ok(());
        }

        let budget = self.max_size.saturating_sub(cookie.name.len());
        if cookie.value.len() > budget {
            let mut cut = budget;
            while !cookie.value.is_char_boundary(cut) {
                cut -= 1;
            }
            tracing::trace!(name = %cookie.name, from = cookie.value.len(), to = cut, "Cookie value truncated");
            cookie.value.truncate(cut);
        }

        self.cookies.write().insert(cookie.name.clone(), cookie);
        Ok(())
    }

    fn remove_cookie(&self, name: &str) -> Result<(), StorageError> {
        self.cookies.write().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn stores_and_reads_back() {
        let jar = MemoryCookieJar::new("localhost");
        jar.set_cookie(Cookie::new("GlobalDomain", "abc").expires(Cookie::far_future())).unwrap();

        let cookie = jar.cookie("GlobalDomain").unwrap().unwrap();
        assert_eq!(cookie.value, "abc");
        assert_eq!(cookie.path, "/");
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn expired_cookies_are_invisible_and_setting_one_deletes() {
        let jar = MemoryCookieJar::new("localhost");
        jar.set_cookie(Cookie::new("a", "1")).unwrap();
        jar.set_cookie(Cookie::new("a", "").expires(Utc::now() - Duration::days(1))).unwrap();

        assert_eq!(jar.cookie("a").unwrap(), None);
        assert!(jar.is_empty());
    }

    #[test]
    fn foreign_domains_are_ignored() {
        let jar = MemoryCookieJar::new("app.example.com");
        jar.set_cookie(Cookie::new("x", "1").domain("other.org")).unwrap();
        jar.set_cookie(Cookie::new("y", "2").domain(".example.com")).unwrap();
        jar.set_cookie(Cookie::new("z", "3").domain("app.example.com")).unwrap();

        assert_eq!(jar.cookie("x").unwrap(), None);
        assert!(jar.cookie("y").unwrap().is_some());
        assert!(jar.cookie("z").unwrap().is_some());
    }

    #[test]
    fn oversized_values_are_truncated() {
        let jar = MemoryCookieJar::with_max_size("localhost", 10);
        jar.set_cookie(Cookie::new("key", "0123456789")).unwrap();
        assert_eq!(jar.cookie("key").unwrap().unwrap().value, "0123456");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let jar = MemoryCookieJar::with_max_size("localhost", 4);
        jar.set_cookie(Cookie::new("k", "ééé")).unwrap();
        assert_eq!(jar.cookie("k").unwrap().unwrap().value, "é");
    }

    #[test]
    fn far_future_is_year_9999() {
        assert_eq!(Cookie::far_future().format("%Y-%m-%d").to_string(), "9999-12-31");
        assert!(!Cookie::new("a", "b").expires(Cookie::far_future()).is_expired(Utc::now()));
    }

    #[test]
    fn header_value_lists_attributes() {
        let cookie = Cookie::new("n", "v").domain("localhost").path("/prefs");
        assert_eq!(cookie.header_value(), "n=v; domain=localhost; path=/prefs");
    }
}
