use serde::{Deserialize, Serialize};

const DEFAULT_HOSTNAME: &str = "localhost";

/// Preference-store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Storage key of the Application domain. Falls back to `ApplicationDomain` when unset.
    pub application_id: Option<String>,
    pub store: StorePreference,
    pub archive: ArchiveFormat,
    /// Host the cookie store scopes its cookies to.
    pub hostname: String,
}

/// Which persistent store the built-in domains bind to at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorePreference {
    /// Local storage when the host offers it, cookies otherwise.
    #[default]
    Auto,
    Local,
    Cookie,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[default]
    Postcard,
    Json,
}

impl DefaultsConfig {
    #[must_use]
    pub fn with_application_id(mut self, id: impl Into<String>) -> Self {
        self.application_id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn with_store(mut self, store: StorePreference) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub const fn with_archive(mut self, archive: ArchiveFormat) -> Self {
        self.archive = archive;
        self
    }

    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }
}

// --- Default ---

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            application_id: None,
            store: StorePreference::Auto,
            archive: ArchiveFormat::Postcard,
            hostname: DEFAULT_HOSTNAME.to_owned(),
        }
    }
}
