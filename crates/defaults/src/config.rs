use crate::error::{DefaultsError, DefaultsErrorExt};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Prefix of environment overrides, e.g. `STRATA__APPLICATION_ID`.
pub const ENV_PREFIX: &str = "STRATA";

/// Loads configuration from an optional file overlaid with environment variables.
///
/// 1. **File**: when `path` is given it must exist; the format follows its extension
///    (`.toml`, `.json`).
/// 2. **Environment**: variables prefixed with `STRATA__` override file values. Nested
///    fields use double underscores.
///
/// Missing fields fall back to the target's `#[serde(default)]` values.
///
/// # Errors
/// Returns [`DefaultsError::Config`] if the file is missing or does not match `T`.
///
/// # Example
/// ```rust
/// use strata_defaults::load_config;
/// use strata_domain::config::DefaultsConfig;
///
/// let config: DefaultsConfig = load_config(None::<&str>).unwrap_or_default();
/// assert_eq!(config.hostname, "localhost");
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, DefaultsError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();

    if let Some(path) = &path {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading config");
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
