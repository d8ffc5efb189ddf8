use crate::args::ValueType;
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::sync::Arc;
use strata_defaults::{UserDefaults, load_config};
use strata_domain::config::{DefaultsConfig, StorePreference};
use strata_domain::constants::GLOBAL_DOMAIN;
use strata_domain::{Domain, DomainName, Value};
use strata_storage::{FileLocalStorage, Host, MemoryCookieJar};
use tracing::debug;

/// On-disk session: the file storage plus the loaded configuration.
#[derive(Debug)]
pub struct Session {
    storage: FileLocalStorage,
    config: DefaultsConfig,
}

impl Session {
    /// Opens (and creates) the storage root and loads the configuration.
    ///
    /// # Errors
    /// Returns an error if the root cannot be created or the config file is malformed.
    pub fn open(root: &Path, config: Option<&Path>) -> Result<Self> {
        let storage = FileLocalStorage::builder()
            .root(root)
            .connect()
            .with_context(|| format!("Failed to open storage root {}", root.display()))?;
        let config: DefaultsConfig = load_config(config)?;

        Ok(Self { storage, config: config.with_store(StorePreference::Local) })
    }

    /// Builds defaults whose Application domain is archived under `application_id`.
    fn defaults(&self, application_id: Option<&str>) -> Result<UserDefaults> {
        let mut config = self.config.clone();
        if let Some(id) = application_id {
            config = config.with_application_id(id);
        }
        let host = Host::new(
            config.hostname.clone(),
            Some(Arc::new(self.storage.clone())),
            Arc::new(MemoryCookieJar::new(config.hostname.clone())),
        );

        Ok(UserDefaults::builder().host(host).config(config).build()?)
    }

    /// Resolves a domain argument onto defaults and the persistent domain it names.
    fn target(&self, domain: &str) -> Result<(UserDefaults, DomainName)> {
        if domain == GLOBAL_DOMAIN {
            return Ok((self.defaults(None)?, DomainName::Global));
        }
        if domain.is_empty() {
            bail!("Domain name cannot be empty");
        }
        Ok((self.defaults(Some(domain))?, DomainName::Application))
    }

    pub fn read(&self, domain: Option<&str>, key: Option<&str>) -> Result<String> {
        let Some(domain) = domain else {
            return Ok(render_domain(&self.defaults(None)?.dictionary_representation()));
        };
        let (defaults, name) = self.target(domain)?;

        match key {
            None => {
                let contents = defaults
                    .domain(name)
                    .filter(|d| !d.is_empty())
                    .with_context(|| format!("Domain {domain} does not exist"))?;
                Ok(render_domain(&contents))
            },
            Some(key) => {
                let value = defaults
                    .object_for_key_in_domain(key, name)
                    .with_context(|| format!("The pair ({domain}, {key}) does not exist"))?;
                Ok(value.to_string())
            },
        }
    }

    pub fn write(&self, domain: &str, key: &str, raw: &str, kind: ValueType) -> Result<()> {
        if key.is_empty() {
            bail!("Key cannot be empty");
        }
        let value = parse_value(raw, kind)?;
        let (defaults, name) = self.target(domain)?;

        debug!(%domain, %key, %value, "Writing preference");
        defaults.set_object_in_domain(value, key, name);
        defaults.synchronize()?;
        Ok(())
    }

    pub fn delete(&self, domain: &str, key: Option<&str>) -> Result<()> {
        let (defaults, name) = self.target(domain)?;

        match key {
            Some(key) => {
                if defaults.object_for_key_in_domain(key, name.clone()).is_none() {
                    bail!("The pair ({domain}, {key}) does not exist");
                }
                defaults.remove_object_for_key_in_domain(key, name);
            },
            None => defaults.clear_domain(name),
        }
        defaults.synchronize()?;
        Ok(())
    }

    pub fn domains(&self) -> Result<Vec<String>> {
        Ok(self.storage.keys()?)
    }

    pub fn register(&self, file: &Path, domain: Option<&str>) -> Result<String> {
        let defaults = match domain {
            Some(domain) => self.target(domain)?.0,
            None => self.defaults(None)?,
        };
        defaults.register_defaults_from_file(file)?;
        Ok(render_domain(&defaults.dictionary_representation()))
    }
}

fn parse_value(raw: &str, kind: ValueType) -> Result<Value> {
    let value = match kind {
        ValueType::String => Value::from(raw),
        ValueType::Integer => {
            Value::Integer(raw.trim().parse().with_context(|| format!("Not an integer: {raw}"))?)
        },
        ValueType::Real => {
            Value::Real(raw.trim().parse().with_context(|| format!("Not a number: {raw}"))?)
        },
        ValueType::Bool => Value::Bool(Value::from(raw).as_bool().unwrap_or_default()),
    };
    Ok(value)
}

fn render_domain(domain: &Domain) -> String {
    domain.iter().map(|(key, value)| format!("{key} = {value}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_by_type() {
        assert_eq!(parse_value("42", ValueType::Integer).unwrap(), Value::Integer(42));
        assert_eq!(parse_value(" 1.5 ", ValueType::Real).unwrap(), Value::Real(1.5));
        assert_eq!(parse_value("yes", ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(parse_value("no", ValueType::Bool).unwrap(), Value::Bool(false));
        assert_eq!(parse_value("42", ValueType::String).unwrap(), Value::from("42"));
        assert!(parse_value("forty", ValueType::Integer).is_err());
    }

    #[test]
    fn domains_render_one_key_per_line() {
        let domain: Domain = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(render_domain(&domain), "a = 1\nb = 2\n");
    }

    #[test]
    fn writes_persist_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        Session::open(dir.path(), None)
            .unwrap()
            .write("com.example.notes", "theme", "dark", ValueType::String)
            .unwrap();

        let session = Session::open(dir.path(), None).unwrap();
        assert_eq!(session.read(Some("com.example.notes"), Some("theme")).unwrap(), "dark");
        assert_eq!(session.domains().unwrap(), ["com.example.notes"]);
    }

    #[test]
    fn global_domain_is_visible_from_every_application() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(dir.path(), None).unwrap();
        session.write(GLOBAL_DOMAIN, "locale", "en", ValueType::String).unwrap();

        assert!(session.read(None, None).unwrap().contains("locale = en"));
        assert!(session.read(Some("com.example.other"), Some("locale")).is_err());
    }
}
