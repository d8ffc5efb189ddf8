use std::collections::BTreeMap;
use strata_domain::{Domain, DomainName, Value};

/// Every domain an instance knows about, by name.
///
/// Domains are created on first write and only disappear through [`DomainTable::replace`].
#[derive(Debug, Default)]
pub(crate) struct DomainTable {
    domains: BTreeMap<DomainName, Domain>,
}

impl DomainTable {
    pub(crate) fn get(&self, domain: &DomainName, key: &str) -> Option<&Value> {
        self.domains.get(domain)?.get(key)
    }

    pub(crate) fn domain(&self, name: &DomainName) -> Option<&Domain> {
        self.domains.get(name)
    }

    /// Returns `false` when the write was ignored because the domain or key is empty.
    pub(crate) fn set(&mut self, domain: &DomainName, key: &str, value: Value) -> bool {
        if domain.is_empty() || key.is_empty() {
            return false;
        }
        self.domains.entry(domain.clone()).or_default().insert(key, value);
        true
    }

    /// Returns `false` when the domain is unknown or the domain or key is empty.
    ///
    /// An existing domain counts as changed even if it did not hold `key`.
    pub(crate) fn remove(&mut self, domain: &DomainName, key: &str) -> bool {
        if domain.is_empty() || key.is_empty() {
            return false;
        }
        match self.domains.get_mut(domain) {
            Some(entries) => {
                entries.remove(key);
                true
            },
            None => false,
        }
    }

    /// Installs `domain` under `name`, or drops the name when `None`.
    pub(crate) fn replace(&mut self, name: &DomainName, domain: Option<Domain>) {
        match domain {
            Some(domain) => {
                self.domains.insert(name.clone(), domain);
            },
            None => {
                self.domains.remove(name);
            },
        }
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &DomainName> {
        self.domains.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_create_domains_lazily() {
        let mut table = DomainTable::default();
        let custom = DomainName::from("DomainA");
        assert!(table.domain(&custom).is_none());

        assert!(table.set(&custom, "k", Value::Integer(1)));
        assert_eq!(table.get(&custom, "k"), Some(&Value::Integer(1)));
        assert_eq!(table.get(&DomainName::from("DomainB"), "k"), None);
    }

    #[test]
    fn empty_domain_or_key_is_ignored() {
        let mut table = DomainTable::default();
        assert!(!table.set(&DomainName::from(""), "k", Value::Bool(true)));
        assert!(!table.set(&DomainName::Global, "", Value::Bool(true)));
        assert!(!table.remove(&DomainName::from(""), "k"));
        assert_eq!(table.names().count(), 0);
    }

    #[test]
    fn remove_reports_change_for_known_domains_only() {
        let mut table = DomainTable::default();
        assert!(!table.remove(&DomainName::Global, "missing"));

        table.set(&DomainName::Global, "k", Value::Bool(true));
        assert!(table.remove(&DomainName::Global, "k"));
        assert!(table.remove(&DomainName::Global, "k"));
        assert!(table.domain(&DomainName::Global).is_some_and(|d| d.is_empty()));
    }

    #[test]
    fn replace_with_none_forgets_the_domain() {
        let mut table = DomainTable::default();
        table.set(&DomainName::Application, "k", Value::Bool(true));
        table.replace(&DomainName::Application, None);
        assert!(table.domain(&DomainName::Application).is_none());
    }
}
