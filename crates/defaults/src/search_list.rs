use crate::domain_table::DomainTable;
use strata_domain::{Domain, DomainName, Value};
use tracing::trace;

/// Searched domains in ascending precedence: later entries shadow earlier ones.
pub(crate) const SEARCH_ORDER: [DomainName; 4] =
    [DomainName::Registration, DomainName::Global, DomainName::Application, DomainName::Argument];

/// Cached merge of the searched domains, rebuilt lazily after invalidation.
#[derive(Debug)]
pub(crate) struct SearchList {
    merged: Domain,
    dirty: bool,
}

impl Default for SearchList {
    fn default() -> Self {
        Self { merged: Domain::new(), dirty: true }
    }
}

impl SearchList {
    pub(crate) const fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub(crate) const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn get(&mut self, table: &DomainTable, key: &str) -> Option<&Value> {
        self.merged(table).get(key)
    }

    pub(crate) fn merged(&mut self, table: &DomainTable) -> &Domain {
        if self.dirty {
            self.rebuild(table);
        }
        &self.merged
    }

    fn rebuild(&mut self, table: &DomainTable) {
        let mut merged = Domain::new();
        for name in &SEARCH_ORDER {
            if let Some(domain) = table.domain(name) {
                merged.merge_from(domain);
            }
        }
        trace!(keys = merged.len(), "Search list rebuilt");
        self.merged = merged;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_precedence_shadows_lower() {
        let mut table = DomainTable::default();
        table.set(&DomainName::Registration, "k", Value::from("registration"));
        table.set(&DomainName::Global, "k", Value::from("global"));

        let mut list = SearchList::default();
        assert_eq!(list.get(&table, "k"), Some(&Value::from("global")));

        table.set(&DomainName::Argument, "k", Value::from("argument"));
        list.invalidate();
        assert_eq!(list.get(&table, "k"), Some(&Value::from("argument")));
    }

    #[test]
    fn stale_until_invalidated() {
        let mut table = DomainTable::default();
        let mut list = SearchList::default();
        assert!(list.is_dirty());
        assert_eq!(list.get(&table, "k"), None);
        assert!(!list.is_dirty());

        table.set(&DomainName::Global, "k", Value::Integer(1));
        assert_eq!(list.get(&table, "k"), None);
        list.invalidate();
        assert_eq!(list.get(&table, "k"), Some(&Value::Integer(1)));
    }

    #[test]
    fn unlisted_domains_are_never_searched() {
        let mut table = DomainTable::default();
        table.set(&DomainName::Locale, "k", Value::from("locale"));
        table.set(&DomainName::from("DomainA"), "k", Value::from("custom"));

        let mut list = SearchList::default();
        assert_eq!(list.get(&table, "k"), None);
    }
}
