use strata_domain::DomainName;

/// Published after every effective write or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultsChanged {
    pub domain: DomainName,
    /// The key written or removed; `None` when a whole domain was replaced.
    pub key: Option<String>,
}
