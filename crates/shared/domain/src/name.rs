use crate::constants::{
    APPLICATION_DOMAIN, ARGUMENT_DOMAIN, GLOBAL_DOMAIN, LOCALE_DOMAIN, REGISTRATION_DOMAIN,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The name of a preference domain.
///
/// Names are case-sensitive. A string equal to a built-in's canonical name always parses
/// to that built-in, so `DomainName::from("GlobalDomain") == DomainName::Global`.
/// `Custom("")` is the empty domain: writes addressed to it are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DomainName {
    Argument,
    Application,
    Global,
    Locale,
    Registration,
    Custom(String),
}

impl DomainName {
    /// Domains that are never written to a persistent store.
    pub const VOLATILE: [Self; 3] = [Self::Argument, Self::Locale, Self::Registration];

    /// Domains bound to a persistent store at construction.
    pub const PERSISTENT: [Self; 2] = [Self::Global, Self::Application];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Argument => ARGUMENT_DOMAIN,
            Self::Application => APPLICATION_DOMAIN,
            Self::Global => GLOBAL_DOMAIN,
            Self::Locale => LOCALE_DOMAIN,
            Self::Registration => REGISTRATION_DOMAIN,
            Self::Custom(name) => name,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Custom(name) if name.is_empty())
    }

    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Global | Self::Application)
    }

    #[must_use]
    pub const fn is_volatile(&self) -> bool {
        matches!(self, Self::Argument | Self::Locale | Self::Registration)
    }
}

impl From<&str> for DomainName {
    fn from(name: &str) -> Self {
        match name {
            ARGUMENT_DOMAIN => Self::Argument,
            APPLICATION_DOMAIN => Self::Application,
            GLOBAL_DOMAIN => Self::Global,
            LOCALE_DOMAIN => Self::Locale,
            REGISTRATION_DOMAIN => Self::Registration,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for DomainName {
    fn from(name: String) -> Self {
        match Self::from(name.as_str()) {
            Self::Custom(_) => Self::Custom(name),
            builtin => builtin,
        }
    }
}

impl From<&String> for DomainName {
    fn from(name: &String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<&DomainName> for DomainName {
    fn from(name: &Self) -> Self {
        name.clone()
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        match name {
            DomainName::Custom(name) => name,
            builtin => builtin.as_str().to_owned(),
        }
    }
}

impl FromStr for DomainName {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_round_trip_through_strings() {
        for name in DomainName::VOLATILE.iter().chain(DomainName::PERSISTENT.iter()) {
            assert_eq!(&DomainName::from(name.as_str()), name);
            assert_eq!(&DomainName::from(name.to_string()), name);
        }
    }

    #[test]
    fn custom_names_are_case_sensitive() {
        assert_eq!(DomainName::from("globaldomain"), DomainName::Custom("globaldomain".into()));
        assert_eq!(DomainName::from("com.example.notes").as_str(), "com.example.notes");
    }

    #[test]
    fn only_the_empty_custom_name_is_empty() {
        assert!(DomainName::from("").is_empty());
        assert!(!DomainName::Global.is_empty());
        assert!(!DomainName::from("x").is_empty());
    }

    #[test]
    fn persistence_classes_do_not_overlap() {
        assert!(DomainName::Global.is_persistent());
        assert!(DomainName::Application.is_persistent());
        assert!(DomainName::Argument.is_volatile());
        assert!(!DomainName::Custom("DomainA".into()).is_persistent());
        assert!(!DomainName::Custom("DomainA".into()).is_volatile());
    }
}
