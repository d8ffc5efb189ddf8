//! Canonical names of the built-in domains. These double as storage keys.

pub const ARGUMENT_DOMAIN: &str = "ArgumentDomain";
pub const APPLICATION_DOMAIN: &str = "ApplicationDomain";
pub const GLOBAL_DOMAIN: &str = "GlobalDomain";
pub const LOCALE_DOMAIN: &str = "LocaleDomain";
pub const REGISTRATION_DOMAIN: &str = "RegistrationDomain";
