use strata_domain::DomainName;
use strata_domain::constants::{
    APPLICATION_DOMAIN, ARGUMENT_DOMAIN, GLOBAL_DOMAIN, LOCALE_DOMAIN, REGISTRATION_DOMAIN,
};

#[test]
fn constants_match_builtin_names() {
    assert_eq!(ARGUMENT_DOMAIN, "ArgumentDomain");
    assert_eq!(APPLICATION_DOMAIN, "ApplicationDomain");
    assert_eq!(GLOBAL_DOMAIN, "GlobalDomain");
    assert_eq!(LOCALE_DOMAIN, "LocaleDomain");
    assert_eq!(REGISTRATION_DOMAIN, "RegistrationDomain");
}

#[test]
fn constants_parse_into_builtins() {
    assert_eq!(DomainName::from(ARGUMENT_DOMAIN), DomainName::Argument);
    assert_eq!(DomainName::from(APPLICATION_DOMAIN), DomainName::Application);
    assert_eq!(DomainName::from(GLOBAL_DOMAIN), DomainName::Global);
    assert_eq!(DomainName::from(LOCALE_DOMAIN), DomainName::Locale);
    assert_eq!(DomainName::from(REGISTRATION_DOMAIN), DomainName::Registration);
}
