use std::borrow::Cow;

/// A specialized [`DefaultsError`] enum of this crate.
#[strata_derive::strata_error]
pub enum DefaultsError {
    /// The host lacks the capability a store variant needs.
    #[error("Unsupported feature{}: {message}", format_context(.context))]
    UnsupportedFeature { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A defaults file whose extension names no known format.
    #[error("Unsupported format{}: {message}", format_context(.context))]
    UnsupportedFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// A defaults file that does not decode into a domain.
    #[error("Decode failure{}: {message}", format_context(.context))]
    Decode { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Archive failure{}: {message}", format_context(.context))]
    Archive { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: strata_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Event bus failure{}: {source}", format_context(.context))]
    Events { source: strata_event_bus::EventBusError, context: Option<Cow<'static, str>> },

    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Internal defaults error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
