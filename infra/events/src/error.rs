use std::borrow::Cow;

/// Errors that can occur during event bus operations.
#[strata_derive::strata_error]
pub enum EventBusError {
    /// The channel registered for a type holds a sender of another type.
    /// This indicates an invariant violation in the type registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Capacity must be greater than zero.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The bus was shut down and no longer accepts subscriptions.
    #[error("Bus closed{}: {message}", format_context(.context))]
    Closed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
