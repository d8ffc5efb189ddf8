use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[strata_derive::strata_error]
pub enum StorageError {
    #[error("Invalid storage key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage quota exceeded{}: {message}", format_context(.context))]
    QuotaExceeded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Corrupted item{}: {message}", format_context(.context))]
    Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Decompression failure{}: {source}", format_context(.context))]
    Decompress { source: lz4_flex::block::DecompressError, context: Option<Cow<'static, str>> },
}
