#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Strata crates.
//!
//! Every crate in the workspace describes its failures with a single enum annotated with
//! [`macro@strata_error`]; the macro keeps the `context` plumbing and source conversions
//! identical everywhere.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! strata-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context(...)`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped source type.
/// * **Conversions**: Implements `From<Source>` for variants with a `source` field (or a field
///   marked `#[source]` / `#[from]`), enabling `?` on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
/// * **Context Accessor**: `fn context_note(&self) -> Option<&str>` returning the attached context.
///
/// # Requirements
///
/// 1. Must be applied to an **enum** with named-field variants only.
/// 2. A `context` field, if present, must be `Option<Cow<'static, str>>`.
/// 3. A variant wrapping a source error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
/// use strata_derive::strata_error;
///
/// #[strata_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &str) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Reading store file")
/// }
/// ```
#[proc_macro_attribute]
pub fn strata_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
