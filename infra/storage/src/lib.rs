//! Host storage capabilities.
//!
//! Preference stores persist through whatever the environment offers. This crate models
//! those offerings as two synchronous capabilities bundled in a [`Host`]:
//!
//! - **[`LocalStorage`]**: durable string-keyed strings. [`FileLocalStorage`] keeps one file
//!   per key with atomic writes and optional LZ4 compression; [`MemoryLocalStorage`] is the
//!   in-process variant with an optional quota.
//! - **[`CookieJar`]**: host-scoped cookies with expiration and a per-cookie size ceiling.
//!   [`MemoryCookieJar`] behaves like a browser jar for a single origin.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_storage::{FileLocalStorage, Host, LocalStorage, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let files = FileLocalStorage::builder().root(tmp.path()).connect()?;
//! let host = Host::cookie_only().with_local_storage(Arc::new(files));
//!
//! if let Some(storage) = host.local_storage() {
//!     storage.set_item("GlobalDomain", "payload")?;
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod cookie;
mod error;
mod file;
mod host;
mod local;
mod maintenance;
mod security;

pub use builder::{FileStorageBuilder, NoRoot, WithRoot};
pub use cookie::{Cookie, CookieJar, DEFAULT_MAX_COOKIE_SIZE, MemoryCookieJar};
pub use error::{StorageError, StorageErrorExt};
pub use file::{Compression, FileLocalStorage};
pub use host::Host;
pub use local::{LocalStorage, MemoryLocalStorage};
