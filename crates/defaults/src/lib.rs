//! Layered preference storage.
//!
//! Preferences live in named **domains**. Lookups merge a fixed subset of them into a
//! **search list**, where later domains shadow earlier ones:
//!
//! ```text
//! Registration < Global < Application < Argument
//! ```
//!
//! Global and Application are **persistent**: each is archived into one opaque payload
//! and kept in a [`PersistentStore`] over the host's local storage or, when the host has
//! none, its cookie jar. Writes to them schedule a single synchronize per processing
//! cycle on the [`RunLoop`]. Every effective write publishes [`DefaultsChanged`].
//!
//! # Architectural Overview
//!
//! 1.  **[`UserDefaults`]**: the cheap-clone facade and entry point.
//! 2.  **[`StandardDefaults`]**: owns the lifecycle of the shared standard instance.
//! 3.  **[`StoreKind`]** / **[`PersistentStore`]**: the storage backends.
//! 4.  **[`Archiver`]**: the serialization boundary ([`PostcardArchiver`], [`JsonArchiver`]).
//!
//! # Examples
//!
//! ```rust
//! use strata_defaults::{ProcessArguments, UserDefaults};
//! use strata_domain::DomainName;
//! use strata_storage::Host;
//!
//! # fn main() -> Result<(), strata_defaults::DefaultsError> {
//! let host = Host::in_memory();
//! let defaults = UserDefaults::builder()
//!     .host(host.clone())
//!     .arguments(&ProcessArguments::new(["-theme", "custom"]))
//!     .build()?;
//!
//! defaults.register_defaults([("theme", "dark")]);
//! defaults.set_object_in_domain("light", "theme", DomainName::Global);
//! assert_eq!(defaults.string_for_key("theme").as_deref(), Some("custom"));
//!
//! defaults.remove_object_for_key_in_domain("theme", DomainName::Argument);
//! assert_eq!(defaults.string_for_key("theme").as_deref(), Some("light"));
//!
//! // End of cycle: Global is written to the host.
//! defaults.run_loop().run_until_idle();
//! assert!(host.local_storage().unwrap().get_item("GlobalDomain")?.is_some());
//! # Ok(())
//! # }
//! ```

mod archive;
mod arguments;
mod config;
mod defaults;
mod domain_table;
mod error;
mod events;
pub mod plist;
mod run_loop;
mod search_list;
mod standard;
mod store;

pub use archive::{Archiver, JsonArchiver, PostcardArchiver, archiver_for};
pub use arguments::{ArgumentSource, ProcessArguments};
pub use config::{ENV_PREFIX, load_config};
pub use defaults::{UserDefaults, UserDefaultsBuilder};
pub use error::{DefaultsError, DefaultsErrorExt};
pub use events::DefaultsChanged;
pub use run_loop::RunLoop;
pub use standard::StandardDefaults;
pub use store::{CookiePersistentStore, LocalPersistentStore, PersistentStore, StoreKind};
