//! # Preference Data Types
//!
//! Pure data shared by every Strata crate: [`Value`], [`Domain`], [`DomainName`] and the
//! [`config::DefaultsConfig`] model. Keep it lean: no I/O or storage logic, just data and
//! the conversions between its shapes.

pub mod config;
pub mod constants;
mod domain;
mod error;
mod name;
mod value;

pub use domain::Domain;
pub use error::{ValueError, ValueErrorExt};
pub use name::DomainName;
pub use value::Value;
