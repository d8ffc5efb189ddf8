//! The serialization boundary between in-memory domains and persisted bytes.

use crate::error::DefaultsError;
use std::fmt::Debug;
use std::sync::Arc;
use strata_domain::{Domain, Value};
use strata_domain::config::ArchiveFormat;

/// Turns a [`Domain`] into an opaque byte payload and back.
///
/// `unarchive(archive(d)) == d` must hold for every domain `archive` accepts.
pub trait Archiver: Send + Sync + Debug {
    fn format(&self) -> ArchiveFormat;

    fn archive(&self, domain: &Domain) -> Result<Vec<u8>, DefaultsError>;

    fn unarchive(&self, bytes: &[u8]) -> Result<Domain, DefaultsError>;
}

/// Compact binary archives via `postcard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostcardArchiver;

impl Archiver for PostcardArchiver {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Postcard
    }

    fn archive(&self, domain: &Domain) -> Result<Vec<u8>, DefaultsError> {
        postcard::to_stdvec(domain).map_err(|e| DefaultsError::Archive {
            message: e.to_string().into(),
            context: Some("Postcard encoding failed".into()),
        })
    }

    fn unarchive(&self, bytes: &[u8]) -> Result<Domain, DefaultsError> {
        postcard::from_bytes(bytes).map_err(|e| DefaultsError::Archive {
            message: e.to_string().into(),
            context: Some("Postcard decoding failed".into()),
        })
    }
}

/// Human-readable archives via `serde_json`.
///
/// JSON has no spelling for infinities or NaN, so domains holding one are refused rather
/// than written as `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArchiver;

impl Archiver for JsonArchiver {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Json
    }

    fn archive(&self, domain: &Domain) -> Result<Vec<u8>, DefaultsError> {
        if let Some((key, _)) = domain.iter().find(|(_, value)| holds_non_finite(value)) {
            return Err(DefaultsError::Archive {
                message: format!("Non-finite real under '{key}'").into(),
                context: Some("Json encoding failed".into()),
            });
        }
        serde_json::to_vec(domain).map_err(|e| DefaultsError::Archive {
            message: e.to_string().into(),
            context: Some("Json encoding failed".into()),
        })
    }

    fn unarchive(&self, bytes: &[u8]) -> Result<Domain, DefaultsError> {
        serde_json::from_slice(bytes).map_err(|e| DefaultsError::Archive {
            message: e.to_string().into(),
            context: Some("Json decoding failed".into()),
        })
    }
}

fn holds_non_finite(value: &Value) -> bool {
    match value {
        Value::Real(r) => !r.is_finite(),
        Value::Array(items) => items.iter().any(holds_non_finite),
        Value::Dictionary(map) => map.values().any(holds_non_finite),
        _ => false,
    }
}

/// The stock archiver for `format`.
#[must_use]
pub fn archiver_for(format: ArchiveFormat) -> Arc<dyn Archiver> {
    match format {
        ArchiveFormat::Postcard => Arc::new(PostcardArchiver),
        ArchiveFormat::Json => Arc::new(JsonArchiver),
    }
}
