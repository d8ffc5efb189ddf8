use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// Longest key accepted as a file name on every supported filesystem.
const MAX_KEY_LEN: usize = 200;

/// Marker embedded in temporary file names; keys may never contain it.
pub(crate) const TMP_MARKER: &str = ".stratatmp.";

/// Validates a storage key and maps it to a file directly under `root`.
///
/// Keys are flat: letters, digits, `.`, `_` and `-` only, no leading dot, so a key can
/// never name a directory, a hidden file, or anything outside the root.
pub(crate) fn resolve_key(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    validate_key(key)?;
    Ok(root.join(key))
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            message: "EMPTY".into(),
            context: Some("Storage key cannot be empty".into()),
        });
    }

    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey {
            message: key.chars().take(32).collect::<String>().into(),
            context: Some(format!("Storage key longer than {MAX_KEY_LEN} bytes").into()),
        });
    }

    if key.starts_with('.') || key.contains(TMP_MARKER) {
        return Err(StorageError::InvalidKey {
            message: key.to_owned().into(),
            context: Some("Storage key cannot be hidden or reserved".into()),
        });
    }

    if !key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(StorageError::InvalidKey {
            message: key.to_owned().into(),
            context: Some("Storage key contains illegal characters".into()),
        });
    }

    Ok(())
}
