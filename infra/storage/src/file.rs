//! Directory-backed [`LocalStorage`] with atomic writes and optional compression.

use crate::builder::FileStorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::local::LocalStorage;
use crate::maintenance;
use crate::security::{self, TMP_MARKER};
use std::fs;
use std::io::Write;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decompress(self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(data).context("Lz4 decompression failed")
            },
        }
    }
}

/// The shared state of a [`FileLocalStorage`] handle.
#[derive(Debug)]
pub struct FileStorageInner {
    /// Canonical directory holding one file per storage key.
    pub(crate) root: PathBuf,
    pub(crate) compression: Compression,
    /// Counter used to generate unique temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A durable [`LocalStorage`] that keeps one file per key under a root directory.
///
/// - **Atomic Writes**: each value is written to a unique temp file, synced, then renamed
///   over the target, so a crash never leaves a half-written value behind.
/// - **Transparent Compression**: optional LZ4 block compression.
/// - **Self-Healing**: stale temp files are purged when the storage is opened.
///
/// The handle is reference-counted and cheap to clone.
///
/// # Example
///
/// ```rust
/// use strata_storage::{Compression, FileLocalStorage, LocalStorage, StorageError};
///
/// # fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let storage = FileLocalStorage::builder()
///     .root(tmp.path().join("prefs"))
///     .compression(Compression::Lz4)
///     .connect()?;
///
/// storage.set_item("GlobalDomain", "%7B%7D")?;
/// assert_eq!(storage.get_item("GlobalDomain")?.as_deref(), Some("%7B%7D"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileLocalStorage {
    pub(crate) inner: Arc<FileStorageInner>,
}

impl Deref for FileLocalStorage {
    type Target = FileStorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FileLocalStorage {
    #[must_use = "The storage is not opened until you call .connect()"]
    pub fn builder() -> FileStorageBuilder {
        FileStorageBuilder::new()
    }

    /// Canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical path of the file backing `key`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidKey`] if the key is not a flat, safe file name.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        security::resolve_key(&self.root, key)
    }

    /// Lists the keys currently stored, sorted.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the root cannot be read.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = fs::read_dir(&self.root)
            .context(format!("Listing {}", self.root.display()))?
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| security::validate_key(name).is_ok())
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Removes stale temp files. Returns how many were deleted.
    pub fn purge_tmp(&self) -> usize {
        maintenance::purge_tmp(&self.root)
    }

    fn write_atomic(&self, target: &Path, data: &[u8]) -> Result<(), StorageError> {
        let temp = unique_tmp_path(target, &self.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).context("Write failed")?;
            file.sync_all().context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, target) {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(target)
                    .context(format!("Failed to replace existing file: {}", target.display()))?;
                fs::rename(&temp, target).context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    target.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp);
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
        }

        if let Some(parent) = target.parent() {
            sync_dir(parent);
        }
        Ok(())
    }
}

impl LocalStorage for FileLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.resolve(key)?;

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        let bytes = self.compression.decompress(&raw)?;
        String::from_utf8(bytes).map(Some).map_err(|e| StorageError::Corrupted {
            message: e.to_string().into(),
            context: Some(key.to_owned().into()),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        let data = self.compression.compress(value.as_bytes());
        self.write_atomic(&path, &data)?;
        debug!(key, bytes = data.len(), "Item saved atomically");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "Item removed");
                Ok(())
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", path.display()).into()),
            }),
        }
    }
}

fn sync_dir(path: &Path) {
    match fs::File::open(path) {
        Ok(dir) => {
            if let Err(err) = dir.sync_all() {
                tracing::trace!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("item");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
}
