use crate::error::{StorageError, StorageErrorExt};
use crate::file::{Compression, FileLocalStorage, FileStorageInner};
use private::Sealed;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing::info;

#[derive(Debug, Clone)]
struct FileStorageConfig {
    compression: Compression,
    create: bool,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self { compression: Compression::None, create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FileStorageBuilder<S: Sealed = NoRoot> {
    state: S,
    config: FileStorageConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> FileStorageBuilder<S> {
    #[must_use = "Sets compression for stored values"]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.config.compression = compression;
        self
    }

    #[must_use = "Sets whether the root directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> FileStorageBuilder<N> {
        FileStorageBuilder { state, config: self.config }
    }
}

impl FileStorageBuilder<NoRoot> {
    #[must_use = "Creates a new builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory holding one file per storage key"]
    pub fn root(self, path: impl Into<PathBuf>) -> FileStorageBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl FileStorageBuilder<WithRoot> {
    /// Opens the storage.
    ///
    /// 1. Creates the root directory if `create(true)` (the default).
    /// 2. Canonicalizes the root so later key resolution is anchored to a physical path.
    /// 3. Purges stale temp files left by interrupted writes (best-effort).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root does not exist and `create` is false, or if
    /// it cannot be created or resolved.
    pub fn connect(self) -> Result<FileLocalStorage, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .context(format!("Failed to resolve storage root: {}", root.display()))?;
        info!(path = %canonical.display(), compression = ?self.config.compression, "Opened file storage");

        let storage = FileLocalStorage {
            inner: Arc::new(FileStorageInner {
                root: canonical,
                compression: self.config.compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        storage.purge_tmp();

        Ok(storage)
    }
}
