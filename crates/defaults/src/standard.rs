use crate::defaults::UserDefaults;
use crate::error::DefaultsError;
use crate::run_loop::RunLoop;
use parking_lot::Mutex;
use std::fmt;
use strata_domain::config::DefaultsConfig;
use strata_storage::Host;
use tracing::info;

type Factory = Box<dyn Fn() -> Result<UserDefaults, DefaultsError> + Send + Sync>;

/// Owns the process-wide "standard" [`UserDefaults`].
///
/// The instance is built on first access. Resetting synchronizes it and forgets it, so the
/// next access builds a fresh instance that reloads from the persistent stores.
pub struct StandardDefaults {
    factory: Factory,
    instance: Mutex<Option<UserDefaults>>,
}

impl StandardDefaults {
    /// Uses `factory` to build every standard instance.
    pub fn new(
        factory: impl Fn() -> Result<UserDefaults, DefaultsError> + Send + Sync + 'static,
    ) -> Self {
        Self { factory: Box::new(factory), instance: Mutex::new(None) }
    }

    /// Builds instances over `host` with `config`; all of them share one run loop.
    #[must_use]
    pub fn with_host(host: Host, config: DefaultsConfig, run_loop: RunLoop) -> Self {
        Self::new(move || {
            UserDefaults::builder()
                .host(host.clone())
                .config(config.clone())
                .run_loop(run_loop.clone())
                .build()
        })
    }

    /// The standard instance, built now if there is none.
    pub fn standard_instance(&self) -> Result<UserDefaults, DefaultsError> {
        let mut slot = self.instance.lock();
        if let Some(defaults) = slot.as_ref() {
            return Ok(defaults.clone());
        }

        let defaults = (self.factory)()?;
        info!("Standard defaults created");
        *slot = Some(defaults.clone());
        Ok(defaults)
    }

    /// Synchronizes the standard instance, then drops it.
    ///
    /// The instance is dropped even when the synchronize fails; the error is returned.
    pub fn reset_standard_instance(&self) -> Result<(), DefaultsError> {
        let Some(defaults) = self.instance.lock().take() else {
            return Ok(());
        };
        info!("Standard defaults reset");
        defaults.synchronize()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.instance.lock().is_some()
    }
}

impl fmt::Debug for StandardDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardDefaults").field("instance", &*self.instance.lock()).finish()
    }
}
