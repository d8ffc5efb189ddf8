use crate::archive::{Archiver, archiver_for};
use crate::arguments::ArgumentSource;
use crate::domain_table::DomainTable;
use crate::error::{DefaultsError, DefaultsErrorExt};
use crate::events::DefaultsChanged;
use crate::plist;
use crate::run_loop::RunLoop;
use crate::search_list::SearchList;
use crate::store::{PersistentStore, StoreKind};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strata_domain::config::DefaultsConfig;
use strata_domain::{Domain, DomainName, Value};
use strata_event_bus::{EventBus, Receiver};
use strata_storage::Host;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct State {
    table: DomainTable,
    search: SearchList,
}

#[derive(Debug)]
struct DefaultsInner {
    state: Mutex<State>,
    stores: RwLock<FxHashMap<DomainName, Box<dyn PersistentStore>>>,
    host: Host,
    archiver: Arc<dyn Archiver>,
    config: DefaultsConfig,
    bus: EventBus,
    /// Set while a synchronize sits in the run loop.
    flush_pending: AtomicBool,
}

/// Held only by user-facing handles. Deferred tasks hold [`DefaultsInner`] directly, so
/// dropping the last handle flushes a pending synchronize instead of losing it.
#[derive(Debug)]
struct FlushOnDrop(Arc<DefaultsInner>);

impl Drop for FlushOnDrop {
    fn drop(&mut self) {
        self.0.flush_if_pending();
    }
}

/// Layered preferences backed by persistent stores.
///
/// Lookups go through a search list that merges, in ascending precedence, the
/// Registration, Global, Application and Argument domains. Writes to Global or
/// Application schedule one synchronize on the [`RunLoop`] per cycle, and every effective
/// write publishes [`DefaultsChanged`].
///
/// The handle is reference-counted and cheap to clone. When the last handle is dropped
/// with a synchronize still queued, the synchronize runs right away.
///
/// # Example
///
/// ```rust
/// use strata_defaults::UserDefaults;
///
/// # fn main() -> Result<(), strata_defaults::DefaultsError> {
/// let defaults = UserDefaults::builder().build()?;
/// defaults.register_defaults([("theme", "dark")]);
/// defaults.set_object("light", "theme");
///
/// assert_eq!(defaults.string_for_key("theme").as_deref(), Some("light"));
///
/// // End of the processing cycle: the Application domain is written to its store.
/// defaults.run_loop().run_until_idle();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UserDefaults {
    inner: Arc<DefaultsInner>,
    run_loop: RunLoop,
    _flush_guard: Arc<FlushOnDrop>,
}

impl UserDefaults {
    #[must_use = "The instance is not created until you call .build()"]
    pub fn builder() -> UserDefaultsBuilder {
        UserDefaultsBuilder::default()
    }

    // --- Lookup ---

    /// The value for `key` in the highest-precedence searched domain that defines it.
    #[must_use]
    pub fn object_for_key(&self, key: &str) -> Option<Value> {
        let mut state = self.inner.state.lock();
        let State { table, search } = &mut *state;
        search.get(table, key).cloned()
    }

    /// The value for `key` in exactly `domain`, bypassing the search list.
    #[must_use]
    pub fn object_for_key_in_domain(
        &self,
        key: &str,
        domain: impl Into<DomainName>,
    ) -> Option<Value> {
        self.inner.state.lock().table.get(&domain.into(), key).cloned()
    }

    #[must_use]
    pub fn bool_for_key(&self, key: &str) -> Option<bool> {
        self.object_for_key(key)?.as_bool()
    }

    #[must_use]
    pub fn integer_for_key(&self, key: &str) -> Option<i64> {
        self.object_for_key(key)?.as_i64()
    }

    #[must_use]
    pub fn float_for_key(&self, key: &str) -> Option<f32> {
        self.object_for_key(key)?.as_f32()
    }

    #[must_use]
    pub fn double_for_key(&self, key: &str) -> Option<f64> {
        self.object_for_key(key)?.as_f64()
    }

    /// Strings, plus numbers in their decimal form.
    #[must_use]
    pub fn string_for_key(&self, key: &str) -> Option<String> {
        self.object_for_key(key)?.to_text()
    }

    #[must_use]
    pub fn array_for_key(&self, key: &str) -> Option<Vec<Value>> {
        match self.object_for_key(key)? {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn dictionary_for_key(&self, key: &str) -> Option<BTreeMap<String, Value>> {
        match self.object_for_key(key)? {
            Value::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn data_for_key(&self, key: &str) -> Option<Vec<u8>> {
        match self.object_for_key(key)? {
            Value::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    // --- Mutation ---

    /// Sets `key` in the Application domain.
    pub fn set_object(&self, value: impl Into<Value>, key: &str) {
        self.set_object_in_domain(value, key, DomainName::Application);
    }

    /// Sets `key` in `domain`, creating the domain if needed.
    ///
    /// Ignored when `key` or `domain` is empty.
    pub fn set_object_in_domain(
        &self,
        value: impl Into<Value>,
        key: &str,
        domain: impl Into<DomainName>,
    ) {
        let domain = domain.into();
        let changed = {
            let mut state = self.inner.state.lock();
            let changed = state.table.set(&domain, key, value.into());
            if changed {
                state.search.invalidate();
            }
            changed
        };

        if changed {
            debug!(domain = %domain, key, "Value set");
            self.domain_changed(domain, Some(key));
        }
    }

    pub fn set_bool(&self, value: bool, key: &str) {
        self.set_object(value, key);
    }

    pub fn set_integer(&self, value: i64, key: &str) {
        self.set_object(value, key);
    }

    pub fn set_float(&self, value: f32, key: &str) {
        self.set_object(value, key);
    }

    pub fn set_double(&self, value: f64, key: &str) {
        self.set_object(value, key);
    }

    /// Removes `key` from the Application domain.
    pub fn remove_object_for_key(&self, key: &str) {
        self.remove_object_for_key_in_domain(key, DomainName::Application);
    }

    /// Removes `key` from `domain`.
    ///
    /// Ignored when the domain does not exist. Observers are notified even if the key was
    /// not present.
    pub fn remove_object_for_key_in_domain(&self, key: &str, domain: impl Into<DomainName>) {
        let domain = domain.into();
        let changed = {
            let mut state = self.inner.state.lock();
            let changed = state.table.remove(&domain, key);
            if changed {
                state.search.invalidate();
            }
            changed
        };

        if changed {
            debug!(domain = %domain, key, "Value removed");
            self.domain_changed(domain, Some(key));
        }
    }

    /// Replaces the whole content of `name`.
    pub fn set_domain(&self, domain: Domain, name: impl Into<DomainName>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        {
            let mut state = self.inner.state.lock();
            state.table.replace(&name, Some(domain));
            state.search.invalidate();
        }
        debug!(domain = %name, "Domain replaced");
        self.domain_changed(name, None);
    }

    /// Empties `name`. A persisted domain is written back empty on the next synchronize.
    pub fn clear_domain(&self, name: impl Into<DomainName>) {
        self.set_domain(Domain::new(), name);
    }

    /// Writes every entry into the Registration domain, which is never persisted.
    pub fn register_defaults<K, V>(&self, defaults: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in defaults {
            self.set_object_in_domain(value, key.as_ref(), DomainName::Registration);
        }
    }

    /// Registers the defaults stored in a `.json` or `.toml` file.
    ///
    /// # Errors
    /// * [`DefaultsError::UnsupportedFormat`] for other extensions.
    /// * [`DefaultsError::Io`] if the file cannot be read.
    /// * [`DefaultsError::Decode`] if it does not hold a table of values.
    pub fn register_defaults_from_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(), DefaultsError> {
        let path = path.as_ref();
        let domain = plist::read_domain(path)?;
        info!(path = %path.display(), keys = domain.len(), "Registering defaults from file");
        self.register_defaults(domain);
        Ok(())
    }

    // --- Persistence ---

    /// Archives the Global and Application domains into their stores.
    ///
    /// Absent domains and domains without a store are skipped. A failure on one domain
    /// does not stop the other; the first error is returned.
    pub fn synchronize(&self) -> Result<(), DefaultsError> {
        self.inner.synchronize()
    }

    /// Whether a synchronize is waiting in the run loop.
    #[must_use]
    pub fn has_pending_synchronize(&self) -> bool {
        self.inner.flush_pending.load(Ordering::Acquire)
    }

    /// Replaces `name` with what its store holds, or drops it when the store holds nothing
    /// readable. Domains without a store are left untouched.
    pub fn reload_domain(&self, name: &DomainName) {
        let loaded = {
            let stores = self.inner.stores.read();
            let Some(store) = stores.get(name) else {
                debug!(domain = %name, "Reload skipped: no store bound");
                return;
            };
            self.read_store(name, store.as_ref())
        };

        let mut state = self.inner.state.lock();
        state.table.replace(name, loaded);
        state.search.invalidate();
    }

    fn read_store(&self, name: &DomainName, store: &dyn PersistentStore) -> Option<Domain> {
        let bytes = match store.data() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(domain = %name, "No persisted data");
                return None;
            },
            Err(err) => {
                warn!(domain = %name, error = %err, "Persisted data unreadable");
                return None;
            },
        };

        match self.inner.archiver.unarchive(&bytes) {
            Ok(domain) => {
                debug!(domain = %name, keys = domain.len(), "Domain reloaded");
                Some(domain)
            },
            Err(err) => {
                warn!(domain = %name, error = %err, "Persisted data does not unarchive");
                None
            },
        }
    }

    /// The kind of store bound to `domain`, if any.
    #[must_use]
    pub fn persistent_store_for_domain(&self, domain: impl Into<DomainName>) -> Option<StoreKind> {
        self.inner.stores.read().get(&domain.into()).map(|store| store.kind())
    }

    /// Binds `domain` to a new store of `kind`, optionally reloading the domain from it.
    ///
    /// Does nothing when the bound store already has `kind`.
    ///
    /// # Errors
    /// Returns [`DefaultsError::UnsupportedFeature`] when the host lacks the capability; the
    /// previous binding is kept.
    pub fn set_persistent_store_kind_for_domain(
        &self,
        kind: StoreKind,
        domain: impl Into<DomainName>,
        reload: bool,
    ) -> Result<(), DefaultsError> {
        let domain = domain.into();
        if domain.is_empty() || self.persistent_store_for_domain(&domain) == Some(kind) {
            return Ok(());
        }

        let mut store = kind.create(&self.inner.host)?;
        store.bind_to_domain(&self.storage_key(&domain));
        self.inner.stores.write().insert(domain.clone(), store);
        info!(domain = %domain, store = %kind, reload, "Persistent store bound");

        if reload {
            self.reload_domain(&domain);
        }
        Ok(())
    }

    /// The key a domain is stored under: its name, or the application id for Application.
    #[must_use]
    pub fn storage_key(&self, name: &DomainName) -> String {
        match (name, &self.inner.config.application_id) {
            (DomainName::Application, Some(id)) if !id.is_empty() => id.clone(),
            _ => name.as_str().to_owned(),
        }
    }

    // --- Introspection ---

    #[must_use]
    pub fn volatile_domain_names(&self) -> Vec<DomainName> {
        DomainName::VOLATILE.to_vec()
    }

    #[must_use]
    pub fn persistent_domain_names(&self) -> Vec<DomainName> {
        DomainName::PERSISTENT.to_vec()
    }

    /// Snapshot of the merged search list.
    #[must_use]
    pub fn dictionary_representation(&self) -> Domain {
        let mut state = self.inner.state.lock();
        let State { table, search } = &mut *state;
        search.merged(table).clone()
    }

    /// Snapshot of one domain.
    #[must_use]
    pub fn domain(&self, name: impl Into<DomainName>) -> Option<Domain> {
        self.inner.state.lock().table.domain(&name.into()).cloned()
    }

    /// Names of the domains currently present.
    #[must_use]
    pub fn domain_names(&self) -> Vec<DomainName> {
        self.inner.state.lock().table.names().cloned().collect()
    }

    /// Subscribes to change notifications.
    ///
    /// # Errors
    /// Returns [`DefaultsError::Events`] when the event bus has been shut down.
    pub fn subscribe(&self) -> Result<Receiver<Arc<DefaultsChanged>>, DefaultsError> {
        Ok(self.inner.bus.subscribe::<DefaultsChanged>()?)
    }

    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }

    #[must_use]
    pub fn run_loop(&self) -> &RunLoop {
        &self.run_loop
    }

    #[must_use]
    pub fn host(&self) -> &Host {
        &self.inner.host
    }

    #[must_use]
    pub fn config(&self) -> &DefaultsConfig {
        &self.inner.config
    }

    // --- Change propagation ---

    fn domain_changed(&self, domain: DomainName, key: Option<&str>) {
        if domain.is_persistent() {
            self.schedule_synchronize();
        }

        let event = DefaultsChanged { domain, key: key.map(str::to_owned) };
        if let Err(err) = self.inner.bus.publish(event) {
            warn!(error = %err, "Change notification failed");
        }
    }

    fn schedule_synchronize(&self) {
        if self.inner.flush_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.run_loop.schedule(move || inner.flush_if_pending());
        debug!("Synchronize scheduled");
    }
}

impl DefaultsInner {
    fn synchronize(&self) -> Result<(), DefaultsError> {
        let mut first_error = None;
        for name in &DomainName::PERSISTENT {
            if let Err(err) = self.synchronize_domain(name) {
                warn!(domain = %name, error = %err, "Synchronize failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn synchronize_domain(&self, name: &DomainName) -> Result<(), DefaultsError> {
        let Some(domain) = self.state.lock().table.domain(name).cloned() else {
            return Ok(());
        };

        let stores = self.stores.read();
        let Some(store) = stores.get(name) else {
            return Ok(());
        };

        let bytes = self.archiver.archive(&domain).context(name.to_string())?;
        store.set_data(&bytes)?;
        debug!(domain = %name, keys = domain.len(), bytes = bytes.len(), "Domain synchronized");
        Ok(())
    }

    /// Runs the queued synchronize unless something already ran it.
    fn flush_if_pending(&self) {
        if !self.flush_pending.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Err(err) = self.synchronize() {
            warn!(error = %err, "Deferred synchronize failed");
        }
    }
}

/// Configures and builds a [`UserDefaults`].
///
/// Everything is optional: the host defaults to [`Host::in_memory`], the archiver follows
/// the configured [`ArchiveFormat`](strata_domain::config::ArchiveFormat), and a private
/// run loop and event bus are created when none are supplied.
#[derive(Debug, Default)]
pub struct UserDefaultsBuilder {
    host: Option<Host>,
    config: DefaultsConfig,
    archiver: Option<Arc<dyn Archiver>>,
    arguments: Vec<(String, Value)>,
    run_loop: Option<RunLoop>,
    bus: Option<EventBus>,
}

impl UserDefaultsBuilder {
    #[must_use = "Sets the storage capabilities"]
    pub fn host(mut self, host: Host) -> Self {
        self.host = Some(host);
        self
    }

    #[must_use = "Sets the configuration"]
    pub fn config(mut self, config: DefaultsConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "Overrides the configured archive format"]
    pub fn archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.archiver = Some(archiver);
        self
    }

    /// Seeds the Argument domain.
    #[must_use = "Seeds the Argument domain"]
    pub fn arguments(mut self, source: &impl ArgumentSource) -> Self {
        self.arguments.extend(source.arguments());
        self
    }

    #[must_use = "Shares a run loop for deferred synchronization"]
    pub fn run_loop(mut self, run_loop: RunLoop) -> Self {
        self.run_loop = Some(run_loop);
        self
    }

    #[must_use = "Shares an event bus for change notifications"]
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the instance.
    ///
    /// 1. Picks the store kind: the configured one, or local storage when the host has it
    ///    and cookies otherwise.
    /// 2. Copies the startup arguments into the Argument domain.
    /// 3. Binds Global and Application to stores and reloads both.
    ///
    /// # Errors
    /// Returns [`DefaultsError::UnsupportedFeature`] when local storage is configured but
    /// the host does not offer it.
    pub fn build(self) -> Result<UserDefaults, DefaultsError> {
        let host = self.host.unwrap_or_default();
        let kind = StoreKind::select(self.config.store, &host)?;
        let archiver = self.archiver.unwrap_or_else(|| archiver_for(self.config.archive));

        let mut table = DomainTable::default();
        for (key, value) in self.arguments {
            table.set(&DomainName::Argument, &key, value);
        }

        let inner = Arc::new(DefaultsInner {
            state: Mutex::new(State { table, search: SearchList::default() }),
            stores: RwLock::default(),
            host,
            archiver,
            config: self.config,
            bus: self.bus.unwrap_or_default(),
            flush_pending: AtomicBool::new(false),
        });
        let defaults = UserDefaults {
            _flush_guard: Arc::new(FlushOnDrop(Arc::clone(&inner))),
            inner,
            run_loop: self.run_loop.unwrap_or_default(),
        };

        for name in DomainName::PERSISTENT {
            let mut store = kind.create(&defaults.inner.host)?;
            store.bind_to_domain(&defaults.storage_key(&name));
            defaults.inner.stores.write().insert(name.clone(), store);
            defaults.reload_domain(&name);
        }

        info!(
            store = %kind,
            archive = ?defaults.inner.archiver.format(),
            application = %defaults.storage_key(&DomainName::Application),
            "User defaults ready"
        );
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_event_bus::EventReceiverExt;

    fn defaults() -> UserDefaults {
        UserDefaults::builder().build().unwrap()
    }

    #[test]
    fn set_object_targets_the_application_domain() {
        let defaults = defaults();
        defaults.set_object(3, "count");

        assert_eq!(
            defaults.object_for_key_in_domain("count", DomainName::Application),
            Some(Value::Integer(3))
        );
        assert_eq!(defaults.object_for_key_in_domain("count", DomainName::Global), None);
    }

    #[test]
    fn typed_getters_coerce_or_return_none() {
        let defaults = defaults();
        defaults.set_object("12.75", "size");
        defaults.set_object(vec![Value::Integer(1)], "list");

        assert_eq!(defaults.integer_for_key("size"), Some(12));
        assert_eq!(defaults.double_for_key("size"), Some(12.75));
        assert_eq!(defaults.bool_for_key("size"), Some(true));
        assert_eq!(defaults.integer_for_key("list"), None);
        assert_eq!(defaults.array_for_key("list"), Some(vec![Value::Integer(1)]));
        assert_eq!(defaults.integer_for_key("missing"), None);
    }

    #[test]
    fn typed_setters_store_native_kinds() {
        let defaults = defaults();
        defaults.set_bool(true, "b");
        defaults.set_integer(7, "i");
        defaults.set_float(1.5, "f");
        defaults.set_double(2.25, "d");

        assert_eq!(defaults.object_for_key("b"), Some(Value::Bool(true)));
        assert_eq!(defaults.object_for_key("i"), Some(Value::Integer(7)));
        assert_eq!(defaults.object_for_key("f"), Some(Value::Real(1.5)));
        assert_eq!(defaults.float_for_key("d"), Some(2.25));
    }

    #[test]
    fn registration_is_never_scheduled_for_synchronize() {
        let defaults = defaults();
        defaults.register_defaults([("theme", "dark")]);

        assert!(!defaults.has_pending_synchronize());
        assert_eq!(defaults.run_loop().pending(), 0);
        assert_eq!(defaults.string_for_key("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn writes_notify_subscribers() {
        let defaults = defaults();
        let mut rx = defaults.subscribe().unwrap();

        defaults.set_object_in_domain(1, "k", "DomainA");
        defaults.remove_object_for_key_in_domain("absent", "DomainA");
        defaults.remove_object_for_key_in_domain("k", "NoSuchDomain");

        let events = rx.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].domain, DomainName::from("DomainA"));
        assert_eq!(events[1].key.as_deref(), Some("absent"));
    }

    #[test]
    fn clearing_a_domain_keeps_it_present() {
        let defaults = defaults();
        defaults.set_object(1, "k");
        defaults.clear_domain(DomainName::Application);

        assert_eq!(defaults.domain(DomainName::Application), Some(Domain::new()));
        assert_eq!(defaults.object_for_key("k"), None);
    }

    #[test]
    fn storage_key_uses_the_application_id() {
        let config = DefaultsConfig::default().with_application_id("com.example.notes");
        let defaults = UserDefaults::builder().config(config).build().unwrap();

        assert_eq!(defaults.storage_key(&DomainName::Application), "com.example.notes");
        assert_eq!(defaults.storage_key(&DomainName::Global), "GlobalDomain");
    }

    #[test]
    fn rebinding_to_the_same_kind_is_a_no_op() {
        let defaults = defaults();
        defaults.set_object(1, "k");
        defaults
            .set_persistent_store_kind_for_domain(StoreKind::Local, DomainName::Application, true)
            .unwrap();

        assert_eq!(defaults.object_for_key("k"), Some(Value::Integer(1)));
    }
}
