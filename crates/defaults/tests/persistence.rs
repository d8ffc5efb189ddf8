mod common;

use common::counting_host;
use std::sync::Arc;
use strata_defaults::{
    DefaultsError, JsonArchiver, LocalPersistentStore, RunLoop, StoreKind, UserDefaults,
};
use strata_domain::config::{ArchiveFormat, DefaultsConfig, StorePreference};
use strata_domain::{DomainName, Value};
use strata_storage::{Cookie, FileLocalStorage, Host, LocalStorage};

#[test]
fn many_writes_in_one_cycle_synchronize_once() {
    let (host, storage) = counting_host();
    let defaults = UserDefaults::builder().host(host).build().unwrap();

    for i in 0..10 {
        defaults.set_object_in_domain(i, "counter", DomainName::Global);
        defaults.set_object(i, "counter");
    }
    assert!(defaults.has_pending_synchronize());
    assert_eq!(defaults.run_loop().pending(), 1);
    assert_eq!(storage.total_writes(), 0);

    assert_eq!(defaults.run_loop().run_until_idle(), 1);
    assert_eq!(storage.writes("GlobalDomain"), 1);
    assert_eq!(storage.writes("ApplicationDomain"), 1);
    assert!(!defaults.has_pending_synchronize());
}

#[test]
fn a_new_cycle_schedules_a_new_synchronize() {
    let (host, storage) = counting_host();
    let defaults = UserDefaults::builder().host(host).build().unwrap();

    defaults.set_object(1, "k");
    defaults.run_loop().run_until_idle();
    defaults.set_object(2, "k");
    defaults.run_loop().run_until_idle();

    assert_eq!(storage.writes("ApplicationDomain"), 2);
}

#[test]
fn volatile_and_custom_domains_never_schedule() {
    let (host, storage) = counting_host();
    let defaults = UserDefaults::builder().host(host).build().unwrap();

    defaults.set_object_in_domain(1, "k", DomainName::Argument);
    defaults.set_object_in_domain(1, "k", DomainName::Registration);
    defaults.set_object_in_domain(1, "k", "DomainA");

    assert_eq!(defaults.run_loop().run_until_idle(), 0);
    assert_eq!(storage.total_writes(), 0);
}

#[test]
fn synchronize_skips_absent_domains() {
    let (host, storage) = counting_host();
    let defaults = UserDefaults::builder().host(host).build().unwrap();

    defaults.set_object_in_domain(true, "k", DomainName::Global);
    defaults.synchronize().unwrap();

    assert_eq!(storage.writes("GlobalDomain"), 1);
    assert_eq!(storage.writes("ApplicationDomain"), 0);
}

#[test]
fn persisted_domains_reload_in_a_new_instance() {
    let host = Host::in_memory();
    let first = UserDefaults::builder().host(host.clone()).build().unwrap();
    first.set_object_in_domain("g", "scope", DomainName::Global);
    first.set_object(vec![Value::from("a.txt")], "recent");
    first.set_object_in_domain("r", "reg", DomainName::Registration);
    first.run_loop().run_until_idle();

    let second = UserDefaults::builder().host(host).build().unwrap();
    assert_eq!(second.string_for_key("scope").as_deref(), Some("g"));
    assert_eq!(second.array_for_key("recent"), Some(vec![Value::from("a.txt")]));
    assert_eq!(second.object_for_key("reg"), None);
}

#[test]
fn pending_flush_targets_the_instance_that_scheduled_it() {
    let host = Host::in_memory();
    let run_loop = RunLoop::new();
    let build = || {
        UserDefaults::builder().host(host.clone()).run_loop(run_loop.clone()).build().unwrap()
    };

    let old = build();
    old.set_object("old", "k");
    let fresh = build();
    drop(old);

    run_loop.run_until_idle();
    assert_eq!(fresh.object_for_key("k"), None);
    assert_eq!(build().string_for_key("k").as_deref(), Some("old"));
}

#[test]
fn cookie_fallback_without_local_storage() {
    let host = Host::cookie_only();
    let defaults = UserDefaults::builder().host(host.clone()).build().unwrap();

    assert_eq!(defaults.persistent_store_for_domain(DomainName::Global), Some(StoreKind::Cookie));
    assert_eq!(
        defaults.persistent_store_for_domain(DomainName::Application),
        Some(StoreKind::Cookie)
    );
    assert!(matches!(
        LocalPersistentStore::new(&host),
        Err(DefaultsError::UnsupportedFeature { .. })
    ));

    defaults.set_object("v", "k");
    defaults.run_loop().run_until_idle();
    let cookie = host.cookies().cookie("ApplicationDomain").unwrap().unwrap();
    assert_eq!(cookie.expires, Some(Cookie::far_future()));

    let reloaded = UserDefaults::builder().host(host).build().unwrap();
    assert_eq!(reloaded.string_for_key("k").as_deref(), Some("v"));
}

#[test]
fn pinning_local_storage_on_a_cookie_host_fails() {
    let config = DefaultsConfig::default().with_store(StorePreference::Local);
    let result = UserDefaults::builder().host(Host::cookie_only()).config(config).build();
    assert!(matches!(result, Err(DefaultsError::UnsupportedFeature { .. })));
}

#[test]
fn failed_rebind_keeps_the_previous_store() {
    let defaults = UserDefaults::builder().host(Host::cookie_only()).build().unwrap();

    let result =
        defaults.set_persistent_store_kind_for_domain(StoreKind::Local, DomainName::Global, true);
    assert!(matches!(result, Err(DefaultsError::UnsupportedFeature { .. })));
    assert_eq!(defaults.persistent_store_for_domain(DomainName::Global), Some(StoreKind::Cookie));
}

#[test]
fn rebinding_with_reload_switches_data_source() {
    let host = Host::in_memory();
    let defaults = UserDefaults::builder().host(host.clone()).build().unwrap();
    defaults.set_object_in_domain("local", "k", DomainName::Global);
    defaults.synchronize().unwrap();

    defaults
        .set_persistent_store_kind_for_domain(StoreKind::Cookie, DomainName::Global, true)
        .unwrap();
    assert_eq!(defaults.persistent_store_for_domain(DomainName::Global), Some(StoreKind::Cookie));
    assert_eq!(defaults.object_for_key_in_domain("k", DomainName::Global), None);

    defaults.set_object_in_domain("cookie", "k", DomainName::Global);
    defaults.synchronize().unwrap();
    assert!(host.cookies().cookie("GlobalDomain").unwrap().is_some());
}

#[test]
fn rebinding_without_reload_keeps_memory() {
    let defaults = UserDefaults::builder().build().unwrap();
    defaults.set_object("kept", "k");

    defaults
        .set_persistent_store_kind_for_domain(StoreKind::Cookie, DomainName::Application, false)
        .unwrap();
    assert_eq!(defaults.string_for_key("k").as_deref(), Some("kept"));
}

#[test]
fn custom_domains_can_be_bound_and_reloaded() {
    let host = Host::in_memory();
    host.local_storage().unwrap().set_item("Shared", "").unwrap();
    let defaults = UserDefaults::builder().host(host).build().unwrap();

    assert_eq!(defaults.persistent_store_for_domain("Shared"), None);
    defaults.set_persistent_store_kind_for_domain(StoreKind::Local, "Shared", true).unwrap();
    assert_eq!(defaults.persistent_store_for_domain("Shared"), Some(StoreKind::Local));
    assert_eq!(defaults.domain("Shared"), None);
}

#[test]
fn malformed_persisted_data_is_no_data() {
    let host = Host::in_memory();
    host.local_storage().unwrap().set_item("GlobalDomain", "%FF%FF%FF").unwrap();

    let defaults = UserDefaults::builder().host(host).build().unwrap();
    assert_eq!(defaults.domain(DomainName::Global), None);
}

#[test]
fn application_id_names_the_storage_slot() {
    let host = Host::in_memory();
    let config = DefaultsConfig::default().with_application_id("com.example.notes");
    let defaults = UserDefaults::builder().host(host.clone()).config(config).build().unwrap();

    defaults.set_object(1, "k");
    defaults.run_loop().run_until_idle();

    let storage = host.local_storage().unwrap();
    assert!(storage.get_item("com.example.notes").unwrap().is_some());
    assert!(storage.get_item("ApplicationDomain").unwrap().is_none());
}

#[test]
fn json_archives_are_readable_in_storage() {
    let host = Host::in_memory();
    let config = DefaultsConfig::default().with_archive(ArchiveFormat::Json);
    let defaults = UserDefaults::builder().host(host.clone()).config(config).build().unwrap();

    defaults.set_object_in_domain(true, "k", DomainName::Global);
    defaults.synchronize().unwrap();

    let stored = host.local_storage().unwrap().get_item("GlobalDomain").unwrap().unwrap();
    let decoded = urlencoding::decode(&stored).unwrap();
    assert_eq!(decoded, r#"{"k":{"Bool":true}}"#);
}

#[test]
fn explicit_archiver_overrides_config() {
    let defaults = UserDefaults::builder().archiver(Arc::new(JsonArchiver)).build().unwrap();
    defaults.set_object(1.5, "ratio");
    defaults.synchronize().unwrap();

    let reloaded = UserDefaults::builder()
        .host(defaults.host().clone())
        .archiver(Arc::new(JsonArchiver))
        .build()
        .unwrap();
    assert_eq!(reloaded.double_for_key("ratio"), Some(1.5));
}

#[test]
fn clearing_a_persisted_domain_writes_it_back_empty() {
    let host = Host::in_memory();
    let defaults = UserDefaults::builder().host(host.clone()).build().unwrap();
    defaults.set_object(1, "k");
    defaults.run_loop().run_until_idle();

    defaults.clear_domain(DomainName::Application);
    defaults.run_loop().run_until_idle();

    let reloaded = UserDefaults::builder().host(host).build().unwrap();
    assert_eq!(reloaded.object_for_key("k"), None);
    assert_eq!(reloaded.domain(DomainName::Application).map(|d| d.len()), Some(0));
}

#[test]
fn file_storage_survives_process_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        let files = FileLocalStorage::builder().root(dir.path()).connect().unwrap();
        let host = Host::cookie_only().with_local_storage(Arc::new(files));
        UserDefaults::builder().host(host).build().unwrap()
    };

    let first = open();
    first.set_object_in_domain(42, "answer", DomainName::Global);
    first.run_loop().run_until_idle();
    drop(first);

    assert_eq!(open().integer_for_key("answer"), Some(42));
    assert!(dir.path().join("GlobalDomain").exists());
}

#[test]
fn unarchivable_values_leave_the_stored_domain_intact() {
    let host = Host::in_memory();
    let config = DefaultsConfig::default().with_archive(ArchiveFormat::Json);
    let build = || UserDefaults::builder().host(host.clone()).config(config.clone()).build();

    let defaults = build().unwrap();
    defaults.set_object_in_domain("keep-me", "theme", DomainName::Global);
    defaults.synchronize().unwrap();

    defaults.set_object_in_domain(f64::INFINITY, "limit", DomainName::Global);
    let err = defaults.synchronize().expect_err("infinity has no JSON form");
    assert!(matches!(err, DefaultsError::Archive { .. }));

    let reloaded = build().unwrap();
    assert_eq!(reloaded.string_for_key("theme").as_deref(), Some("keep-me"));
    assert_eq!(reloaded.object_for_key("limit"), None);
}

#[test]
fn dropping_the_last_handle_flushes_and_releases_the_host() {
    let (host, storage) = counting_host();
    let defaults = UserDefaults::builder().host(host).build().unwrap();
    let clone = defaults.clone();

    defaults.set_object(1, "k");
    drop(defaults);
    assert_eq!(storage.total_writes(), 0);

    drop(clone);
    assert_eq!(storage.writes("ApplicationDomain"), 1);
    assert_eq!(Arc::strong_count(&storage), 1);
}

#[test]
fn a_shared_loop_does_not_flush_twice_after_drop() {
    let (host, storage) = counting_host();
    let run_loop = RunLoop::new();
    let defaults = UserDefaults::builder().host(host).run_loop(run_loop.clone()).build().unwrap();

    defaults.set_object(1, "k");
    drop(defaults);
    assert_eq!(storage.writes("ApplicationDomain"), 1);

    assert_eq!(run_loop.run_until_idle(), 1);
    assert_eq!(storage.writes("ApplicationDomain"), 1);
    assert_eq!(Arc::strong_count(&storage), 1);
}
