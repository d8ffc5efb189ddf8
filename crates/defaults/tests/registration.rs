use std::path::PathBuf;
use strata_defaults::{DefaultsError, UserDefaults};
use strata_domain::{DomainName, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn registers_json_defaults() {
    let defaults = UserDefaults::builder().build().unwrap();
    defaults.register_defaults_from_file(fixture("defaults.json")).unwrap();

    assert_eq!(defaults.string_for_key("theme").as_deref(), Some("dark"));
    assert_eq!(defaults.integer_for_key("fontSize"), Some(13));
    assert_eq!(defaults.double_for_key("lineHeight"), Some(1.4));
    assert_eq!(defaults.bool_for_key("autosave"), Some(true));
    assert_eq!(defaults.integer_for_key("recentLimit"), Some(10));
    assert_eq!(
        defaults.array_for_key("plugins"),
        Some(vec![Value::from("git"), Value::from("lint")])
    );
    let window = defaults.dictionary_for_key("window").unwrap();
    assert_eq!(window.get("width"), Some(&Value::Integer(1024)));
}

#[test]
fn registers_toml_defaults() {
    let defaults = UserDefaults::builder().build().unwrap();
    defaults.register_defaults_from_file(fixture("defaults.toml")).unwrap();

    assert_eq!(defaults.integer_for_key("fontSize"), Some(13));
    assert_eq!(defaults.bool_for_key("autosave"), Some(true));
    assert!(defaults.dictionary_for_key("window").is_some());
}

#[test]
fn registered_defaults_stay_volatile_and_lowest() {
    let defaults = UserDefaults::builder().build().unwrap();
    defaults.set_object("light", "theme");
    defaults.register_defaults_from_file(fixture("defaults.json")).unwrap();

    assert_eq!(defaults.string_for_key("theme").as_deref(), Some("light"));
    assert_eq!(
        defaults.object_for_key_in_domain("theme", DomainName::Registration),
        Some(Value::from("dark"))
    );
    defaults.run_loop().run_until_idle();
    defaults.synchronize().unwrap();

    let reloaded = UserDefaults::builder().host(defaults.host().clone()).build().unwrap();
    assert_eq!(reloaded.object_for_key("fontSize"), None);
}

#[test]
fn unknown_format_is_rejected() {
    let defaults = UserDefaults::builder().build().unwrap();
    let result = defaults.register_defaults_from_file(fixture("defaults.yaml"));
    assert!(matches!(result, Err(DefaultsError::UnsupportedFormat { .. })));
    assert!(defaults.domain(DomainName::Registration).is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let defaults = UserDefaults::builder().build().unwrap();
    let result = defaults.register_defaults_from_file(fixture("absent.json"));
    assert!(matches!(result, Err(DefaultsError::Io { .. })));
}

#[test]
fn malformed_file_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"theme\": ").unwrap();

    let defaults = UserDefaults::builder().build().unwrap();
    let err = defaults.register_defaults_from_file(&path).unwrap_err();
    assert!(matches!(err, DefaultsError::Decode { .. }));
    assert!(err.context_note().is_some_and(|c| c.ends_with("broken.json")));
}
