use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn strata(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.arg("--root").arg(root).env_remove("STRATA_ROOT");
    cmd
}

#[test]
fn no_arguments_prints_help() {
    Command::cargo_bin("strata")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn write_then_read_a_key() {
    let dir = TempDir::new().unwrap();

    strata(dir.path()).args(["write", "com.example.notes", "theme", "dark"]).assert().success();
    strata(dir.path())
        .args(["read", "com.example.notes", "theme"])
        .assert()
        .success()
        .stdout("dark\n");
}

#[test]
fn typed_values_are_stored_typed() {
    let dir = TempDir::new().unwrap();

    strata(dir.path())
        .args(["write", "com.example.notes", "fontSize", "13", "--type", "integer"])
        .assert()
        .success();
    strata(dir.path())
        .args(["write", "com.example.notes", "autosave", "yes", "--type", "bool"])
        .assert()
        .success();
    strata(dir.path())
        .args(["read", "com.example.notes"])
        .assert()
        .success()
        .stdout("autosave = 1\nfontSize = 13\n");
}

#[test]
fn bad_integer_is_rejected() {
    let dir = TempDir::new().unwrap();

    strata(dir.path())
        .args(["write", "com.example.notes", "fontSize", "big", "--type", "integer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not an integer"));
}

#[test]
fn missing_key_fails() {
    let dir = TempDir::new().unwrap();

    strata(dir.path())
        .args(["read", "com.example.notes", "theme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn delete_removes_a_key() {
    let dir = TempDir::new().unwrap();

    strata(dir.path()).args(["write", "com.example.notes", "theme", "dark"]).assert().success();
    strata(dir.path()).args(["write", "com.example.notes", "font", "mono"]).assert().success();
    strata(dir.path()).args(["delete", "com.example.notes", "theme"]).assert().success();

    strata(dir.path())
        .args(["read", "com.example.notes"])
        .assert()
        .success()
        .stdout("font = mono\n");
}

#[test]
fn delete_without_key_empties_the_domain() {
    let dir = TempDir::new().unwrap();

    strata(dir.path()).args(["write", "com.example.notes", "theme", "dark"]).assert().success();
    strata(dir.path()).args(["delete", "com.example.notes"]).assert().success();

    strata(dir.path())
        .args(["read", "com.example.notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn domains_lists_archived_domains() {
    let dir = TempDir::new().unwrap();

    strata(dir.path()).args(["write", "GlobalDomain", "locale", "en"]).assert().success();
    strata(dir.path()).args(["write", "com.example.notes", "theme", "dark"]).assert().success();

    strata(dir.path())
        .arg("domains")
        .assert()
        .success()
        .stdout("GlobalDomain\ncom.example.notes\n");
}

#[test]
fn application_values_shadow_global_ones() {
    let dir = TempDir::new().unwrap();

    strata(dir.path()).args(["write", "GlobalDomain", "theme", "light"]).assert().success();
    strata(dir.path()).args(["write", "com.example.notes", "theme", "dark"]).assert().success();

    strata(dir.path())
        .args(["register", fixture("defaults.json").as_str(), "--domain", "com.example.notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("theme = dark"))
        .stdout(predicate::str::contains("fontSize = 13"));
}

#[test]
fn registered_values_are_not_persisted() {
    let dir = TempDir::new().unwrap();

    strata(dir.path()).args(["register", fixture("defaults.json").as_str()]).assert().success();
    strata(dir.path()).arg("read").assert().success().stdout(predicate::str::contains("theme").not());
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}
