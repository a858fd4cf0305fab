//! Integration tests for the oja binary that stop before any network access.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Runs `oja` inside `home` with no user config and no OJS environment.
fn oja_cmd(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("oja");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    for key in oja_config::loader::ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn no_arguments_prints_help() {
    let home = TempDir::new().unwrap();
    oja_cmd(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn missing_path_fails() {
    let home = TempDir::new().unwrap();
    oja_cmd(&home)
        .arg("no/such/folder")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn folder_without_submission_id_fails() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir(home.path().join("paper")).unwrap();

    oja_cmd(&home)
        .arg("paper")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not extract submission ID"));
}

#[test]
fn folder_with_id_is_recognised_before_settings_check() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir(home.path().join("srm_8661")).unwrap();

    oja_cmd(&home)
        .args(["srm_8661", "--skip"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Extracted submission ID: 8661"))
        .stderr(predicate::str::contains("Missing OJS settings"));
}

#[test]
fn skip_without_settings_fails_without_prompting() {
    let home = TempDir::new().unwrap();

    oja_cmd(&home)
        .args(["8661", "--skip", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing OJS settings"))
        .stderr(predicate::str::contains("OJS_API_TOKEN"));
}

#[test]
fn invalid_local_config_fails() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("oja.json"), "not json").unwrap();

    oja_cmd(&home)
        .args(["8661", "--skip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON"));
}
