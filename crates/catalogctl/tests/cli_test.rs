//! Integration tests for the `catalogctl` binary.
//!
//! These cover argument parsing, help output, shell completions, config
//! handling, and error reporting without a live catalog API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `catalogctl` binary with env isolation.
///
/// Clears all `CATALOG_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn catalogctl(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("catalogctl");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("CATALOG_PROFILE")
        .env_remove("CATALOG_API_URL")
        .env_remove("CATALOG_OUTPUT")
        .env_remove("CATALOG_INSECURE")
        .env_remove("CATALOG_TIMEOUT")
        .env_remove("CATALOG_USERNAME")
        .env_remove("CATALOG_PASSWORD");
    cmd
}

fn isolated() -> (tempfile::TempDir, assert_cmd::Command) {
    let home = tempfile::tempdir().unwrap();
    let cmd = catalogctl(home.path());
    (home, cmd)
}

fn write_config(home: &Path, contents: &str) {
    let dir = home.join(".config").join("catalogctl");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const TWO_PROFILES: &str = r#"
default_profile = "staging"

[profiles.staging]
api_url = "https://staging.example.com/api"
username = "ops"
password = "hunter2"

[profiles.prod]
api_url = "https://admin.example.com/api"
"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let (_home, mut cmd) = isolated();
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_domains() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--help").assert().success().stdout(
        predicate::str::contains("categories")
            .and(predicate::str::contains("providers"))
            .and(predicate::str::contains("manager"))
            .and(predicate::str::contains("auth")),
    );
}

#[test]
fn version_flag() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalogctl"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn completions_zsh() {
    let (_home, mut cmd) = isolated();
    cmd.args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn completions_bash() {
    let (_home, mut cmd) = isolated();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn list_without_config_explains_setup() {
    let (_home, mut cmd) = isolated();
    cmd.args(["categories", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config init").or(predicate::str::contains("API URL")));
}

#[test]
fn unknown_profile_is_reported() {
    let (home, mut cmd) = isolated();
    write_config(home.path(), TWO_PROFILES);
    cmd.args(["--profile", "qa", "tags", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("qa").and(predicate::str::contains("prod, staging")));
}

#[test]
fn bad_api_url_is_a_validation_error() {
    let (_home, mut cmd) = isolated();
    cmd.args(["--api-url", "ftp://example.com", "lookups"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api_url"));
}

#[test]
fn invalid_output_format() {
    let (_home, mut cmd) = isolated();
    let output = cmd
        .args(["--output", "invalid", "categories", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("invalid") || text.contains("possible values"), "{text}");
}

#[test]
fn date_range_needs_both_ends() {
    let (_home, mut cmd) = isolated();
    cmd.args(["games", "list", "--from", "2024-01-01"])
        .assert()
        .code(2);
}

#[test]
fn from_file_conflicts_with_name() {
    let (_home, mut cmd) = isolated();
    cmd.args(["categories", "create", "--name", "Slots", "--from-file", "x.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_path_points_into_config_home() {
    let (home, mut cmd) = isolated();
    let expected = home.path().join(".config").join("catalogctl").join("config.toml");
    cmd.args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_profiles_marks_default() {
    let (home, mut cmd) = isolated();
    write_config(home.path(), TWO_PROFILES);
    cmd.args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::diff("prod\nstaging *\n"));
}

#[test]
fn config_show_redacts_passwords() {
    let (home, mut cmd) = isolated();
    write_config(home.path(), TWO_PROFILES);
    cmd.args(["--output", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********").and(predicate::str::contains("hunter2").not()));
}

#[test]
fn config_use_switches_default() {
    let (home, mut cmd) = isolated();
    write_config(home.path(), TWO_PROFILES);
    cmd.args(["config", "use", "prod"]).assert().success();

    catalogctl(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod *"));
}

#[test]
fn config_use_rejects_unknown_profile() {
    let (home, mut cmd) = isolated();
    write_config(home.path(), TWO_PROFILES);
    cmd.args(["config", "use", "qa"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("qa"));
}
