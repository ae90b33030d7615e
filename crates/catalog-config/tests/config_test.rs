#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;

use catalog_config::{
    Config, ConfigError, Profile, load_config_from, profile_to_store_config, save_config_to,
};

const SAMPLE: &str = r#"
default_profile = "staging"

[defaults]
output = "json"
page_size = 50

[profiles.staging]
api_url = "https://staging.example.com/api"
username = "ops"
debounce_ms = 150

[profiles.prod]
api_url = "https://admin.example.com/api"
page_size = 10
dropdown_ttl_secs = 60
"#;

#[test]
fn loads_profiles_and_defaults_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.default_profile.as_deref(), Some("staging"));
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.color, "auto");
    assert_eq!(cfg.defaults.timeout, 30);
    assert_eq!(cfg.profiles.len(), 2);

    let (name, staging) = cfg.profile(None).unwrap();
    assert_eq!(name, "staging");
    assert_eq!(staging.username.as_deref(), Some("ops"));

    let store = profile_to_store_config(staging, &cfg.defaults).unwrap();
    assert_eq!(store.page_size, 50);
    assert_eq!(store.debounce_quiet, Duration::from_millis(150));
}

#[test]
fn profile_page_size_beats_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let cfg = load_config_from(&path).unwrap();
    let (_, prod) = cfg.profile(Some("prod")).unwrap();
    let store = profile_to_store_config(prod, &cfg.defaults).unwrap();
    assert_eq!(store.page_size, 10);
    assert_eq!(store.dropdown_ttl, Duration::from_secs(60));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert!(cfg.profiles.is_empty());
    assert_eq!(cfg.defaults.page_size, 20);
}

#[test]
fn unknown_profile_is_reported_by_name() {
    let cfg = Config::default();
    let err = cfg.profile(Some("nope")).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProfile { ref profile } if profile == "nope"));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.profiles.insert(
        "default".into(),
        Profile {
            api_url: "http://localhost:8080/api".into(),
            username: Some("admin".into()),
            insecure: Some(true),
            ..Profile::default()
        },
    );
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    let (_, profile) = loaded.profile(None).unwrap();
    assert_eq!(profile.api_url, "http://localhost:8080/api");
    assert_eq!(profile.insecure, Some(true));
    assert!(profile.password.is_none());
}

#[test]
fn malformed_toml_is_a_figment_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "profiles = [not toml").unwrap();
    assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
}
