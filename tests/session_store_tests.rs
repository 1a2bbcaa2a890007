//! Session persistence and configuration files on disk

use horizon::{HorizonConfig, Language, Session, SessionStore};
use std::fs;

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("horizon").join("session.json"));

    let mut session = Session::new("tok-1", "meena", Language::Gujarati);
    session.display_name = Some("Meena Patel".into());
    store.save(&session).unwrap();

    assert!(store.path().exists());
    assert_eq!(store.load(), Some(session));
}

#[test]
fn test_missing_file_is_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    assert_eq!(store.load(), None);
}

#[test]
fn test_corrupt_file_is_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "{ not json").unwrap();

    let store = SessionStore::new(&path);
    assert_eq!(store.load(), None);
}

#[test]
fn test_clear_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    store
        .save(&Session::new("tok", "arun", Language::Kannada))
        .unwrap();

    store.clear().unwrap();
    assert!(!store.path().exists());
    assert_eq!(store.load(), None);

    // Clearing twice is fine
    store.clear().unwrap();
}

#[test]
fn test_save_overwrites_language() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let mut session = Session::new("tok", "arun", Language::English);
    store.save(&session).unwrap();

    session.language = Language::Malayalam;
    store.save(&session).unwrap();
    assert_eq!(store.load().map(|s| s.language), Some(Language::Malayalam));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
api_base_url = "https://krishi.example.org"
request_timeout_ms = 15000
default_language = "bn"
"#,
    )
    .unwrap();

    let config = HorizonConfig::load_from(&path).unwrap();
    assert_eq!(config.api_base_url, "https://krishi.example.org");
    assert_eq!(config.request_timeout_ms, 15000);
    assert_eq!(config.default_language, Language::Bengali);
    // Unset fields keep their defaults
    assert_eq!(config.banner_duration_ms, 5000);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "api_base_url = \"ftp://nope\"\n").unwrap();
    assert!(HorizonConfig::load_from(&path).is_err());

    fs::write(&path, "default_language = \"xx\"\n").unwrap();
    assert!(HorizonConfig::load_from(&path).is_err());
}
