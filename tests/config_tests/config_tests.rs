//! Config Tests
//!
//! Tests for client options and `.env` loading.

use std::io::Write;
use std::time::Duration;

use crossbeam::channel;
use eslink::config::{load_env_file, parse_env_file};
use eslink::{Config, EslError, Event};
use tempfile::{NamedTempFile, TempDir};

// =============================================================================
// Helper Functions
// =============================================================================

fn env_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// =============================================================================
// Builder Tests
// =============================================================================

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.dial_timeout, Duration::from_secs(5));
    assert_eq!(config.auth_timeout, Duration::from_secs(2));
    assert!(config.events.is_none());
    assert!(!config.auto_close_events);
    assert!(config.dump_in.is_none());
    assert!(config.dump_out.is_none());
}

#[test]
fn test_builder() {
    let (tx, _rx) = channel::bounded::<Event>(1);
    let config = Config::builder()
        .dial_timeout(Duration::from_millis(250))
        .auth_timeout(Duration::from_secs(10))
        .events(tx, true)
        .dump_out(std::io::sink())
        .build();

    assert_eq!(config.dial_timeout, Duration::from_millis(250));
    assert_eq!(config.auth_timeout, Duration::from_secs(10));
    assert!(config.events.is_some());
    assert!(config.auto_close_events);
    assert!(config.dump_in.is_none());
    assert!(config.dump_out.is_some());
}

#[test]
fn test_debug_omits_handles() {
    let config = Config::builder().dump_in(std::io::sink()).build();
    let debug = format!("{config:?}");

    assert!(debug.contains("dial_timeout: 5s"));
    assert!(debug.contains("dump_in: true"));
    assert!(debug.contains("events: false"));
}

// =============================================================================
// .env Parsing Tests
// =============================================================================

#[test]
fn test_parse_env_file() {
    let file = env_file(
        "ESL_ADDR=10.0.0.5:8021\n\
         ESL_PASSWORD = secret # trailing comment\n\
         # a comment line\n\
         COMMENTED=#value\n\
         no equals sign\n\
         EMPTY=\n",
    );

    let vars = parse_env_file(file.path()).unwrap();
    assert_eq!(
        vars,
        vec![
            ("ESL_ADDR".to_string(), "10.0.0.5:8021".to_string()),
            ("ESL_PASSWORD".to_string(), "secret".to_string()),
            ("EMPTY".to_string(), String::new()),
        ]
    );
}

#[test]
fn test_parse_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = parse_env_file(dir.path().join("missing.env"));
    assert!(matches!(result, Err(EslError::Config(_))));
}

// =============================================================================
// .env Loading Tests
// =============================================================================

#[test]
fn test_load_env_file() {
    let file = env_file("ESLINK_TEST_LOAD_ADDR=fs.local\nESLINK_TEST_LOAD_PORT=8022 # custom\n");

    assert_eq!(load_env_file(file.path()).unwrap(), 2);
    assert_eq!(std::env::var("ESLINK_TEST_LOAD_ADDR").unwrap(), "fs.local");
    assert_eq!(std::env::var("ESLINK_TEST_LOAD_PORT").unwrap(), "8022");
}

#[test]
fn test_load_missing_file_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    assert_eq!(load_env_file(dir.path().join(".env")).unwrap(), 0);
}

#[test]
fn test_load_rejects_empty_key() {
    let file = env_file("=orphan\n");
    assert!(matches!(load_env_file(file.path()), Err(EslError::Config(_))));
}
