//! Log output goes to the configured file and nowhere else.

use std::fs;

use curmix::config::{Config, ConfigError};
use curmix::logging;

fn config_with_file(path: std::path::PathBuf, filter: &str) -> Config {
    Config {
        log_file: Some(path),
        log_filter: filter.into(),
        ..Config::default()
    }
}

#[test]
fn no_file_means_no_subscriber() {
    let subscriber = logging::subscriber(&Config::default()).unwrap();
    assert!(subscriber.is_none());
}

#[test]
fn events_are_appended_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("curmix.log");
    fs::write(&path, "previous run\n").unwrap();

    let subscriber = logging::subscriber(&config_with_file(path.clone(), "info"))
        .unwrap()
        .expect("file configured");
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(generation = 3, "rebuild committed");
        tracing::debug!("filtered out");
    });

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("previous run\n"));
    assert!(text.contains("rebuild committed"));
    assert!(text.contains("generation=3"));
    assert!(!text.contains("filtered out"));
    assert!(!text.contains('\u{1b}'), "log must not contain ANSI escapes");
}

#[test]
fn unopenable_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("curmix.log");
    let result = logging::subscriber(&config_with_file(path, "info"));
    assert!(matches!(result, Err(ConfigError::LogFile { .. })));
}
