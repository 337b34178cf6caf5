#![forbid(unsafe_code)]

//! Log-file setup.
//!
//! The terminal belongs to the mixer, so events are only recorded when
//! `CURMIX_LOG_FILE` names a file. Without one no subscriber is installed
//! and every `tracing` macro is a no-op.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError};

/// Build the file subscriber described by `config`, or `None` when logging
/// is off.
///
/// # Errors
///
/// Returns [`ConfigError`] if the filter is invalid or the file cannot be
/// opened for appending.
pub fn subscriber(
    config: &Config,
) -> Result<Option<impl Subscriber + Send + Sync + 'static>, ConfigError> {
    let Some(path) = config.log_file.as_deref() else {
        return Ok(None);
    };
    let filter = EnvFilter::try_new(&config.log_filter).map_err(|err| ConfigError::LogFilter {
        directive: config.log_filter.clone(),
        reason: err.to_string(),
    })?;
    let file = open_log(path)?;
    Ok(Some(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_thread_names(true)
            .with_target(true)
            .finish(),
    ))
}

/// Install the global subscriber. Returns whether logging is on.
///
/// # Errors
///
/// See [`subscriber`].
pub fn init(config: &Config) -> Result<bool, ConfigError> {
    let Some(subscriber) = subscriber(config)? else {
        return Ok(false);
    };
    // Already set only happens in tests that install their own.
    Ok(tracing::subscriber::set_global_default(subscriber).is_ok())
}

fn open_log(path: &Path) -> Result<File, ConfigError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}
