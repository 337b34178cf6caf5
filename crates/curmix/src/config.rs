#![forbid(unsafe_code)]

//! Environment configuration.
//!
//! curmix takes no command-line flags. Behaviour is adjusted through
//! `CURMIX_*` environment variables; stray arguments are kept only so they
//! can be logged once logging is up.

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Server to connect to (PulseAudio server string).
pub const ENV_SERVER: &str = "CURMIX_SERVER";
/// Log filter directive.
pub const ENV_LOG: &str = "CURMIX_LOG";
/// Log file path. Logging is off when unset.
pub const ENV_LOG_FILE: &str = "CURMIX_LOG_FILE";

/// Filter used when `CURMIX_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Invalid configuration. Reported on stderr with exit status 2.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CURMIX_SERVER is set but empty")]
    EmptyServer,
    #[error("invalid CURMIX_LOG directive {directive:?}: {reason}")]
    LogFilter { directive: String, reason: String },
    #[error("CURMIX_LOG_FILE is set but empty")]
    EmptyLogFile,
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` uses the client library's default server.
    pub server: Option<String>,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    /// Command-line arguments that were ignored.
    pub ignored_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: None,
            log_filter: DEFAULT_LOG_FILTER.into(),
            log_file: None,
            ignored_args: Vec::new(),
        }
    }
}

impl Config {
    /// Read the process environment and arguments.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok(), env::args().skip(1))
    }

    /// Resolve from an arbitrary variable lookup and argument list.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(server) = lookup(ENV_SERVER) {
            if server.trim().is_empty() {
                return Err(ConfigError::EmptyServer);
            }
            config.server = Some(server);
        }

        if let Some(directive) = lookup(ENV_LOG) {
            EnvFilter::try_new(&directive).map_err(|err| ConfigError::LogFilter {
                reason: err.to_string(),
                directive: directive.clone(),
            })?;
            config.log_filter = directive;
        }

        if let Some(path) = lookup(ENV_LOG_FILE) {
            if path.is_empty() {
                return Err(ConfigError::EmptyLogFile);
            }
            config.log_file = Some(PathBuf::from(path));
        }

        config.ignored_args = args.into_iter().collect();
        Ok(config)
    }
}
