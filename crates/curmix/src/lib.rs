#![forbid(unsafe_code)]

//! Start-up support for the `curmix` binary: environment configuration and
//! log-file setup.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError};
