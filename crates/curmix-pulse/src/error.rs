#![forbid(unsafe_code)]

//! Backend start-up errors.

use std::io;

use thiserror::Error;

/// Failure to bring up the PulseAudio backend.
///
/// Only start-up can fail this way. Once the backend thread runs, a lost
/// connection is reported as a `ServerEvent::State` instead.
#[derive(Debug, Error)]
pub enum PulseError {
    /// The standard mainloop could not be allocated.
    #[error("failed to create PulseAudio mainloop")]
    Mainloop,
    /// The client context (or its property list) could not be allocated.
    #[error("failed to create PulseAudio context")]
    Context,
    /// The connection attempt was refused immediately.
    #[error("failed to connect to PulseAudio server: {0}")]
    Connect(String),
    /// The backend thread could not be started.
    #[error("failed to spawn audio backend thread: {0}")]
    Spawn(#[source] io::Error),
    /// The backend thread exited before reporting start-up.
    #[error("audio backend thread exited during start-up")]
    ThreadExited,
}
