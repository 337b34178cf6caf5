#![forbid(unsafe_code)]

use std::io;

use thiserror::Error;

/// Failures that stop the dispatcher.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A subscription thread could not be started.
    #[error("failed to spawn subscription thread: {0}")]
    Spawn(#[source] io::Error),
    /// Signal handlers could not be registered.
    #[error("failed to register signal handlers: {0}")]
    Signals(#[source] io::Error),
    /// Reading terminal input failed.
    #[error("terminal input failed: {0}")]
    Input(#[source] io::Error),
    /// Every sender of the event channel is gone.
    #[error("event channel closed")]
    Disconnected,
}
