#![forbid(unsafe_code)]

//! PulseAudio backend for curmix.
//!
//! [`PulseBackend`] connects to the server on its own thread and implements
//! the core's `AudioControl` trait. Server activity comes back to the
//! dispatcher as `ServerEvent`s on the channel passed to
//! [`PulseBackend::connect`].

pub mod backend;
pub mod convert;
pub mod error;

pub use backend::{PulseBackend, Request};
pub use error::PulseError;
