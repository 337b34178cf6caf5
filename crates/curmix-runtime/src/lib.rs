#![forbid(unsafe_code)]

//! Event loop for curmix.
//!
//! A [`program::Program`] owns the reconciler and the receiving end of one
//! channel. Producer threads (terminal input, signals, and the audio
//! backend) only ever send [`program::Message`]s into it; every handler runs
//! on the dispatcher thread, one at a time.

pub mod error;
pub mod program;
pub mod subscription;

pub use error::RuntimeError;
pub use program::{Message, Program};
pub use subscription::{InputSubscription, SignalSubscription, StopSignal, SubId, Subscription};
