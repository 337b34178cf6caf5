#![forbid(unsafe_code)]

//! Core: stream registry, volume arithmetic, keymap, and the reconciler.
//!
//! Nothing in this crate performs I/O. The audio server and the terminal are
//! reached through the [`audio::AudioControl`] and [`view::StreamView`]
//! traits, and all input arrives as [`event::Event`] values handed in by the
//! runtime's dispatcher.
//!
//! # How it fits in the system
//! `curmix-runtime` owns the event loop and feeds events into the
//! [`reconciler::Reconciler`]; `curmix-render` implements [`view::StreamView`]
//! and `curmix-pulse` implements [`audio::AudioControl`].

pub mod audio;
pub mod cursor;
pub mod event;
pub mod keymap;
pub mod reconciler;
pub mod registry;
pub mod view;
pub mod volume;

pub use audio::{AudioControl, ControlError};
pub use cursor::Cursor;
pub use event::{
    ChangeKind, ConnectionState, Event, Generation, KeyCode, KeyEvent, Modifiers, ServerEvent,
    StreamInfo,
};
pub use keymap::Action;
pub use reconciler::{ExitReason, Flow, Reconciler};
pub use registry::{CAPACITY, MAX_NAME_WIDTH, StreamEntry, StreamId, StreamRegistry};
pub use view::StreamView;
pub use volume::Volume;
