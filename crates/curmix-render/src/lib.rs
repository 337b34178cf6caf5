#![forbid(unsafe_code)]

//! Terminal rendering for curmix.
//!
//! Frames are drawn into an off-screen [`buffer::Buffer`], diffed against
//! the previous frame, and emitted by a state-tracking
//! [`presenter::Presenter`]. [`renderer::TerminalRenderer`] ties these
//! together behind the core's `StreamView` trait.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod geometry;
pub mod layout;
pub mod presenter;
pub mod renderer;
pub mod terminal_session;
pub mod widgets;

pub use buffer::Buffer;
pub use geometry::Rect;
pub use renderer::TerminalRenderer;
pub use terminal_session::TerminalSession;
