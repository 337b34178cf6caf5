#![forbid(unsafe_code)]

//! Canonical event types.
//!
//! Every source the dispatcher waits on is reduced to one [`Event`] variant:
//! server notifications and query replies ([`ServerEvent`]), keystrokes
//! ([`KeyEvent`]), terminal resizes, and termination signals. Events are
//! plain data so they can cross the channel from producer threads to the
//! single dispatcher thread.

use bitflags::bitflags;

use crate::registry::StreamId;
use crate::volume::Volume;

/// An event delivered to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Something happened on the audio-server connection.
    Server(ServerEvent),

    /// A keystroke.
    Key(KeyEvent),

    /// The terminal was resized.
    Resize {
        /// New terminal width in columns.
        width: u16,
        /// New terminal height in rows.
        height: u16,
    },

    /// SIGINT or SIGTERM was delivered.
    Terminate,
}

impl From<ServerEvent> for Event {
    fn from(event: ServerEvent) -> Self {
        Self::Server(event)
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

/// Monotonic rebuild counter.
///
/// Each full-list query is tagged with the generation current when it was
/// issued; replies carrying any other generation are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation after this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Connection state of the audio-server client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Connecting, authorizing, or setting the client name.
    #[default]
    Connecting,
    /// Connected and able to serve queries.
    Ready,
    /// Cleanly disconnected by the server.
    Terminated,
    /// The connection failed or was lost.
    Failed,
}

impl ConnectionState {
    /// Whether this state ends the connection.
    #[inline]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Terminated | Self::Failed)
    }
}

/// What happened to a stream, as reported by a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A stream appeared.
    New,
    /// A stream's properties changed.
    Changed,
    /// A stream went away.
    Removed,
}

/// One stream as reported by a full-list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Server-assigned handle.
    pub id: StreamId,
    /// Human-readable name property, if the server supplied one.
    pub name: Option<String>,
    /// Average of the per-channel volumes.
    pub volume: Volume,
    /// Mute flag.
    pub muted: bool,
}

/// Events produced by the audio-server collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The connection moved to a new state.
    State(ConnectionState),

    /// A stream was added, changed, or removed.
    ///
    /// The payload is informational only: any change triggers a full rebuild.
    StreamsChanged {
        /// Kind of change, if the server said.
        kind: Option<ChangeKind>,
        /// Affected stream, if the server said.
        id: Option<StreamId>,
    },

    /// One entry of a full-list reply.
    StreamListed {
        /// Generation of the query this entry answers.
        generation: Generation,
        /// The reported stream.
        info: StreamInfo,
    },

    /// The full-list reply for `generation` is complete.
    EndOfList {
        /// Generation of the query that finished.
        generation: Generation,
    },
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
    }
}

/// Keys the mixer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key.
    Char(char),
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Escape.
    Escape,
    /// Any other key.
    Other,
}

/// A single keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key pressed.
    pub code: KeyCode,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}
