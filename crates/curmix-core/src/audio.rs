#![forbid(unsafe_code)]

//! The audio-server seam.

use thiserror::Error;

use crate::event::Generation;
use crate::registry::StreamId;
use crate::volume::Volume;

/// Failure to hand a request to the audio backend.
///
/// These never reach the user: control failures are absorbed and the next
/// change notification corrects the display.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The backend is gone (its thread exited or the connection dropped).
    #[error("audio backend disconnected")]
    Disconnected,
    /// The backend refused the request outright.
    #[error("audio request rejected: {0}")]
    Rejected(String),
}

/// Requests the reconciler issues to the audio server.
///
/// Every method is a non-blocking hand-off. Replies to
/// [`AudioControl::query_streams`] arrive later as
/// [`crate::event::ServerEvent::StreamListed`] and
/// [`crate::event::ServerEvent::EndOfList`] tagged with the same generation.
pub trait AudioControl {
    /// Start a full-list query tagged with `generation`.
    fn query_streams(&mut self, generation: Generation) -> Result<(), ControlError>;

    /// Subscribe to stream lifecycle notifications only.
    fn subscribe(&mut self) -> Result<(), ControlError>;

    /// Set every channel of stream `id` to `volume`.
    fn set_volume(&mut self, id: StreamId, volume: Volume) -> Result<(), ControlError>;

    /// Set the mute flag of stream `id`.
    fn set_mute(&mut self, id: StreamId, muted: bool) -> Result<(), ControlError>;
}

impl<T: AudioControl + ?Sized> AudioControl for Box<T> {
    fn query_streams(&mut self, generation: Generation) -> Result<(), ControlError> {
        (**self).query_streams(generation)
    }

    fn subscribe(&mut self) -> Result<(), ControlError> {
        (**self).subscribe()
    }

    fn set_volume(&mut self, id: StreamId, volume: Volume) -> Result<(), ControlError> {
        (**self).set_volume(id, volume)
    }

    fn set_mute(&mut self, id: StreamId, muted: bool) -> Result<(), ControlError> {
        (**self).set_mute(id, muted)
    }
}
