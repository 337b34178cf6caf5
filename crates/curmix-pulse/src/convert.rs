#![forbid(unsafe_code)]

//! Translation between PulseAudio types and core types.

use curmix_core::event::{ChangeKind, ConnectionState};
use curmix_core::volume::Volume;
use pulse::context::State as ContextState;
use pulse::context::subscribe::Operation as SubscribeOperation;
use pulse::volume::{ChannelVolumes, Volume as PaVolume};

/// Collapse the context's states into the four the mixer cares about.
pub fn connection_state(state: ContextState) -> ConnectionState {
    match state {
        ContextState::Unconnected
        | ContextState::Connecting
        | ContextState::Authorizing
        | ContextState::SettingName => ConnectionState::Connecting,
        ContextState::Ready => ConnectionState::Ready,
        ContextState::Failed => ConnectionState::Failed,
        ContextState::Terminated => ConnectionState::Terminated,
    }
}

/// Lifecycle kind of a subscription event.
pub fn change_kind(operation: SubscribeOperation) -> ChangeKind {
    match operation {
        SubscribeOperation::New => ChangeKind::New,
        SubscribeOperation::Changed => ChangeKind::Changed,
        SubscribeOperation::Removed => ChangeKind::Removed,
    }
}

/// Pick the display name: process binary, then application name.
///
/// Empty values count as absent.
pub fn stream_name(process_binary: Option<String>, application_name: Option<String>) -> Option<String> {
    process_binary
        .filter(|s| !s.is_empty())
        .or_else(|| application_name.filter(|s| !s.is_empty()))
}

/// Per-channel average of a volume vector.
pub fn average_volume(volumes: &ChannelVolumes) -> Volume {
    let raw: Vec<u32> = volumes.get().iter().map(|v| v.0).collect();
    Volume::average(&raw)
}

/// A volume vector of `channels` channels all set to `volume`.
///
/// Values above the server's maximum are clamped to it.
pub fn uniform_volume(channels: u8, volume: Volume) -> ChannelVolumes {
    let mut out = ChannelVolumes::default();
    out.set(channels, PaVolume(volume.0.min(PaVolume::MAX.0)));
    out
}
