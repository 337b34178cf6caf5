#![forbid(unsafe_code)]

//! The reconciler: one owner for the stream list, the cursor, and the
//! connection state machine.
//!
//! # Event handling
//!
//! The runtime calls exactly one `handle_*` method per event, to completion,
//! on a single thread. Each returns a [`Flow`] telling the loop whether to
//! keep going.
//!
//! # Rebuild protocol
//!
//! 1. A change notification (or the first `Ready`) bumps the [`Generation`],
//!    resets the staging registry, and issues a full-list query.
//! 2. Replies tagged with the current generation are appended to staging;
//!    replies tagged with any other generation are dropped.
//! 3. The matching end-of-list swaps staging into the live registry, clamps
//!    the cursor, and renders.
//!
//! Keystrokes and renders only see the live registry, so a half-built list is
//! never drawn and a keystroke never indexes into one.
//!
//! # Connection states
//!
//! `Connecting → Ready → (Terminated | Failed)`. Nothing is queried or
//! controlled until `Ready`; a final state stops the loop.

use tracing::{debug, info, info_span, trace, warn};

use crate::audio::AudioControl;
use crate::cursor::Cursor;
use crate::event::{ConnectionState, Event, Generation, KeyEvent, ServerEvent, StreamInfo};
use crate::keymap::{self, Action};
use crate::registry::{StreamEntry, StreamRegistry};
use crate::view::StreamView;
use crate::volume::Volume;

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Wait for the next event.
    Continue,
    /// Stop after this handler returns.
    Stop(ExitReason),
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// The operator pressed `q`.
    UserQuit,
    /// SIGINT or SIGTERM.
    Signal,
    /// The server closed the connection after it was established.
    ServerTerminated,
    /// The connection never became ready.
    ConnectionFailed,
    /// An established connection failed.
    ConnectionLost,
}

impl ExitReason {
    /// Whether this exit should be reported as a failure.
    #[inline]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::ConnectionFailed | Self::ConnectionLost)
    }

    /// Process exit status for this reason.
    #[inline]
    pub const fn exit_code(self) -> i32 {
        if self.is_failure() { 1 } else { 0 }
    }
}

/// Owns the registry, cursor, and connection state; drives the collaborators.
pub struct Reconciler<A, V> {
    audio: A,
    view: V,
    state: ConnectionState,
    was_ready: bool,
    live: StreamRegistry,
    staging: StreamRegistry,
    cursor: Cursor,
    generation: Generation,
    rebuilding: bool,
    width: u16,
}

impl<A: AudioControl, V: StreamView> Reconciler<A, V> {
    /// Create a reconciler for a terminal `width` columns wide.
    pub fn new(audio: A, view: V, width: u16) -> Self {
        Self::with_registries(
            audio,
            view,
            width,
            StreamRegistry::default(),
            StreamRegistry::default(),
        )
    }

    /// Create a reconciler with custom-capacity registries.
    pub fn with_capacity(audio: A, view: V, width: u16, capacity: usize) -> Self {
        Self::with_registries(
            audio,
            view,
            width,
            StreamRegistry::with_capacity(capacity),
            StreamRegistry::with_capacity(capacity),
        )
    }

    fn with_registries(
        audio: A,
        view: V,
        width: u16,
        live: StreamRegistry,
        staging: StreamRegistry,
    ) -> Self {
        Self {
            audio,
            view,
            state: ConnectionState::Connecting,
            was_ready: false,
            live,
            staging,
            cursor: Cursor::default(),
            generation: Generation::default(),
            rebuilding: false,
            width,
        }
    }

    /// Draw the initial (empty) screen.
    pub fn start(&mut self) {
        info!(width = self.width, "reconciler started");
        self.render();
    }

    /// Dispatch one event to its handler.
    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Server(ev) => self.handle_server(ev),
            Event::Key(key) => self.handle_key(key),
            Event::Resize { width, height } => self.handle_resize(width, height),
            Event::Terminate => self.handle_terminate(),
        }
    }

    /// Handle a notification or reply from the audio server.
    pub fn handle_server(&mut self, event: ServerEvent) -> Flow {
        match event {
            ServerEvent::State(state) => self.on_state(state),
            ServerEvent::StreamsChanged { kind, id } => {
                if self.state != ConnectionState::Ready {
                    trace!(?kind, ?id, "change notification before ready ignored");
                    return Flow::Continue;
                }
                debug!(?kind, ?id, "streams changed");
                self.begin_rebuild();
                Flow::Continue
            }
            ServerEvent::StreamListed { generation, info } => {
                self.on_listed(generation, &info);
                Flow::Continue
            }
            ServerEvent::EndOfList { generation } => {
                self.on_end_of_list(generation);
                Flow::Continue
            }
        }
    }

    /// Handle a keystroke. Always renders once.
    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let action = keymap::dispatch(&key, self.cursor.index(), self.live.count());
        trace!(?key, ?action, "key dispatched");
        let flow = self.apply(action);
        self.render();
        flow
    }

    /// Handle a terminal resize. Always renders once.
    pub fn handle_resize(&mut self, width: u16, height: u16) -> Flow {
        debug!(width, height, "terminal resized");
        self.width = width;
        self.view.resize(width, height);
        self.render();
        Flow::Continue
    }

    /// Handle SIGINT/SIGTERM.
    pub fn handle_terminate(&mut self) -> Flow {
        info!("termination signal received");
        Flow::Stop(ExitReason::Signal)
    }

    fn on_state(&mut self, state: ConnectionState) -> Flow {
        if state == self.state {
            return Flow::Continue;
        }
        info!(from = ?self.state, to = ?state, "connection state changed");
        self.state = state;
        match state {
            ConnectionState::Connecting => Flow::Continue,
            ConnectionState::Ready => {
                self.was_ready = true;
                self.begin_rebuild();
                if let Err(err) = self.audio.subscribe() {
                    warn!(%err, "subscribe request failed");
                }
                Flow::Continue
            }
            ConnectionState::Terminated => Flow::Stop(if self.was_ready {
                ExitReason::ServerTerminated
            } else {
                ExitReason::ConnectionFailed
            }),
            ConnectionState::Failed => Flow::Stop(if self.was_ready {
                ExitReason::ConnectionLost
            } else {
                ExitReason::ConnectionFailed
            }),
        }
    }

    fn begin_rebuild(&mut self) {
        if self.rebuilding {
            debug!(superseded = self.generation.0, "in-flight rebuild superseded");
        }
        self.generation = self.generation.next();
        self.rebuilding = true;
        self.staging.begin_rebuild();
        debug!(generation = self.generation.0, "rebuild started");
        if let Err(err) = self.audio.query_streams(self.generation) {
            warn!(%err, generation = self.generation.0, "stream query failed");
        }
    }

    fn on_listed(&mut self, generation: Generation, info: &StreamInfo) {
        if !self.rebuilding || generation != self.generation {
            trace!(
                stale = generation.0,
                current = self.generation.0,
                id = %info.id,
                "stale stream entry dropped"
            );
            return;
        }
        self.staging.append(StreamEntry::from_info(info));
    }

    fn on_end_of_list(&mut self, generation: Generation) {
        if !self.rebuilding || generation != self.generation {
            trace!(
                stale = generation.0,
                current = self.generation.0,
                "stale end-of-list dropped"
            );
            return;
        }
        let _span = info_span!("rebuild_commit", generation = generation.0).entered();
        self.rebuilding = false;
        std::mem::swap(&mut self.live, &mut self.staging);
        self.cursor.clamp(self.live.count());
        debug!(count = self.live.count(), "rebuild committed");
        self.render();
    }

    fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::MoveCursor(delta) => self.cursor.step(delta, self.live.count()),
            Action::IncrementVolume => {
                self.adjust_volume(i64::from(Volume::STEP), |_| Volume::NORMAL);
            }
            Action::DecrementVolume => {
                self.adjust_volume(-i64::from(Volume::STEP), |current| {
                    current.max(Volume::NORMAL)
                });
            }
            Action::ToggleMute => self.toggle_mute(),
            Action::Quit => return Flow::Stop(ExitReason::UserQuit),
            Action::None => {}
        }
        Flow::Continue
    }

    fn adjust_volume(&mut self, delta: i64, ceiling: impl FnOnce(Volume) -> Volume) {
        let index = self.cursor.index();
        let Some(current) = self.live.get(index).map(|e| e.volume) else {
            return;
        };
        let Some(entry) = self
            .live
            .update_volume(index, delta, Volume::MUTED, ceiling(current))
        else {
            return;
        };
        let (id, volume) = (entry.id, entry.volume);
        debug!(%id, from = %current, to = %volume, "volume adjusted");
        if !self.can_control() {
            return;
        }
        if let Err(err) = self.audio.set_volume(id, volume) {
            debug!(%err, %id, "set_volume request not sent");
        }
    }

    fn toggle_mute(&mut self) {
        let index = self.cursor.index();
        let Some(muted) = self.live.get(index).map(|e| !e.muted) else {
            return;
        };
        let Some(entry) = self.live.set_mute(index, muted) else {
            return;
        };
        let id = entry.id;
        debug!(%id, muted, "mute toggled");
        if !self.can_control() {
            return;
        }
        if let Err(err) = self.audio.set_mute(id, muted) {
            debug!(%err, %id, "set_mute request not sent");
        }
    }

    fn can_control(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    fn render(&mut self) {
        let selected = self.cursor.selected(self.live.count());
        self.view.render(self.live.entries(), selected, self.width);
    }

    /// Current connection state.
    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The live registry.
    #[inline]
    pub fn registry(&self) -> &StreamRegistry {
        &self.live
    }

    /// The cursor.
    #[inline]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The selected row, if any.
    #[inline]
    pub fn selected(&self) -> Option<usize> {
        self.cursor.selected(self.live.count())
    }

    /// Generation of the most recent rebuild.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a rebuild is waiting for its end-of-list.
    #[inline]
    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding
    }

    /// Terminal width used for the next render.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// The audio collaborator.
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// The view collaborator.
    pub fn view(&self) -> &V {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ControlError;
    use crate::event::{ChangeKind, KeyCode};
    use crate::registry::StreamId;

    #[derive(Default)]
    struct NullAudio {
        queries: Vec<Generation>,
        subscribed: usize,
    }

    impl AudioControl for NullAudio {
        fn query_streams(&mut self, generation: Generation) -> Result<(), ControlError> {
            self.queries.push(generation);
            Ok(())
        }
        fn subscribe(&mut self) -> Result<(), ControlError> {
            self.subscribed += 1;
            Ok(())
        }
        fn set_volume(&mut self, _: StreamId, _: Volume) -> Result<(), ControlError> {
            Err(ControlError::Disconnected)
        }
        fn set_mute(&mut self, _: StreamId, _: bool) -> Result<(), ControlError> {
            Err(ControlError::Disconnected)
        }
    }

    #[derive(Default)]
    struct CountingView {
        renders: usize,
        resizes: Vec<(u16, u16)>,
    }

    impl StreamView for CountingView {
        fn render(&mut self, _: &[StreamEntry], _: Option<usize>, _: u16) {
            self.renders += 1;
        }
        fn resize(&mut self, width: u16, height: u16) {
            self.resizes.push((width, height));
        }
    }

    fn reconciler() -> Reconciler<NullAudio, CountingView> {
        Reconciler::new(NullAudio::default(), CountingView::default(), 80)
    }

    #[test]
    fn ready_queries_and_subscribes_once() {
        let mut r = reconciler();
        r.handle_server(ServerEvent::State(ConnectionState::Ready));
        r.handle_server(ServerEvent::State(ConnectionState::Ready));
        assert_eq!(r.audio().queries, vec![Generation(1)]);
        assert_eq!(r.audio().subscribed, 1);
        assert!(r.is_rebuilding());
    }

    #[test]
    fn changes_ignored_while_connecting() {
        let mut r = reconciler();
        let flow = r.handle_server(ServerEvent::StreamsChanged {
            kind: Some(ChangeKind::New),
            id: Some(StreamId(3)),
        });
        assert_eq!(flow, Flow::Continue);
        assert!(r.audio().queries.is_empty());
    }

    #[test]
    fn failure_before_ready_is_connection_failed() {
        let mut r = reconciler();
        assert_eq!(
            r.handle_server(ServerEvent::State(ConnectionState::Failed)),
            Flow::Stop(ExitReason::ConnectionFailed)
        );
    }

    #[test]
    fn final_states_after_ready() {
        let mut r = reconciler();
        r.handle_server(ServerEvent::State(ConnectionState::Ready));
        assert_eq!(
            r.handle_server(ServerEvent::State(ConnectionState::Failed)),
            Flow::Stop(ExitReason::ConnectionLost)
        );

        let mut r = reconciler();
        r.handle_server(ServerEvent::State(ConnectionState::Ready));
        assert_eq!(
            r.handle_server(ServerEvent::State(ConnectionState::Terminated)),
            Flow::Stop(ExitReason::ServerTerminated)
        );
    }

    #[test]
    fn resize_forwards_and_renders() {
        let mut r = reconciler();
        r.handle_resize(120, 40);
        assert_eq!(r.view().resizes, vec![(120, 40)]);
        assert_eq!(r.view().renders, 1);
        assert_eq!(r.width(), 120);
    }

    #[test]
    fn quit_renders_then_stops() {
        let mut r = reconciler();
        let flow = r.handle_key(KeyEvent::new(KeyCode::Char('q')));
        assert_eq!(flow, Flow::Stop(ExitReason::UserQuit));
        assert_eq!(r.view().renders, 1);
    }

    #[test]
    fn control_failure_keeps_optimistic_value() {
        let mut r = reconciler();
        r.handle_server(ServerEvent::State(ConnectionState::Ready));
        r.handle_server(ServerEvent::StreamListed {
            generation: Generation(1),
            info: StreamInfo {
                id: StreamId(4),
                name: Some("mpv".into()),
                volume: Volume::from_percent(20),
                muted: false,
            },
        });
        r.handle_server(ServerEvent::EndOfList {
            generation: Generation(1),
        });
        r.handle_key(KeyEvent::new(KeyCode::Char('m')));
        assert_eq!(r.registry().get(0).map(|e| e.muted), Some(true));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitReason::UserQuit.exit_code(), 0);
        assert_eq!(ExitReason::Signal.exit_code(), 0);
        assert_eq!(ExitReason::ServerTerminated.exit_code(), 0);
        assert_eq!(ExitReason::ConnectionFailed.exit_code(), 1);
        assert_eq!(ExitReason::ConnectionLost.exit_code(), 1);
    }
}
