#![forbid(unsafe_code)]

//! The PulseAudio backend thread.
//!
//! The standard mainloop and the context are not `Send`, so both live on a
//! dedicated thread for their whole lifetime. The dispatcher reaches the
//! thread through a request channel ([`PulseBackend`] implements
//! [`AudioControl`] by sending on it) and hears back through its own event
//! channel, which the thread feeds with [`ServerEvent`]s.
//!
//! # Thread loop
//!
//! 1. Run the mainloop without blocking until it has nothing to dispatch.
//! 2. Compare the context state with the last one reported; forward changes.
//! 3. Wait briefly for a request and apply it (and any others queued).
//!
//! The thread ends on a final connection state, on shutdown, or when the
//! dispatcher hangs up.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use curmix_core::audio::{AudioControl, ControlError};
use curmix_core::event::{ChangeKind, ConnectionState, Generation, ServerEvent, StreamInfo};
use curmix_core::registry::StreamId;
use curmix_core::volume::Volume;
use pulse::callbacks::ListResult;
use pulse::context::introspect::SinkInputInfo;
use pulse::context::subscribe::{Facility, InterestMaskSet};
use pulse::context::{Context, FlagSet as ContextFlags};
use pulse::mainloop::standard::{IterateResult, Mainloop};
use pulse::proplist::{Proplist, properties};
use tracing::{debug, info, trace, warn};

use crate::convert;
use crate::error::PulseError;

/// Client name announced to the server.
pub const CLIENT_NAME: &str = "curmix";

/// How long the backend thread waits for a request between mainloop runs.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on non-blocking iterations per loop turn.
const MAX_ITERATIONS: usize = 64;

/// A request from the dispatcher to the backend thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Query(Generation),
    Subscribe,
    SetVolume(StreamId, Volume),
    SetMute(StreamId, bool),
    Shutdown,
}

/// Handle to the backend thread.
///
/// Dropping the handle disconnects from the server and joins the thread.
#[derive(Debug)]
pub struct PulseBackend {
    requests: Sender<Request>,
    thread: Option<JoinHandle<()>>,
}

impl PulseBackend {
    /// Start the backend thread and begin connecting to `server` (the
    /// library default when `None`).
    ///
    /// Returns once the context exists and the connection attempt is under
    /// way. Connection progress, including failure, arrives on `events` as
    /// [`ServerEvent::State`].
    ///
    /// # Errors
    ///
    /// Returns [`PulseError`] if the thread cannot start, the mainloop or
    /// context cannot be created, or the server refuses immediately.
    pub fn connect<M>(server: Option<String>, events: Sender<M>) -> Result<Self, PulseError>
    where
        M: From<ServerEvent> + Send + 'static,
    {
        let (requests, inbox) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::sync_channel(1);

        let thread = thread::Builder::new()
            .name("curmix-pulse".into())
            .spawn(move || match Worker::new(server.as_deref(), events) {
                Ok(worker) => {
                    let _ = started_tx.send(Ok(()));
                    worker.run(&inbox);
                }
                Err(err) => {
                    let _ = started_tx.send(Err(err));
                }
            })
            .map_err(PulseError::Spawn)?;

        let started = started_rx.recv().unwrap_or(Err(PulseError::ThreadExited));
        match started {
            Ok(()) => Ok(Self {
                requests,
                thread: Some(thread),
            }),
            Err(err) => {
                let _ = thread.join();
                Err(err)
            }
        }
    }

    fn send(&self, request: Request) -> Result<(), ControlError> {
        self.requests
            .send(request)
            .map_err(|_| ControlError::Disconnected)
    }
}

impl AudioControl for PulseBackend {
    fn query_streams(&mut self, generation: Generation) -> Result<(), ControlError> {
        self.send(Request::Query(generation))
    }

    fn subscribe(&mut self) -> Result<(), ControlError> {
        self.send(Request::Subscribe)
    }

    fn set_volume(&mut self, id: StreamId, volume: Volume) -> Result<(), ControlError> {
        self.send(Request::SetVolume(id, volume))
    }

    fn set_mute(&mut self, id: StreamId, muted: bool) -> Result<(), ControlError> {
        self.send(Request::SetMute(id, muted))
    }
}

impl Drop for PulseBackend {
    fn drop(&mut self) {
        let _ = self.requests.send(Request::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("audio backend thread panicked");
            }
        }
    }
}

/// Channel count per stream, learned from list replies.
type ChannelCounts = Rc<RefCell<HashMap<u32, u8>>>;

/// State owned by the backend thread.
struct Worker<M> {
    // Declared before the mainloop so it is dropped first.
    context: Context,
    mainloop: Mainloop,
    events: Sender<M>,
    channels: ChannelCounts,
    reported: Option<ConnectionState>,
}

impl<M> Worker<M>
where
    M: From<ServerEvent> + Send + 'static,
{
    fn new(server: Option<&str>, events: Sender<M>) -> Result<Self, PulseError> {
        let mainloop = Mainloop::new().ok_or(PulseError::Mainloop)?;

        let mut proplist = Proplist::new().ok_or(PulseError::Context)?;
        proplist
            .set_str(properties::APPLICATION_NAME, CLIENT_NAME)
            .map_err(|()| PulseError::Context)?;

        let mut context = Context::new_with_proplist(&mainloop, CLIENT_NAME, &proplist)
            .ok_or(PulseError::Context)?;

        let channels: ChannelCounts = Rc::default();
        let notify = events.clone();
        let known = Rc::clone(&channels);
        context.set_subscribe_callback(Some(Box::new(move |facility, operation, index| {
            if facility != Some(Facility::SinkInput) {
                return;
            }
            let kind = operation.map(convert::change_kind);
            trace!(?kind, index, "sink input event");
            if kind == Some(ChangeKind::Removed) {
                known.borrow_mut().remove(&index);
            }
            let _ = notify.send(M::from(ServerEvent::StreamsChanged {
                kind,
                id: Some(StreamId(index)),
            }));
        })));

        context
            .connect(server, ContextFlags::NOFLAGS, None)
            .map_err(|err| PulseError::Connect(format!("{err}")))?;
        info!(server = server.unwrap_or("default"), "connecting to PulseAudio");

        Ok(Self {
            context,
            mainloop,
            events,
            channels,
            reported: None,
        })
    }

    fn run(mut self, inbox: &Receiver<Request>) {
        loop {
            if !self.pump_mainloop() {
                break;
            }
            let state = convert::connection_state(self.context.get_state());
            if !self.report(state) || state.is_final() {
                break;
            }

            match inbox.recv_timeout(POLL_INTERVAL) {
                Ok(Request::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(request) => {
                    if !self.apply_all(request, inbox) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        self.context.disconnect();
        debug!("audio backend thread finished");
    }

    /// Dispatch everything the mainloop has ready. `false` if it died.
    fn pump_mainloop(&mut self) -> bool {
        for _ in 0..MAX_ITERATIONS {
            match self.mainloop.iterate(false) {
                IterateResult::Success(0) => return true,
                IterateResult::Success(_) => {}
                IterateResult::Quit(_) => {
                    info!("mainloop quit");
                    return false;
                }
                IterateResult::Err(err) => {
                    warn!(%err, "mainloop iteration failed");
                    let _ = self.report(ConnectionState::Failed);
                    return false;
                }
            }
        }
        true
    }

    /// Forward `state` if it changed. `false` if the dispatcher is gone.
    fn report(&mut self, state: ConnectionState) -> bool {
        if self.reported == Some(state) {
            return true;
        }
        debug!(?state, "context state");
        self.reported = Some(state);
        self.emit(ServerEvent::State(state))
    }

    fn emit(&self, event: ServerEvent) -> bool {
        self.events.send(M::from(event)).is_ok()
    }

    /// Apply `first` and anything else already queued. `false` on shutdown.
    fn apply_all(&mut self, first: Request, inbox: &Receiver<Request>) -> bool {
        let mut next = Some(first);
        while let Some(request) = next {
            if request == Request::Shutdown {
                return false;
            }
            self.apply(request);
            next = inbox.try_recv().ok();
        }
        true
    }

    fn apply(&mut self, request: Request) {
        trace!(?request, "backend request");
        match request {
            Request::Query(generation) => self.query(generation),
            Request::Subscribe => {
                self.context.subscribe(InterestMaskSet::SINK_INPUT, |ok| {
                    if !ok {
                        warn!("sink input subscription refused");
                    }
                });
            }
            Request::SetVolume(id, volume) => self.set_volume(id, volume),
            Request::SetMute(id, muted) => {
                self.context.introspect().set_sink_input_mute(
                    id.0,
                    muted,
                    Some(Box::new(move |ok| {
                        if !ok {
                            debug!(%id, muted, "set mute rejected");
                        }
                    })),
                );
            }
            Request::Shutdown => {}
        }
    }

    fn query(&mut self, generation: Generation) {
        let events = self.events.clone();
        let channels = Rc::clone(&self.channels);
        self.context
            .introspect()
            .get_sink_input_info_list(move |result: ListResult<&SinkInputInfo>| {
                let event = match result {
                    ListResult::Item(info) => {
                        channels.borrow_mut().insert(info.index, info.volume.len());
                        ServerEvent::StreamListed {
                            generation,
                            info: stream_info(info),
                        }
                    }
                    ListResult::End => ServerEvent::EndOfList { generation },
                    ListResult::Error => {
                        warn!(generation = generation.0, "sink input list query failed");
                        ServerEvent::EndOfList { generation }
                    }
                };
                let _ = events.send(M::from(event));
            });
    }

    fn set_volume(&mut self, id: StreamId, volume: Volume) {
        let Some(channels) = self.channels.borrow().get(&id.0).copied() else {
            debug!(%id, "set volume skipped: channel count unknown");
            return;
        };
        let volumes = convert::uniform_volume(channels, volume);
        self.context.introspect().set_sink_input_volume(
            id.0,
            &volumes,
            Some(Box::new(move |ok| {
                if !ok {
                    debug!(%id, %volume, "set volume rejected");
                }
            })),
        );
    }
}

/// Core view of one sink input.
fn stream_info(info: &SinkInputInfo) -> StreamInfo {
    StreamInfo {
        id: StreamId(info.index),
        name: convert::stream_name(
            info.proplist.get_str(properties::APPLICATION_PROCESS_BINARY),
            info.proplist.get_str(properties::APPLICATION_NAME),
        ),
        volume: convert::average_volume(&info.volume),
        muted: info.mute,
    }
}
