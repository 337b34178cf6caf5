#![forbid(unsafe_code)]

//! Background event sources.
//!
//! A subscription runs on its own thread and sends [`Message`]s to the
//! dispatcher. The program starts each one once and stops all of them when
//! the loop ends.
//!
//! # Built-in subscriptions
//!
//! - [`InputSubscription`]: terminal keystrokes and resizes.
//! - [`SignalSubscription`]: SIGINT and SIGTERM as [`Event::Terminate`].

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use curmix_core::event::Event;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{debug, info, trace, warn};

use crate::error::RuntimeError;
use crate::program::Message;

/// Identifies a subscription so it is started at most once.
pub type SubId = u64;

/// How often subscription loops re-check their stop signal.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A source of events running on a background thread.
pub trait Subscription: Send {
    /// Stable identifier.
    fn id(&self) -> SubId;

    /// Send messages until `stop` fires or the receiver is dropped.
    fn run(&self, sender: mpsc::Sender<Message>, stop: StopSignal);
}

/// Signal for stopping a subscription.
///
/// The program sets it when the loop ends. Subscriptions check it between
/// polls and return once it is set.
#[derive(Clone, Debug)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Create a linked (signal, trigger) pair.
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Whether the stop signal has been triggered.
    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if `duration` elapsed first.
    /// Spurious wakeups are absorbed.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();
        let mut remaining = duration;
        loop {
            if *stopped {
                return true;
            }
            let (guard, result) = cvar
                .wait_timeout(stopped, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            stopped = guard;
            if *stopped {
                return true;
            }
            if result.timed_out() {
                return false;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            remaining = duration - elapsed;
        }
    }
}

/// Program-side half of a [`StopSignal`].
#[derive(Debug)]
pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        cvar.notify_all();
    }
}

/// A started subscription.
#[derive(Debug)]
pub(crate) struct RunningSubscription {
    pub(crate) id: SubId,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningSubscription {
    /// Start `subscription` on a named thread.
    pub(crate) fn spawn(
        subscription: Box<dyn Subscription>,
        sender: mpsc::Sender<Message>,
    ) -> Result<Self, RuntimeError> {
        let id = subscription.id();
        let (signal, trigger) = StopSignal::new();
        let thread = thread::Builder::new()
            .name(format!("curmix-sub-{id:x}"))
            .spawn(move || subscription.run(sender, signal))
            .map_err(RuntimeError::Spawn)?;
        debug!(sub_id = id, "subscription started");
        Ok(Self {
            id,
            trigger,
            thread: Some(thread),
        })
    }

    /// Stop the subscription and join its thread.
    pub(crate) fn stop(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!(sub_id = self.id, "subscription thread panicked");
            }
        }
        debug!(sub_id = self.id, "subscription stopped");
    }
}

impl Drop for RunningSubscription {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}

// --- Built-in subscriptions ---

type PollFn = dyn Fn(Duration) -> io::Result<Option<Event>> + Send + Sync;

/// Terminal input: keystrokes and resizes.
///
/// Polls in short slices so a stop request is noticed promptly. A read
/// failure is sent as [`Message::Failed`] and ends the subscription.
pub struct InputSubscription {
    poll: Box<PollFn>,
}

impl InputSubscription {
    /// Stable identifier ("INPT").
    pub const ID: SubId = 0x494E_5054;

    /// Read from the controlling terminal.
    pub fn new() -> Self {
        Self::with_source(curmix_render::terminal_session::poll_event)
    }

    /// Read from a custom source; `poll` waits up to its argument for one
    /// event.
    pub fn with_source(
        poll: impl Fn(Duration) -> io::Result<Option<Event>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            poll: Box::new(poll),
        }
    }
}

impl Default for InputSubscription {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscription for InputSubscription {
    fn id(&self) -> SubId {
        Self::ID
    }

    fn run(&self, sender: mpsc::Sender<Message>, stop: StopSignal) {
        while !stop.is_stopped() {
            match (self.poll)(POLL_INTERVAL) {
                Ok(Some(event)) => {
                    trace!(?event, "terminal event");
                    if sender.send(Message::Event(event)).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "terminal input failed");
                    let _ = sender.send(Message::Failed(RuntimeError::Input(err)));
                    break;
                }
            }
        }
    }
}

/// SIGINT and SIGTERM, delivered as [`Event::Terminate`].
///
/// Handlers are registered on construction, so the default action (process
/// termination without terminal cleanup) is replaced before the loop starts.
pub struct SignalSubscription {
    signals: Mutex<Signals>,
}

impl SignalSubscription {
    /// Stable identifier ("SIGS").
    pub const ID: SubId = 0x5349_4753;

    /// Register SIGINT and SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Signals`] if registration fails.
    pub fn new() -> Result<Self, RuntimeError> {
        Self::with_signals(&[SIGINT, SIGTERM])
    }

    /// Register an explicit set of signals.
    pub fn with_signals(signals: &[i32]) -> Result<Self, RuntimeError> {
        let signals = Signals::new(signals).map_err(RuntimeError::Signals)?;
        Ok(Self {
            signals: Mutex::new(signals),
        })
    }
}

impl Subscription for SignalSubscription {
    fn id(&self) -> SubId {
        Self::ID
    }

    fn run(&self, sender: mpsc::Sender<Message>, stop: StopSignal) {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            for signal in signals.pending() {
                info!(signal, "termination signal received");
                if sender.send(Message::Event(Event::Terminate)).is_err() {
                    return;
                }
            }
            if stop.wait_timeout(POLL_INTERVAL) {
                break;
            }
        }
    }
}
