#![forbid(unsafe_code)]

//! The dispatcher.
//!
//! [`Program`] waits on one channel and hands each message to the
//! reconciler, to completion, before taking the next. Producers never touch
//! the reconciler, so generation checks are enough to discard stale
//! rebuild replies.
//!
//! # Shutdown
//!
//! The loop ends when a handler returns [`Flow::Stop`] or a subscription
//! reports a failure. Subscriptions are then stopped and joined; dropping
//! the program drops the reconciler and with it the audio backend.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use curmix_core::audio::AudioControl;
use curmix_core::event::{Event, ServerEvent};
use curmix_core::reconciler::{ExitReason, Flow, Reconciler};
use curmix_core::view::StreamView;
use tracing::{debug, info, info_span};

use crate::error::RuntimeError;
use crate::subscription::{RunningSubscription, Subscription};

/// What travels on the dispatcher channel.
#[derive(Debug)]
pub enum Message {
    /// An event for the reconciler.
    Event(Event),
    /// A producer hit an error it cannot recover from.
    Failed(RuntimeError),
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

impl From<ServerEvent> for Message {
    fn from(event: ServerEvent) -> Self {
        Self::Event(Event::Server(event))
    }
}

/// Single-threaded event loop around a [`Reconciler`].
pub struct Program<A, V> {
    reconciler: Reconciler<A, V>,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    subscriptions: Vec<RunningSubscription>,
    started: bool,
}

impl<A: AudioControl, V: StreamView> Program<A, V> {
    /// Wrap `reconciler`; `sender` and `receiver` are the two ends of the
    /// dispatcher channel (the audio backend typically holds another clone
    /// of `sender`).
    pub fn new(
        reconciler: Reconciler<A, V>,
        sender: Sender<Message>,
        receiver: Receiver<Message>,
    ) -> Self {
        Self {
            reconciler,
            sender,
            receiver,
            subscriptions: Vec::new(),
            started: false,
        }
    }

    /// Start a subscription thread. A second subscription with an id that
    /// is already running is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Spawn`] if the thread cannot be started.
    pub fn subscribe(&mut self, subscription: impl Subscription + 'static) -> Result<(), RuntimeError> {
        let id = subscription.id();
        if self.subscriptions.iter().any(|running| running.id == id) {
            debug!(sub_id = id, "subscription already running");
            return Ok(());
        }
        let running = RunningSubscription::spawn(Box::new(subscription), self.sender.clone())?;
        self.subscriptions.push(running);
        Ok(())
    }

    /// Number of running subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Draw the first frame and dispatch until the loop stops.
    ///
    /// # Errors
    ///
    /// Returns the first [`Message::Failed`] received.
    pub fn run(&mut self) -> Result<ExitReason, RuntimeError> {
        let _span = info_span!("dispatcher").entered();
        self.start();
        let outcome = loop {
            let message = match self.receiver.recv() {
                Ok(message) => message,
                Err(_) => break Err(RuntimeError::Disconnected),
            };
            if let Some(outcome) = self.dispatch(message) {
                break outcome;
            }
        };
        info!(?outcome, "dispatcher stopped");
        self.stop_subscriptions();
        outcome
    }

    /// Dispatch every message already queued without waiting.
    ///
    /// Returns `Some` once the loop would stop.
    pub fn pump(&mut self) -> Option<Result<ExitReason, RuntimeError>> {
        self.start();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    if let Some(outcome) = self.dispatch(message) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(Err(RuntimeError::Disconnected)),
            }
        }
    }

    /// The wrapped reconciler.
    pub fn reconciler(&self) -> &Reconciler<A, V> {
        &self.reconciler
    }

    /// A sender for injecting messages into the loop.
    pub fn sender(&self) -> Sender<Message> {
        self.sender.clone()
    }

    fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.reconciler.start();
        }
    }

    fn dispatch(&mut self, message: Message) -> Option<Result<ExitReason, RuntimeError>> {
        match message {
            Message::Event(event) => match self.reconciler.handle(event) {
                Flow::Continue => None,
                Flow::Stop(reason) => Some(Ok(reason)),
            },
            Message::Failed(err) => Some(Err(err)),
        }
    }
}

impl<A, V> Program<A, V> {
    fn stop_subscriptions(&mut self) {
        for running in self.subscriptions.drain(..) {
            running.stop();
        }
    }
}

impl<A, V> Drop for Program<A, V> {
    fn drop(&mut self) {
        self.stop_subscriptions();
    }
}
