//! Dispatcher scenarios with in-memory collaborators.
//!
//! 1. The first frame is drawn before any event is handled.
//! 2. Events are handled in channel order, one at a time.
//! 3. The loop stops on quit, on a termination signal, and on server loss,
//!    with the matching exit reason.
//! 4. A producer failure ends the loop with that error.
//! 5. Subscriptions feed the same channel and are stopped when the loop ends.
//! 6. Any keystroke sequence without a quit key keeps the loop alive and
//!    renders exactly once per keystroke.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use curmix_core::audio::{AudioControl, ControlError};
use curmix_core::event::{
    ConnectionState, Event, Generation, KeyCode, KeyEvent, Modifiers, ServerEvent, StreamInfo,
};
use curmix_core::reconciler::{ExitReason, Reconciler};
use curmix_core::registry::{StreamEntry, StreamId};
use curmix_core::view::StreamView;
use curmix_core::volume::Volume;
use curmix_runtime::{InputSubscription, Message, Program, RuntimeError};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct NullAudio {
    volumes: Vec<(StreamId, Volume)>,
}

impl AudioControl for NullAudio {
    fn query_streams(&mut self, _: Generation) -> Result<(), ControlError> {
        Ok(())
    }

    fn subscribe(&mut self) -> Result<(), ControlError> {
        Ok(())
    }

    fn set_volume(&mut self, id: StreamId, volume: Volume) -> Result<(), ControlError> {
        self.volumes.push((id, volume));
        Ok(())
    }

    fn set_mute(&mut self, _: StreamId, _: bool) -> Result<(), ControlError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct CountingView {
    passes: Arc<Mutex<Vec<(usize, Option<usize>)>>>,
}

impl CountingView {
    fn passes(&self) -> Vec<(usize, Option<usize>)> {
        self.passes.lock().unwrap().clone()
    }
}

impl StreamView for CountingView {
    fn render(&mut self, entries: &[StreamEntry], selected: Option<usize>, _width: u16) {
        self.passes.lock().unwrap().push((entries.len(), selected));
    }

    fn resize(&mut self, _width: u16, _height: u16) {}
}

fn program() -> (Program<NullAudio, CountingView>, CountingView) {
    let view = CountingView::default();
    let reconciler = Reconciler::new(NullAudio::default(), view.clone(), 80);
    let (tx, rx) = mpsc::channel();
    (Program::new(reconciler, tx, rx), view)
}

fn key(c: char) -> Message {
    Message::Event(Event::Key(KeyEvent::new(KeyCode::Char(c))))
}

fn server(event: ServerEvent) -> Message {
    Message::from(event)
}

fn listed(generation: u64, id: u32, pct: u32) -> Message {
    server(ServerEvent::StreamListed {
        generation: Generation(generation),
        info: StreamInfo {
            id: StreamId(id),
            name: Some(format!("app{id}")),
            volume: Volume::from_percent(pct),
            muted: false,
        },
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1–2. Start-up and ordering
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn first_frame_precedes_events() {
    let (mut program, view) = program();
    assert!(program.pump().is_none());
    assert_eq!(view.passes(), vec![(0, None)]);
}

#[test]
fn rebuild_then_keystroke_in_order() {
    let (mut program, view) = program();
    let tx = program.sender();
    tx.send(server(ServerEvent::State(ConnectionState::Ready))).unwrap();
    tx.send(listed(1, 10, 50)).unwrap();
    tx.send(listed(1, 11, 20)).unwrap();
    tx.send(server(ServerEvent::EndOfList {
        generation: Generation(1),
    }))
    .unwrap();
    tx.send(key('l')).unwrap();

    assert!(program.pump().is_none());
    assert_eq!(view.passes(), vec![(0, None), (2, Some(0)), (2, Some(0))]);
    assert_eq!(
        program.reconciler().audio().volumes,
        vec![(StreamId(10), Volume::from_percent(55))]
    );
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Exit reasons
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn quit_key_stops_run() {
    let (mut program, _view) = program();
    program.sender().send(key('q')).unwrap();
    assert_eq!(program.run().unwrap(), ExitReason::UserQuit);
}

#[test]
fn ctrl_c_stops_run() {
    let (mut program, _view) = program();
    let ctrl_c = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
    program.sender().send(Message::Event(Event::Key(ctrl_c))).unwrap();
    assert_eq!(program.run().unwrap(), ExitReason::UserQuit);
}

#[test]
fn terminate_stops_run() {
    let (mut program, _view) = program();
    program.sender().send(Message::Event(Event::Terminate)).unwrap();
    assert_eq!(program.run().unwrap(), ExitReason::Signal);
}

#[test]
fn server_loss_after_ready_is_failure() {
    let (mut program, _view) = program();
    let tx = program.sender();
    tx.send(server(ServerEvent::State(ConnectionState::Ready))).unwrap();
    tx.send(server(ServerEvent::State(ConnectionState::Failed))).unwrap();
    let reason = program.run().unwrap();
    assert_eq!(reason, ExitReason::ConnectionLost);
    assert_eq!(reason.exit_code(), 1);
}

#[test]
fn events_after_stop_are_not_handled() {
    let (mut program, view) = program();
    let tx = program.sender();
    tx.send(key('q')).unwrap();
    tx.send(key('j')).unwrap();
    assert!(matches!(program.pump(), Some(Ok(ExitReason::UserQuit))));
    // Initial frame plus the quit keystroke; 'j' never reaches a handler.
    assert_eq!(view.passes().len(), 2);
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Producer failure
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn producer_failure_ends_run() {
    let (mut program, _view) = program();
    program
        .sender()
        .send(Message::Failed(RuntimeError::Input(std::io::Error::other("eof"))))
        .unwrap();
    assert!(matches!(program.run(), Err(RuntimeError::Input(_))));
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Subscriptions
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn input_subscription_drives_loop() {
    let (mut program, _view) = program();
    let script = Arc::new(Mutex::new(vec![
        Event::Key(KeyEvent::new(KeyCode::Char('q'))),
        Event::Resize {
            width: 100,
            height: 40,
        },
    ]));
    program
        .subscribe(InputSubscription::with_source(move |_timeout| {
            std::thread::sleep(Duration::from_millis(1));
            Ok(script.lock().unwrap().pop())
        }))
        .unwrap();
    assert_eq!(program.subscription_count(), 1);

    assert_eq!(program.run().unwrap(), ExitReason::UserQuit);
    assert_eq!(program.reconciler().width(), 100);
    assert_eq!(program.subscription_count(), 0);
}

#[test]
fn duplicate_subscription_is_ignored() {
    let (mut program, _view) = program();
    program
        .subscribe(InputSubscription::with_source(|_| Ok(None)))
        .unwrap();
    program
        .subscribe(InputSubscription::with_source(|_| Ok(None)))
        .unwrap();
    assert_eq!(program.subscription_count(), 1);
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Keystroke sequences
// ═════════════════════════════════════════════════════════════════════════

fn non_quit_key() -> impl Strategy<Value = KeyEvent> {
    prop_oneof![
        prop::sample::select(vec!['h', 'j', 'k', 'l', 'm', 'x', ' ']).prop_map(|c| KeyEvent::new(KeyCode::Char(c))),
        Just(KeyEvent::new(KeyCode::Up)),
        Just(KeyEvent::new(KeyCode::Down)),
        Just(KeyEvent::new(KeyCode::Left)),
        Just(KeyEvent::new(KeyCode::Right)),
        Just(KeyEvent::new(KeyCode::Escape)),
    ]
}

proptest! {
    #[test]
    fn one_render_per_keystroke(keys in prop::collection::vec(non_quit_key(), 0..40)) {
        let (mut program, view) = program();
        let tx = program.sender();
        tx.send(server(ServerEvent::State(ConnectionState::Ready))).unwrap();
        tx.send(listed(1, 1, 50)).unwrap();
        tx.send(listed(1, 2, 50)).unwrap();
        tx.send(server(ServerEvent::EndOfList { generation: Generation(1) })).unwrap();
        for key in &keys {
            tx.send(Message::Event(Event::Key(*key))).unwrap();
        }

        prop_assert!(program.pump().is_none());
        let passes = view.passes();
        // Initial frame, the committed rebuild, then one per key.
        prop_assert_eq!(passes.len(), 2 + keys.len());
        for (count, selected) in &passes[1..] {
            prop_assert_eq!(*count, 2);
            prop_assert!(matches!(selected, Some(0 | 1)));
        }
    }
}
