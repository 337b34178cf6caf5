#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! RAII management of the terminal modes the mixer needs: raw mode, the
//! alternate screen, and a hidden cursor.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Drop restores previous state**: modes are undone in reverse order.
//! 2. **Panic safety**: a panic hook restores the terminal before the
//!    previous hook prints the message, so it also works with
//!    `panic = "abort"` where `Drop` never runs.
//! 3. **Only undo what was done**: each mode has an `_enabled` flag set
//!    after it is successfully entered.
//!
//! # Cleanup Order
//!
//! 1. Show cursor (if hidden)
//! 2. Leave alternate screen (if entered)
//! 3. Exit raw mode (always)
//! 4. Flush stdout
//!
//! # Usage
//!
//! ```no_run
//! use curmix_render::terminal_session::TerminalSession;
//!
//! let session = TerminalSession::new()?;
//! let (width, height) = session.size()?;
//! // ... draw ...
//! drop(session); // terminal restored
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use curmix_core::event::{Event, KeyCode, KeyEvent, Modifiers};
use tracing::{debug, info};

/// Owns raw mode and the alternate screen for its lifetime.
///
/// Only one session should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
}

impl TerminalSession {
    /// Enter raw mode, switch to the alternate screen, and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the mode sequences
    /// cannot be written. Anything already enabled is undone by `Drop`.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            cursor_hidden: false,
        };

        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        session.alternate_screen_enabled = true;
        info!("alternate screen enabled");

        crossterm::execute!(stdout, crossterm::cursor::Hide)?;
        session.cursor_hidden = true;

        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();

        if self.cursor_hidden {
            let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
            self.cursor_hidden = false;
        }

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Wait up to `timeout` for one terminal event.
///
/// Returns `Ok(None)` on timeout and for events the mixer does not handle
/// (mouse, focus, paste, key releases).
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if !crossterm::event::poll(timeout)? {
        return Ok(None);
    }
    let event = crossterm::event::read()?;
    let mapped = map_crossterm_event(event);
    if mapped.is_none() {
        debug!("unhandled terminal event dropped");
    }
    Ok(mapped)
}

/// Translate a crossterm event into a mixer event.
pub fn map_crossterm_event(event: crossterm::event::Event) -> Option<Event> {
    match event {
        crossterm::event::Event::Key(key) => map_key_event(key).map(Event::Key),
        crossterm::event::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        _ => None,
    }
}

fn map_key_event(event: crossterm::event::KeyEvent) -> Option<KeyEvent> {
    if event.kind == crossterm::event::KeyEventKind::Release {
        return None;
    }
    Some(KeyEvent::new(map_key_code(event.code)).with_modifiers(map_modifiers(event.modifiers)))
}

fn map_key_code(code: crossterm::event::KeyCode) -> KeyCode {
    match code {
        crossterm::event::KeyCode::Char(c) => KeyCode::Char(c),
        crossterm::event::KeyCode::Up => KeyCode::Up,
        crossterm::event::KeyCode::Down => KeyCode::Down,
        crossterm::event::KeyCode::Left => KeyCode::Left,
        crossterm::event::KeyCode::Right => KeyCode::Right,
        crossterm::event::KeyCode::Esc => KeyCode::Escape,
        _ => KeyCode::Other,
    }
}

fn map_modifiers(modifiers: crossterm::event::KeyModifiers) -> Modifiers {
    let mut result = Modifiers::NONE;
    if modifiers.contains(crossterm::event::KeyModifiers::SHIFT) {
        result |= Modifiers::SHIFT;
    }
    if modifiers.contains(crossterm::event::KeyModifiers::ALT) {
        result |= Modifiers::ALT;
    }
    if modifiers.contains(crossterm::event::KeyModifiers::CONTROL) {
        result |= Modifiers::CTRL;
    }
    result
}
