#![forbid(unsafe_code)]

//! Keystroke to action mapping.
//!
//! | key            | action                    | precondition        |
//! |----------------|---------------------------|---------------------|
//! | `Up` / `k`     | move cursor up            | cursor > 0          |
//! | `Down` / `j`   | move cursor down          | cursor + 1 < count  |
//! | `Left` / `h`   | volume down one step      | count > 0           |
//! | `Right` / `l`  | volume up one step        | count > 0           |
//! | `m`            | toggle mute               | count > 0           |
//! | `q` / `Ctrl+C` | quit                      | always              |
//!
//! Anything else, or a key whose precondition fails, maps to
//! [`Action::None`].

use crate::event::{KeyCode, KeyEvent};

/// What a keystroke asks the reconciler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move the selection by the given number of rows.
    MoveCursor(isize),
    /// Raise the selected stream by one step.
    IncrementVolume,
    /// Lower the selected stream by one step.
    DecrementVolume,
    /// Flip the selected stream's mute flag.
    ToggleMute,
    /// Stop the event loop.
    Quit,
    /// Nothing to do.
    None,
}

/// Map a keystroke to an action given the cursor and the registry size.
///
/// Pure: the result depends only on the arguments.
pub fn dispatch(key: &KeyEvent, cursor: usize, count: usize) -> Action {
    if key.ctrl() {
        return if key.is_char('c') {
            Action::Quit
        } else {
            Action::None
        };
    }

    let selectable = count > 0;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') if cursor > 0 => Action::MoveCursor(-1),
        KeyCode::Down | KeyCode::Char('j') if cursor + 1 < count => Action::MoveCursor(1),
        KeyCode::Left | KeyCode::Char('h') if selectable => Action::DecrementVolume,
        KeyCode::Right | KeyCode::Char('l') if selectable => Action::IncrementVolume,
        KeyCode::Char('m') if selectable => Action::ToggleMute,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    #[test]
    fn navigation_respects_edges() {
        assert_eq!(dispatch(&key(KeyCode::Up), 0, 3), Action::None);
        assert_eq!(dispatch(&key(KeyCode::Char('k')), 1, 3), Action::MoveCursor(-1));
        assert_eq!(dispatch(&key(KeyCode::Down), 2, 3), Action::None);
        assert_eq!(dispatch(&key(KeyCode::Char('j')), 1, 3), Action::MoveCursor(1));
    }

    #[test]
    fn volume_keys_need_a_selection() {
        assert_eq!(dispatch(&key(KeyCode::Left), 0, 0), Action::None);
        assert_eq!(dispatch(&key(KeyCode::Char('l')), 0, 0), Action::None);
        assert_eq!(dispatch(&key(KeyCode::Char('m')), 0, 0), Action::None);
        assert_eq!(dispatch(&key(KeyCode::Char('h')), 0, 1), Action::DecrementVolume);
        assert_eq!(dispatch(&key(KeyCode::Right), 0, 1), Action::IncrementVolume);
        assert_eq!(dispatch(&key(KeyCode::Char('m')), 0, 1), Action::ToggleMute);
    }

    #[test]
    fn quit_is_always_available() {
        assert_eq!(dispatch(&key(KeyCode::Char('q')), 0, 0), Action::Quit);
        let ctrl_c = key(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert_eq!(dispatch(&ctrl_c, 0, 0), Action::Quit);
    }

    #[test]
    fn other_keys_do_nothing() {
        assert_eq!(dispatch(&key(KeyCode::Char('x')), 0, 2), Action::None);
        assert_eq!(dispatch(&key(KeyCode::Escape), 0, 2), Action::None);
        assert_eq!(dispatch(&key(KeyCode::Other), 0, 2), Action::None);
        let ctrl_m = key(KeyCode::Char('m')).with_modifiers(Modifiers::CTRL);
        assert_eq!(dispatch(&ctrl_m, 0, 2), Action::None);
    }
}
