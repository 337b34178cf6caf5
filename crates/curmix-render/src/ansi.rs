#![forbid(unsafe_code)]

//! ANSI escape sequence helpers.
//!
//! Pure byte generation; the [`crate::presenter::Presenter`] does the state
//! tracking.
//!
//! | Sequence | Description |
//! |----------|-------------|
//! | `ESC [ n m` | SGR (Select Graphic Rendition) |
//! | `ESC [ row ; col H` | CUP (Cursor Position, 1-indexed) |
//! | `ESC [ 2 J` | ED (Erase Display) |
//! | `ESC [ ? 2026 h/l` | Synchronized Output (DEC) |
//! | `ESC [ ? 25 h/l` | Cursor visibility |

use std::io::{self, Write};

use crate::cell::{Color, StyleFlags};

/// SGR reset: `CSI 0 m`
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// Erase the whole display: `CSI 2 J`
pub const ERASE_DISPLAY: &[u8] = b"\x1b[2J";

/// Hide the cursor.
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// Show the cursor.
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// Begin synchronized output (DEC 2026).
pub const SYNC_BEGIN: &[u8] = b"\x1b[?2026h";

/// End synchronized output (DEC 2026).
pub const SYNC_END: &[u8] = b"\x1b[?2026l";

/// Flag to SGR "on" code, in emission order.
const FLAG_TABLE: [(StyleFlags, u8); 4] = [
    (StyleFlags::BOLD, 1),
    (StyleFlags::DIM, 2),
    (StyleFlags::UNDERLINE, 4),
    (StyleFlags::REVERSE, 7),
];

#[inline]
fn write_u8_dec(buf: &mut [u8], n: u8) -> usize {
    if n >= 100 {
        buf[0] = b'0' + n / 100;
        buf[1] = b'0' + (n / 10) % 10;
        buf[2] = b'0' + n % 10;
        3
    } else if n >= 10 {
        buf[0] = b'0' + n / 10;
        buf[1] = b'0' + n % 10;
        2
    } else {
        buf[0] = b'0' + n;
        1
    }
}

#[inline]
fn write_sgr_code<W: Write>(w: &mut W, code: u8) -> io::Result<()> {
    let mut buf = [0u8; 6];
    buf[0] = 0x1b;
    buf[1] = b'[';
    let len = write_u8_dec(&mut buf[2..], code);
    buf[2 + len] = b'm';
    w.write_all(&buf[..2 + len + 1])
}

/// Write SGR reset sequence.
#[inline]
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// Write one SGR sequence enabling every set flag.
///
/// Does not emit reset first; the caller owns the style state.
pub fn sgr_flags<W: Write>(w: &mut W, flags: StyleFlags) -> io::Result<()> {
    if flags.is_empty() {
        return Ok(());
    }

    let mut buf = [0u8; 16];
    buf[0] = 0x1b;
    buf[1] = b'[';
    let mut idx = 2;
    let mut first = true;
    for (flag, code) in FLAG_TABLE {
        if flags.contains(flag) {
            if !first {
                buf[idx] = b';';
                idx += 1;
            }
            idx += write_u8_dec(&mut buf[idx..], code);
            first = false;
        }
    }
    buf[idx] = b'm';
    w.write_all(&buf[..=idx])
}

/// Foreground palette color; `Color::Default` emits `CSI 39 m`.
pub fn sgr_fg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color.index() {
        Some(i) => write_sgr_code(w, 30 + i),
        None => write_sgr_code(w, 39),
    }
}

/// Background palette color; `Color::Default` emits `CSI 49 m`.
pub fn sgr_bg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color.index() {
        Some(i) => write_sgr_code(w, 40 + i),
        None => write_sgr_code(w, 49),
    }
}

/// CUP: move to 0-indexed (`row`, `col`).
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(
        w,
        "\x1b[{};{}H",
        u32::from(row) + 1,
        u32::from(col) + 1
    )
}

/// Erase the whole display.
#[inline]
pub fn erase_display<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(ERASE_DISPLAY)
}

/// Write hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Write show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

/// Write synchronized output begin.
#[inline]
pub fn sync_begin<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SYNC_BEGIN)
}

/// Write synchronized output end.
#[inline]
pub fn sync_end<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SYNC_END)
}
