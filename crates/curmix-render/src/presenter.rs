#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! Turns a [`BufferDiff`] into terminal output, emitting style and cursor
//! sequences only when they change. Each frame is written into one buffered
//! writer, optionally wrapped in synchronized-output markers, and flushed
//! once.
//!
//! ```
//! use curmix_render::buffer::Buffer;
//! use curmix_render::diff::BufferDiff;
//! use curmix_render::presenter::Presenter;
//!
//! let mut presenter = Presenter::new(Vec::new(), true);
//! let current = Buffer::new(20, 2);
//! let mut next = Buffer::new(20, 2);
//! next.set_string(0, 0, "hi", Default::default(), 20);
//!
//! let diff = BufferDiff::compute(&current, &next);
//! presenter.present(&next, &diff).unwrap();
//! ```

use std::io::{self, BufWriter, Write};

use crate::ansi;
use crate::buffer::Buffer;
use crate::cell::{Cell, Style};
use crate::diff::BufferDiff;

/// Size of the internal write buffer.
const BUFFER_CAPACITY: usize = 16 * 1024;

/// State-tracked ANSI presenter.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    /// Style last emitted (None = unknown/reset).
    current_style: Option<Style>,
    /// Cursor column. None = unknown.
    cursor_x: Option<u16>,
    /// Cursor row. None = unknown.
    cursor_y: Option<u16>,
    sync_output: bool,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter; `sync_output` wraps frames in DEC 2026 markers.
    pub fn new(writer: W, sync_output: bool) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            current_style: None,
            cursor_x: None,
            cursor_y: None,
            sync_output,
        }
    }

    /// Present one frame.
    ///
    /// 1. Begins synchronized output (if enabled)
    /// 2. Emits the changed runs
    /// 3. Resets style
    /// 4. Ends synchronized output
    /// 5. Flushes once
    pub fn present(&mut self, buffer: &Buffer, diff: &BufferDiff) -> io::Result<()> {
        let _span = tracing::debug_span!(
            "present",
            width = buffer.width(),
            height = buffer.height(),
            changes = diff.len()
        )
        .entered();

        if self.sync_output {
            ansi::sync_begin(&mut self.writer)?;
        }

        for run in diff.runs() {
            self.move_cursor_to(run.x0, run.y)?;
            for x in run.x0..=run.x1 {
                self.emit_cell(buffer.get_unchecked(x, run.y))?;
            }
        }

        ansi::sgr_reset(&mut self.writer)?;
        self.current_style = None;

        if self.sync_output {
            ansi::sync_end(&mut self.writer)?;
        }
        self.writer.flush()
    }

    fn emit_cell(&mut self, cell: &Cell) -> io::Result<()> {
        if cell.is_continuation() {
            return Ok(());
        }

        self.emit_style_changes(cell.style())?;

        let mut scratch = [0u8; 4];
        if let Some(text) = cell.content.as_str(&mut scratch) {
            self.writer.write_all(text.as_bytes())?;
        }

        if let Some(x) = self.cursor_x {
            self.cursor_x = Some(x.saturating_add(cell.content.width() as u16));
        }
        Ok(())
    }

    /// Reset and re-apply when the style differs from the last one emitted.
    fn emit_style_changes(&mut self, style: Style) -> io::Result<()> {
        if self.current_style == Some(style) {
            return Ok(());
        }
        ansi::sgr_reset(&mut self.writer)?;
        if style.fg.index().is_some() {
            ansi::sgr_fg(&mut self.writer, style.fg)?;
        }
        if style.bg.index().is_some() {
            ansi::sgr_bg(&mut self.writer, style.bg)?;
        }
        ansi::sgr_flags(&mut self.writer, style.flags)?;
        self.current_style = Some(style);
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor_x == Some(x) && self.cursor_y == Some(y) {
            return Ok(());
        }
        ansi::cup(&mut self.writer, y, x)?;
        self.cursor_x = Some(x);
        self.cursor_y = Some(y);
        Ok(())
    }

    /// Clear the entire screen and home the cursor.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        ansi::sgr_reset(&mut self.writer)?;
        ansi::erase_display(&mut self.writer)?;
        ansi::cup(&mut self.writer, 0, 0)?;
        self.current_style = None;
        self.cursor_x = Some(0);
        self.cursor_y = Some(0);
        self.writer.flush()
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        ansi::cursor_hide(&mut self.writer)?;
        self.writer.flush()
    }

    /// Forget tracked state (after a resize or an external write).
    pub fn reset(&mut self) {
        self.current_style = None;
        self.cursor_x = None;
        self.cursor_y = None;
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Consume the presenter, flushing and returning the writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}
