#![forbid(unsafe_code)]

//! The terminal-backed [`StreamView`].
//!
//! Each pass draws the whole list into a fresh off-screen [`Buffer`], diffs
//! it against the previous frame, and hands the diff to the [`Presenter`].
//! A resize throws the previous frame away and clears the screen, so the
//! next pass repaints everything at the new size.

use std::io::Write;

use curmix_core::registry::StreamEntry;
use curmix_core::view::StreamView;
use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::diff::BufferDiff;
use crate::layout::{SlotTable, placeholder_area};
use crate::presenter::Presenter;
use crate::widgets::{Placeholder, VolumeBox, Widget};

/// Draws stream lists to a terminal writer.
pub struct TerminalRenderer<W: Write> {
    presenter: Presenter<W>,
    slots: SlotTable,
    previous: Option<Buffer>,
    width: u16,
    height: u16,
    clear_pending: bool,
    failed_passes: u64,
}

impl<W: Write> TerminalRenderer<W> {
    /// Create a renderer for a `width` x `height` terminal.
    ///
    /// The first pass clears the screen.
    pub fn new(writer: W, width: u16, height: u16, sync_output: bool) -> Self {
        Self {
            presenter: Presenter::new(writer, sync_output),
            slots: SlotTable::new(width),
            previous: None,
            width,
            height,
            clear_pending: true,
            failed_passes: 0,
        }
    }

    /// Frame drawn by the last successful pass.
    pub fn last_frame(&self) -> Option<&Buffer> {
        self.previous.as_ref()
    }

    /// Number of live render slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Passes whose output could not be written.
    pub fn failed_passes(&self) -> u64 {
        self.failed_passes
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        self.presenter.get_ref()
    }

    /// Draw `entries` into a fresh frame.
    fn compose(&mut self, entries: &[StreamEntry], selected: Option<usize>) -> Buffer {
        let mut frame = Buffer::new(self.width, self.height);
        let slots = self.slots.sync(entries.len());

        if entries.is_empty() {
            Placeholder::default().render(placeholder_area(self.width), &mut frame);
            return frame;
        }
        for (index, (slot, entry)) in slots.iter().zip(entries).enumerate() {
            VolumeBox::new(&entry.display_name, entry.volume)
                .muted(entry.muted)
                .selected(selected == Some(index))
                .render(slot.area(), &mut frame);
        }
        frame
    }

    fn present(&mut self, frame: &Buffer) -> std::io::Result<()> {
        if self.clear_pending {
            self.presenter.clear_screen()?;
            self.presenter.hide_cursor()?;
            self.clear_pending = false;
        }
        let diff = match &self.previous {
            Some(prev) if prev.width() == frame.width() && prev.height() == frame.height() => {
                BufferDiff::compute(prev, frame)
            }
            _ => BufferDiff::full(frame),
        };
        self.presenter.present(frame, &diff)
    }
}

impl<W: Write> StreamView for TerminalRenderer<W> {
    fn render(&mut self, entries: &[StreamEntry], selected: Option<usize>, width: u16) {
        let _span = tracing::debug_span!(
            "render_pass",
            entries = entries.len(),
            selected = ?selected,
            width
        )
        .entered();

        if width != self.width {
            self.width = width;
            self.slots.resize(width);
        }
        let frame = self.compose(entries, selected);
        match self.present(&frame) {
            Ok(()) => self.previous = Some(frame),
            Err(err) => {
                self.failed_passes += 1;
                warn!(%err, "render pass failed");
                // The screen is in an unknown state; repaint everything next time.
                self.previous = None;
                self.presenter.reset();
            }
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "renderer resized");
        self.width = width;
        self.height = height;
        self.slots.resize(width);
        self.previous = None;
        self.clear_pending = true;
        self.presenter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curmix_core::registry::StreamId;
    use curmix_core::volume::Volume;

    fn entry(id: u32, name: &str, pct: u32, muted: bool) -> StreamEntry {
        StreamEntry::new(StreamId(id), Some(name), Volume::from_percent(pct), muted)
    }

    fn renderer() -> TerminalRenderer<Vec<u8>> {
        TerminalRenderer::new(Vec::new(), 40, 20, false)
    }

    #[test]
    fn empty_list_shows_placeholder_only() {
        let mut r = renderer();
        r.render(&[], None, 40);
        let frame = r.last_frame().unwrap();
        assert_eq!(frame.row_text(3).trim_end(), "      No Inputs found");
        assert!(!frame.row_text(4).contains('│'));
        assert_eq!(r.slot_count(), 0);
    }

    #[test]
    fn one_box_per_entry() {
        let mut r = renderer();
        r.render(&[entry(1, "mpv", 50, false), entry(2, "firefox", 10, true)], Some(1), 40);
        let frame = r.last_frame().unwrap();
        assert!(frame.row_text(3).starts_with("      ┌─mpv"));
        assert!(frame.row_text(9).starts_with("      ┌─firefox"));
        assert_eq!(r.slot_count(), 2);
    }

    #[test]
    fn shrinking_releases_slots_and_blanks_rows() {
        let mut r = renderer();
        r.render(&[entry(1, "a", 50, false), entry(2, "b", 50, false)], Some(0), 40);
        r.render(&[entry(1, "a", 50, false)], Some(0), 40);
        assert_eq!(r.slot_count(), 1);
        assert_eq!(r.last_frame().unwrap().row_text(9).trim(), "");
    }

    #[test]
    fn identical_pass_writes_no_cells() {
        let mut r = renderer();
        let entries = [entry(1, "mpv", 50, false)];
        r.render(&entries, Some(0), 40);
        let before = r.writer().len();
        r.render(&entries, Some(0), 40);
        let written = &r.writer()[before..];
        assert_eq!(written, b"\x1b[0m");
    }

    #[test]
    fn resize_clears_and_relays() {
        let mut r = renderer();
        r.render(&[entry(1, "mpv", 100, false)], Some(0), 40);
        r.resize(30, 10);
        assert!(r.last_frame().is_none());
        let before = r.writer().len();
        r.render(&[entry(1, "mpv", 100, false)], Some(0), 30);
        let written = String::from_utf8_lossy(&r.writer()[before..]).into_owned();
        assert!(written.contains("\x1b[2J"));
        let frame = r.last_frame().unwrap();
        assert_eq!(frame.width(), 30);
        assert!(frame.row_text(3).starts_with("      ┌"));
        assert!(frame.row_text(3).ends_with("┐      "));
    }
}
