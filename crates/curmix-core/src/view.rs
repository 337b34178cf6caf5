#![forbid(unsafe_code)]

//! The rendering seam.

use crate::registry::StreamEntry;

/// Draws the stream list.
///
/// Implementations must be idempotent (same arguments, same screen), must not
/// block beyond local drawing work, and absorb their own I/O errors.
pub trait StreamView {
    /// Draw one full pass: a box per entry, or a placeholder when empty.
    fn render(&mut self, entries: &[StreamEntry], selected: Option<usize>, width: u16);

    /// The terminal changed size; every visible row follows the new width.
    fn resize(&mut self, width: u16, height: u16);
}

impl<T: StreamView + ?Sized> StreamView for Box<T> {
    fn render(&mut self, entries: &[StreamEntry], selected: Option<usize>, width: u16) {
        (**self).render(entries, selected, width);
    }

    fn resize(&mut self, width: u16, height: u16) {
        (**self).resize(width, height);
    }
}
