#![forbid(unsafe_code)]

//! The empty-list message.

use super::Widget;
use crate::buffer::Buffer;
use crate::cell::Style;
use crate::geometry::Rect;

/// Text shown when no streams exist.
pub const NO_INPUTS: &str = "No Inputs found";

/// A single line of literal text at the top-left of its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    text: &'a str,
}

impl Default for Placeholder<'_> {
    fn default() -> Self {
        Self { text: NO_INPUTS }
    }
}

impl<'a> Placeholder<'a> {
    /// Placeholder with custom text.
    pub const fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl Widget for Placeholder<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        buf.set_string(area.x, area.y, self.text, Style::new(), area.right());
    }
}
