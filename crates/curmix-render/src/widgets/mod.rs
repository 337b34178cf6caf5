#![forbid(unsafe_code)]

//! Widgets drawn by the terminal renderer.

pub mod placeholder;
pub mod volume_box;

pub use placeholder::Placeholder;
pub use volume_box::VolumeBox;

use crate::buffer::Buffer;
use crate::cell::{Cell, Style};
use crate::geometry::Rect;

/// A renderable component.
///
/// Widgets draw themselves into a [`Buffer`] within the given area and must
/// not touch cells outside it.
pub trait Widget {
    /// Render the widget into the buffer at the given area.
    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// Box-drawing glyphs for a single-line border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSet {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderSet {
    /// Light single-line box drawing.
    pub const PLAIN: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };
}

/// Draw a single-line border around `area`.
pub(crate) fn render_border(area: Rect, buf: &mut Buffer, set: BorderSet, style: Style) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let cell = |c: char| Cell::from_char(c).with_style(style);
    let (right, bottom) = (area.right() - 1, area.bottom() - 1);

    for x in area.x..area.right() {
        buf.set(x, area.y, cell(set.horizontal));
        buf.set(x, bottom, cell(set.horizontal));
    }
    for y in area.y..area.bottom() {
        buf.set(area.x, y, cell(set.vertical));
        buf.set(right, y, cell(set.vertical));
    }
    buf.set(area.x, area.y, cell(set.top_left));
    buf.set(right, area.y, cell(set.top_right));
    buf.set(area.x, bottom, cell(set.bottom_left));
    buf.set(right, bottom, cell(set.bottom_right));
}
