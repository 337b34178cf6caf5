#![forbid(unsafe_code)]

//! Titled box with a horizontal volume bar.
//!
//! ```text
//! ┌─mpv──────────────────────────┐
//! │▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒               │
//! └──────────────────────────────┘
//! ```
//!
//! Filled columns are colored by position in five bands (green through
//! red) so the bar signals "getting loud" as it grows. A muted stream's
//! bar is drawn in a single bold green instead.

use curmix_core::volume::Volume;

use super::{BorderSet, Widget, render_border};
use crate::buffer::Buffer;
use crate::cell::{Cell, Color, Style};
use crate::geometry::{Rect, Sides};

/// Glyph used for filled bar columns.
pub const BAR_GLYPH: char = '▒';

/// Column of the top border where the title starts.
pub const TITLE_OFFSET: u16 = 2;

/// Number of severity bands across the bar.
pub const BANDS: usize = 5;

/// (fg, bg) for each severity band, quietest first.
const BAND_COLORS: [(Color, Color); BANDS] = [
    (Color::Green, Color::Green),
    (Color::Green, Color::Yellow),
    (Color::Yellow, Color::Yellow),
    (Color::Yellow, Color::Red),
    (Color::Red, Color::Red),
];

/// Style of every filled column of a muted stream.
pub const MUTED_STYLE: Style = Style::new().fg(Color::Green).bold();

/// Style of the selected stream's title.
pub const SELECTED_TITLE_STYLE: Style = Style::new().fg(Color::Blue);

/// Filled columns for `volume` on a bar `inner` columns wide.
///
/// `round(volume / NORMAL * inner)`, capped at `inner`.
pub fn filled_columns(volume: Volume, inner: u16) -> u16 {
    let filled = (volume.ratio() * f64::from(inner)).round();
    if filled >= f64::from(inner) {
        inner
    } else {
        filled as u16
    }
}

/// Severity band (0-based) of bar column `column` on a bar `inner` wide.
pub fn band(column: u16, inner: u16) -> usize {
    if inner == 0 {
        return 0;
    }
    (usize::from(column) * BANDS / usize::from(inner)).min(BANDS - 1)
}

/// Style of bar column `column`.
pub fn bar_style(column: u16, inner: u16, muted: bool) -> Style {
    if muted {
        return MUTED_STYLE;
    }
    let (fg, bg) = BAND_COLORS[band(column, inner)];
    Style::new().fg(fg).bg(bg)
}

/// One stream's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeBox<'a> {
    name: &'a str,
    volume: Volume,
    muted: bool,
    selected: bool,
}

impl<'a> VolumeBox<'a> {
    /// Box for a stream called `name`.
    pub const fn new(name: &'a str, volume: Volume) -> Self {
        Self {
            name,
            volume,
            muted: false,
            selected: false,
        }
    }

    /// Draw the bar in the muted style.
    #[must_use]
    pub const fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    /// Highlight the title.
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for VolumeBox<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let _span = tracing::trace_span!(
            "widget_render",
            widget = "VolumeBox",
            x = area.x,
            y = area.y,
            w = area.width
        )
        .entered();

        if area.width < 2 || area.height < 2 {
            return;
        }
        // Blank first so a reused slot never shows the previous occupant.
        buf.fill(area, Cell::BLANK);
        render_border(area, buf, BorderSet::PLAIN, Style::new());

        let title_style = if self.selected {
            SELECTED_TITLE_STYLE
        } else {
            Style::new()
        };
        buf.set_string(
            area.x.saturating_add(TITLE_OFFSET),
            area.y,
            self.name,
            title_style,
            area.right().saturating_sub(1),
        );

        let bar = area.inner(Sides::all(1));
        if bar.is_empty() {
            return;
        }
        let filled = filled_columns(self.volume, bar.width);
        for column in 0..filled {
            let cell = Cell::from_char(BAR_GLYPH).with_style(bar_style(column, bar.width, self.muted));
            buf.set(bar.x + column, bar.y, cell);
        }
    }
}
