#![forbid(unsafe_code)]

//! Cell types.
//!
//! A [`Cell`] is one terminal column: its content plus palette colors and
//! style flags. Cells are `Copy`; grapheme clusters up to
//! [`CellContent::INLINE_CAPACITY`] bytes are stored inline so the buffer
//! never allocates per cell.
//!
//! Wide content (display width 2) occupies its head cell plus one
//! [`Cell::CONTINUATION`] cell that the presenter skips.

use unicode_width::UnicodeWidthStr;

/// Terminal palette colors.
///
/// Only the eight base colors are used: the bars and titles must look the
/// same on any terminal, including ones without truecolor support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's own foreground or background.
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// Palette index (0..=7) for SGR 30-37 / 40-47, or `None` for the default.
    #[inline]
    pub const fn index(self) -> Option<u8> {
        match self {
            Self::Default => None,
            Self::Black => Some(0),
            Self::Red => Some(1),
            Self::Green => Some(2),
            Self::Yellow => Some(3),
            Self::Blue => Some(4),
            Self::Magenta => Some(5),
            Self::Cyan => Some(6),
            Self::White => Some(7),
        }
    }
}

bitflags::bitflags! {
    /// Cell style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD      = 0b0000_0001;
        /// Dim / decreased intensity.
        const DIM       = 0b0000_0010;
        /// Underlined text.
        const UNDERLINE = 0b0000_0100;
        /// Reverse video (swap fg/bg).
        const REVERSE   = 0b0000_1000;
    }
}

impl Default for StyleFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Foreground, background, and flags applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub flags: StyleFlags,
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Style {
    /// Terminal defaults, no flags.
    pub const fn new() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            flags: StyleFlags::empty(),
        }
    }

    /// Set the foreground.
    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    /// Set the background.
    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Add bold.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.flags = self.flags.union(StyleFlags::BOLD);
        self
    }
}

/// What a cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellContent {
    /// Nothing drawn; emitted as a space.
    #[default]
    Empty,
    /// A single scalar value.
    Char(char),
    /// A multi-codepoint grapheme cluster stored inline as UTF-8.
    Cluster {
        bytes: [u8; CellContent::INLINE_CAPACITY],
        len: u8,
        width: u8,
    },
    /// Second column of a wide head cell.
    Continuation,
}

impl CellContent {
    /// Longest cluster stored inline, in bytes.
    pub const INLINE_CAPACITY: usize = 16;

    /// Content for one grapheme cluster.
    ///
    /// Clusters longer than [`Self::INLINE_CAPACITY`] bytes degrade to their
    /// first scalar value.
    pub fn from_grapheme(grapheme: &str) -> Self {
        let mut chars = grapheme.chars();
        let Some(first) = chars.next() else {
            return Self::Empty;
        };
        if chars.next().is_none() {
            return Self::Char(first);
        }
        if grapheme.len() > Self::INLINE_CAPACITY {
            return Self::Char(first);
        }
        let mut bytes = [0u8; Self::INLINE_CAPACITY];
        bytes[..grapheme.len()].copy_from_slice(grapheme.as_bytes());
        Self::Cluster {
            bytes,
            len: grapheme.len() as u8,
            width: grapheme.width().min(2) as u8,
        }
    }

    /// Display width in columns. Empty cells count as one column.
    pub fn width(&self) -> usize {
        match self {
            Self::Empty => 1,
            Self::Char(c) => unicode_width::UnicodeWidthChar::width(*c).unwrap_or(0),
            Self::Cluster { width, .. } => usize::from(*width),
            Self::Continuation => 0,
        }
    }

    /// The text to emit, or `None` for continuation cells.
    pub fn as_str<'a>(&'a self, scratch: &'a mut [u8; 4]) -> Option<&'a str> {
        match self {
            Self::Empty => Some(" "),
            Self::Char(c) => Some(c.encode_utf8(scratch)),
            Self::Cluster { bytes, len, .. } => {
                std::str::from_utf8(&bytes[..usize::from(*len)]).ok()
            }
            Self::Continuation => None,
        }
    }
}

/// One terminal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub content: CellContent,
    pub fg: Color,
    pub bg: Color,
    pub flags: StyleFlags,
}

impl Cell {
    /// Tail of a wide character.
    pub const CONTINUATION: Self = Self {
        content: CellContent::Continuation,
        fg: Color::Default,
        bg: Color::Default,
        flags: StyleFlags::empty(),
    };

    /// A blank cell in terminal defaults.
    pub const BLANK: Self = Self {
        content: CellContent::Empty,
        fg: Color::Default,
        bg: Color::Default,
        flags: StyleFlags::empty(),
    };

    /// Create a cell holding `c` in terminal defaults.
    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self {
            content: CellContent::Char(c),
            ..Self::BLANK
        }
    }

    /// Replace colors and flags with `style`.
    #[inline]
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.fg = style.fg;
        self.bg = style.bg;
        self.flags = style.flags;
        self
    }

    /// Colors and flags of this cell.
    #[inline]
    pub const fn style(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            flags: self.flags,
        }
    }

    /// Check if this is a continuation cell.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        matches!(self.content, CellContent::Continuation)
    }
}
