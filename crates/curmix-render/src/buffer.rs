#![forbid(unsafe_code)]

//! Off-screen cell grid.
//!
//! Cells are stored in row-major order: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. Width and height never change after creation
//! 3. A wide head cell is always followed by a continuation cell inside the
//!    same row, or not written at all

use unicode_segmentation::UnicodeSegmentation;

use crate::cell::{Cell, CellContent, Style};
use crate::geometry::Rect;

/// A 2D grid of terminal cells.
///
/// # Example
///
/// ```
/// use curmix_render::buffer::Buffer;
/// use curmix_render::cell::Cell;
///
/// let mut buffer = Buffer::new(80, 24);
/// buffer.set(0, 0, Cell::from_char('H'));
/// assert_eq!(buffer.get(0, 0), Some(&Cell::from_char('H')));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a blank buffer. Zero dimensions are raised to 1.
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    /// Buffer width in cells.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Bounding rect of the entire buffer.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Cell at (x, y), or `None` out of bounds.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Cell at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get_unchecked(&self, x: u16, y: u16) -> &Cell {
        debug_assert!(x < self.width && y < self.height);
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Write `cell` at (x, y).
    ///
    /// Out-of-bounds writes are ignored. A wide cell that does not fit in the
    /// row is not written at all; otherwise its continuation cell is set.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let width = cell.content.width();
        if width > 1 && u32::from(x) + width as u32 > u32::from(self.width) {
            return;
        }
        let Some(idx) = self.index(x, y) else {
            return;
        };
        self.cells[idx] = cell;
        for i in 1..width {
            self.cells[idx + i] = Cell::CONTINUATION;
        }
    }

    /// Fill `rect` (clipped to the buffer) with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = self.bounds().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Write `text` starting at (x, y), stopping before column `max_x`.
    ///
    /// Text is split at grapheme boundaries; a grapheme that would cross
    /// `max_x` ends the write. Returns the column after the last grapheme
    /// written.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width);
        let mut col = x;
        for grapheme in text.graphemes(true) {
            let content = CellContent::from_grapheme(grapheme);
            let w = content.width();
            if w == 0 {
                continue;
            }
            if u32::from(col) + w as u32 > u32::from(max_x) {
                break;
            }
            self.set(
                col,
                y,
                Cell {
                    content,
                    ..Cell::BLANK
                }
                .with_style(style),
            );
            col += w as u16;
        }
        col
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Cells of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_cells(&self, y: u16) -> &[Cell] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Row `y` as plain text (continuations skipped, blanks as spaces).
    pub fn row_text(&self, y: u16) -> String {
        let mut scratch = [0u8; 4];
        let mut out = String::with_capacity(self.width as usize);
        for cell in self.row_cells(y) {
            if let Some(s) = cell.content.as_str(&mut scratch) {
                out.push_str(s);
            }
        }
        out
    }
}
