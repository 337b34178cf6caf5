#![forbid(unsafe_code)]

//! Diff computation between buffers.
//!
//! Row-major scan: cells are stored row by row, so comparing in `(y, x)`
//! order walks memory sequentially and yields changes already sorted for run
//! coalescing.
//!
//! ```
//! use curmix_render::buffer::Buffer;
//! use curmix_render::cell::Cell;
//! use curmix_render::diff::BufferDiff;
//!
//! let old = Buffer::new(80, 24);
//! let mut new = Buffer::new(80, 24);
//! new.set(5, 5, Cell::from_char('X'));
//! new.set(6, 5, Cell::from_char('Y'));
//!
//! let diff = BufferDiff::compute(&old, &new);
//! assert_eq!(diff.len(), 2);
//! assert_eq!(diff.runs().len(), 1);
//! ```

use crate::buffer::Buffer;

/// A contiguous run of changed cells on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    /// Row index.
    pub y: u16,
    /// Start column (inclusive).
    pub x0: u16,
    /// End column (inclusive).
    pub x1: u16,
}

impl ChangeRun {
    /// Create a new change run.
    #[inline]
    pub const fn new(y: u16, x0: u16, x1: u16) -> Self {
        debug_assert!(x0 <= x1);
        Self { y, x0, x1 }
    }

    /// Number of cells in this run.
    #[inline]
    pub const fn len(&self) -> u16 {
        self.x1 - self.x0 + 1
    }
}

/// Changed cell positions between two equally-sized buffers.
#[derive(Debug, Clone, Default)]
pub struct BufferDiff {
    changes: Vec<(u16, u16)>,
}

impl BufferDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every cell of `buffer`, as if diffed against an unknown screen.
    pub fn full(buffer: &Buffer) -> Self {
        let mut changes = Vec::with_capacity(buffer.width() as usize * buffer.height() as usize);
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                changes.push((x, y));
            }
        }
        Self { changes }
    }

    /// Compute the diff between two buffers.
    ///
    /// Both buffers must have the same dimensions.
    pub fn compute(old: &Buffer, new: &Buffer) -> Self {
        debug_assert_eq!(old.width(), new.width(), "buffer widths must match");
        debug_assert_eq!(old.height(), new.height(), "buffer heights must match");

        let width = old.width().min(new.width());
        let height = old.height().min(new.height());
        let mut changes = Vec::with_capacity((width as usize * height as usize) / 20);

        for y in 0..height {
            let (a, b) = (old.row_cells(y), new.row_cells(y));
            for x in 0..width {
                if a[x as usize] != b[x as usize] {
                    changes.push((x, y));
                }
            }
        }

        tracing::trace!(changes = changes.len(), "diff computed");
        Self { changes }
    }

    /// Number of changed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if no cells changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed positions as `(x, y)`.
    #[inline]
    pub fn changes(&self) -> &[(u16, u16)] {
        &self.changes
    }

    /// Coalesce consecutive columns on the same row into runs.
    pub fn runs(&self) -> Vec<ChangeRun> {
        let mut runs = Vec::new();
        let mut i = 0;
        let sorted = &self.changes;

        while i < sorted.len() {
            let (x0, y) = sorted[i];
            let mut x1 = x0;
            i += 1;

            while i < sorted.len() {
                let (x, yy) = sorted[i];
                if yy != y || x != x1 + 1 {
                    break;
                }
                x1 = x;
                i += 1;
            }

            runs.push(ChangeRun::new(y, x0, x1));
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, Color, Style};

    #[test]
    fn identical_buffers_have_empty_diff() {
        let diff = BufferDiff::compute(&Buffer::new(10, 10), &Buffer::new(10, 10));
        assert!(diff.is_empty());
        assert!(diff.runs().is_empty());
    }

    #[test]
    fn style_only_change_is_detected() {
        let mut old = Buffer::new(5, 1);
        let mut new = Buffer::new(5, 1);
        old.set(1, 0, Cell::from_char('a'));
        new.set(1, 0, Cell::from_char('a').with_style(Style::new().fg(Color::Blue)));
        assert_eq!(BufferDiff::compute(&old, &new).changes(), &[(1, 0)]);
    }

    #[test]
    fn runs_split_on_gaps_and_rows() {
        let old = Buffer::new(10, 3);
        let mut new = Buffer::new(10, 3);
        for x in [1, 2, 3, 6] {
            new.set(x, 0, Cell::from_char('x'));
        }
        new.set(0, 2, Cell::from_char('y'));

        let runs = BufferDiff::compute(&old, &new).runs();
        assert_eq!(
            runs,
            vec![
                ChangeRun::new(0, 1, 3),
                ChangeRun::new(0, 6, 6),
                ChangeRun::new(2, 0, 0),
            ]
        );
        assert_eq!(runs[0].len(), 3);
    }

    #[test]
    fn full_diff_covers_every_row() {
        let buf = Buffer::new(4, 3);
        let runs = BufferDiff::full(&buf).runs();
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.x0 == 0 && r.x1 == 3));
    }
}
