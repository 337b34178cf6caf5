#![forbid(unsafe_code)]

//! Selection cursor.

/// Index of the selected row.
///
/// The cursor is always `< max(count, 1)`. When the registry is empty the
/// stored index is 0 but [`Cursor::selected`] reports no selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    /// Raw index, meaningful only when the registry is non-empty.
    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Selected row for a registry of `count` entries.
    #[inline]
    pub const fn selected(self, count: usize) -> Option<usize> {
        if count == 0 { None } else { Some(self.index) }
    }

    /// Move by `delta` rows, staying within `[0, count)`.
    ///
    /// Moves that would leave the range are ignored rather than clamped, so
    /// repeated presses at an edge never change the cursor.
    pub fn step(&mut self, delta: isize, count: usize) {
        let Some(target) = self.index.checked_add_signed(delta) else {
            return;
        };
        if target < count {
            self.index = target;
        }
    }

    /// Pull the cursor back inside a registry that now holds `count` entries.
    pub fn clamp(&mut self, count: usize) {
        self.index = self.index.min(count.saturating_sub(1));
    }
}
