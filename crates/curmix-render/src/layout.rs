#![forbid(unsafe_code)]

//! Row layout and position-keyed render slots.
//!
//! Row `i` occupies `BOX_HEIGHT` lines at `y = VPAD + i * ROW_PITCH`,
//! starting `HPAD` columns from the left edge and ending `HPAD` columns
//! from the right edge.
//!
//! Slots are keyed by position, not by stream id: slot 2 draws whichever
//! stream is third in the list this pass. A slot is created the first time
//! its index is populated and released when the list shrinks below it.

use tracing::trace;

use crate::geometry::Rect;

/// Horizontal padding from each screen edge.
pub const HPAD: u16 = 6;

/// Vertical padding above the first row (and between rows).
pub const VPAD: u16 = 3;

/// Height of one box: border, bar, border.
pub const BOX_HEIGHT: u16 = 3;

/// Distance between the tops of consecutive rows.
pub const ROW_PITCH: u16 = VPAD + BOX_HEIGHT;

/// Area of row `index` on a terminal `width` columns wide.
///
/// Saturates rather than overflowing for absurd indices.
pub fn row_area(index: usize, width: u16) -> Rect {
    let offset = u16::try_from(index)
        .ok()
        .and_then(|i| i.checked_mul(ROW_PITCH))
        .unwrap_or(u16::MAX);
    Rect::new(
        HPAD,
        VPAD.saturating_add(offset),
        width.saturating_sub(2 * HPAD),
        BOX_HEIGHT,
    )
}

/// Where the empty-list placeholder goes.
pub fn placeholder_area(width: u16) -> Rect {
    Rect::new(HPAD, VPAD, width.saturating_sub(HPAD), 1)
}

/// One drawable surface for one row position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSlot {
    area: Rect,
}

impl RenderSlot {
    fn new(index: usize, width: u16) -> Self {
        Self {
            area: row_area(index, width),
        }
    }

    /// Screen area of this slot.
    #[inline]
    pub const fn area(&self) -> Rect {
        self.area
    }
}

/// The live slots, one per populated row.
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    slots: Vec<RenderSlot>,
    width: u16,
}

impl SlotTable {
    /// Empty table for a terminal `width` columns wide.
    pub fn new(width: u16) -> Self {
        Self {
            slots: Vec::new(),
            width,
        }
    }

    /// Create slots up to `count` and release any beyond it.
    pub fn sync(&mut self, count: usize) -> &[RenderSlot] {
        if count < self.slots.len() {
            trace!(from = self.slots.len(), to = count, "render slots released");
            self.slots.truncate(count);
        }
        while self.slots.len() < count {
            let index = self.slots.len();
            trace!(index, "render slot created");
            self.slots.push(RenderSlot::new(index, self.width));
        }
        &self.slots
    }

    /// Re-lay every live slot for a new terminal width.
    pub fn resize(&mut self, width: u16) {
        self.width = width;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            *slot = RenderSlot::new(index, width);
        }
    }

    /// Number of live slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Width the slots are laid out for.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }
}
