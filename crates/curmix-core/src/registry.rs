#![forbid(unsafe_code)]

//! The stream registry.
//!
//! A bounded, index-addressed table of the streams known from the most
//! recent full rebuild.
//!
//! # Invariants
//!
//! 1. `count() <= capacity()`; appends past capacity are dropped silently
//! 2. No two live entries share a [`StreamId`]
//! 3. Entries keep discovery order within a rebuild
//! 4. Backing storage is kept across rebuilds; only the logical count resets

use std::fmt;

use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::event::StreamInfo;
use crate::volume::Volume;

/// Maximum number of streams tracked at once.
pub const CAPACITY: usize = 64;

/// Maximum display width of a stream name, in terminal columns.
pub const MAX_NAME_WIDTH: usize = 32;

/// Name shown when the server supplies none.
pub const UNKNOWN_NAME: &str = "unknown";

/// Opaque stream handle assigned by the audio server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(pub u32);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One stream as shown in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    /// Server handle, used to address control requests.
    pub id: StreamId,
    /// Name as displayed: never empty, at most [`MAX_NAME_WIDTH`] columns.
    pub display_name: String,
    /// Average volume across channels.
    pub volume: Volume,
    /// Mute flag.
    pub muted: bool,
}

impl StreamEntry {
    /// Create an entry, applying the display-name rules to `name`.
    pub fn new(id: StreamId, name: Option<&str>, volume: Volume, muted: bool) -> Self {
        Self {
            id,
            display_name: display_name(name),
            volume,
            muted,
        }
    }

    /// Build an entry from a query reply.
    pub fn from_info(info: &StreamInfo) -> Self {
        Self::new(info.id, info.name.as_deref(), info.volume, info.muted)
    }
}

/// Normalize a raw name property for display.
///
/// Absent or empty names become [`UNKNOWN_NAME`]; long names are cut at the
/// last grapheme that fits in [`MAX_NAME_WIDTH`] columns.
pub fn display_name(raw: Option<&str>) -> String {
    let raw = raw.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN_NAME);
    let mut out = String::with_capacity(raw.len().min(MAX_NAME_WIDTH * 4));
    let mut width = 0;
    for grapheme in raw.graphemes(true) {
        let w = grapheme.width();
        if width + w > MAX_NAME_WIDTH {
            break;
        }
        width += w;
        out.push_str(grapheme);
    }
    if out.is_empty() {
        // Nothing printable survived (e.g. a single over-wide grapheme).
        out.push_str(UNKNOWN_NAME);
    }
    out
}

/// Bounded table of streams from the latest rebuild.
///
/// # Example
///
/// ```
/// use curmix_core::registry::{StreamEntry, StreamId, StreamRegistry};
/// use curmix_core::volume::Volume;
///
/// let mut registry = StreamRegistry::with_capacity(2);
/// registry.begin_rebuild();
/// registry.append(StreamEntry::new(StreamId(1), Some("mpv"), Volume::NORMAL, false));
/// assert_eq!(registry.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    slots: Vec<StreamEntry>,
    count: usize,
    capacity: usize,
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::with_capacity(CAPACITY)
    }
}

impl StreamRegistry {
    /// Create an empty registry holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            count: 0,
            capacity,
        }
    }

    /// Reset the logical count to zero, keeping backing storage.
    pub fn begin_rebuild(&mut self) {
        trace!(previous = self.count, "registry rebuild started");
        self.count = 0;
    }

    /// Append an entry at the current count.
    ///
    /// A no-op once the registry is full. An entry whose id is already
    /// present replaces the earlier one in place.
    pub fn append(&mut self, entry: StreamEntry) {
        if let Some(existing) = self.position(entry.id) {
            debug!(id = %entry.id, index = existing, "duplicate stream id replaced");
            self.slots[existing] = entry;
            return;
        }
        if self.count >= self.capacity {
            trace!(id = %entry.id, capacity = self.capacity, "registry full, entry dropped");
            return;
        }
        if self.count < self.slots.len() {
            self.slots[self.count] = entry;
        } else {
            self.slots.push(entry);
        }
        self.count += 1;
    }

    /// Entry at `index`, if `index < count()`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&StreamEntry> {
        self.entries().get(index)
    }

    /// Add `delta` to the volume at `index`, clamped into `[min, max]`.
    ///
    /// Returns the updated entry, or `None` if `index` is out of range.
    pub fn update_volume(
        &mut self,
        index: usize,
        delta: i64,
        min: Volume,
        max: Volume,
    ) -> Option<&StreamEntry> {
        let entry = self.slots[..self.count].get_mut(index)?;
        entry.volume = entry.volume.saturating_offset(delta, min, max);
        Some(&*entry)
    }

    /// Set the mute flag at `index`.
    ///
    /// Returns the updated entry, or `None` if `index` is out of range.
    pub fn set_mute(&mut self, index: usize, muted: bool) -> Option<&StreamEntry> {
        let entry = self.slots[..self.count].get_mut(index)?;
        entry.muted = muted;
        Some(&*entry)
    }

    /// Number of live entries.
    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Whether there are no live entries.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of entries.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live entries in discovery order.
    #[inline]
    pub fn entries(&self) -> &[StreamEntry] {
        &self.slots[..self.count]
    }

    /// Index of the live entry with `id`.
    pub fn position(&self, id: StreamId) -> Option<usize> {
        self.entries().iter().position(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, pct: u32) -> StreamEntry {
        StreamEntry::new(StreamId(id), Some("app"), Volume::from_percent(pct), false)
    }

    #[test]
    fn append_then_get() {
        let mut r = StreamRegistry::default();
        r.begin_rebuild();
        r.append(entry(7, 40));
        r.append(entry(9, 60));
        assert_eq!(r.count(), 2);
        assert_eq!(r.get(0).map(|e| e.id), Some(StreamId(7)));
        assert_eq!(r.get(1).map(|e| e.id), Some(StreamId(9)));
        assert!(r.get(2).is_none());
    }

    #[test]
    fn rebuild_hides_previous_entries() {
        let mut r = StreamRegistry::default();
        r.begin_rebuild();
        r.append(entry(1, 10));
        r.append(entry(2, 20));
        r.begin_rebuild();
        assert_eq!(r.count(), 0);
        assert!(r.get(0).is_none());
        r.append(entry(3, 30));
        assert_eq!(r.entries(), &[entry(3, 30)]);
    }

    #[test]
    fn append_past_capacity_is_dropped() {
        let mut r = StreamRegistry::with_capacity(2);
        r.begin_rebuild();
        for id in 0..5 {
            r.append(entry(id, 50));
        }
        assert_eq!(r.count(), 2);
        assert_eq!(r.get(1).map(|e| e.id), Some(StreamId(1)));
    }

    #[test]
    fn duplicate_id_replaces_in_place() {
        let mut r = StreamRegistry::default();
        r.begin_rebuild();
        r.append(entry(1, 10));
        r.append(entry(2, 20));
        r.append(entry(1, 90));
        assert_eq!(r.count(), 2);
        assert_eq!(r.get(0).map(|e| e.volume), Some(Volume::from_percent(90)));
    }

    #[test]
    fn update_volume_clamps() {
        let mut r = StreamRegistry::default();
        r.append(entry(1, 98));
        let e = r
            .update_volume(0, i64::from(Volume::STEP), Volume::MUTED, Volume::NORMAL)
            .cloned();
        assert_eq!(e.map(|e| e.volume), Some(Volume::NORMAL));
        assert!(
            r.update_volume(3, 1, Volume::MUTED, Volume::NORMAL)
                .is_none()
        );
    }

    #[test]
    fn set_mute_out_of_range_is_none() {
        let mut r = StreamRegistry::default();
        assert!(r.set_mute(0, true).is_none());
        r.append(entry(1, 10));
        assert_eq!(r.set_mute(0, true).map(|e| e.muted), Some(true));
    }

    #[test]
    fn stale_slots_are_not_mutable() {
        let mut r = StreamRegistry::default();
        r.append(entry(1, 10));
        r.begin_rebuild();
        assert!(r.set_mute(0, true).is_none());
    }

    #[test]
    fn display_name_fallback_and_truncation() {
        assert_eq!(display_name(None), UNKNOWN_NAME);
        assert_eq!(display_name(Some("")), UNKNOWN_NAME);
        assert_eq!(display_name(Some("firefox")), "firefox");
        let long = "x".repeat(50);
        assert_eq!(display_name(Some(&long)).len(), MAX_NAME_WIDTH);
    }

    #[test]
    fn display_name_respects_wide_graphemes() {
        // 20 double-width characters are 40 columns; only 16 fit.
        let wide = "音".repeat(20);
        let shown = display_name(Some(&wide));
        assert_eq!(shown.chars().count(), 16);
        assert_eq!(shown.width(), 32);
    }
}
