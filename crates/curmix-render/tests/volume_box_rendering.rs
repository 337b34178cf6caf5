//! End-to-end rendering tests: stream entries in, frame contents out.
//!
//! 1. Row layout follows the fixed pitch and padding.
//! 2. Filled bar length matches the rounded volume ratio for any volume.
//! 3. Muted bars use one style; unmuted bars ramp through the bands.
//! 4. Exactly one title is highlighted, and only when a row is selected.
//! 5. Rendering is idempotent.

use curmix_core::registry::{StreamEntry, StreamId};
use curmix_core::view::StreamView;
use curmix_core::volume::Volume;
use curmix_render::buffer::Buffer;
use curmix_render::cell::{Color, StyleFlags};
use curmix_render::layout::{HPAD, ROW_PITCH, VPAD};
use curmix_render::renderer::TerminalRenderer;
use curmix_render::widgets::volume_box::BAR_GLYPH;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const WIDTH: u16 = 60;
const HEIGHT: u16 = 30;

fn entry(id: u32, pct: u32, muted: bool) -> StreamEntry {
    StreamEntry::new(StreamId(id), Some(&format!("app{id}")), Volume::from_percent(pct), muted)
}

fn draw(entries: &[StreamEntry], selected: Option<usize>) -> Buffer {
    let mut renderer = TerminalRenderer::new(Vec::new(), WIDTH, HEIGHT, true);
    renderer.render(entries, selected, WIDTH);
    renderer.last_frame().cloned().expect("frame drawn")
}

fn bar_row(index: usize) -> u16 {
    VPAD + index as u16 * ROW_PITCH + 1
}

fn filled(frame: &Buffer, index: usize) -> usize {
    frame
        .row_text(bar_row(index))
        .chars()
        .filter(|&c| c == BAR_GLYPH)
        .count()
}

fn inner_width() -> u16 {
    WIDTH - 2 * HPAD - 2
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Layout
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn rows_are_stacked_with_padding() {
    let frame = draw(&[entry(1, 50, false), entry(2, 50, false), entry(3, 50, false)], Some(0));
    for index in 0..3 {
        let top = VPAD + index as u16 * ROW_PITCH;
        let row = frame.row_text(top);
        assert_eq!(&row[..HPAD as usize], "      ");
        assert!(row[HPAD as usize..].starts_with('┌'), "row {index}: {row:?}");
        assert!(frame.row_text(top + 2).contains('└'));
    }
    // Gap rows between boxes are blank.
    assert_eq!(frame.row_text(VPAD + 3).trim(), "");
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Bar length
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bar_length_tracks_volume(raw in 0u32..=0x3_0000) {
        let volume = Volume(raw);
        let e = StreamEntry::new(StreamId(1), Some("x"), volume, false);
        let frame = draw(&[e], Some(0));
        let inner = f64::from(inner_width());
        let expected = (volume.ratio() * inner).round().min(inner) as usize;
        prop_assert_eq!(filled(&frame, 0), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Bar styling
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn muted_bar_is_bold_green_on_default() {
    let frame = draw(&[entry(1, 100, true)], None);
    let y = bar_row(0);
    for x in HPAD + 1..HPAD + 1 + inner_width() {
        let cell = frame.get(x, y).expect("in bounds");
        assert_eq!(cell.fg, Color::Green);
        assert_eq!(cell.bg, Color::Default);
        assert!(cell.flags.contains(StyleFlags::BOLD));
    }
}

#[test]
fn full_bar_ramps_green_to_red() {
    let frame = draw(&[entry(1, 100, false)], None);
    let y = bar_row(0);
    let first = frame.get(HPAD + 1, y).expect("first column");
    let last = frame.get(HPAD + inner_width(), y).expect("last column");
    assert_eq!((first.fg, first.bg), (Color::Green, Color::Green));
    assert_eq!((last.fg, last.bg), (Color::Red, Color::Red));
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Selection
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn only_selected_title_is_blue() {
    let entries = [entry(1, 50, false), entry(2, 50, false)];
    let title_x = HPAD + 2;
    let frame = draw(&entries, Some(1));
    assert_eq!(frame.get(title_x, VPAD).map(|c| c.fg), Some(Color::Default));
    assert_eq!(frame.get(title_x, VPAD + ROW_PITCH).map(|c| c.fg), Some(Color::Blue));

    let frame = draw(&entries, None);
    assert_eq!(frame.get(title_x, VPAD + ROW_PITCH).map(|c| c.fg), Some(Color::Default));
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Idempotence
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn same_input_same_frame() {
    let entries = [entry(1, 30, false), entry(2, 80, true)];
    let mut renderer = TerminalRenderer::new(Vec::new(), WIDTH, HEIGHT, false);
    renderer.render(&entries, Some(0), WIDTH);
    let first = renderer.last_frame().cloned();
    renderer.render(&entries, Some(0), WIDTH);
    assert_eq!(renderer.last_frame().cloned(), first);
}

#[test]
fn reused_slot_shows_new_occupant_only() {
    let mut renderer = TerminalRenderer::new(Vec::new(), WIDTH, HEIGHT, false);
    renderer.render(&[StreamEntry::new(StreamId(1), Some("a-long-stream-name"), Volume::NORMAL, false)], Some(0), WIDTH);
    renderer.render(&[StreamEntry::new(StreamId(2), Some("mpv"), Volume::MUTED, false)], Some(0), WIDTH);
    let frame = renderer.last_frame().expect("frame");
    let top = frame.row_text(VPAD);
    assert!(top.contains("mpv"));
    assert!(!top.contains("long"));
    assert_eq!(filled(frame, 0), 0);
}
