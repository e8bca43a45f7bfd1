// SPDX-License-Identifier: MIT
//
// Differential redraw — the core of frame rendering performance.
//
// Instead of repainting the screen, the redrawer compares the new frame
// against the last one it rendered and hands the terminal only the cells
// that changed. A keystroke in a word processor typically rewraps one
// paragraph: a handful of rows, and inside each row usually a short
// stretch of cells.
//
// The pipeline per frame:
//
//   1. The view paints the layout into a FrameBuffer.
//   2. Redrawer::render() compares it row by row with the stored frame.
//   3. Unchanged rows are skipped with one slice comparison.
//   4. Changed rows are split into maximal spans of changed cells; only
//      those spans are written.
//   5. The cursor is placed, and the terminal is flushed once.
//
// A frame whose content is identical to the previous one only moves the
// cursor (if it moved at all). The first frame, a resize, or an explicit
// force_redraw() writes every cell.

use std::io;
use std::ops::Range;

use crate::buffer::FrameBuffer;
use crate::cell::Cell;
use crate::terminal::Terminal;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells handed to the terminal.
    pub cells_written: usize,
    /// Cells that matched the previous frame.
    pub cells_skipped: usize,
    /// Contiguous runs of changed cells written.
    pub spans: usize,
    /// Whether the terminal cursor was moved.
    pub cursor_moved: bool,
    /// Whether the frame was written in full (first frame, resize, forced).
    pub full_redraw: bool,
}

impl RenderStats {
    /// Total cells processed (written + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_written + self.cells_skipped
    }
}

// ─── Span detection ─────────────────────────────────────────────────────────

/// Column ranges where `current` differs from `previous`.
///
/// Spans are maximal: two changed cells with no unchanged cell between
/// them are in the same span. A span never starts on a continuation cell;
/// it is widened left to include the wide character that owns it.
#[must_use]
pub fn changed_spans(current: &[Cell], previous: &[Cell]) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = Vec::new();
    let mut start: Option<usize> = None;

    for (x, cell) in current.iter().enumerate() {
        let changed = previous.get(x) != Some(cell);
        match (changed, start) {
            (true, None) => {
                let mut s = x;
                while s > 0 && current[s].is_continuation() {
                    s -= 1;
                }
                // Widening can make this span touch the previous one.
                let merge_with = spans.last().filter(|l| l.end >= s).map(|l| l.start);
                if let Some(merged) = merge_with {
                    spans.pop();
                    start = Some(merged);
                } else {
                    start = Some(s);
                }
            }
            (false, Some(s)) => {
                spans.push(s..x);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..current.len());
    }
    spans
}

// ─── Redrawer ───────────────────────────────────────────────────────────────

/// Differential renderer that writes only changed cells.
///
/// # Usage
///
/// ```
/// use quire_term::buffer::FrameBuffer;
/// use quire_term::cell::Attr;
/// use quire_term::diff::Redrawer;
/// use quire_term::terminal::MemoryTerminal;
///
/// let mut redrawer = Redrawer::new();
/// let mut term = MemoryTerminal::new();
/// let mut frame = FrameBuffer::new(20, 2);
///
/// redrawer.render(&frame, None, &mut term).unwrap();
/// frame.paint_text(0, 1, "hi", Attr::empty());
/// let stats = redrawer.render(&frame, None, &mut term).unwrap();
/// assert_eq!(stats.cells_written, 2);
/// ```
#[derive(Debug, Default)]
pub struct Redrawer {
    previous: Option<FrameBuffer>,
    cursor: Option<(u16, u16)>,
}

impl Redrawer {
    /// Create a redrawer with no previous frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: None,
            cursor: None,
        }
    }

    /// Diff `current` against the last rendered frame and write the changes.
    ///
    /// `cursor` is the `(row, col)` the terminal cursor should end on.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal fails to flush.
    pub fn render(
        &mut self,
        current: &FrameBuffer,
        cursor: Option<(u16, u16)>,
        term: &mut impl Terminal,
    ) -> io::Result<RenderStats> {
        let mut stats = RenderStats::default();

        let full_redraw = !self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.width() == current.width() && prev.height() == current.height());
        stats.full_redraw = full_redraw;

        for y in 0..current.height() {
            let Some(row) = current.row(y) else { break };

            let prev_row = if full_redraw {
                None
            } else {
                self.previous.as_ref().and_then(|p| p.row(y))
            };

            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }

            let spans = match prev_row {
                Some(prev) => changed_spans(row, prev),
                None => vec![0..row.len()],
            };

            let mut written = 0;
            for span in &spans {
                for x in span.clone() {
                    // x < width, which is a u16.
                    #[allow(clippy::cast_possible_truncation)]
                    let col = x as u16;
                    term.write_cell(y, col, row[x]);
                }
                written += span.len();
            }
            stats.spans += spans.len();
            stats.cells_written += written;
            stats.cells_skipped += row.len() - written;
        }

        // Content writes leave the physical cursor wherever the last cell
        // was; reposition whenever anything was written or the target moved.
        if let Some((row, col)) = cursor {
            if stats.cells_written > 0 || self.cursor != cursor {
                term.move_cursor(row, col);
                stats.cursor_moved = true;
            }
        }
        self.cursor = cursor;

        log::trace!(
            "redraw: {} cells in {} spans, {} skipped",
            stats.cells_written,
            stats.spans,
            stats.cells_skipped
        );

        self.store_frame(current);
        if stats.cells_written > 0 || stats.cursor_moved {
            term.flush()?;
        }
        Ok(stats)
    }

    /// Discard the previous frame so the next render writes everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// The last frame rendered, if any.
    #[must_use]
    pub const fn previous(&self) -> Option<&FrameBuffer> {
        self.previous.as_ref()
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attr;
    use crate::terminal::{MemoryTerminal, TermOp};
    use pretty_assertions::assert_eq;

    fn cells(text: &str) -> Vec<Cell> {
        text.chars().map(Cell::new).collect()
    }

    // ── Span detection ──────────────────────────────────────────────────

    #[test]
    fn identical_rows_have_no_spans() {
        assert!(changed_spans(&cells("abcd"), &cells("abcd")).is_empty());
    }

    #[test]
    fn single_change_is_one_span() {
        assert_eq!(changed_spans(&cells("abXd"), &cells("abcd")), vec![2..3]);
    }

    #[test]
    fn separate_changes_are_separate_spans() {
        assert_eq!(changed_spans(&cells("Xbcd Y"), &cells("abcd e")), vec![0..1, 5..6]);
    }

    #[test]
    fn adjacent_changes_merge() {
        assert_eq!(changed_spans(&cells("aXYZe"), &cells("abcde")), vec![1..4]);
    }

    #[test]
    fn span_widens_to_owner_of_continuation() {
        let mut prev = FrameBuffer::new(4, 1);
        prev.paint_text(0, 0, "中", Attr::empty());
        let mut cur = prev.clone();
        cur.add_attrs(1, 0, 1, Attr::INVERSE);
        let spans = changed_spans(cur.row(0).unwrap(), prev.row(0).unwrap());
        assert_eq!(spans, vec![0..2]);
    }

    // ── Rendering ───────────────────────────────────────────────────────

    #[test]
    fn first_render_writes_every_cell() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let frame = FrameBuffer::new(10, 5);

        let stats = r.render(&frame, None, &mut term).unwrap();
        assert!(stats.full_redraw);
        assert_eq!(stats.cells_written, 50);
        assert_eq!(stats.spans, 5);
        assert_eq!(term.cells_written(), 50);
    }

    #[test]
    fn identical_frame_writes_nothing() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let frame = FrameBuffer::new(10, 5);

        r.render(&frame, None, &mut term).unwrap();
        term.take();

        let stats = r.render(&frame, None, &mut term).unwrap();
        assert_eq!(stats.cells_written, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert!(term.ops().is_empty());
    }

    #[test]
    fn changed_cells_only_are_written() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let mut frame = FrameBuffer::new(10, 3);
        frame.paint_text(0, 1, "hello", Attr::empty());
        r.render(&frame, None, &mut term).unwrap();
        term.take();

        frame.paint_text(0, 1, "helps", Attr::empty());
        let stats = r.render(&frame, None, &mut term).unwrap();

        assert_eq!(stats.cells_written, 2);
        assert_eq!(stats.spans, 1);
        assert_eq!(
            term.ops(),
            &[
                TermOp::Cell { row: 1, col: 3, cell: Cell::new('p') },
                TermOp::Cell { row: 1, col: 4, cell: Cell::new('s') },
                TermOp::Flush,
            ]
        );
    }

    #[test]
    fn two_separate_changes_on_one_row_are_two_spans() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let mut frame = FrameBuffer::new(10, 1);
        frame.paint_text(0, 0, "abcdefghij", Attr::empty());
        r.render(&frame, None, &mut term).unwrap();
        term.take();

        frame.set(1, 0, Cell::new('X'));
        frame.set(8, 0, Cell::new('Y'));
        let stats = r.render(&frame, None, &mut term).unwrap();
        assert_eq!(stats.spans, 2);
        assert_eq!(stats.cells_written, 2);
    }

    #[test]
    fn cursor_only_change_moves_cursor_without_cells() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let frame = FrameBuffer::new(10, 3);
        r.render(&frame, Some((0, 0)), &mut term).unwrap();
        term.take();

        let stats = r.render(&frame, Some((2, 4)), &mut term).unwrap();
        assert_eq!(stats.cells_written, 0);
        assert!(stats.cursor_moved);
        assert_eq!(term.ops(), &[TermOp::Cursor { row: 2, col: 4 }, TermOp::Flush]);
    }

    #[test]
    fn unchanged_cursor_and_content_is_silent() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let frame = FrameBuffer::new(4, 1);
        r.render(&frame, Some((0, 1)), &mut term).unwrap();
        term.take();

        let stats = r.render(&frame, Some((0, 1)), &mut term).unwrap();
        assert!(!stats.cursor_moved);
        assert!(term.ops().is_empty());
    }

    #[test]
    fn resize_triggers_full_redraw() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        r.render(&FrameBuffer::new(4, 2), None, &mut term).unwrap();

        let stats = r.render(&FrameBuffer::new(6, 2), None, &mut term).unwrap();
        assert!(stats.full_redraw);
        assert_eq!(stats.cells_written, 12);
    }

    #[test]
    fn force_redraw_writes_everything_again() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let frame = FrameBuffer::new(3, 3);
        r.render(&frame, None, &mut term).unwrap();
        r.force_redraw();
        let stats = r.render(&frame, None, &mut term).unwrap();
        assert_eq!(stats.cells_written, 9);
    }

    #[test]
    fn reverting_a_change_writes_it_back() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let mut frame = FrameBuffer::new(5, 1);
        r.render(&frame, None, &mut term).unwrap();

        frame.set(0, 0, Cell::new('!'));
        assert_eq!(r.render(&frame, None, &mut term).unwrap().cells_written, 1);
        frame.set(0, 0, Cell::EMPTY);
        assert_eq!(r.render(&frame, None, &mut term).unwrap().cells_written, 1);
        assert_eq!(r.render(&frame, None, &mut term).unwrap().cells_written, 0);
    }

    #[test]
    fn zero_size_frame_is_silent() {
        let mut r = Redrawer::new();
        let mut term = MemoryTerminal::new();
        let stats = r.render(&FrameBuffer::new(0, 0), None, &mut term).unwrap();
        assert_eq!(stats.total_cells(), 0);
        assert!(term.ops().is_empty());
    }
}
