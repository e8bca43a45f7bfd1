// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid the layout engine paints into.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing. A row's cells are
//     contiguous, so the redraw engine compares whole rows with a single
//     slice equality before looking at individual cells.
//
//   - Wide characters (CJK, some emoji) occupy two columns. The first cell
//     holds the codepoint; the second is a continuation cell (ch = 0).
//     Paint methods create continuation cells and clean up wide characters
//     they partially overwrite.
//
// Coordinates are (x = column, y = row), 0-indexed, like every other
// screen-space API in this crate.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::cell::{Attr, Cell};

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A 2D buffer of cells — one frame of the screen.
///
/// # Examples
///
/// ```
/// use quire_term::buffer::FrameBuffer;
/// use quire_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// buf.set(5, 3, Cell::new('X'));
/// assert_eq!(buf.get(5, 3).unwrap().character(), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Buffer width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the buffer.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell reference, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The text of a row with continuation cells skipped and trailing
    /// blanks trimmed. Handy for tests and for plain-text dumps.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let Some(row) = self.row(y) else {
            return String::new();
        };
        let text: String = row.iter().filter_map(|c| c.character()).collect();
        text.trim_end().to_string()
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    /// Clear the buffer to empty cells.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the buffer, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy all cells from another buffer of the same size.
    ///
    /// Falls back to a full clone when the dimensions differ.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            *self = other.clone();
        }
    }

    // ─── Direct Cell Access ──────────────────────────────────────────────

    /// Write a cell directly. Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Add attributes to every cell in `[x, x + len)` on row `y`.
    pub fn add_attrs(&mut self, x: u16, y: u16, len: u16, attrs: Attr) {
        if y >= self.height {
            return;
        }
        let end = x.saturating_add(len).min(self.width);
        for col in x..end {
            let idx = self.index(col, y);
            self.cells[idx].attrs |= attrs;
        }
    }

    // ─── Wide Character Cleanup ──────────────────────────────────────────

    /// Break any wide character that touches position `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = u32::from(b' ');
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }

    // ─── Text Painting ──────────────────────────────────────────────────

    /// Paint one character at `(x, y)`, handling wide characters.
    ///
    /// Returns the number of columns consumed (0 for zero-width characters
    /// or out-of-bounds positions).
    pub fn paint_char(&mut self, x: u16, y: u16, ch: char, attrs: Attr) -> u16 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        let char_w = ch.width().unwrap_or(0);
        if char_w == 0 {
            return 0;
        }

        self.break_wide_char_at(x, y);

        // A wide char that doesn't fit becomes a space: half a glyph is
        // garbage in every terminal.
        if char_w == 2 && x + 1 >= self.width {
            let idx = self.index(x, y);
            self.cells[idx] = Cell::styled(' ', attrs);
            return 1;
        }

        let idx = self.index(x, y);
        self.cells[idx] = Cell::styled(ch, attrs);
        if char_w == 2 {
            self.break_wide_char_at(x + 1, y);
            let cont = self.index(x + 1, y);
            self.cells[cont] = Cell::continuation(attrs);
            return 2;
        }
        1
    }

    /// Paint a string left-to-right starting at `(x, y)`.
    ///
    /// Returns the number of columns consumed. Painting stops at the right
    /// edge of the buffer.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, attrs: Attr) -> u16 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            col = col.saturating_add(self.paint_char(col, y, ch, attrs));
        }
        col.saturating_sub(x)
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ───────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// ```
/// use quire_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
///
/// ```
/// use quire_term::buffer::string_width;
///
/// assert_eq!(string_width("hello"), 5);
/// assert_eq!(string_width("a中b"), 4);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.width()
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty() {
        let buf = FrameBuffer::new(10, 3);
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.height(), 3);
        assert!(buf.row(0).unwrap().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn out_of_bounds_access_is_none() {
        let mut buf = FrameBuffer::new(4, 2);
        assert!(buf.get(4, 0).is_none());
        assert!(buf.row(2).is_none());
        assert!(!buf.set(0, 2, Cell::new('x')));
    }

    #[test]
    fn paint_text_returns_columns() {
        let mut buf = FrameBuffer::new(10, 1);
        assert_eq!(buf.paint_text(1, 0, "abc", Attr::BOLD), 3);
        assert_eq!(buf.row_text(0), " abc");
        assert_eq!(buf.get(2, 0).unwrap().attrs, Attr::BOLD);
    }

    #[test]
    fn paint_text_clips_at_right_edge() {
        let mut buf = FrameBuffer::new(4, 1);
        assert_eq!(buf.paint_text(2, 0, "hello", Attr::empty()), 2);
        assert_eq!(buf.row_text(0), "  he");
    }

    #[test]
    fn wide_char_creates_continuation() {
        let mut buf = FrameBuffer::new(4, 1);
        assert_eq!(buf.paint_text(0, 0, "中", Attr::empty()), 2);
        assert!(buf.get(1, 0).unwrap().is_continuation());
        assert_eq!(buf.row_text(0), "中");
    }

    #[test]
    fn wide_char_at_edge_becomes_space() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.paint_text(2, 0, "中", Attr::empty());
        assert_eq!(buf.get(2, 0).unwrap().character(), Some(' '));
    }

    #[test]
    fn overwriting_continuation_breaks_wide_char() {
        let mut buf = FrameBuffer::new(4, 1);
        buf.paint_text(0, 0, "中", Attr::empty());
        buf.paint_char(1, 0, 'x', Attr::empty());
        assert_eq!(buf.get(0, 0).unwrap().character(), Some(' '));
        assert_eq!(buf.get(1, 0).unwrap().character(), Some('x'));
    }

    #[test]
    fn add_attrs_marks_a_span() {
        let mut buf = FrameBuffer::new(6, 1);
        buf.paint_text(0, 0, "abcdef", Attr::empty());
        buf.add_attrs(2, 0, 10, Attr::INVERSE);
        assert!(!buf.get(1, 0).unwrap().attrs.contains(Attr::INVERSE));
        assert!(buf.get(5, 0).unwrap().attrs.contains(Attr::INVERSE));
    }

    #[test]
    fn copy_from_same_size() {
        let mut a = FrameBuffer::new(3, 1);
        let mut b = FrameBuffer::new(3, 1);
        b.paint_text(0, 0, "xyz", Attr::empty());
        a.copy_from(&b);
        assert_eq!(a, b);
    }

    #[test]
    fn copy_from_other_size_clones() {
        let mut a = FrameBuffer::new(3, 1);
        let b = FrameBuffer::new(5, 2);
        a.copy_from(&b);
        assert_eq!(a.width(), 5);
        assert_eq!(a.height(), 2);
    }

    #[test]
    fn resize_clears() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.paint_text(0, 0, "abc", Attr::empty());
        buf.resize(2, 2);
        assert_eq!(buf.row_text(0), "");
        assert_eq!(buf.row_text(1), "");
    }

    #[test]
    fn widths() {
        assert_eq!(char_width('x'), 1);
        assert_eq!(string_width("日本"), 4);
    }
}
