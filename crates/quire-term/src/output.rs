// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer — accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() syscall.
//
//   CellWriter — tracks the terminal's current state (cursor position and
//   attributes) and skips redundant escape sequences. Consecutive cells on
//   a row need no cursor move, and cells sharing attributes need no SGR.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` call.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write a Unicode codepoint as UTF-8.
    ///
    /// Invalid codepoints (including 0, the continuation marker) produce `?`.
    pub fn write_codepoint(&mut self, cp: u32) {
        match char::from_u32(cp).filter(|&ch| ch != '\0') {
            Some(ch) => {
                let mut enc = [0u8; 4];
                self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w` and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens in flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell renderer that tracks terminal state to skip redundant escapes.
///
/// - **Cursor**: skipped when the next cell is at `(last_x + 1, last_y)`,
///   since the terminal auto-advances after character output.
/// - **Attributes**: when the new set only adds flags, just the added codes
///   are emitted; dropping any flag resets (SGR 0) and re-emits.
/// - **Wide chars**: continuation cells produce no output when preceded by
///   their wide char start.
#[allow(clippy::struct_field_names)]
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_attrs: Attr,
}

impl CellWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_attrs: Attr::empty(),
        }
    }

    /// Reset all tracked state. Call after a terminal reset or screen clear.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Forget the cursor position (after an explicit cursor move).
    pub const fn invalidate_cursor(&mut self) {
        self.last_x = -1;
        self.last_y = -1;
    }

    /// Render a single cell, emitting only the escape sequences needed.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        if cell.is_continuation() {
            if xi > 0 && self.last_x == xi - 1 && self.last_y == yi {
                self.last_x = xi;
                return;
            }
            self.apply_attrs(out, cell.attrs);
            out.buf.push(b' ');
            self.last_x = xi;
            self.last_y = yi;
            return;
        }

        self.apply_attrs(out, cell.attrs);
        out.write_codepoint(cell.ch);

        self.last_x = xi;
        self.last_y = yi;
    }

    fn apply_attrs(&mut self, out: &mut OutputBuffer, attrs: Attr) {
        if attrs == self.last_attrs {
            return;
        }
        if attrs.contains(self.last_attrs) {
            ansi::attrs(out, attrs - self.last_attrs).ok();
        } else {
            ansi::reset(out).ok();
            ansi::attrs(out, attrs).ok();
        }
        self.last_attrs = attrs;
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_buffer_write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn output_buffer_write_codepoint() {
        let mut buf = OutputBuffer::new();
        buf.write_codepoint(u32::from('A'));
        buf.write_codepoint(u32::from('中'));
        buf.write_codepoint(0);
        buf.write_codepoint(0xD800);
        assert_eq!(buf.as_bytes(), "A中??".as_bytes());
    }

    #[test]
    fn output_buffer_flush_to_clears() {
        let mut buf = OutputBuffer::new();
        write!(buf, "frame").unwrap();
        let mut dest = Vec::new();
        buf.flush_to(&mut dest).unwrap();
        assert_eq!(dest, b"frame");
        assert!(buf.is_empty());
    }

    fn render_seq(cells: &[(u16, u16, Cell)]) -> String {
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        for &(x, y, ref cell) in cells {
            writer.render_cell(&mut out, x, y, cell);
        }
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn first_cell_emits_cursor_move() {
        let output = render_seq(&[(5, 3, Cell::new('A'))]);
        assert_eq!(output, "\x1b[4;6HA");
    }

    #[test]
    fn sequential_cells_skip_cursor_move() {
        let output = render_seq(&[
            (0, 0, Cell::new('a')),
            (1, 0, Cell::new('b')),
            (2, 0, Cell::new('c')),
        ]);
        assert_eq!(output, "\x1b[1;1Habc");
    }

    #[test]
    fn gap_emits_new_cursor_move() {
        let output = render_seq(&[(0, 0, Cell::new('a')), (5, 0, Cell::new('b'))]);
        assert_eq!(output, "\x1b[1;1Ha\x1b[1;6Hb");
    }

    #[test]
    fn same_attrs_emitted_once() {
        let output = render_seq(&[
            (0, 0, Cell::styled('a', Attr::BOLD)),
            (1, 0, Cell::styled('b', Attr::BOLD)),
        ]);
        assert_eq!(output, "\x1b[1;1H\x1b[1mab");
    }

    #[test]
    fn attr_change_resets_first() {
        let output = render_seq(&[
            (0, 0, Cell::styled('a', Attr::BOLD)),
            (1, 0, Cell::new('b')),
        ]);
        assert_eq!(output, "\x1b[1;1H\x1b[1ma\x1b[0mb");
    }

    #[test]
    fn added_attr_emits_only_the_difference() {
        let output = render_seq(&[
            (0, 0, Cell::styled('a', Attr::BOLD)),
            (1, 0, Cell::styled('b', Attr::BOLD | Attr::INVERSE)),
            (2, 0, Cell::styled('c', Attr::INVERSE)),
        ]);
        assert_eq!(output, "\x1b[1;1H\x1b[1ma\x1b[7mb\x1b[0m\x1b[7mc");
    }

    #[test]
    fn continuation_after_wide_char_is_silent() {
        let output = render_seq(&[
            (0, 0, Cell::new('中')),
            (1, 0, Cell::continuation(Attr::empty())),
        ]);
        assert_eq!(output, "\x1b[1;1H中");
    }

    #[test]
    fn orphan_continuation_becomes_space() {
        let output = render_seq(&[(1, 0, Cell::continuation(Attr::empty()))]);
        assert_eq!(output, "\x1b[1;2H ");
    }
}
