// SPDX-License-Identifier: MIT
//
// The terminal collaborator.
//
// The redraw engine never talks to a tty directly. It calls three methods
// on a `Terminal`: write one cell, move the cursor, flush. Everything that
// makes those calls cheap on a real terminal (escape minimization, a
// single write per frame, synchronized output) lives in `AnsiTerminal`.
// `MemoryTerminal` records the calls instead, for tests and for tools that
// want the grid without a screen.
//
// Safety: the size query uses `unsafe` for ioctl(TIOCGWINSZ) and isatty.
// These are the standard POSIX interfaces; each block is one call.
#![allow(unsafe_code)]

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Cell;
use crate::output::{CellWriter, OutputBuffer};

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The capability the redraw engine renders into.
///
/// Coordinates are 0-indexed `(row, col)`.
pub trait Terminal {
    /// Write one cell (glyph plus attributes) at `(row, col)`.
    fn write_cell(&mut self, row: u16, col: u16, cell: Cell);

    /// Move the visible cursor to `(row, col)` without touching content.
    fn move_cursor(&mut self, row: u16, col: u16);

    /// Make everything written since the last flush visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying device rejects the write.
    fn flush(&mut self) -> io::Result<()>;
}

// ─── AnsiTerminal ───────────────────────────────────────────────────────────

/// A [`Terminal`] that encodes cells as ANSI escape sequences.
///
/// All output accumulates in an [`OutputBuffer`]; `flush` wraps it in
/// synchronized-output markers and writes it to the sink in one call.
pub struct AnsiTerminal<W: Write> {
    sink: W,
    output: OutputBuffer,
    writer: CellWriter,
    bytes_flushed: usize,
}

impl<W: Write> AnsiTerminal<W> {
    /// Wrap a byte sink (usually stdout).
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            bytes_flushed: 0,
        }
    }

    /// Clear the physical screen. The next frame is written onto a blank
    /// terminal, so attribute tracking starts over.
    pub fn clear(&mut self) {
        self.begin_frame();
        ansi::reset(&mut self.output).ok();
        ansi::clear_screen(&mut self.output).ok();
        self.writer.reset_state();
    }

    /// Total bytes written to the sink so far.
    #[must_use]
    pub const fn bytes_flushed(&self) -> usize {
        self.bytes_flushed
    }

    /// The sink, for inspecting captured output.
    #[must_use]
    pub const fn sink(&self) -> &W {
        &self.sink
    }

    /// Unwrap into the sink.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Open a frame on first output: synchronized update, cursor hidden
    /// until it is placed.
    fn begin_frame(&mut self) {
        if self.output.is_empty() {
            ansi::begin_sync(&mut self.output).ok();
            ansi::cursor_hide(&mut self.output).ok();
        }
    }
}

impl<W: Write> Terminal for AnsiTerminal<W> {
    fn write_cell(&mut self, row: u16, col: u16, cell: Cell) {
        self.begin_frame();
        self.writer.render_cell(&mut self.output, col, row, &cell);
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.begin_frame();
        ansi::cursor_to(&mut self.output, col, row).ok();
        ansi::cursor_show(&mut self.output).ok();
        self.writer.invalidate_cursor();
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.output.is_empty() {
            return Ok(());
        }
        // Leave the terminal with default attributes between frames.
        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();
        self.writer.reset_state();
        self.bytes_flushed += self.output.len();
        self.output.flush_to(&mut self.sink)
    }
}

// ─── MemoryTerminal ─────────────────────────────────────────────────────────

/// One recorded terminal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOp {
    /// `write_cell(row, col, cell)`.
    Cell { row: u16, col: u16, cell: Cell },
    /// `move_cursor(row, col)`.
    Cursor { row: u16, col: u16 },
    /// `flush()`.
    Flush,
}

/// A [`Terminal`] that records every call.
#[derive(Debug, Default)]
pub struct MemoryTerminal {
    ops: Vec<TermOp>,
}

impl MemoryTerminal {
    /// Create an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Every operation since creation or the last [`take`](Self::take).
    #[must_use]
    pub fn ops(&self) -> &[TermOp] {
        &self.ops
    }

    /// Drain the recorded operations.
    pub fn take(&mut self) -> Vec<TermOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of `write_cell` calls recorded.
    #[must_use]
    pub fn cells_written(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, TermOp::Cell { .. }))
            .count()
    }
}

impl Terminal for MemoryTerminal {
    fn write_cell(&mut self, row: u16, col: u16, cell: Cell) {
        self.ops.push(TermOp::Cell { row, col, cell });
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.ops.push(TermOp::Cursor { row, col });
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ops.push(TermOp::Flush);
        Ok(())
    }
}

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdout is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Tests ──────────────────────────────────────────────────────────────────
