// SPDX-License-Identifier: MIT
//
// Cell — the atomic unit of the screen grid.
//
// Every character position on screen is a Cell: a Unicode codepoint plus
// the attributes it is drawn with. The layout engine paints these into a
// FrameBuffer, the redraw engine diffs frames of them, and the terminal
// collaborator receives only the ones that changed.
//
// A word processor grid carries no colors of its own: emphasis is shown
// with SGR attributes (bold, italic, underline) and the selection with
// inverse video. That keeps a cell at 8 bytes and equality a single
// compare.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell
// holds the codepoint; the second is a continuation cell (ch = 0). The
// terminal writer skips continuation cells when outputting characters.

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Cell attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters:
    ///
    /// ```
    /// use quire_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::ITALIC));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2 — decreased intensity (faint). Used for margin labels.
        const DIM           = 1 << 1;
        /// SGR 3 — italic or oblique.
        const ITALIC        = 1 << 2;
        /// SGR 4 — straight underline.
        const UNDERLINE     = 1 << 3;
        /// SGR 7 — swap foreground and background. Used for the selection
        /// and the status line.
        const INVERSE       = 1 << 4;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single grid cell.
///
/// # Wide Characters
///
/// Characters that occupy two terminal columns use a **continuation cell**:
/// the first cell holds the codepoint, the second has `ch = 0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Unicode codepoint to display.
    ///
    /// - `0` = continuation cell (second column of a wide character)
    /// - `b' '` (32) = empty / space (the default)
    pub ch: u32,

    /// Text attributes (bold, italic, underline, inverse, ...).
    pub attrs: Attr,
}

/// Continuation marker: a cell whose `ch` is 0 belongs to the preceding
/// wide character and should not produce character output.
const CONTINUATION: u32 = 0;

/// Default character for empty cells.
const SPACE: u32 = b' ' as u32;

impl Cell {
    /// An empty cell: space character, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and no attributes.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            attrs: Attr::empty(),
        }
    }

    /// Create a cell with a character and attributes.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, attrs: Attr) -> Self {
        Self {
            ch: ch as u32,
            attrs,
        }
    }

    /// Create a continuation cell for wide characters.
    ///
    /// Continuation cells carry the attributes of their owner so an
    /// inverse selection covers both columns.
    #[inline]
    #[must_use]
    pub const fn continuation(attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            attrs,
        }
    }

    /// Whether this is a continuation cell (second column of a wide char).
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this cell is visually empty (space, no attributes).
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.ch == SPACE && self.attrs.is_empty()
    }

    /// The Unicode codepoint as a `char`, if valid.
    ///
    /// Returns `None` for continuation cells and invalid scalar values.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    /// Reset this cell to empty.
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    /// Replace the attributes.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn cell_is_8_bytes() {
        assert_eq!(mem::size_of::<Cell>(), 8);
    }

    #[test]
    fn default_cell_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell, Cell::EMPTY);
    }

    #[test]
    fn cell_with_attrs_is_not_empty() {
        assert!(!Cell::EMPTY.with_attrs(Attr::INVERSE).is_empty());
    }

    #[test]
    fn styled_cell_keeps_attrs() {
        let cell = Cell::styled('Z', Attr::BOLD | Attr::ITALIC);
        assert_eq!(cell.character(), Some('Z'));
        assert!(cell.attrs.contains(Attr::BOLD));
        assert!(cell.attrs.contains(Attr::ITALIC));
        assert!(!cell.attrs.contains(Attr::UNDERLINE));
    }

    #[test]
    fn continuation_cell_has_no_character() {
        let cell = Cell::continuation(Attr::INVERSE);
        assert!(cell.is_continuation());
        assert!(cell.character().is_none());
        assert!(cell.attrs.contains(Attr::INVERSE));
    }

    #[test]
    fn regular_cell_is_not_continuation() {
        assert!(!Cell::new('x').is_continuation());
    }

    #[test]
    fn reset_clears_everything() {
        let mut cell = Cell::styled('X', Attr::BOLD);
        cell.reset();
        assert_eq!(cell, Cell::EMPTY);
    }

    #[test]
    fn cells_differ_by_attrs() {
        assert_ne!(Cell::new('A'), Cell::styled('A', Attr::BOLD));
    }

    #[test]
    fn debug_format_shows_attrs() {
        let s = format!("{:?}", Cell::styled('a', Attr::BOLD));
        assert!(s.starts_with("Cell('a'"));
        assert!(s.contains("BOLD"));
        assert_eq!(format!("{:?}", Cell::continuation(Attr::empty())), "Cell(continuation)");
    }
}
