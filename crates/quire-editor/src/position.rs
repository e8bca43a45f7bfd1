//! Document positions and selections.
//!
//! All coordinates are **0-indexed**. A position names a paragraph and a
//! char offset inside that paragraph's text (the concatenation of its runs).
//! Offsets count Unicode scalar values, not bytes. Offset `len` is valid: it
//! is the position after the last character, where typing appends.
//!
//! Display layers should convert to 1-indexed for the user; that conversion
//! never belongs here.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in a document: (paragraph, offset), both 0-indexed.
///
/// Positions are ordered lexicographically: paragraph first, then offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub paragraph: usize,
    pub offset: usize,
}

impl Position {
    /// The start of the document.
    pub const ZERO: Self = Self {
        paragraph: 0,
        offset: 0,
    };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(paragraph: usize, offset: usize) -> Self {
        Self { paragraph, offset }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.paragraph
            .cmp(&other.paragraph)
            .then(self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.paragraph, self.offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for human display.
        write!(f, "{}:{}", self.paragraph + 1, self.offset + 1)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A half-open selected span `[start, end)`.
///
/// Always normalized so that `start <= end`: build one with
/// [`Selection::ordered`], which accepts the two ends in either order (the
/// user may have dragged backwards).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    /// Create a selection from two arbitrary positions.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// True when the selection covers nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// True when `pos` lies inside `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// True when start and end are in the same paragraph.
    #[inline]
    #[must_use]
    pub const fn is_single_paragraph(self) -> bool {
        self.start.paragraph == self.end.paragraph
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sel({:?}..{:?})", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// CursorState
// ---------------------------------------------------------------------------

/// The cursor and selection together, as an undo step restores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    pub cursor: Position,
    pub selection: Option<Selection>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_paragraph_then_offset() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(1, 1).max(Position::new(1, 4)), Position::new(1, 4));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Position::new(0, 0).to_string(), "1:1");
        assert_eq!(Position::new(4, 10).to_string(), "5:11");
    }

    #[test]
    fn debug_is_compact() {
        assert_eq!(format!("{:?}", Position::new(3, 2)), "Pos(3:2)");
    }

    #[test]
    fn selection_normalizes_backwards_drag() {
        let sel = Selection::ordered(Position::new(2, 0), Position::new(1, 5));
        assert_eq!(sel.start, Position::new(1, 5));
        assert_eq!(sel.end, Position::new(2, 0));
        assert!(!sel.is_single_paragraph());
    }

    #[test]
    fn selection_contains_is_half_open() {
        let sel = Selection::ordered(Position::new(0, 2), Position::new(0, 4));
        assert!(!sel.contains(Position::new(0, 1)));
        assert!(sel.contains(Position::new(0, 2)));
        assert!(sel.contains(Position::new(0, 3)));
        assert!(!sel.contains(Position::new(0, 4)));
    }

    #[test]
    fn empty_selection() {
        let p = Position::new(1, 1);
        assert!(Selection::ordered(p, p).is_empty());
    }
}
