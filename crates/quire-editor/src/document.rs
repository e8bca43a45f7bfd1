//! The document model.
//!
//! A document is an ordered, never-empty sequence of [`Paragraph`]s plus a
//! cursor and an optional selection. All mutation goes through the edit
//! primitives below. Each one validates its arguments first, so on `Err`
//! nothing has changed, then rewrites a contiguous range of paragraphs and
//! returns a [`Delta`] describing exactly that rewrite. Replaying a delta
//! backwards restores the document bit for bit, cursor included.
//!
//! # Cursor policy
//!
//! Positions held by the document (cursor and both selection ends) follow
//! the text they point into:
//!
//! - insertions at or before a position shift it forward;
//! - a deletion whose span contains a position collapses it to the start
//!   of the span, where the following text now begins;
//! - positions in later paragraphs shift by the net paragraph count;
//! - splitting moves positions after the split point into the new
//!   paragraph; merging moves positions in the second paragraph onto the
//!   end of the first.
//!
//! After every edit positions are clamped into the document and the
//! selection is re-normalized.

use crate::error::EditError;
use crate::history::Delta;
use crate::paragraph::{Paragraph, Run, RunAttrs};
use crate::position::{CursorState, Position, Selection};
use crate::style::StyleId;

/// A rich-text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
    cursor: Position,
    selection: Option<Selection>,
}

impl Document {
    /// A document holding one empty body paragraph.
    #[must_use]
    pub fn new() -> Self {
        Self::from_paragraphs(Vec::new())
    }

    /// Build a document from paragraphs. An empty list yields one empty
    /// body paragraph.
    #[must_use]
    pub fn from_paragraphs(mut paragraphs: Vec<Paragraph>) -> Self {
        if paragraphs.is_empty() {
            paragraphs.push(Paragraph::new(StyleId::P));
        }
        Self {
            paragraphs,
            cursor: Position::ZERO,
            selection: None,
        }
    }

    /// One body paragraph per line of `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_paragraphs(
            normalize_newlines(text)
                .split('\n')
                .map(|line| Paragraph::with_text(StyleId::P, line))
                .collect(),
        )
    }

    // -- Queries ------------------------------------------------------------

    #[must_use]
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    #[must_use]
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    /// Number of paragraphs (always at least 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Never true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    #[must_use]
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    #[must_use]
    pub const fn cursor_state(&self) -> CursorState {
        CursorState {
            cursor: self.cursor,
            selection: self.selection,
        }
    }

    /// The plain text, paragraphs joined by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::word_count).sum()
    }

    /// Chars across all paragraphs, not counting paragraph breaks.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::len).sum()
    }

    /// The plain text of paragraph `index`.
    #[must_use]
    pub fn paragraph_text(&self, index: usize) -> Option<String> {
        self.paragraphs.get(index).map(Paragraph::text)
    }

    /// Repair a document assembled by hand: line breaks inside runs become
    /// spaces, and the cursor and selection are clamped into range.
    pub fn normalize(&mut self) {
        for p in &mut self.paragraphs {
            if p.runs().iter().any(|r| r.text.contains(['\n', '\r'])) {
                let runs: Vec<Run> = p
                    .runs()
                    .iter()
                    .map(|r| Run::new(&r.text.replace(['\n', '\r'], " "), r.attrs))
                    .collect();
                *p = Paragraph::from_runs(p.style, runs);
            }
        }
        let state = self.cursor_state();
        self.restore(state);
    }

    /// The position after the last char of the last paragraph.
    #[must_use]
    pub fn end(&self) -> Position {
        let last = self.paragraphs.len() - 1;
        Position::new(last, self.paragraphs[last].len())
    }

    /// Check that `pos` exists.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if the paragraph or offset is past the end.
    pub fn check(&self, pos: Position) -> Result<(), EditError> {
        match self.paragraphs.get(pos.paragraph) {
            Some(p) if pos.offset <= p.len() => Ok(()),
            _ => Err(EditError::OutOfRange { position: pos }),
        }
    }

    /// Check that paragraph `index` exists.
    ///
    /// # Errors
    ///
    /// [`EditError::ParagraphOutOfRange`] otherwise.
    pub fn check_paragraph(&self, index: usize) -> Result<(), EditError> {
        if index < self.paragraphs.len() {
            Ok(())
        } else {
            Err(EditError::ParagraphOutOfRange {
                index,
                count: self.paragraphs.len(),
            })
        }
    }

    /// The nearest valid position to `pos`.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let paragraph = pos.paragraph.min(self.paragraphs.len() - 1);
        let offset = pos.offset.min(self.paragraphs[paragraph].len());
        Position::new(paragraph, offset)
    }

    /// A copy of the content in `[start, end)` as a paragraph fragment.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if either end does not exist.
    pub fn extract(&self, start: Position, end: Position) -> Result<Vec<Paragraph>, EditError> {
        self.check(start)?;
        self.check(end)?;
        let Selection { start, end } = Selection::ordered(start, end);

        if start.paragraph == end.paragraph {
            let p = &self.paragraphs[start.paragraph];
            return Ok(vec![p.slice(start.offset, end.offset)]);
        }

        let first = &self.paragraphs[start.paragraph];
        let mut out = vec![first.slice(start.offset, first.len())];
        out.extend_from_slice(&self.paragraphs[start.paragraph + 1..end.paragraph]);
        out.push(self.paragraphs[end.paragraph].slice(0, end.offset));
        Ok(out)
    }

    // -- Cursor and selection -----------------------------------------------

    /// Move the cursor.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist.
    pub fn set_cursor(&mut self, pos: Position) -> Result<(), EditError> {
        self.check(pos)?;
        self.cursor = pos;
        Ok(())
    }

    /// Set or clear the selection.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if either end does not exist.
    pub fn set_selection(&mut self, selection: Option<Selection>) -> Result<(), EditError> {
        if let Some(sel) = selection {
            self.check(sel.start)?;
            self.check(sel.end)?;
        }
        self.selection = selection.map(|s| Selection::ordered(s.start, s.end));
        Ok(())
    }

    // -- Edit primitives ----------------------------------------------------

    /// Insert plain text at `pos`.
    ///
    /// The text takes the attributes of the char before `pos` (or of the
    /// first char at offset 0). Each `\n` (also `\r\n` and `\r`) splits the
    /// paragraph; new paragraphs take the style of the one split.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Result<Delta, EditError> {
        self.check(pos)?;
        let target = &self.paragraphs[pos.paragraph];
        let attrs = target.attrs_at(pos.offset);
        let style = target.style;
        let fragment = normalize_newlines(text)
            .split('\n')
            .map(|line| {
                let mut p = Paragraph::new(style);
                p.push(line, attrs);
                p
            })
            .collect();
        self.insert_paragraphs(pos, fragment)
    }

    /// Insert a paragraph fragment (as produced by [`extract`](Self::extract))
    /// at `pos`.
    ///
    /// The first fragment paragraph joins the text before `pos`, keeping the
    /// target paragraph's style. The last one receives the text after
    /// `pos`. Paragraphs in between are inserted whole.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist.
    pub fn insert_paragraphs(
        &mut self,
        pos: Position,
        fragment: Vec<Paragraph>,
    ) -> Result<Delta, EditError> {
        self.check(pos)?;
        let before = self.cursor_state();
        let old = vec![self.paragraphs[pos.paragraph].clone()];

        let mut head = old[0].clone();
        let tail = head.split_off(pos.offset);
        let mut pieces = fragment.into_iter();
        let first = pieces.next().unwrap_or_default();
        let mut rest: Vec<Paragraph> = pieces.collect();

        let added = rest.len();
        let inserted = match rest.last_mut() {
            Some(last) => {
                let n = last.len();
                last.append(tail);
                head.append(first);
                n
            }
            None => {
                let n = first.len();
                head.append(first);
                head.append(tail);
                n
            }
        };

        let mut new = Vec::with_capacity(added + 1);
        new.push(head);
        new.extend(rest);
        self.splice(pos.paragraph, 1, new.clone());

        self.map_positions(|p| {
            if p.paragraph == pos.paragraph && p.offset >= pos.offset {
                if added == 0 {
                    Position::new(p.paragraph, p.offset + inserted)
                } else {
                    Position::new(pos.paragraph + added, inserted + (p.offset - pos.offset))
                }
            } else if p.paragraph > pos.paragraph {
                Position::new(p.paragraph + added, p.offset)
            } else {
                p
            }
        });

        Ok(self.delta(pos.paragraph, old, new, before))
    }

    /// Delete the content in `[start, end)`; the ends may come in either
    /// order. A span crossing paragraphs merges its first and last
    /// paragraph; the merged paragraph keeps the first one's style.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if either end does not exist.
    pub fn delete_range(&mut self, start: Position, end: Position) -> Result<Delta, EditError> {
        self.check(start)?;
        self.check(end)?;
        let Selection { start, end } = Selection::ordered(start, end);
        let before = self.cursor_state();
        let old = self.paragraphs[start.paragraph..=end.paragraph].to_vec();

        let mut merged = old[0].clone();
        drop(merged.split_off(start.offset));
        let mut last = old[old.len() - 1].clone();
        merged.append(last.split_off(end.offset));

        let new = vec![merged];
        self.splice(start.paragraph, old.len(), new.clone());

        let removed = end.paragraph - start.paragraph;
        self.map_positions(|p| {
            if p <= start {
                p
            } else if p <= end {
                start
            } else if p.paragraph == end.paragraph {
                Position::new(start.paragraph, start.offset + (p.offset - end.offset))
            } else {
                Position::new(p.paragraph - removed, p.offset)
            }
        });

        Ok(self.delta(start.paragraph, old, new, before))
    }

    /// Split the paragraph at `pos` into two of the same style.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist.
    pub fn split_paragraph(&mut self, pos: Position) -> Result<Delta, EditError> {
        self.check(pos)?;
        let before = self.cursor_state();
        let old = vec![self.paragraphs[pos.paragraph].clone()];

        let mut head = old[0].clone();
        let tail = head.split_off(pos.offset);
        let new = vec![head, tail];
        self.splice(pos.paragraph, 1, new.clone());

        self.map_positions(|p| {
            if p.paragraph == pos.paragraph && p.offset >= pos.offset {
                Position::new(p.paragraph + 1, p.offset - pos.offset)
            } else if p.paragraph > pos.paragraph {
                Position::new(p.paragraph + 1, p.offset)
            } else {
                p
            }
        });

        Ok(self.delta(pos.paragraph, old, new, before))
    }

    /// Join paragraph `index + 1` onto the end of paragraph `index`.
    ///
    /// # Errors
    ///
    /// [`EditError::ParagraphOutOfRange`] if `index` is the last paragraph
    /// or past the end.
    pub fn merge_with_next(&mut self, index: usize) -> Result<Delta, EditError> {
        self.check_paragraph(index.saturating_add(1))?;
        let before = self.cursor_state();
        let old = self.paragraphs[index..=index + 1].to_vec();

        let first_len = old[0].len();
        let mut merged = old[0].clone();
        merged.append(old[1].clone());
        let new = vec![merged];
        self.splice(index, 2, new.clone());

        self.map_positions(|p| {
            if p.paragraph == index + 1 {
                Position::new(index, first_len + p.offset)
            } else if p.paragraph > index + 1 {
                Position::new(p.paragraph - 1, p.offset)
            } else {
                p
            }
        });

        Ok(self.delta(index, old, new, before))
    }

    /// Change the style of paragraph `index`.
    ///
    /// The document does not know which styles exist; callers holding a
    /// registry check the id first.
    ///
    /// # Errors
    ///
    /// [`EditError::ParagraphOutOfRange`] if `index` does not exist.
    pub fn set_paragraph_style(&mut self, index: usize, style: StyleId) -> Result<Delta, EditError> {
        self.check_paragraph(index)?;
        let before = self.cursor_state();
        let old = vec![self.paragraphs[index].clone()];
        let mut restyled = old[0].clone();
        restyled.style = style;
        let new = vec![restyled];
        self.splice(index, 1, new.clone());
        Ok(self.delta(index, old, new, before))
    }

    /// Set or clear `attr` on every char in `[start, end)`; the ends may
    /// come in either order.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if either end does not exist.
    pub fn set_run_attribute(
        &mut self,
        start: Position,
        end: Position,
        attr: RunAttrs,
        value: bool,
    ) -> Result<Delta, EditError> {
        self.check(start)?;
        self.check(end)?;
        let Selection { start, end } = Selection::ordered(start, end);
        let before = self.cursor_state();
        let old = self.paragraphs[start.paragraph..=end.paragraph].to_vec();

        let new: Vec<Paragraph> = old
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let index = start.paragraph + i;
                let from = if index == start.paragraph { start.offset } else { 0 };
                let to = if index == end.paragraph { end.offset } else { p.len() };
                let mut p = p.clone();
                p.set_attr(from, to, attr, value);
                p
            })
            .collect();
        self.splice(start.paragraph, old.len(), new.clone());
        Ok(self.delta(start.paragraph, old, new, before))
    }

    // -- Internals ----------------------------------------------------------

    /// Replace `count` paragraphs at `at` with `with`, keeping the
    /// sequence non-empty.
    pub(crate) fn splice(&mut self, at: usize, count: usize, with: Vec<Paragraph>) {
        let end = (at + count).min(self.paragraphs.len());
        let at = at.min(end);
        self.paragraphs.splice(at..end, with);
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::new(StyleId::P));
        }
    }

    /// Restore a cursor and selection, clamping them into the document.
    pub(crate) fn restore(&mut self, state: CursorState) {
        self.cursor = self.clamp(state.cursor);
        self.selection = state
            .selection
            .map(|s| Selection::ordered(self.clamp(s.start), self.clamp(s.end)));
    }

    fn map_positions(&mut self, f: impl Fn(Position) -> Position) {
        let state = CursorState {
            cursor: f(self.cursor),
            selection: self.selection.map(|s| Selection::ordered(f(s.start), f(s.end))),
        };
        self.restore(state);
    }

    fn delta(
        &self,
        at: usize,
        old: Vec<Paragraph>,
        new: Vec<Paragraph>,
        before: CursorState,
    ) -> Delta {
        Delta::new(at, old, new, before, self.cursor_state())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold `\r\n` and lone `\r` into `\n`.
fn normalize_newlines(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains('\r') {
        std::borrow::Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}
