//! The editor facade.
//!
//! `Editor` owns a document together with its style registry, undo history
//! and event bus, and is the one place UI code edits through. Every edit
//! follows the same path:
//!
//! 1. validate: the document primitive rejects bad positions, the editor
//!    rejects unknown styles. On error nothing changes and nothing is
//!    published;
//! 2. mutate, producing a [`Delta`];
//! 3. record the delta in the history;
//! 4. publish `DocumentChanged`, then `CursorMoved` / `SelectionChanged`
//!    if those moved.
//!
//! Compound commands (typing over a selection) group their deltas into one
//! undo step.

use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::EditError;
use crate::event::{Event, EventBus};
use crate::history::{Delta, History};
use crate::paragraph::{Paragraph, RunAttrs};
use crate::position::{CursorState, Position, Selection};
use crate::style::{StyleId, StyleRegistry};

/// A document being edited.
#[derive(Debug)]
pub struct Editor {
    document: Document,
    styles: StyleRegistry,
    history: History,
    events: EventBus,
    path: Option<PathBuf>,
    modified: bool,
}

impl Editor {
    /// An editor on an empty document.
    #[must_use]
    pub fn new(styles: StyleRegistry) -> Self {
        Self::with_document(Document::new(), styles)
    }

    #[must_use]
    pub fn with_document(document: Document, styles: StyleRegistry) -> Self {
        Self {
            document,
            styles,
            history: History::new(),
            events: EventBus::new(),
            path: None,
            modified: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub const fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// The registry, for registering add-on styles.
    pub const fn styles_mut(&mut self) -> &mut StyleRegistry {
        &mut self.styles
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    pub fn set_undo_depth(&mut self, depth: usize) {
        self.history.set_depth(depth);
    }

    pub const fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Where the document was last opened from or saved to.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True if the document changed since it was opened or saved.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    // -- Documents ----------------------------------------------------------

    /// Replace the document. History is cleared.
    pub fn open(&mut self, document: Document, path: Option<PathBuf>) {
        log::info!(
            "opened {} ({} paragraphs)",
            path.as_deref().map_or_else(|| "<new>".into(), |p| p.display().to_string()),
            document.len()
        );
        self.document = document;
        self.history.clear();
        self.modified = false;
        self.path.clone_from(&path);
        self.events
            .publish(&Event::DocumentOpened { path }, &self.document);
    }

    /// Note that the document was written to `path`.
    pub fn mark_saved(&mut self, path: &Path) {
        self.modified = false;
        self.path = Some(path.to_path_buf());
        self.events.publish(
            &Event::DocumentSaved {
                path: path.to_path_buf(),
            },
            &self.document,
        );
    }

    // -- Edit primitives ----------------------------------------------------

    /// Insert text at `pos`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Result<(), EditError> {
        let delta = self.document.insert_text(pos, text)?;
        self.commit(delta);
        Ok(())
    }

    /// Delete `[start, end)`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if either end does not exist.
    pub fn delete_range(&mut self, start: Position, end: Position) -> Result<(), EditError> {
        let delta = self.document.delete_range(start, end)?;
        self.commit(delta);
        Ok(())
    }

    /// Split the paragraph at `pos`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist.
    pub fn split_paragraph(&mut self, pos: Position) -> Result<(), EditError> {
        let delta = self.document.split_paragraph(pos)?;
        self.commit(delta);
        Ok(())
    }

    /// Join paragraph `index + 1` onto paragraph `index`.
    ///
    /// # Errors
    ///
    /// [`EditError::ParagraphOutOfRange`] if there is no next paragraph.
    pub fn merge_with_next(&mut self, index: usize) -> Result<(), EditError> {
        let delta = self.document.merge_with_next(index)?;
        self.commit(delta);
        Ok(())
    }

    /// Restyle paragraph `index`.
    ///
    /// # Errors
    ///
    /// [`EditError::UnknownStyle`] if `style` is not registered,
    /// [`EditError::ParagraphOutOfRange`] if `index` does not exist.
    pub fn set_paragraph_style(&mut self, index: usize, style: StyleId) -> Result<(), EditError> {
        if !self.styles.contains(style) {
            return Err(EditError::UnknownStyle(style));
        }
        let delta = self.document.set_paragraph_style(index, style)?;
        self.commit(delta);
        Ok(())
    }

    /// Set or clear `attr` over `[start, end)`.
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
    ) -> Result<(), EditError> {
        let delta = self.document.set_run_attribute(start, end, attr, value)?;
        self.commit(delta);
        Ok(())
    }

    /// Insert a copied fragment at `pos`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist, or
    /// [`EditError::UnknownStyle`] if the fragment uses an unregistered style.
    pub fn paste(&mut self, pos: Position, fragment: Vec<Paragraph>) -> Result<(), EditError> {
        if let Some(p) = fragment.iter().find(|p| !self.styles.contains(p.style)) {
            return Err(EditError::UnknownStyle(p.style));
        }
        let delta = self.document.insert_paragraphs(pos, fragment)?;
        self.commit(delta);
        Ok(())
    }

    /// A copy of the selected content, if anything is selected.
    #[must_use]
    pub fn copy_selection(&self) -> Option<Vec<Paragraph>> {
        let sel = self.document.selection().filter(|s| !s.is_empty())?;
        self.document.extract(sel.start, sel.end).ok()
    }

    // -- Commands -----------------------------------------------------------

    /// Type `text` at the cursor, replacing the selection if there is one.
    /// One undo step either way.
    pub fn type_text(&mut self, text: &str) {
        let at = match self.document.selection().filter(|s| !s.is_empty()) {
            Some(sel) => {
                self.history.begin();
                self.apply_checked(|doc| doc.delete_range(sel.start, sel.end));
                self.clear_selection();
                sel.start
            }
            None => self.document.cursor(),
        };
        self.apply_checked(|doc| doc.insert_text(at, text));
        self.history.commit();
    }

    /// Delete the selection, or the char before the cursor, or join this
    /// paragraph onto the previous one.
    pub fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        let cursor = self.document.cursor();
        if cursor.offset > 0 {
            let from = Position::new(cursor.paragraph, cursor.offset - 1);
            self.apply_checked(|doc| doc.delete_range(from, cursor));
        } else if cursor.paragraph > 0 {
            self.apply_checked(|doc| doc.merge_with_next(cursor.paragraph - 1));
        }
    }

    /// Delete the selection, or the char after the cursor, or join the next
    /// paragraph onto this one.
    pub fn delete_forward(&mut self) {
        if self.delete_selection() {
            return;
        }
        let cursor = self.document.cursor();
        let len = self.document.paragraph(cursor.paragraph).map_or(0, Paragraph::len);
        if cursor.offset < len {
            let to = Position::new(cursor.paragraph, cursor.offset + 1);
            self.apply_checked(|doc| doc.delete_range(cursor, to));
        } else if cursor.paragraph + 1 < self.document.len() {
            self.apply_checked(|doc| doc.merge_with_next(cursor.paragraph));
        }
    }

    /// Split the paragraph at the cursor.
    pub fn new_paragraph(&mut self) {
        let cursor = self.document.cursor();
        self.apply_checked(|doc| doc.split_paragraph(cursor));
    }

    fn delete_selection(&mut self) -> bool {
        let Some(sel) = self.document.selection().filter(|s| !s.is_empty()) else {
            return false;
        };
        self.apply_checked(|doc| doc.delete_range(sel.start, sel.end));
        self.clear_selection();
        true
    }

    /// Run a primitive whose arguments come from the document's own
    /// cursor or selection, which are always valid.
    fn apply_checked(&mut self, edit: impl FnOnce(&mut Document) -> Result<Delta, EditError>) {
        match edit(&mut self.document) {
            Ok(delta) => self.commit(delta),
            Err(e) => log::warn!("edit at cursor rejected: {e}"),
        }
    }

    // -- Undo ---------------------------------------------------------------

    /// Undo the last edit. Returns false (and does nothing) if there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let before = self.document.cursor_state();
        let Some(touched) = self.history.undo(&mut self.document) else {
            return false;
        };
        self.modified = true;
        self.publish_change(touched, before);
        true
    }

    /// Redo the last undone edit. Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let before = self.document.cursor_state();
        let Some(touched) = self.history.redo(&mut self.document) else {
            return false;
        };
        self.modified = true;
        self.publish_change(touched, before);
        true
    }

    // -- Cursor and selection -----------------------------------------------

    /// Move the cursor.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `pos` does not exist.
    pub fn move_cursor(&mut self, pos: Position) -> Result<(), EditError> {
        let before = self.document.cursor();
        self.document.set_cursor(pos)?;
        if before != pos {
            self.events
                .publish(&Event::CursorMoved { position: pos }, &self.document);
        }
        Ok(())
    }

    /// Move one char left, onto the end of the previous paragraph at the
    /// start of a paragraph.
    pub fn move_left(&mut self) {
        let c = self.document.cursor();
        let target = if c.offset > 0 {
            Position::new(c.paragraph, c.offset - 1)
        } else if c.paragraph > 0 {
            let len = self.document.paragraph(c.paragraph - 1).map_or(0, Paragraph::len);
            Position::new(c.paragraph - 1, len)
        } else {
            c
        };
        self.move_cursor(target).ok();
    }

    /// Move one char right, onto the start of the next paragraph at the end
    /// of a paragraph.
    pub fn move_right(&mut self) {
        let c = self.document.cursor();
        let len = self.document.paragraph(c.paragraph).map_or(0, Paragraph::len);
        let target = if c.offset < len {
            Position::new(c.paragraph, c.offset + 1)
        } else if c.paragraph + 1 < self.document.len() {
            Position::new(c.paragraph + 1, 0)
        } else {
            c
        };
        self.move_cursor(target).ok();
    }

    /// Select `[a, b)` (either order) and put the cursor on `b`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if either end does not exist.
    pub fn select(&mut self, a: Position, b: Position) -> Result<(), EditError> {
        let before = self.document.cursor_state();
        self.document.set_selection(Some(Selection::ordered(a, b)))?;
        self.document.set_cursor(b)?;
        self.publish_moves(before);
        Ok(())
    }

    /// End selection mode.
    pub fn clear_selection(&mut self) {
        if self.document.selection().is_some() {
            let before = self.document.cursor_state();
            self.document.set_selection(None).ok();
            self.publish_moves(before);
        }
    }

    // -- Internals ----------------------------------------------------------

    fn commit(&mut self, delta: Delta) {
        if delta.is_noop() {
            return;
        }
        let changed = delta.changed();
        let before = delta.before();
        self.history.record(delta);
        self.modified = true;
        self.publish_change(changed, before);
    }

    fn publish_change(&mut self, paragraphs: std::ops::Range<usize>, before: CursorState) {
        self.events
            .publish(&Event::DocumentChanged { paragraphs }, &self.document);
        self.publish_moves(before);
    }

    fn publish_moves(&mut self, before: CursorState) {
        let after = self.document.cursor_state();
        if after.cursor != before.cursor {
            self.events.publish(
                &Event::CursorMoved {
                    position: after.cursor,
                },
                &self.document,
            );
        }
        if after.selection != before.selection {
            self.events.publish(
                &Event::SelectionChanged {
                    selection: after.selection,
                },
                &self.document,
            );
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(StyleRegistry::builtin())
    }
}
