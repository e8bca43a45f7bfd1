//! Undo/redo history — delta-based edit tracking.
//!
//! Every edit primitive on [`Document`] returns a [`Delta`]: the range of
//! paragraphs it rewrote, their contents before and after, and the cursor
//! state before and after. Deltas are grouped into transactions, the
//! atomic unit of undo/redo:
//!
//! - a lone primitive recorded with [`History::record`] is one transaction;
//! - a compound command (replace the selection with typed text, say) wraps
//!   its primitives in [`History::begin`] / [`History::commit`].
//!
//! ```text
//! history.begin();
//! history.record(doc.delete_range(a, b)?);
//! history.record(doc.insert_text(a, "x")?);
//! history.commit();
//! ```
//!
//! Transactions that change nothing are discarded. Recording a new
//! transaction clears the redo stack; there is no branching history.

use std::ops::Range;

use crate::document::Document;
use crate::paragraph::Paragraph;
use crate::position::CursorState;

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// One reversible paragraph-range rewrite.
///
/// Applying a delta replaces `old.len()` paragraphs at `at` with `new`;
/// reverting it replaces `new.len()` paragraphs at `at` with `old`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    at: usize,
    old: Vec<Paragraph>,
    new: Vec<Paragraph>,
    before: CursorState,
    after: CursorState,
}

impl Delta {
    pub(crate) const fn new(
        at: usize,
        old: Vec<Paragraph>,
        new: Vec<Paragraph>,
        before: CursorState,
        after: CursorState,
    ) -> Self {
        Self {
            at,
            old,
            new,
            before,
            after,
        }
    }

    /// Index of the first rewritten paragraph.
    #[must_use]
    pub const fn at(&self) -> usize {
        self.at
    }

    /// The paragraphs the edit replaced.
    #[must_use]
    pub fn old(&self) -> &[Paragraph] {
        &self.old
    }

    /// The paragraphs the edit wrote.
    #[must_use]
    pub fn new_paragraphs(&self) -> &[Paragraph] {
        &self.new
    }

    #[must_use]
    pub const fn before(&self) -> CursorState {
        self.before
    }

    #[must_use]
    pub const fn after(&self) -> CursorState {
        self.after
    }

    /// The affected paragraph range in the edited document.
    #[must_use]
    pub fn changed(&self) -> Range<usize> {
        self.at..self.at + self.new.len()
    }

    /// The affected paragraph range in the document before the edit.
    #[must_use]
    pub fn replaced(&self) -> Range<usize> {
        self.at..self.at + self.old.len()
    }

    /// True when neither content nor cursor changed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old == self.new && self.before == self.after
    }

    pub(crate) fn apply(&self, doc: &mut Document) {
        doc.splice(self.at, self.old.len(), self.new.clone());
        doc.restore(self.after);
    }

    pub(crate) fn revert(&self, doc: &mut Document) {
        doc.splice(self.at, self.new.len(), self.old.clone());
        doc.restore(self.before);
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A group of deltas that undo/redo as one atomic unit.
#[derive(Debug, Clone, Default)]
struct Transaction {
    deltas: Vec<Delta>,
}

impl Transaction {
    fn is_noop(&self) -> bool {
        self.deltas.iter().all(Delta::is_noop)
    }

    /// Revert this transaction's deltas in reverse order. Returns the
    /// paragraph range touched in the resulting document.
    fn undo(&self, doc: &mut Document) -> Range<usize> {
        let mut touched = Touched::default();
        for delta in self.deltas.iter().rev() {
            delta.revert(doc);
            touched.add(delta.replaced(), delta.new.len());
        }
        touched.finish(doc.len())
    }

    /// Re-apply this transaction's deltas in forward order.
    fn redo(&self, doc: &mut Document) -> Range<usize> {
        let mut touched = Touched::default();
        for delta in &self.deltas {
            delta.apply(doc);
            touched.add(delta.changed(), delta.old.len());
        }
        touched.finish(doc.len())
    }
}

/// Accumulates the union of paragraph ranges touched by a sequence of
/// splices, shifting earlier ranges as later splices grow or shrink the
/// document.
#[derive(Default)]
struct Touched {
    range: Option<Range<usize>>,
}

impl Touched {
    /// `written` is the range now holding the splice's output; `removed`
    /// is how many paragraphs it replaced.
    fn add(&mut self, written: Range<usize>, removed: usize) {
        let boundary = written.start + removed;
        let len = written.len();
        let shift = |i: usize| {
            if i > boundary {
                i - removed + len
            } else {
                i
            }
        };
        self.range = Some(match self.range.take() {
            None => written,
            Some(prev) => {
                shift(prev.start).min(written.start)..shift(prev.end).max(written.end)
            }
        });
    }

    fn finish(self, len: usize) -> Range<usize> {
        self.range.map_or(0..0, |r| r.start.min(len)..r.end.min(len))
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Default maximum number of undoable transactions.
pub const DEFAULT_DEPTH: usize = 1000;

/// Undo/redo history for a document.
///
/// Maintains two stacks: transactions that can be undone and transactions
/// that can be redone. New transactions clear the redo stack. When the undo
/// stack exceeds the depth limit the oldest transaction is dropped.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    pending: Option<Transaction>,
    depth: usize,
}

impl History {
    /// Create an empty history with the default depth.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_depth(DEFAULT_DEPTH)
    }

    /// Create an empty history keeping at most `depth` transactions
    /// (at least 1).
    #[must_use]
    pub const fn with_depth(depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
            depth: if depth == 0 { 1 } else { depth },
        }
    }

    /// Change the depth limit, dropping the oldest transactions if needed.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth.max(1);
        self.trim();
    }

    /// Start a transaction. A transaction still pending is committed first.
    pub fn begin(&mut self) {
        self.commit();
        self.pending = Some(Transaction::default());
    }

    /// Record a delta: into the pending transaction if one is open,
    /// otherwise as a transaction of its own.
    pub fn record(&mut self, delta: Delta) {
        match &mut self.pending {
            Some(txn) => txn.deltas.push(delta),
            None => self.push(Transaction {
                deltas: vec![delta],
            }),
        }
    }

    /// Finalize the pending transaction, if any.
    pub fn commit(&mut self) {
        if let Some(txn) = self.pending.take() {
            self.push(txn);
        }
    }

    /// Undo the last transaction. Returns the paragraph range it touched,
    /// or `None` (leaving the document alone) if there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Option<Range<usize>> {
        self.commit();
        let txn = self.undo_stack.pop()?;
        let touched = txn.undo(doc);
        self.redo_stack.push(txn);
        Some(touched)
    }

    /// Redo the last undone transaction. Returns the paragraph range it
    /// touched, or `None` if there is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Option<Range<usize>> {
        let txn = self.redo_stack.pop()?;
        let touched = txn.redo(doc);
        self.undo_stack.push(txn);
        Some(touched)
    }

    /// Forget everything (after loading a new document).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
    }

    /// True if there are transactions that can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self.pending.as_ref().is_some_and(|t| !t.is_noop())
    }

    /// True if there are transactions that can be redone.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of transactions on the undo stack.
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of transactions on the redo stack.
    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    fn push(&mut self, txn: Transaction) {
        if txn.is_noop() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push(txn);
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.depth {
            let excess = self.undo_stack.len() - self.depth;
            self.undo_stack.drain(..excess);
            log::debug!("history: dropped {excess} oldest transaction(s)");
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
