//! Inline emphasis resolution with an explicit marker stack.
//!
//! Scanners feed literal text and markers in source order. An opening
//! marker is recorded as a placeholder piece holding its literal source
//! text. When a closer consumes it, the placeholder text is dropped and
//! the attribute is applied to every piece written since. A closer can
//! only consume the innermost open marker; openers never consumed stay in
//! the output as the literal text they were.

use quire_editor::paragraph::{Run, RunAttrs};

#[derive(Debug)]
struct Piece {
    text: String,
    attrs: RunAttrs,
}

/// An open marker.
#[derive(Debug, Clone)]
pub struct Opener {
    /// What closes it: the delimiter char, or `}` for a brace group.
    pub marker: char,
    /// Delimiter chars still unconsumed.
    pub count: usize,
    /// Length of the delimiter run as written.
    pub original: usize,
    /// The run could also have closed.
    pub both: bool,
    /// Attributes a full close applies.
    pub attrs: RunAttrs,
    piece: usize,
}

#[derive(Debug, Default)]
pub struct Inline {
    pieces: Vec<Piece>,
    stack: Vec<Opener>,
    /// Literal text not yet committed to a piece.
    pending: String,
}

impl Inline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text.
    pub fn text(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    pub fn push(&mut self, c: char) {
        self.pending.push(c);
    }

    /// Commit pending text as a piece of its own. Pieces are never
    /// extended afterwards, since a later close may style only the tail.
    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.pieces.push(Piece {
                text: std::mem::take(&mut self.pending),
                attrs: RunAttrs::empty(),
            });
        }
    }

    /// Record an opening marker whose source text is `literal`.
    pub fn open(&mut self, marker: char, literal: &str, attrs: RunAttrs) {
        self.open_run(marker, literal, literal.chars().count(), false, attrs);
    }

    /// Record a delimiter run of `count` chars that may be consumed
    /// partially.
    pub fn open_run(&mut self, marker: char, literal: &str, original: usize, both: bool, attrs: RunAttrs) {
        self.flush();
        self.pieces.push(Piece {
            text: literal.to_string(),
            attrs: RunAttrs::empty(),
        });
        self.stack.push(Opener {
            marker,
            count: literal.chars().count(),
            original,
            both,
            attrs,
            piece: self.pieces.len() - 1,
        });
    }

    /// The innermost open marker.
    pub fn top(&self) -> Option<&Opener> {
        self.stack.last()
    }

    /// Consume `n` chars of the innermost marker, applying `attrs` to the
    /// text written since it opened. The marker closes once fully consumed.
    pub fn consume(&mut self, n: usize, attrs: RunAttrs) {
        self.flush();
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        let start = top.piece;
        top.count = top.count.saturating_sub(n);
        let placeholder = &mut self.pieces[start].text;
        if top.count == 0 {
            placeholder.clear();
            self.stack.pop();
        } else {
            let keep = placeholder.chars().count().saturating_sub(n);
            *placeholder = placeholder.chars().take(keep).collect();
        }
        for piece in &mut self.pieces[start + 1..] {
            piece.attrs |= attrs;
        }
    }

    /// Close the innermost marker completely with its own attributes.
    pub fn close(&mut self) {
        if let Some(top) = self.stack.last() {
            let (count, attrs) = (top.count, top.attrs);
            self.consume(count, attrs);
        }
    }

    /// The resolved runs. Unclosed markers are literal text.
    pub fn finish(mut self) -> Vec<Run> {
        self.flush();
        self.pieces
            .into_iter()
            .filter(|p| !p.text.is_empty())
            .map(|p| Run::new(&p.text, p.attrs))
            .collect()
    }
}
