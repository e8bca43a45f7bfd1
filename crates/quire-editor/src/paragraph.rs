//! Paragraphs and styled runs.
//!
//! A paragraph is a style id plus a sequence of runs, each run a non-empty
//! string carrying a set of character attributes. The run list is kept
//! normalized at all times: no empty runs, and no two adjacent runs with
//! equal attributes, so two paragraphs that look the same compare equal.
//! The history relies on that.
//!
//! Offsets are char offsets into the paragraph's plain text.

use bitflags::bitflags;

use crate::style::StyleId;

bitflags! {
    /// Character attributes carried by a run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RunAttrs: u8 {
        const BOLD      = 1;
        const ITALIC    = 1 << 1;
        const UNDERLINE = 1 << 2;
    }
}

/// A maximal stretch of text with uniform attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub attrs: RunAttrs,
    pub text: String,
}

impl Run {
    #[must_use]
    pub fn new(text: &str, attrs: RunAttrs) -> Self {
        Self {
            attrs,
            text: text.to_string(),
        }
    }

    /// Length in chars.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Byte index of char `n` in `s`, or `s.len()` past the end.
fn byte_index(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// A styled paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub style: StyleId,
    runs: Vec<Run>,
}

impl Paragraph {
    /// An empty paragraph (zero runs).
    #[must_use]
    pub const fn new(style: StyleId) -> Self {
        Self {
            style,
            runs: Vec::new(),
        }
    }

    /// A paragraph holding one unstyled run.
    #[must_use]
    pub fn with_text(style: StyleId, text: &str) -> Self {
        let mut p = Self::new(style);
        p.push(text, RunAttrs::empty());
        p
    }

    /// Build from arbitrary runs, normalizing as they are added.
    #[must_use]
    pub fn from_runs(style: StyleId, runs: impl IntoIterator<Item = Run>) -> Self {
        let mut p = Self::new(style);
        for run in runs {
            p.push_run(run);
        }
        p
    }

    /// The normalized run list.
    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Append text with the given attributes.
    pub fn push(&mut self, text: &str, attrs: RunAttrs) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.attrs == attrs => last.text.push_str(text),
            _ => self.runs.push(Run::new(text, attrs)),
        }
    }

    /// Append a whole run, merging with the last one when attributes match.
    pub fn push_run(&mut self, run: Run) {
        if run.text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.attrs == run.attrs => last.text.push_str(&run.text),
            _ => self.runs.push(run),
        }
    }

    /// Length in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The plain text.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Every char paired with its attributes.
    pub fn chars(&self) -> impl Iterator<Item = (char, RunAttrs)> + '_ {
        self.runs
            .iter()
            .flat_map(|r| r.text.chars().map(move |c| (c, r.attrs)))
    }

    /// Whitespace-separated word count.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text().split_whitespace().count()
    }

    /// The attributes typing at `offset` inherits: those of the char before
    /// it, or of the first char when `offset` is 0.
    #[must_use]
    pub fn attrs_at(&self, offset: usize) -> RunAttrs {
        let index = offset.saturating_sub(1);
        self.chars()
            .nth(index)
            .or_else(|| self.chars().last())
            .map_or(RunAttrs::empty(), |(_, attrs)| attrs)
    }

    /// Split at `offset` (clamped), keeping the head and returning the tail
    /// as a paragraph of the same style.
    pub fn split_off(&mut self, offset: usize) -> Self {
        let mut remaining = offset;
        let mut idx = 0;
        while idx < self.runs.len() {
            let n = self.runs[idx].char_len();
            if remaining < n {
                break;
            }
            remaining -= n;
            idx += 1;
        }

        let tail = if idx >= self.runs.len() {
            Vec::new()
        } else if remaining == 0 {
            self.runs.split_off(idx)
        } else {
            let run = &mut self.runs[idx];
            let rest = run.text.split_off(byte_index(&run.text, remaining));
            let attrs = run.attrs;
            let mut tail = self.runs.split_off(idx + 1);
            tail.insert(0, Run { attrs, text: rest });
            tail
        };

        Self {
            style: self.style,
            runs: tail,
        }
    }

    /// Append another paragraph's runs. Its style is ignored.
    pub fn append(&mut self, other: Self) {
        for run in other.runs {
            self.push_run(run);
        }
    }

    /// Insert `text` with `attrs` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str, attrs: RunAttrs) {
        let tail = self.split_off(offset);
        self.push(text, attrs);
        self.append(tail);
    }

    /// Remove the chars in `[start, end)`.
    pub fn delete(&mut self, start: usize, end: usize) {
        let tail = self.split_off(end);
        drop(self.split_off(start));
        self.append(tail);
    }

    /// A copy of `[start, end)` with the same style.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let mut head = self.clone();
        drop(head.split_off(end));
        head.split_off(start)
    }

    /// Set or clear `attr` over `[start, end)`.
    pub fn set_attr(&mut self, start: usize, end: usize, attr: RunAttrs, value: bool) {
        let tail = self.split_off(end);
        let middle = self.split_off(start);
        for mut run in middle.runs {
            run.attrs.set(attr, value);
            self.push_run(run);
        }
        self.append(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn styled() -> Paragraph {
        Paragraph::from_runs(
            StyleId::P,
            [
                Run::new("Some ", RunAttrs::empty()),
                Run::new("bold", RunAttrs::BOLD),
                Run::new(" text", RunAttrs::empty()),
            ],
        )
    }

    #[test]
    fn from_runs_normalizes() {
        let p = Paragraph::from_runs(
            StyleId::P,
            [
                Run::new("a", RunAttrs::BOLD),
                Run::new("", RunAttrs::ITALIC),
                Run::new("b", RunAttrs::BOLD),
                Run::new("c", RunAttrs::empty()),
            ],
        );
        assert_eq!(
            p.runs(),
            &[Run::new("ab", RunAttrs::BOLD), Run::new("c", RunAttrs::empty())]
        );
    }

    #[test]
    fn empty_paragraph_has_no_runs() {
        let p = Paragraph::with_text(StyleId::H1, "");
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
        assert_eq!(p.runs().len(), 0);
    }

    #[test]
    fn len_counts_chars_not_bytes() {
        let p = Paragraph::with_text(StyleId::P, "héllo 中");
        assert_eq!(p.len(), 7);
    }

    #[test]
    fn split_inside_run() {
        let mut p = styled();
        let tail = p.split_off(7);
        assert_eq!(p.text(), "Some bo");
        assert_eq!(tail.text(), "ld text");
        assert_eq!(tail.runs()[0], Run::new("ld", RunAttrs::BOLD));
        assert_eq!(tail.style, StyleId::P);
    }

    #[test]
    fn split_on_run_boundary() {
        let mut p = styled();
        let tail = p.split_off(5);
        assert_eq!(p.runs(), &[Run::new("Some ", RunAttrs::empty())]);
        assert_eq!(tail.runs().len(), 2);
    }

    #[test]
    fn split_at_ends() {
        let mut p = styled();
        let tail = p.split_off(99);
        assert!(tail.is_empty());
        assert_eq!(p, styled());

        let tail = p.split_off(0);
        assert!(p.is_empty());
        assert_eq!(tail.text(), "Some bold text");
    }

    #[test]
    fn insert_inherits_nothing_by_itself() {
        let mut p = Paragraph::with_text(StyleId::P, "ac");
        p.insert(1, "b", RunAttrs::ITALIC);
        assert_eq!(
            p.runs(),
            &[
                Run::new("a", RunAttrs::empty()),
                Run::new("b", RunAttrs::ITALIC),
                Run::new("c", RunAttrs::empty()),
            ]
        );
    }

    #[test]
    fn delete_merges_neighbors() {
        let mut p = styled();
        p.delete(5, 9);
        assert_eq!(p.runs(), &[Run::new("Some  text", RunAttrs::empty())]);
    }

    #[test]
    fn slice_copies_range() {
        let p = styled();
        let s = p.slice(3, 7);
        assert_eq!(s.text(), "e bo");
        assert_eq!(
            s.runs(),
            &[Run::new("e ", RunAttrs::empty()), Run::new("bo", RunAttrs::BOLD)]
        );
    }

    #[test]
    fn set_attr_splits_and_merges() {
        let mut p = Paragraph::with_text(StyleId::P, "hello world");
        p.set_attr(0, 5, RunAttrs::ITALIC, true);
        assert_eq!(
            p.runs(),
            &[
                Run::new("hello", RunAttrs::ITALIC),
                Run::new(" world", RunAttrs::empty()),
            ]
        );
        p.set_attr(0, 11, RunAttrs::ITALIC, false);
        assert_eq!(p, Paragraph::with_text(StyleId::P, "hello world"));
    }

    #[test]
    fn attrs_at_uses_previous_char() {
        let p = styled();
        assert_eq!(p.attrs_at(0), RunAttrs::empty());
        assert_eq!(p.attrs_at(6), RunAttrs::BOLD);
        assert_eq!(p.attrs_at(9), RunAttrs::BOLD);
        assert_eq!(p.attrs_at(10), RunAttrs::empty());

        let bold = Paragraph::from_runs(StyleId::P, [Run::new("x", RunAttrs::BOLD)]);
        assert_eq!(bold.attrs_at(0), RunAttrs::BOLD);
        assert_eq!(Paragraph::new(StyleId::P).attrs_at(0), RunAttrs::empty());
    }

    #[test]
    fn word_count() {
        assert_eq!(styled().word_count(), 3);
        assert_eq!(Paragraph::new(StyleId::P).word_count(), 0);
    }
}
