//! Layout — wrapping paragraphs into display lines.
//!
//! Each paragraph is wrapped greedily into the width its style leaves
//! between the margins. Widths are measured per grapheme cluster with
//! `unicode-width`, so wide CJK text and combining marks line up with what
//! the terminal draws.
//!
//! Wrapping rules:
//!
//! - words are never split unless a single word is wider than the line, in
//!   which case it is broken at the last grapheme that fits;
//! - the spaces at a break hang off the end of the line and are not
//!   counted against the width;
//! - whitespace at the start of a paragraph is kept as indentation;
//! - an empty paragraph still occupies one line.
//!
//! Justification does not change where lines break. It is applied when a
//! line is placed ([`Layout::place`]), which shifts the line or stretches
//! its inter-word gaps.
//!
//! Wrapping results are kept per paragraph. [`Layout::update`] re-wraps
//! only the paragraphs an edit touched.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::document::Document;
use crate::paragraph::{Paragraph, RunAttrs};
use crate::position::Position;
use crate::style::{Justification, Numbering, Style, StyleId, StyleRegistry};

// ---------------------------------------------------------------------------
// Graphemes
// ---------------------------------------------------------------------------

/// A grapheme cluster with its char offset and display width.
#[derive(Debug, Clone, Copy)]
struct Grapheme<'a> {
    offset: usize,
    chars: usize,
    width: usize,
    space: bool,
    text: &'a str,
}

fn graphemes(text: &str) -> Vec<Grapheme<'_>> {
    let mut offset = 0;
    text.graphemes(true)
        .map(|g| {
            let chars = g.chars().count();
            let space = g.chars().all(char::is_whitespace);
            let width = if space {
                1
            } else {
                g.chars().filter_map(UnicodeWidthChar::width).sum::<usize>().min(2)
            };
            let item = Grapheme {
                offset,
                chars,
                width,
                space,
                text: g,
            };
            offset += chars;
            item
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Wrapping
// ---------------------------------------------------------------------------

/// One wrapped line of a paragraph, in char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    /// End of the visible content; hanging spaces lie in `content_end..end`.
    pub content_end: usize,
    pub end: usize,
    /// Display width of `start..content_end`.
    pub width: usize,
}

/// A maximal run of space or non-space graphemes, as indices into the
/// grapheme list.
struct Token {
    first: usize,
    last: usize,
    width: usize,
    space: bool,
}

fn tokenize(gs: &[Grapheme<'_>]) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for (i, g) in gs.iter().enumerate() {
        match tokens.last_mut() {
            Some(t) if t.space == g.space => {
                t.last = i;
                t.width += g.width;
            }
            _ => tokens.push(Token {
                first: i,
                last: i,
                width: g.width,
                space: g.space,
            }),
        }
    }
    // Leading whitespace is indentation, not a break opportunity.
    if let Some(first) = tokens.first_mut() {
        first.space = false;
    }
    tokens
}

/// Greedy word wrap of `text` into lines at most `avail` columns wide.
#[must_use]
pub fn wrap(text: &str, avail: usize) -> Vec<LineSpan> {
    let avail = avail.max(1);
    let gs = graphemes(text);
    let total = gs.last().map_or(0, |g| g.offset + g.chars);

    let mut lines = Vec::new();
    let mut start = 0;
    let mut content_end = 0;
    let mut width = 0;
    let mut has_content = false;
    let mut pending_space = 0;

    for token in tokenize(&gs) {
        if token.space {
            pending_space = token.width;
            continue;
        }
        let word_start = gs[token.first].offset;
        let word_end = gs[token.last].offset + gs[token.last].chars;

        if has_content && width + pending_space + token.width > avail {
            lines.push(LineSpan {
                start,
                content_end,
                end: word_start,
                width,
            });
            start = word_start;
            width = 0;
        } else if has_content {
            width += pending_space;
        }
        pending_space = 0;

        if token.width > avail {
            // Force-break: the word starts a fresh line and fills as many
            // lines as it needs.
            for g in &gs[token.first..=token.last] {
                if width > 0 && width + g.width > avail {
                    lines.push(LineSpan {
                        start,
                        content_end: g.offset,
                        end: g.offset,
                        width,
                    });
                    start = g.offset;
                    width = 0;
                }
                width += g.width;
            }
        } else {
            width += token.width;
        }
        content_end = word_end;
        has_content = true;
    }

    lines.push(LineSpan {
        start,
        content_end: content_end.max(start),
        end: total.max(start),
        width,
    });
    lines
}

/// Left indent and available width for a style at screen width `width`.
#[must_use]
pub fn geometry(width: u16, style: &Style) -> (usize, usize) {
    let width = usize::from(width);
    let indent = usize::from(style.left_margin).min(width.saturating_sub(1));
    let avail = width
        .saturating_sub(indent)
        .saturating_sub(usize::from(style.right_margin))
        .max(1);
    (indent, avail)
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// A display line in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutLine {
    pub paragraph: usize,
    pub start: usize,
    pub content_end: usize,
    pub end: usize,
    pub width: usize,
    /// First line of its paragraph.
    pub first: bool,
    /// Last line of its paragraph.
    pub last: bool,
}

/// One placed grapheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub col: u16,
    pub width: u16,
    /// Char offset in the paragraph.
    pub offset: usize,
    /// Chars in the grapheme.
    pub chars: usize,
    /// The char to draw (whitespace is drawn as a space).
    pub ch: char,
    pub attrs: RunAttrs,
}

/// A line ready to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    /// Column where the content starts.
    pub start_col: u16,
    pub glyphs: Vec<Glyph>,
    /// List marker and its column, on the first line of list items.
    pub label: Option<(u16, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParagraphLayout {
    style: StyleId,
    lines: Vec<LineSpan>,
}

/// Wrapped lines for a whole document at one screen width.
#[derive(Debug, Clone)]
pub struct Layout {
    width: u16,
    page_height: usize,
    paragraphs: Vec<ParagraphLayout>,
    lines: Vec<LayoutLine>,
    first_line: Vec<usize>,
    ordinals: Vec<Option<usize>>,
}

fn to_col(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

impl Layout {
    /// Lay out every paragraph of `doc` at `width` columns.
    /// `page_height` of 0 means no pagination.
    #[must_use]
    pub fn new(doc: &Document, styles: &StyleRegistry, width: u16, page_height: usize) -> Self {
        let mut layout = Self {
            width: width.max(1),
            page_height,
            paragraphs: Vec::new(),
            lines: Vec::new(),
            first_line: Vec::new(),
            ordinals: Vec::new(),
        };
        layout.relayout(doc, styles);
        layout
    }

    /// Re-wrap everything.
    pub fn relayout(&mut self, doc: &Document, styles: &StyleRegistry) {
        self.paragraphs = doc
            .paragraphs()
            .iter()
            .map(|p| self.wrap_paragraph(p, styles))
            .collect();
        self.reindex(styles);
    }

    /// Change the screen width; everything is re-wrapped.
    pub fn set_width(&mut self, doc: &Document, styles: &StyleRegistry, width: u16) {
        let width = width.max(1);
        if width != self.width {
            self.width = width;
            self.relayout(doc, styles);
        }
    }

    pub fn set_page_height(&mut self, page_height: usize) {
        self.page_height = page_height;
    }

    /// Re-wrap after an edit that rewrote `changed` (indices in the
    /// current document). Paragraphs outside the range keep their lines.
    pub fn update(&mut self, doc: &Document, styles: &StyleRegistry, changed: Range<usize>) {
        let new_total = doc.len();
        let old_total = self.paragraphs.len();
        let start = changed.start.min(new_total);
        let end = changed.end.clamp(start, new_total);

        let removed = (end - start + old_total).checked_sub(new_total);
        let Some(removed) = removed.filter(|r| start + r <= old_total) else {
            log::debug!("layout: inconsistent change {changed:?}, relaying out everything");
            self.relayout(doc, styles);
            return;
        };

        let fresh: Vec<ParagraphLayout> = doc.paragraphs()[start..end]
            .iter()
            .map(|p| self.wrap_paragraph(p, styles))
            .collect();
        log::trace!("layout: rewrap {start}..{end}, replacing {removed}");
        self.paragraphs.splice(start..start + removed, fresh);
        self.reindex(styles);
    }

    fn wrap_paragraph(&self, paragraph: &Paragraph, styles: &StyleRegistry) -> ParagraphLayout {
        let (_, avail) = geometry(self.width, styles.style(paragraph.style));
        ParagraphLayout {
            style: paragraph.style,
            lines: wrap(&paragraph.text(), avail),
        }
    }

    /// Rebuild the flat line list, paragraph index and list ordinals.
    fn reindex(&mut self, styles: &StyleRegistry) {
        self.lines.clear();
        self.first_line.clear();
        self.ordinals.clear();

        let mut counter = 0;
        let mut previous: Option<StyleId> = None;
        for (index, para) in self.paragraphs.iter().enumerate() {
            self.first_line.push(self.lines.len());
            let n = para.lines.len();
            self.lines.extend(para.lines.iter().enumerate().map(|(i, span)| LayoutLine {
                paragraph: index,
                start: span.start,
                content_end: span.content_end,
                end: span.end,
                width: span.width,
                first: i == 0,
                last: i + 1 == n,
            }));

            let ordinal = if styles.style(para.style).numbering == Numbering::Number {
                counter = if previous == Some(para.style) { counter + 1 } else { 1 };
                Some(counter)
            } else {
                None
            };
            self.ordinals.push(ordinal);
            previous = Some(para.style);
        }
    }

    // -- Queries ------------------------------------------------------------

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn page_height(&self) -> usize {
        self.page_height
    }

    #[must_use]
    pub fn lines(&self) -> &[LayoutLine] {
        &self.lines
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Layout line indices of paragraph `index`.
    #[must_use]
    pub fn lines_of(&self, index: usize) -> Range<usize> {
        let Some(&start) = self.first_line.get(index) else {
            return self.lines.len()..self.lines.len();
        };
        let end = self.first_line.get(index + 1).copied().unwrap_or(self.lines.len());
        start..end
    }

    /// The list number of paragraph `index`, for numbered styles.
    #[must_use]
    pub fn ordinal(&self, index: usize) -> Option<usize> {
        self.ordinals.get(index).copied().flatten()
    }

    /// The page a layout line falls on (0-based).
    #[must_use]
    pub const fn page_of_line(&self, line: usize) -> usize {
        if self.page_height == 0 { 0 } else { line / self.page_height }
    }

    /// Number of pages (at least 1).
    #[must_use]
    pub const fn page_count(&self) -> usize {
        if self.page_height == 0 {
            1
        } else {
            let n = self.lines.len().div_ceil(self.page_height);
            if n == 0 { 1 } else { n }
        }
    }

    // -- Placement ----------------------------------------------------------

    /// Place layout line `row`: columns for every visible grapheme, with
    /// the style's justification applied, plus the list label.
    #[must_use]
    pub fn place(&self, doc: &Document, styles: &StyleRegistry, row: usize) -> PlacedLine {
        let empty = PlacedLine {
            start_col: 0,
            glyphs: Vec::new(),
            label: None,
        };
        let Some(line) = self.lines.get(row) else {
            return empty;
        };
        let Some(para) = doc.paragraph(line.paragraph) else {
            return empty;
        };
        let style = styles.style(para.style);
        let (indent, avail) = geometry(self.width, style);
        let slack = avail.saturating_sub(line.width);

        let (x0, stretch) = match style.justification {
            Justification::Left => (indent, 0),
            Justification::Right => (indent + slack, 0),
            Justification::Center => (indent + slack / 2, 0),
            Justification::Full if !line.last => (indent, slack),
            Justification::Full => (indent, 0),
        };

        let text = para.text();
        let attrs: Vec<RunAttrs> = para.chars().map(|(_, a)| a).collect();
        let visible: Vec<Grapheme<'_>> = graphemes(&text)
            .into_iter()
            .filter(|g| g.offset >= line.start && g.offset < line.content_end)
            .collect();

        // Inter-word gaps: space runs after the first word.
        let mut gaps = 0;
        let mut seen_word = false;
        for pair in visible.windows(2) {
            seen_word |= !pair[0].space;
            if seen_word && pair[0].space && !pair[1].space {
                gaps += 1;
            }
        }
        let (base, mut extra) = if gaps > 0 { (stretch / gaps, stretch % gaps) } else { (0, 0) };

        let mut glyphs = Vec::with_capacity(visible.len());
        let mut col = x0;
        seen_word = false;
        for (i, g) in visible.iter().enumerate() {
            let ch = if g.space {
                ' '
            } else {
                g.text.chars().next().unwrap_or(' ')
            };
            glyphs.push(Glyph {
                col: to_col(col),
                width: to_col(g.width),
                offset: g.offset,
                chars: g.chars,
                ch,
                attrs: attrs.get(g.offset).copied().unwrap_or_default(),
            });
            col += g.width;
            seen_word |= !g.space;
            let gap_ends = visible.get(i + 1).is_some_and(|next| !next.space);
            if seen_word && g.space && gap_ends {
                col += base;
                if extra > 0 {
                    col += 1;
                    extra -= 1;
                }
            }
        }

        let label = if line.first {
            let marker = match style.numbering {
                Numbering::None => None,
                Numbering::Bullet => Some("\u{2022}".to_string()),
                Numbering::Number => self.ordinal(line.paragraph).map(|n| format!("{n}.")),
            };
            marker.map(|m| {
                let w = m.chars().filter_map(UnicodeWidthChar::width).sum::<usize>();
                (to_col(indent.saturating_sub(w + 1)), m)
            })
        } else {
            None
        };

        PlacedLine {
            start_col: to_col(x0),
            glyphs,
            label,
        }
    }

    /// The layout row and screen column of `pos` (clamped into `doc`).
    #[must_use]
    pub fn position_to_screen(
        &self,
        doc: &Document,
        styles: &StyleRegistry,
        pos: Position,
    ) -> (usize, u16) {
        let pos = doc.clamp(pos);
        let rows = self.lines_of(pos.paragraph);
        if rows.is_empty() {
            return (0, 0);
        }
        let row = rows
            .clone()
            .rev()
            .find(|&r| self.lines[r].start <= pos.offset)
            .unwrap_or(rows.start);

        let placed = self.place(doc, styles, row);
        let col = placed
            .glyphs
            .iter()
            .find(|g| g.offset + g.chars > pos.offset)
            .map_or_else(
                || placed.glyphs.last().map_or(placed.start_col, |g| g.col + g.width),
                |g| g.col,
            );
        (row, col.min(self.width.saturating_sub(1)))
    }

    /// The document position under layout row `row`, column `col`.
    #[must_use]
    pub fn screen_to_position(
        &self,
        doc: &Document,
        styles: &StyleRegistry,
        row: usize,
        col: u16,
    ) -> Position {
        let Some(last_row) = self.lines.len().checked_sub(1) else {
            return Position::ZERO;
        };
        let row = row.min(last_row);
        let line = self.lines[row];
        let placed = self.place(doc, styles, row);

        if let Some(g) = placed.glyphs.iter().find(|g| col < g.col + g.width) {
            return Position::new(line.paragraph, g.offset);
        }
        let offset = if line.last {
            doc.paragraph(line.paragraph).map_or(0, Paragraph::len)
        } else {
            line.content_end
        };
        Position::new(line.paragraph, offset)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paragraph::Run;
    use pretty_assertions::assert_eq;

    fn spans(text: &str, avail: usize) -> Vec<(usize, usize, usize)> {
        wrap(text, avail)
            .iter()
            .map(|l| (l.start, l.content_end, l.width))
            .collect()
    }

    fn layout_of(lines: &[&str], width: u16) -> (Document, StyleRegistry, Layout) {
        let doc = Document::from_text(&lines.join("\n"));
        let styles = StyleRegistry::builtin();
        let layout = Layout::new(&doc, &styles, width, 0);
        (doc, styles, layout)
    }

    fn row_text(placed: &PlacedLine) -> String {
        let mut out = String::new();
        let mut col = 0;
        for g in &placed.glyphs {
            while col < g.col {
                out.push(' ');
                col += 1;
            }
            out.push(g.ch);
            col += g.width;
        }
        out
    }

    // -- wrap ---------------------------------------------------------------

    #[test]
    fn wrap_breaks_between_words() {
        assert_eq!(spans("hello world foo", 11), vec![(0, 11, 11), (12, 15, 3)]);
    }

    #[test]
    fn wrap_hangs_trailing_spaces() {
        let lines = wrap("aaa   bbb", 5);
        assert_eq!(lines[0].content_end, 3);
        assert_eq!(lines[0].end, 6);
        assert_eq!(lines[0].width, 3);
        assert_eq!(lines[1].start, 6);
    }

    #[test]
    fn wrap_force_breaks_long_word() {
        assert_eq!(spans("abcdefghijkl", 8), vec![(0, 8, 8), (8, 12, 4)]);
    }

    #[test]
    fn wrap_long_word_after_short_one() {
        assert_eq!(spans("ab abcdefghij", 4), vec![(0, 2, 2), (3, 7, 4), (7, 11, 4), (11, 13, 2)]);
    }

    #[test]
    fn wrap_empty_paragraph_is_one_line() {
        assert_eq!(spans("", 10), vec![(0, 0, 0)]);
    }

    #[test]
    fn wrap_keeps_leading_indent() {
        assert_eq!(spans("    code", 20), vec![(0, 8, 8)]);
    }

    #[test]
    fn wrap_measures_wide_chars() {
        assert_eq!(spans("中文字", 5), vec![(0, 2, 4), (2, 3, 2)]);
    }

    #[test]
    fn wrap_never_exceeds_available_width() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        for avail in 1..30 {
            for line in wrap(text, avail) {
                assert!(line.width <= avail, "width {} > {avail}", line.width);
            }
        }
    }

    #[test]
    fn wrap_covers_all_text() {
        let text = "one two  three   four";
        let lines = wrap(text, 7);
        assert_eq!(lines[0].start, 0);
        for pair in lines.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(lines.last().unwrap().end, text.chars().count());
    }

    // -- Layout -------------------------------------------------------------

    #[test]
    fn body_paragraph_long_word_at_width_eight() {
        let (_, _, layout) = layout_of(&["abcdefghijkl"], 8);
        let widths: Vec<usize> = layout.lines().iter().map(|l| l.width).collect();
        assert_eq!(widths, [8, 4]);
        assert!(layout.lines()[0].first && !layout.lines()[0].last);
        assert!(layout.lines()[1].last);
    }

    #[test]
    fn margins_narrow_the_line() {
        let mut doc = Document::from_text("aaa bbb ccc ddd");
        doc.set_paragraph_style(0, StyleId::Q).unwrap();
        let styles = StyleRegistry::builtin();
        // Q has 4+4 margins: 16 columns leave 8.
        let layout = Layout::new(&doc, &styles, 16, 0);
        assert_eq!(layout.line_count(), 2);
        let placed = layout.place(&doc, &styles, 0);
        assert_eq!(placed.start_col, 4);
        assert_eq!(row_text(&placed), "    aaa bbb");
    }

    #[test]
    fn lines_of_and_paragraph_index() {
        let (_, _, layout) = layout_of(&["one two three", "", "four"], 6);
        assert_eq!(layout.lines_of(0), 0..3);
        assert_eq!(layout.lines_of(1), 3..4);
        assert_eq!(layout.lines_of(2), 4..5);
        assert_eq!(layout.lines_of(9), 5..5);
    }

    #[test]
    fn centered_and_right_aligned() {
        let mut doc = Document::from_text("abcd\nabcd");
        doc.set_paragraph_style(0, StyleId::CENTER).unwrap();
        doc.set_paragraph_style(1, StyleId::RIGHT).unwrap();
        let styles = StyleRegistry::builtin();
        let layout = Layout::new(&doc, &styles, 10, 0);
        assert_eq!(layout.place(&doc, &styles, 0).start_col, 3);
        assert_eq!(layout.place(&doc, &styles, 1).start_col, 6);
    }

    #[test]
    fn full_justification_stretches_all_but_last_line() {
        let mut doc = Document::from_text("aa bb cc dd");
        let mut styles = StyleRegistry::builtin();
        let full = styles.register(
            Style::new("J", "justified", crate::style::StyleKind::Body)
                .justified(Justification::Full),
        );
        doc.set_paragraph_style(0, full).unwrap();
        let layout = Layout::new(&doc, &styles, 10, 0);
        assert_eq!(layout.line_count(), 2);
        assert_eq!(row_text(&layout.place(&doc, &styles, 0)), "aa  bb  cc");
        assert_eq!(row_text(&layout.place(&doc, &styles, 1)), "dd");
    }

    #[test]
    fn glyphs_carry_run_attributes() {
        let doc = Document::from_paragraphs(vec![Paragraph::from_runs(
            StyleId::P,
            [Run::new("a", RunAttrs::empty()), Run::new("b", RunAttrs::BOLD)],
        )]);
        let styles = StyleRegistry::builtin();
        let layout = Layout::new(&doc, &styles, 10, 0);
        let placed = layout.place(&doc, &styles, 0);
        assert_eq!(placed.glyphs[1].attrs, RunAttrs::BOLD);
        assert_eq!(placed.glyphs[1].ch, 'b');
    }

    #[test]
    fn list_labels_and_ordinals() {
        let mut doc = Document::from_text("one\ntwo\nbreak\nthree\nbullet");
        for i in [0, 1, 3] {
            doc.set_paragraph_style(i, StyleId::LN).unwrap();
        }
        doc.set_paragraph_style(4, StyleId::LB).unwrap();
        let styles = StyleRegistry::builtin();
        let layout = Layout::new(&doc, &styles, 20, 0);

        assert_eq!(layout.ordinal(0), Some(1));
        assert_eq!(layout.ordinal(1), Some(2));
        assert_eq!(layout.ordinal(2), None);
        assert_eq!(layout.ordinal(3), Some(1));

        assert_eq!(layout.place(&doc, &styles, 1).label, Some((1, "2.".to_string())));
        assert_eq!(layout.place(&doc, &styles, 4).label, Some((0, "\u{2022}".to_string())));
        assert_eq!(layout.place(&doc, &styles, 2).label, None);
    }

    #[test]
    fn pagination() {
        let (doc, styles, mut layout) = layout_of(&["a", "b", "c", "d", "e"], 10);
        assert_eq!(layout.page_count(), 1);
        layout.set_page_height(2);
        assert_eq!(layout.page_count(), 3);
        assert_eq!(layout.page_of_line(3), 1);
        assert_eq!(layout.page_of_line(4), 2);
        layout.set_width(&doc, &styles, 1);
        assert_eq!(layout.width(), 1);
    }

    // -- Incremental --------------------------------------------------------

    #[test]
    fn update_matches_full_relayout() {
        let (mut doc, styles, mut layout) =
            layout_of(&["alpha beta gamma", "delta", "epsilon zeta eta theta"], 8);

        let d = doc.insert_text(Position::new(1, 5), " and more words\nsplit").unwrap();
        layout.update(&doc, &styles, d.changed());
        assert_eq!(layout.lines(), Layout::new(&doc, &styles, 8, 0).lines());

        let end = doc.end();
        let d = doc.delete_range(Position::new(0, 3), end).unwrap();
        layout.update(&doc, &styles, d.changed());
        assert_eq!(layout.lines(), Layout::new(&doc, &styles, 8, 0).lines());
        assert_eq!(layout.line_count(), 1);
    }

    #[test]
    fn update_with_stale_range_falls_back() {
        let (mut doc, styles, mut layout) = layout_of(&["a", "b"], 8);
        doc.split_paragraph(Position::new(1, 1)).unwrap();
        doc.split_paragraph(Position::new(0, 1)).unwrap();
        layout.update(&doc, &styles, 9..12);
        assert_eq!(layout.lines(), Layout::new(&doc, &styles, 8, 0).lines());
    }

    // -- Position mapping ---------------------------------------------------

    #[test]
    fn position_to_screen_follows_wraps() {
        let (doc, styles, layout) = layout_of(&["hello world", "x"], 8);
        assert_eq!(layout.position_to_screen(&doc, &styles, Position::new(0, 0)), (0, 0));
        assert_eq!(layout.position_to_screen(&doc, &styles, Position::new(0, 4)), (0, 4));
        assert_eq!(layout.position_to_screen(&doc, &styles, Position::new(0, 6)), (1, 0));
        assert_eq!(layout.position_to_screen(&doc, &styles, Position::new(0, 11)), (1, 5));
        assert_eq!(layout.position_to_screen(&doc, &styles, Position::new(1, 1)), (2, 1));
    }

    #[test]
    fn position_in_hanging_space_stays_on_line() {
        let (doc, styles, layout) = layout_of(&["hello world"], 8);
        assert_eq!(layout.position_to_screen(&doc, &styles, Position::new(0, 5)), (0, 5));
    }

    #[test]
    fn screen_to_position_inverts() {
        let (doc, styles, layout) = layout_of(&["hello world", "x"], 8);
        for offset in 0..=11 {
            let pos = Position::new(0, offset);
            let (row, col) = layout.position_to_screen(&doc, &styles, pos);
            if offset == 5 {
                continue;
            }
            assert_eq!(layout.screen_to_position(&doc, &styles, row, col), pos);
        }
        assert_eq!(layout.screen_to_position(&doc, &styles, 0, 7), Position::new(0, 5));
        assert_eq!(layout.screen_to_position(&doc, &styles, 2, 9), Position::new(1, 1));
        assert_eq!(layout.screen_to_position(&doc, &styles, 99, 0), Position::new(1, 0));
    }

    #[test]
    fn wide_chars_map_to_their_first_column() {
        let (doc, styles, layout) = layout_of(&["a中b"], 10);
        assert_eq!(layout.position_to_screen(&doc, &styles, Position::new(0, 2)), (0, 3));
        assert_eq!(layout.screen_to_position(&doc, &styles, 0, 2), Position::new(0, 1));
    }
}
