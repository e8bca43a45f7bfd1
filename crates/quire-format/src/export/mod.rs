//! Exporters, one module per format, plus what they share: mapping a
//! paragraph style onto the block kinds the formats know, grouping
//! consecutive paragraphs of one kind, and turning runs into properly
//! nested emphasis markers.

pub mod html;
pub mod latex;
pub mod markdown;
pub mod odt;
pub mod org;
pub mod text;
pub mod troff;

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, Run, RunAttrs};
use quire_editor::style::{Justification, Numbering, StyleId, StyleKind, StyleRegistry};

/// The block kinds exporters distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Block {
    Heading(u8),
    Body,
    Center,
    Right,
    Quote,
    Verse,
    Pre,
    Bullet,
    Number,
    /// List item without a marker.
    Plain,
}

impl Block {
    pub(crate) fn classify(style: StyleId, styles: &StyleRegistry) -> Self {
        let style = styles.style(style);
        match style.kind {
            StyleKind::Heading(level) => Self::Heading(level),
            StyleKind::Quote => Self::Quote,
            StyleKind::Verse => Self::Verse,
            StyleKind::Preformatted => Self::Pre,
            StyleKind::ListItem => match style.numbering {
                Numbering::Bullet => Self::Bullet,
                Numbering::Number => Self::Number,
                Numbering::None => Self::Plain,
            },
            StyleKind::Body => match style.justification {
                Justification::Center => Self::Center,
                Justification::Right => Self::Right,
                Justification::Left | Justification::Full => Self::Body,
            },
        }
    }
}

/// Maximal stretches of consecutive paragraphs sharing a block kind.
pub(crate) fn groups<'a>(doc: &'a Document, styles: &StyleRegistry) -> Vec<(Block, &'a [Paragraph])> {
    let paragraphs = doc.paragraphs();
    let mut out: Vec<(Block, &[Paragraph])> = Vec::new();
    let mut start = 0;
    for i in 1..=paragraphs.len() {
        let block = Block::classify(paragraphs[start].style, styles);
        let same = paragraphs
            .get(i)
            .is_some_and(|p| Block::classify(p.style, styles) == block);
        if !same {
            out.push((block, &paragraphs[start..i]));
            start = i;
        }
    }
    out
}

/// Runs with the attributes of whitespace next to an attribute change
/// narrowed to what both sides share, so markup never opens or closes
/// against a space.
pub(crate) fn tidy_runs(runs: &[Run], keep: RunAttrs) -> Vec<Run> {
    let chars: Vec<(char, RunAttrs)> = runs
        .iter()
        .flat_map(|r| r.text.chars().map(move |c| (c, r.attrs & keep)))
        .collect();
    let mut attrs: Vec<RunAttrs> = chars.iter().map(|(_, a)| *a).collect();

    let mut i = 0;
    while i < chars.len() {
        if !chars[i].0.is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].0.is_whitespace() {
            i += 1;
        }
        let left = start.checked_sub(1).map_or(RunAttrs::empty(), |p| chars[p].1);
        let right = chars.get(i).map_or(RunAttrs::empty(), |c| c.1);
        for a in &mut attrs[start..i] {
            *a &= left & right;
        }
    }

    let mut out = Paragraph::new(StyleId::P);
    let mut buf = [0; 4];
    for ((c, _), a) in chars.iter().zip(attrs) {
        out.push(c.encode_utf8(&mut buf), a);
    }
    out.runs().to_vec()
}

/// A piece of inline output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Open(RunAttrs),
    Close(RunAttrs),
    Text(String),
}

/// Turn runs into properly nested open/close markers. Attributes that
/// last longer open first; one that ends while a later one is still on
/// closes the later one and reopens it.
pub(crate) fn emphasis(runs: &[Run]) -> Vec<Token> {
    const FLAGS: [RunAttrs; 3] = [RunAttrs::BOLD, RunAttrs::ITALIC, RunAttrs::UNDERLINE];

    let mut tokens = Vec::new();
    let mut stack: Vec<RunAttrs> = Vec::new();

    for (i, run) in runs.iter().enumerate() {
        if let Some(depth) = stack.iter().position(|f| !run.attrs.contains(*f)) {
            let popped = stack.split_off(depth);
            tokens.extend(popped.iter().rev().map(|f| Token::Close(*f)));
        }

        let extent = |flag: RunAttrs| -> usize {
            runs[i..]
                .iter()
                .take_while(|r| r.attrs.contains(flag))
                .map(Run::char_len)
                .sum()
        };
        let mut opening: Vec<RunAttrs> = FLAGS
            .into_iter()
            .filter(|f| run.attrs.contains(*f) && !stack.contains(f))
            .collect();
        // Stable sort keeps bold before italic before underline on ties.
        opening.sort_by_key(|f| std::cmp::Reverse(extent(*f)));
        for flag in opening {
            tokens.push(Token::Open(flag));
            stack.push(flag);
        }

        tokens.push(Token::Text(run.text.clone()));
    }
    tokens.extend(stack.iter().rev().map(|f| Token::Close(*f)));
    tokens
}

/// A char XML 1.0 allows in a document.
pub(crate) const fn xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | ' '..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
}

/// Escape the XML specials; `quotes` also escapes `"` for attribute values.
/// Chars XML cannot carry at all are dropped.
pub(crate) fn xml_escape(text: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ if !xml_char(c) => debug!("xml: dropping {c:?}"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const B: RunAttrs = RunAttrs::BOLD;
    const I: RunAttrs = RunAttrs::ITALIC;

    fn runs(spec: &[(&str, RunAttrs)]) -> Vec<Run> {
        spec.iter().map(|(t, a)| Run::new(t, *a)).collect()
    }

    #[test]
    fn classify_builtins() {
        let styles = StyleRegistry::builtin();
        let kinds: Vec<Block> = [
            StyleId::P,
            StyleId::H3,
            StyleId::Q,
            StyleId::V,
            StyleId::PRE,
            StyleId::L,
            StyleId::LB,
            StyleId::LN,
            StyleId::CENTER,
            StyleId::RIGHT,
        ]
        .into_iter()
        .map(|s| Block::classify(s, &styles))
        .collect();
        assert_eq!(
            kinds,
            [
                Block::Body,
                Block::Heading(3),
                Block::Quote,
                Block::Verse,
                Block::Pre,
                Block::Plain,
                Block::Bullet,
                Block::Number,
                Block::Center,
                Block::Right,
            ]
        );
    }

    #[test]
    fn groups_consecutive_kinds() {
        let styles = StyleRegistry::builtin();
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text(StyleId::LB, "a"),
            Paragraph::with_text(StyleId::LB, "b"),
            Paragraph::with_text(StyleId::P, "c"),
            Paragraph::with_text(StyleId::LB, "d"),
        ]);
        let shape: Vec<(Block, usize)> = groups(&doc, &styles).iter().map(|(b, ps)| (*b, ps.len())).collect();
        assert_eq!(shape, [(Block::Bullet, 2), (Block::Body, 1), (Block::Bullet, 1)]);
    }

    #[test]
    fn boundary_whitespace_is_narrowed() {
        let tidy = tidy_runs(&runs(&[("a ", B), ("b", RunAttrs::empty()), (" c d ", I)]), B | I);
        assert_eq!(tidy, runs(&[("a", B), (" b ", RunAttrs::empty()), ("c d", I), (" ", RunAttrs::empty())]));
    }

    #[test]
    fn emphasis_nests_by_extent() {
        use Token::{Close, Open, Text};
        assert_eq!(
            emphasis(&runs(&[("a", B), ("b", B | I), ("c", I)])),
            [
                Open(B),
                Text("a".into()),
                Open(I),
                Text("b".into()),
                Close(I),
                Close(B),
                Open(I),
                Text("c".into()),
                Close(I),
            ]
        );
        assert_eq!(
            emphasis(&runs(&[("x", B | I), ("y", I)])),
            [Open(I), Open(B), Text("x".into()), Close(B), Text("y".into()), Close(I)]
        );
    }

    #[test]
    fn escapes_xml() {
        assert_eq!(xml_escape("a<b & \"c\">", false), "a&lt;b &amp; \"c\"&gt;");
        assert_eq!(xml_escape("\"", true), "&quot;");
    }

    #[test]
    fn drops_chars_xml_forbids() {
        assert_eq!(xml_escape("a\u{1}b\u{1f}\tc\u{ffff}", false), "ab\tc");
        assert!(xml_char('\u{fffd}'));
        assert!(xml_char('\u{1f600}'));
        assert!(!xml_char('\u{0}'));
    }
}
