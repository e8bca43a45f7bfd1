//! Org import.
//!
//! Blocks: `*` headlines, `-`/`+` and numbered list items, `#+BEGIN_X`
//! blocks (QUOTE, VERSE, EXAMPLE, SRC, CENTER), `#+TITLE:` as a level one
//! heading. Other keywords and comments are dropped. Inside verse and
//! example blocks every line is its own paragraph.
//!
//! Inline: `*bold*`, `/italic/` and `_underline_` follow org's rules for
//! the chars allowed before an opening and after a closing marker;
//! `=verbatim=` and `~code~` are copied through untouched. The entities
//! `\ast{}`, `\slash{}`, `\under{}`, `\plus{}`, `\hash{}` and
//! `\backslash{}` decode to their chars. Example lines lose one leading
//! comma when it guards a `*` or `#+`.

use quire_editor::document::Document;
use quire_editor::paragraph::{Run, RunAttrs};
use quire_editor::style::StyleId;
use regex::Regex;

use crate::ConvertError;
use crate::builder::DocumentBuilder;
use crate::inline::Inline;

/// Entities the exporter writes for chars org could read as markup.
pub(crate) const ENTITIES: [(&str, char); 6] = [
    ("\\ast{}", '*'),
    ("\\slash{}", '/'),
    ("\\under{}", '_'),
    ("\\plus{}", '+'),
    ("\\hash{}", '#'),
    ("\\backslash{}", '\\'),
];

/// `s` occurs in `chars` at `at`.
pub(crate) fn starts_with_at(chars: &[char], at: usize, s: &str) -> bool {
    chars
        .get(at..)
        .is_some_and(|rest| rest.iter().copied().take(s.chars().count()).eq(s.chars()))
}

/// An example line org would read as structure unless comma-quoted.
pub(crate) fn needs_comma(line: &str) -> bool {
    let line = line.trim_start().trim_start_matches(',');
    line.starts_with('*') || line.starts_with("#+")
}

const MARKERS: [char; 3] = ['*', '/', '_'];

/// May precede an opening marker.
pub(crate) fn opens_after(c: Option<char>) -> bool {
    c.is_none_or(|c| c.is_whitespace() || "-({'\"".contains(c) || MARKERS.contains(&c))
}

/// May follow a closing marker.
pub(crate) fn closes_before(c: Option<char>) -> bool {
    c.is_none_or(|c| c.is_whitespace() || "-.,;:!?')}[\"\\".contains(c) || MARKERS.contains(&c))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Quote,
    Verse,
    Example,
    Center,
    Other,
}

struct Patterns {
    headline: Regex,
    bullet: Regex,
    ordered: Regex,
    begin: Regex,
    end: Regex,
    title: Regex,
}

impl Patterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            headline: Regex::new(r"^(\*+)[ \t]+(.*)$")?,
            bullet: Regex::new(r"^[ \t]*[-+][ \t]+(.*)$")?,
            ordered: Regex::new(r"^[ \t]*\d+[.)][ \t]+(.*)$")?,
            begin: Regex::new(r"(?i)^[ \t]*#\+begin_(\w+)")?,
            end: Regex::new(r"(?i)^[ \t]*#\+end_(\w+)")?,
            title: Regex::new(r"(?i)^#\+title:[ \t]*(.*)$")?,
        })
    }
}

struct Scanner {
    patterns: Patterns,
    builder: DocumentBuilder,
    pending: Option<(StyleId, String)>,
    block: Option<Block>,
}

impl Scanner {
    fn flush(&mut self) {
        if let Some((style, text)) = self.pending.take() {
            self.emit(style, &text);
        }
    }

    fn emit(&mut self, style: StyleId, text: &str) {
        self.builder.start(style);
        self.builder.push_runs(inline(text));
        self.builder.end();
    }

    fn begin(&mut self, style: StyleId, text: &str) {
        self.flush();
        self.pending = Some((style, text.trim().to_string()));
    }

    fn body_style(&self) -> StyleId {
        match self.block {
            Some(Block::Quote) => StyleId::Q,
            Some(Block::Center) => StyleId::CENTER,
            _ => StyleId::P,
        }
    }

    fn line(&mut self, line: &str) {
        if let Some(block) = self.block {
            if self.patterns.end.is_match(line) {
                self.flush();
                self.block = None;
                return;
            }
            match block {
                Block::Example => {
                    let text = line
                        .strip_prefix(',')
                        .filter(|rest| needs_comma(rest))
                        .unwrap_or(line);
                    self.builder.start(StyleId::PRE);
                    self.builder.push(text, RunAttrs::empty());
                    self.builder.end();
                    return;
                }
                Block::Verse => {
                    if !line.trim().is_empty() {
                        self.emit(StyleId::V, line.trim());
                    }
                    return;
                }
                Block::Quote | Block::Center | Block::Other => {}
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.flush();
            return;
        }

        if let Some(caps) = self.patterns.begin.captures(line) {
            self.flush();
            self.block = Some(match caps[1].to_ascii_lowercase().as_str() {
                "quote" => Block::Quote,
                "verse" => Block::Verse,
                "example" | "src" => Block::Example,
                "center" => Block::Center,
                _ => Block::Other,
            });
            return;
        }

        if let Some(caps) = self.patterns.title.captures(line) {
            let title = caps[1].to_string();
            self.begin(StyleId::heading(1), &title);
            self.flush();
            return;
        }

        if trimmed.starts_with("#+") || trimmed == "#" || trimmed.starts_with("# ") {
            return;
        }

        if self.block.is_none() {
            if let Some(caps) = self.patterns.headline.captures(line) {
                let level = u8::try_from(caps[1].len()).unwrap_or(6);
                let text = caps[2].to_string();
                self.begin(StyleId::heading(level), &text);
                self.flush();
                return;
            }
        }

        if let Some(caps) = self.patterns.bullet.captures(line) {
            let text = caps[1].to_string();
            self.begin(StyleId::LB, &text);
            return;
        }

        if let Some(caps) = self.patterns.ordered.captures(line) {
            let text = caps[1].to_string();
            self.begin(StyleId::LN, &text);
            return;
        }

        match &mut self.pending {
            Some((_, text)) => {
                text.push(' ');
                text.push_str(trimmed);
            }
            None => {
                let style = self.body_style();
                self.begin(style, trimmed);
            }
        }
    }
}

/// Resolve one paragraph's inline markup.
pub(crate) fn inline(text: &str) -> Vec<Run> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Inline::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        if c == '\\' {
            if let Some((entity, ch)) = ENTITIES.iter().find(|(e, _)| starts_with_at(&chars, i, e)) {
                out.push(*ch);
                i += entity.chars().count();
                continue;
            }
        }

        if (c == '=' || c == '~') && opens_after(prev) && next.is_some_and(|n| !n.is_whitespace()) {
            if let Some(end) = verbatim_end(&chars, i) {
                let span: String = chars[i..=end].iter().collect();
                out.text(&span);
                i = end + 1;
                continue;
            }
        }

        if MARKERS.contains(&c) {
            let can_close = prev.is_some_and(|p| !p.is_whitespace()) && closes_before(next);
            if can_close && out.top().is_some_and(|o| o.marker == c) {
                out.close();
                i += 1;
                continue;
            }
            let can_open = opens_after(prev) && next.is_some_and(|n| !n.is_whitespace());
            if can_open {
                let attrs = match c {
                    '*' => RunAttrs::BOLD,
                    '/' => RunAttrs::ITALIC,
                    _ => RunAttrs::UNDERLINE,
                };
                out.open(c, &c.to_string(), attrs);
                i += 1;
                continue;
            }
        }

        out.push(c);
        i += 1;
    }
    out.finish()
}

fn verbatim_end(chars: &[char], start: usize) -> Option<usize> {
    let marker = chars[start];
    (start + 2..chars.len()).find(|&j| {
        chars[j] == marker
            && !chars[j - 1].is_whitespace()
            && closes_before(chars.get(j + 1).copied())
    })
}

pub fn import(bytes: &[u8]) -> Result<Document, ConvertError> {
    let text = super::decode(bytes);
    let mut scanner = Scanner {
        patterns: Patterns::new()?,
        builder: DocumentBuilder::new(),
        pending: None,
        block: None,
    };
    for line in text.lines() {
        scanner.line(line);
    }
    scanner.flush();
    Ok(scanner.builder.build())
}
