//! Markdown import.
//!
//! Blocks: ATX and setext headings, paragraphs separated by blank lines
//! (soft line breaks become spaces), `-`/`*`/`+` bullets, `N.`/`N)`
//! numbered items, `>` quotes, fenced and indented code (one preformatted
//! paragraph per line). Thematic breaks are dropped.
//!
//! Inline: `*`/`_` delimiter runs resolve against a marker stack. A closer
//! consumes from the innermost opener only: two chars make bold, one makes
//! italic. Backslash escapes any ASCII punctuation, and code spans are kept
//! as literal text without their backticks.

use quire_editor::document::Document;
use quire_editor::paragraph::RunAttrs;
use quire_editor::style::StyleId;
use regex::Regex;

use crate::ConvertError;
use crate::builder::DocumentBuilder;
use crate::inline::Inline;

struct Patterns {
    atx: Regex,
    setext: Regex,
    thematic: Regex,
    bullet: Regex,
    ordered: Regex,
    fence: Regex,
}

impl Patterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            atx: Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$")?,
            setext: Regex::new(r"^ {0,3}(=+|-+)[ \t]*$")?,
            thematic: Regex::new(r"^ {0,3}(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$")?,
            bullet: Regex::new(r"^ {0,3}[-*+](?:[ \t]+(.*))?$")?,
            ordered: Regex::new(r"^ {0,3}\d{1,9}[.)](?:[ \t]+(.*))?$")?,
            fence: Regex::new(r"^ {0,3}(`{3,}|~{3,})")?,
        })
    }
}

/// A paragraph being gathered from source lines.
struct Pending {
    style: StyleId,
    text: String,
}

struct Scanner {
    patterns: Patterns,
    builder: DocumentBuilder,
    pending: Option<Pending>,
    /// The opening fence while inside fenced code.
    fence: Option<String>,
}

impl Scanner {
    fn flush(&mut self) {
        if let Some(p) = self.pending.take() {
            self.builder.start(p.style);
            self.builder.push_runs(inline(&p.text));
            self.builder.end();
        }
    }

    fn begin(&mut self, style: StyleId, text: &str) {
        self.flush();
        self.pending = Some(Pending {
            style,
            text: text.trim().to_string(),
        });
    }

    fn literal(&mut self, style: StyleId, text: &str) {
        self.flush();
        self.builder.start(style);
        self.builder.push(text, RunAttrs::empty());
        self.builder.end();
    }

    fn continue_with(&mut self, text: &str) -> bool {
        match &mut self.pending {
            Some(p) => {
                let text = text.trim();
                if !text.is_empty() {
                    if !p.text.is_empty() {
                        p.text.push(' ');
                    }
                    p.text.push_str(text);
                }
                true
            }
            None => false,
        }
    }

    fn line(&mut self, line: &str) {
        if let Some(fence) = &self.fence {
            let trimmed = line.trim();
            if trimmed.starts_with(fence.as_str())
                && trimmed.chars().all(|c| c == fence.chars().next().unwrap_or('`'))
            {
                self.fence = None;
            } else {
                self.literal(StyleId::PRE, line);
            }
            return;
        }

        if line.trim().is_empty() {
            self.flush();
            return;
        }

        if let Some(caps) = self.patterns.fence.captures(line) {
            self.flush();
            self.fence = Some(caps[1].to_string());
            return;
        }

        let indent = line.chars().take_while(|c| *c == ' ').count();
        if (indent >= 4 || line.starts_with('\t')) && self.pending.is_none() {
            let code = line.strip_prefix('\t').unwrap_or_else(|| &line[4.min(line.len())..]);
            self.literal(StyleId::PRE, code);
            return;
        }

        if let Some(caps) = self.patterns.atx.captures(line) {
            let level = u8::try_from(caps[1].len()).unwrap_or(6);
            let text = caps.get(2).map_or("", |m| m.as_str()).to_string();
            self.begin(StyleId::heading(level), &text);
            self.flush();
            return;
        }

        if let Some(caps) = self.patterns.setext.captures(line) {
            if let Some(p) = &mut self.pending {
                if p.style == StyleId::P {
                    p.style = if caps[1].starts_with('=') {
                        StyleId::heading(1)
                    } else {
                        StyleId::heading(2)
                    };
                    self.flush();
                    return;
                }
            }
        }

        if self.patterns.thematic.is_match(line) {
            self.flush();
            return;
        }

        if let Some(rest) = quote_content(line) {
            let continuing = self.pending.as_ref().is_some_and(|p| p.style == StyleId::Q);
            if rest.trim().is_empty() {
                self.flush();
            } else if continuing {
                self.continue_with(rest);
            } else {
                self.begin(StyleId::Q, rest);
            }
            return;
        }

        if let Some(caps) = self.patterns.bullet.captures(line) {
            let text = caps.get(1).map_or("", |m| m.as_str()).to_string();
            self.begin(StyleId::LB, &text);
            return;
        }

        if let Some(caps) = self.patterns.ordered.captures(line) {
            let text = caps.get(1).map_or("", |m| m.as_str()).to_string();
            self.begin(StyleId::LN, &text);
            return;
        }

        if !self.continue_with(line) {
            self.begin(StyleId::P, line);
        }
    }
}

fn quote_content(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let rest = trimmed.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

// ---------------------------------------------------------------------------
// Inline
// ---------------------------------------------------------------------------

fn is_space(c: Option<char>) -> bool {
    c.is_none_or(char::is_whitespace)
}

fn is_punct(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_punctuation())
}

/// Resolve one paragraph's inline markup.
pub(crate) fn inline(text: &str) -> Vec<quire_editor::paragraph::Run> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Inline::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if chars.get(i + 1).is_some_and(char::is_ascii_punctuation) => {
                out.push(chars[i + 1]);
                i += 2;
            }
            '`' => {
                let run = chars[i..].iter().take_while(|&&c| c == '`').count();
                match find_code_end(&chars, i + run, run) {
                    Some(end) => {
                        let code: String = chars[i + run..end].iter().collect();
                        let code = match code.strip_prefix(' ').and_then(|c| c.strip_suffix(' ')) {
                            Some(inner) if !inner.trim().is_empty() => inner.to_string(),
                            _ => code,
                        };
                        out.text(&code);
                        i = end + run;
                    }
                    None => {
                        for _ in 0..run {
                            out.push('`');
                        }
                        i += run;
                    }
                }
            }
            '*' | '_' => {
                let run = chars[i..].iter().take_while(|&&x| x == c).count();
                let prev = i.checked_sub(1).map(|p| chars[p]);
                let next = chars.get(i + run).copied();
                delimiter_run(&mut out, c, run, prev, next);
                i += run;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out.finish()
}

fn find_code_end(chars: &[char], from: usize, run: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        if chars[j] == '`' {
            let len = chars[j..].iter().take_while(|&&c| c == '`').count();
            if len == run {
                return Some(j);
            }
            j += len;
        } else {
            j += 1;
        }
    }
    None
}

fn delimiter_run(out: &mut Inline, c: char, run: usize, prev: Option<char>, next: Option<char>) {
    let left = !is_space(next) && (!is_punct(next) || is_space(prev) || is_punct(prev));
    let right = !is_space(prev) && (!is_punct(prev) || is_space(next) || is_punct(next));
    let (can_open, can_close) = if c == '_' {
        (left && (!right || is_punct(prev)), right && (!left || is_punct(next)))
    } else {
        (left, right)
    };

    let mut remaining = run;
    if can_close {
        while remaining > 0 {
            let Some(top) = out.top() else { break };
            if top.marker != c {
                break;
            }
            let odd_match = (can_open || top.both)
                && (top.original + run) % 3 == 0
                && !(top.original % 3 == 0 && run % 3 == 0);
            if odd_match {
                break;
            }
            let used = if remaining >= 2 && top.count >= 2 { 2 } else { 1 };
            let attrs = if used == 2 { RunAttrs::BOLD } else { RunAttrs::ITALIC };
            out.consume(used, attrs);
            remaining -= used;
        }
    }

    if remaining == 0 {
        return;
    }
    let literal: String = std::iter::repeat_n(c, remaining).collect();
    if can_open {
        out.open_run(c, &literal, run, can_close, RunAttrs::empty());
    } else {
        out.text(&literal);
    }
}

pub fn import(bytes: &[u8]) -> Result<Document, ConvertError> {
    let text = super::decode(bytes);
    let mut scanner = Scanner {
        patterns: Patterns::new()?,
        builder: DocumentBuilder::new(),
        pending: None,
        fence: None,
    };
    for line in text.lines() {
        scanner.line(line);
    }
    scanner.flush();
    Ok(scanner.builder.build())
}
