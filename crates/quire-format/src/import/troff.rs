//! troff import, for documents written with the `-ms` macros.
//!
//! Requests pick the style of the text lines that follow them; text lines
//! are joined into one paragraph until the next request or blank line.
//! Font escapes set run attributes and are reset by every request.
//! Unknown requests are ignored. Reading never fails: whatever cannot be
//! understood is dropped or kept as text.

use std::iter::Peekable;
use std::str::Chars;

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Run, RunAttrs};
use quire_editor::style::StyleId;

use crate::builder::DocumentBuilder;

/// Special character names and what they stand for.
pub(crate) const SPECIALS: &[(&str, &str)] = &[
    ("bu", "\u{2022}"),
    ("em", "\u{2014}"),
    ("en", "\u{2013}"),
    ("aq", "'"),
    ("dq", "\""),
    ("lq", "\u{201c}"),
    ("rq", "\u{201d}"),
    ("oq", "\u{2018}"),
    ("cq", "\u{2019}"),
    ("co", "\u{a9}"),
    ("rg", "\u{ae}"),
    ("hy", "-"),
    ("mi", "-"),
    ("rs", "\\"),
    ("ha", "^"),
    ("ti", "~"),
];

struct Reader {
    builder: DocumentBuilder,
    style: StyleId,
    font: RunAttrs,
    previous: RunAttrs,
    fill: bool,
    /// Text lines still to center.
    center: usize,
}

impl Reader {
    fn new() -> Self {
        Self {
            builder: DocumentBuilder::new(),
            style: StyleId::P,
            font: RunAttrs::empty(),
            previous: RunAttrs::empty(),
            fill: true,
            center: 0,
        }
    }

    fn line(&mut self, line: &str) {
        if line.starts_with('.') || line.starts_with('\'') {
            self.request(&line[1..]);
        } else if !self.fill {
            let runs = self.decode(line);
            self.builder.start(StyleId::PRE);
            self.builder.push_runs(runs);
            self.builder.end();
        } else if line.trim().is_empty() {
            self.builder.end_if_empty();
        } else if !line.trim_start().starts_with("\\\"") {
            let runs = self.decode(line.trim());
            self.append(runs);
        }
    }

    /// Add decoded text to the open paragraph, joined by a space.
    fn append(&mut self, runs: Vec<Run>) {
        if runs.is_empty() {
            return;
        }
        if self.center > 0 {
            self.center -= 1;
            self.builder.start(StyleId::CENTER);
            self.builder.push_runs(runs);
            self.builder.end();
            return;
        }
        if self.builder.is_open() {
            self.builder.push(" ", self.font);
        } else {
            self.builder.start(self.style);
        }
        self.builder.push_runs(runs);
    }

    /// Close the open paragraph; `style` applies to the text that follows.
    fn paragraph(&mut self, style: StyleId) {
        self.builder.end_if_empty();
        self.style = style;
    }

    fn request(&mut self, request: &str) {
        let request = request.trim_start();
        if request.starts_with("\\\"") || request.is_empty() {
            return;
        }
        let (name, rest) = request.split_once(char::is_whitespace).unwrap_or((request, ""));
        let args = arguments(rest);
        let level = || {
            args.first()
                .and_then(|a| a.parse::<u8>().ok())
                .unwrap_or(1)
        };

        self.font = RunAttrs::empty();
        self.previous = RunAttrs::empty();

        match name {
            "PP" | "LP" | "P" => self.paragraph(StyleId::P),
            "SH" | "NH" => self.paragraph(StyleId::heading(level())),
            "TL" => self.paragraph(StyleId::heading(1)),
            "IP" => {
                let style = args.first().map_or(StyleId::L, |marker| list_style(marker));
                self.paragraph(style);
            }
            "QP" => self.paragraph(StyleId::Q),
            "nf" => {
                self.builder.end_if_empty();
                self.fill = false;
            }
            "fi" => {
                self.fill = true;
                self.style = StyleId::P;
            }
            "ce" => {
                self.builder.end_if_empty();
                self.center = args.first().and_then(|a| a.parse().ok()).unwrap_or(1);
            }
            "sp" | "br" => self.builder.end_if_empty(),
            "B" | "I" | "BI" | "R" => {
                let font = match name {
                    "B" => RunAttrs::BOLD,
                    "I" => RunAttrs::ITALIC,
                    "BI" => RunAttrs::BOLD | RunAttrs::ITALIC,
                    _ => RunAttrs::empty(),
                };
                self.font = font;
                if !args.is_empty() {
                    let runs = self.decode(&args.join(" "));
                    self.font = RunAttrs::empty();
                    self.append(runs);
                }
            }
            _ => debug!("troff: ignoring request .{name}"),
        }
    }

    /// Decode escapes in a text line, tracking the font.
    fn decode(&mut self, line: &str) -> Vec<Run> {
        let mut runs = Vec::new();
        let mut buf = String::new();
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                buf.push(c);
                continue;
            }
            let Some(e) = chars.next() else {
                buf.push('\\');
                break;
            };
            match e {
                'f' => {
                    let font = match escape_name(&mut chars).as_str() {
                        "B" => Some(RunAttrs::BOLD),
                        "I" => Some(RunAttrs::ITALIC),
                        "BI" | "IB" => Some(RunAttrs::BOLD | RunAttrs::ITALIC),
                        "R" | "C" | "CW" | "CR" => Some(RunAttrs::empty()),
                        "P" | "" => Some(self.previous),
                        other => {
                            debug!("troff: unknown font {other}");
                            None
                        }
                    };
                    if let Some(font) = font {
                        runs.push(Run::new(&std::mem::take(&mut buf), self.font));
                        self.previous = self.font;
                        self.font = font;
                    }
                }
                '(' => {
                    let name: String = chars.by_ref().take(2).collect();
                    buf.push_str(special(&name));
                }
                '[' => {
                    let name: String = chars.by_ref().take_while(|c| *c != ']').collect();
                    buf.push_str(special(&name));
                }
                'e' | '\\' => buf.push('\\'),
                '&' | 'c' | '%' => {}
                '-' => buf.push('-'),
                ' ' | '~' => buf.push(' '),
                '"' => {
                    buf.truncate(buf.trim_end().len());
                    break;
                }
                other => buf.push(other),
            }
        }
        runs.push(Run::new(&buf, self.font));
        runs.retain(|r| !r.text.is_empty());
        runs
    }
}

/// The name after `\f`: one char, `(xx`, or `[name]`.
fn escape_name(chars: &mut Peekable<Chars<'_>>) -> String {
    match chars.next() {
        Some('(') => chars.by_ref().take(2).collect(),
        Some('[') => chars.by_ref().take_while(|c| *c != ']').collect(),
        Some(c) => c.to_string(),
        None => String::new(),
    }
}

fn special(name: &str) -> &'static str {
    SPECIALS
        .iter()
        .find(|(n, _)| *n == name)
        .map_or_else(
            || {
                debug!("troff: unknown special character {name}");
                ""
            },
            |(_, s)| *s,
        )
}

/// List style for an `.IP` marker.
fn list_style(marker: &str) -> StyleId {
    let marker = marker.trim();
    let digits = marker.trim_end_matches(['.', ')']);
    if matches!(marker, "\\(bu" | "\\[bu]" | "\u{2022}" | "-" | "\\-" | "*" | "o") {
        StyleId::LB
    } else if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        StyleId::LN
    } else {
        StyleId::L
    }
}

/// Split request arguments on whitespace, honoring double quotes.
fn arguments(s: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = s.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };
        let mut arg = String::new();
        if first == '"' {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '"' {
                    if chars.next_if_eq(&'"').is_some() {
                        arg.push('"');
                    } else {
                        break;
                    }
                } else {
                    arg.push(c);
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                arg.push(c);
            }
        }
        args.push(arg);
    }
    args
}

pub fn import(bytes: &[u8]) -> Document {
    let text = super::decode(bytes);
    let mut reader = Reader::new();
    for line in text.lines() {
        reader.line(line);
    }
    reader.builder.end_if_empty();
    reader.builder.build()
}
