//! LaTeX import.
//!
//! Only the body between `\begin{document}` and `\end{document}` is read
//! when those are present. Blank lines end paragraphs; sectioning commands
//! become headings; the environments `itemize`, `enumerate`, `quote`,
//! `quotation`, `verse`, `verbatim`, `center` and `flushright` pick the
//! paragraph style. Inline, `\textbf`, `\emph`/`\textit` and `\underline`
//! set attributes, brace groups are transparent and escaped specials
//! decode. Any other command is kept as literal text.

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Run, RunAttrs};
use quire_editor::style::StyleId;
use regex::Regex;

use crate::ConvertError;
use crate::builder::DocumentBuilder;
use crate::inline::Inline;

/// Commands with no printable content, dropped when alone on a line.
const LAYOUT_COMMANDS: &[&str] = &[
    "maketitle",
    "tableofcontents",
    "newpage",
    "clearpage",
    "noindent",
    "smallskip",
    "medskip",
    "bigskip",
    "vspace",
    "label",
    "centering",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Env {
    Itemize,
    Enumerate,
    Description,
    Quote,
    Verse,
    Verbatim,
    Center,
    Right,
    Other,
}

impl Env {
    fn from_name(name: &str) -> Self {
        match name.trim_end_matches('*') {
            "itemize" => Self::Itemize,
            "enumerate" => Self::Enumerate,
            "description" => Self::Description,
            "quote" | "quotation" => Self::Quote,
            "verse" => Self::Verse,
            "verbatim" => Self::Verbatim,
            "center" => Self::Center,
            "flushright" => Self::Right,
            _ => Self::Other,
        }
    }
}

struct Patterns {
    begin: Regex,
    end: Regex,
    item: Regex,
    section: Regex,
    layout: Regex,
}

impl Patterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            begin: Regex::new(r"^\\begin\{([A-Za-z]+\*?)\}(?:\[[^\]]*\])?")?,
            end: Regex::new(r"^\\end\{([A-Za-z]+\*?)\}")?,
            item: Regex::new(r"^\\item(?:\[([^\]]*)\])?")?,
            section: Regex::new(r"^\\(chapter|section|subsection|subsubsection|paragraph|subparagraph)\*?\{")?,
            layout: Regex::new(r"^\\([A-Za-z]+)\*?(?:\[[^\]]*\])?(?:\{[^{}]*\})*$")?,
        })
    }
}

struct Scanner {
    patterns: Patterns,
    builder: DocumentBuilder,
    envs: Vec<Env>,
    pending: Option<(StyleId, String)>,
}

impl Scanner {
    fn flush(&mut self) {
        if let Some((style, text)) = self.pending.take() {
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            self.builder.start(style);
            self.builder.push_runs(inline(&text));
            self.builder.end();
        }
    }

    fn begin(&mut self, style: StyleId, text: &str) {
        self.flush();
        self.pending = Some((style, text.to_string()));
    }

    fn append(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match &mut self.pending {
            Some((_, pending)) => {
                pending.push(' ');
                pending.push_str(text);
            }
            None => {
                let style = self.body_style();
                self.pending = Some((style, text.to_string()));
            }
        }
    }

    fn env(&self) -> Option<Env> {
        self.envs.iter().rev().find(|e| **e != Env::Other).copied()
    }

    /// Style for text that is not part of an item.
    fn body_style(&self) -> StyleId {
        match self.env() {
            Some(Env::Itemize | Env::Enumerate | Env::Description) => StyleId::L,
            Some(Env::Quote) => StyleId::Q,
            Some(Env::Verse) => StyleId::V,
            Some(Env::Verbatim) => StyleId::PRE,
            Some(Env::Center) => StyleId::CENTER,
            Some(Env::Right) => StyleId::RIGHT,
            Some(Env::Other) | None => StyleId::P,
        }
    }

    fn item_style(&self, label: Option<&str>) -> StyleId {
        if label.is_some() {
            return StyleId::L;
        }
        match self.env() {
            Some(Env::Itemize) => StyleId::LB,
            Some(Env::Enumerate) => StyleId::LN,
            _ => StyleId::L,
        }
    }

    fn line(&mut self, raw: &str) {
        if self.env() == Some(Env::Verbatim) {
            if let Some(at) = raw.find("\\end{verbatim}") {
                self.envs.pop();
                self.line(&raw[at + "\\end{verbatim}".len()..]);
            } else {
                self.builder.start(StyleId::PRE);
                self.builder.push(raw, RunAttrs::empty());
                self.builder.end();
            }
            return;
        }

        let line = strip_comment(raw).trim();
        if line.is_empty() {
            // A line holding only a comment does not end the paragraph.
            if raw.trim().is_empty() {
                self.flush();
            }
            return;
        }
        self.structure(line);
    }

    fn structure(&mut self, line: &str) {
        let line = line.trim_start();
        if line.is_empty() {
            return;
        }

        if let Some(caps) = self.patterns.begin.captures(line) {
            self.flush();
            let env = Env::from_name(&caps[1]);
            let rest = &line[caps[0].len()..];
            self.envs.push(env);
            if env != Env::Verbatim {
                self.structure(rest);
            }
            return;
        }

        if let Some(caps) = self.patterns.end.captures(line) {
            self.flush();
            self.envs.pop();
            let rest = &line[caps[0].len()..];
            self.structure(rest);
            return;
        }

        if let Some(caps) = self.patterns.item.captures(line) {
            let style = self.item_style(caps.get(1).map(|m| m.as_str()));
            let rest = &line[caps[0].len()..];
            self.begin(style, rest.trim());
            return;
        }

        if let Some(caps) = self.patterns.section.captures(line) {
            let level = match &caps[1] {
                "chapter" | "section" => 1,
                "subsection" => 2,
                "subsubsection" => 3,
                "paragraph" => 4,
                _ => 5,
            };
            let body = &line[caps[0].len()..];
            let (title, rest) = balanced(body).map_or((body, ""), |end| (&body[..end], &body[end + 1..]));
            self.begin(StyleId::heading(level), title);
            self.flush();
            self.structure(rest);
            return;
        }

        if let Some(caps) = self.patterns.layout.captures(line) {
            if LAYOUT_COMMANDS.contains(&&caps[1]) {
                debug!("latex: dropping {}", &caps[0]);
                return;
            }
        }

        if self.env() == Some(Env::Verse) {
            let text = line.strip_suffix("\\\\").unwrap_or(line);
            self.begin(StyleId::V, text);
            self.flush();
            return;
        }

        self.append(line);
    }
}

/// Cut a `%` comment, unless the percent sign is escaped.
fn strip_comment(line: &str) -> &str {
    let mut backslashes = 0;
    for (i, c) in line.char_indices() {
        match c {
            '\\' => backslashes += 1,
            '%' if backslashes % 2 == 0 => return &line[..i],
            _ => backslashes = 0,
        }
    }
    line
}

/// Byte index of the brace closing a group whose opening brace precedes
/// `s`.
fn balanced(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Resolve one paragraph's inline markup.
pub(crate) fn inline(text: &str) -> Vec<Run> {
    let mut out = Inline::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => {
                let after = &rest[1..];
                let name_len = after.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(after.len());
                if name_len == 0 {
                    let Some(next) = after.chars().next() else {
                        out.push('\\');
                        rest = after;
                        continue;
                    };
                    let mut used = 1 + next.len_utf8();
                    match next {
                        '\\' | ' ' => out.push(' '),
                        '^' | '~' => {
                            out.push(next);
                            if after[1..].starts_with("{}") {
                                used += 2;
                            }
                        }
                        '{' | '}' | '&' | '%' | '$' | '#' | '_' => out.push(next),
                        _ => {
                            out.push('\\');
                            used = 1;
                        }
                    }
                    rest = &rest[used..];
                    continue;
                }

                let name = &after[..name_len];
                let tail = &after[name_len..];
                let attrs = match name {
                    "textbf" => Some(RunAttrs::BOLD),
                    "emph" | "textit" => Some(RunAttrs::ITALIC),
                    "underline" => Some(RunAttrs::UNDERLINE),
                    _ => None,
                };
                match attrs {
                    Some(attrs) if tail.starts_with('{') => {
                        let literal = &rest[..=name_len + 1];
                        out.open('}', literal, attrs);
                        rest = &rest[name_len + 2..];
                    }
                    _ if name == "textbackslash" => {
                        out.push('\\');
                        rest = tail.strip_prefix("{}").unwrap_or(tail);
                    }
                    _ => {
                        out.text(&rest[..=name_len]);
                        rest = tail;
                    }
                }
            }
            '{' => {
                out.open('}', "{", RunAttrs::empty());
                rest = &rest[1..];
            }
            '}' => {
                if out.top().is_some() {
                    out.close();
                } else {
                    out.push('}');
                }
                rest = &rest[1..];
            }
            '~' => {
                out.push(' ');
                rest = &rest[1..];
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out.finish()
}

pub fn import(bytes: &[u8]) -> Result<Document, ConvertError> {
    let text = super::decode(bytes);
    let body = match text.find("\\begin{document}") {
        Some(start) => {
            let body = &text[start + "\\begin{document}".len()..];
            body.find("\\end{document}").map_or(body, |end| &body[..end])
        }
        None => text.as_str(),
    };

    let mut scanner = Scanner {
        patterns: Patterns::new()?,
        builder: DocumentBuilder::new(),
        envs: Vec::new(),
        pending: None,
    };
    for line in body.lines() {
        scanner.line(line);
    }
    scanner.flush();
    Ok(scanner.builder.build())
}
