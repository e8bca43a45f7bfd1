//! Markdown export.
//!
//! ATX headings, tight `-` and `N.` lists, `>` quotes and fenced code.
//! Markdown has no underline, verse, centered or right-aligned text, and
//! no unmarked list item: underline is dropped and those paragraphs are
//! written as ordinary ones.

use std::fmt::Write as _;

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, RunAttrs};
use quire_editor::style::StyleRegistry;

use super::{Block, Token, emphasis, groups, tidy_runs};

/// Backslash-escape what the inline pass would read as markup.
fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '#') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Escape what would start a block construct at the beginning of a line.
/// Leading whitespace is dropped, since indentation is itself structure.
fn escape_line_start(line: &str) -> String {
    let line = line.trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && matches!(line[digits..].chars().next(), Some('.' | ')')) {
        return format!("{}\\{}", &line[..digits], &line[digits..]);
    }
    if line.starts_with(['>', '-', '+', '=', '~']) {
        return format!("\\{line}");
    }
    line.to_string()
}

/// One paragraph's text with Markdown emphasis.
fn inline(p: &Paragraph) -> String {
    if p.runs().iter().any(|r| r.attrs.contains(RunAttrs::UNDERLINE)) {
        debug!("markdown: dropping underline");
    }
    let runs = tidy_runs(p.runs(), RunAttrs::BOLD | RunAttrs::ITALIC);
    let mut out = String::new();
    for token in emphasis(&runs) {
        match token {
            Token::Open(attr) | Token::Close(attr) => {
                out.push_str(if attr == RunAttrs::BOLD { "**" } else { "*" });
            }
            Token::Text(text) => escape_into(&mut out, &text),
        }
    }
    escape_line_start(&out)
}

/// A fence longer than any backtick run in the lines it encloses.
fn fence(paragraphs: &[Paragraph]) -> String {
    let longest = paragraphs
        .iter()
        .filter_map(|p| p.text().split(|c| c != '`').map(str::len).max())
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

pub fn export(doc: &Document, styles: &StyleRegistry) -> String {
    let mut out = String::new();

    for (block, paragraphs) in groups(doc, styles) {
        if block == Block::Pre {
            if !out.is_empty() {
                out.push('\n');
            }
            let fence = fence(paragraphs);
            let _ = writeln!(out, "{fence}");
            for p in paragraphs {
                out.push_str(&p.text());
                out.push('\n');
            }
            let _ = writeln!(out, "{fence}");
            continue;
        }

        let paragraphs: Vec<&Paragraph> = paragraphs.iter().filter(|p| !p.is_empty()).collect();
        if paragraphs.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        match block {
            Block::Heading(level) => {
                for p in &paragraphs {
                    let _ = writeln!(out, "{} {}", "#".repeat(usize::from(level)), inline(p));
                }
            }
            Block::Bullet => {
                for p in &paragraphs {
                    let _ = writeln!(out, "- {}", inline(p));
                }
            }
            Block::Number => {
                for (n, p) in paragraphs.iter().enumerate() {
                    let _ = writeln!(out, "{}. {}", n + 1, inline(p));
                }
            }
            Block::Quote => {
                for (i, p) in paragraphs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(">\n");
                    }
                    let _ = writeln!(out, "> {}", inline(p));
                }
            }
            _ => {
                if block != Block::Body {
                    debug!("markdown: writing {block:?} paragraphs as plain");
                }
                for (i, p) in paragraphs.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    let _ = writeln!(out, "{}", inline(p));
                }
            }
        }
    }
    out
}
