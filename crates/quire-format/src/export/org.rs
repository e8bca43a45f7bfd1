//! Org export.
//!
//! Emphasis markers are nested by extent. A marker char in the text that
//! org could take for markup is written as its entity (`\ast{}` and
//! friends), as is a `+` or `#` opening a line and a backslash that would
//! read as the start of an entity.

use std::fmt::Write as _;

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, RunAttrs};
use quire_editor::style::StyleRegistry;

use super::{Block, Token, emphasis, groups, tidy_runs};
use crate::import::org::{ENTITIES, closes_before, needs_comma, opens_after, starts_with_at};

fn marker(attr: RunAttrs) -> char {
    if attr == RunAttrs::BOLD {
        '*'
    } else if attr == RunAttrs::ITALIC {
        '/'
    } else {
        '_'
    }
}

fn entity(c: char) -> Option<&'static str> {
    ENTITIES.iter().find(|(_, ch)| *ch == c).map(|(e, _)| *e)
}

/// One paragraph's text with org markup.
fn inline(p: &Paragraph) -> String {
    let runs = tidy_runs(p.runs(), RunAttrs::all());
    let plain: Vec<char> = p.text().chars().collect();
    let mut out = String::new();
    let mut at: usize = 0;

    for token in emphasis(&runs) {
        match token {
            Token::Open(attr) | Token::Close(attr) => out.push(marker(attr)),
            Token::Text(text) => {
                for c in text.chars() {
                    let prev = at.checked_sub(1).map(|i| plain[i]);
                    let next = plain.get(at + 1).copied();
                    let ambiguous = match c {
                        '*' | '/' | '_' => opens_after(prev) || closes_before(next),
                        '+' | '#' => plain[..at].iter().all(|c| c.is_whitespace()),
                        '\\' => ENTITIES.iter().any(|(e, _)| starts_with_at(&plain, at, e)),
                        _ => false,
                    };
                    match entity(c).filter(|_| ambiguous) {
                        Some(e) => out.push_str(e),
                        None => out.push(c),
                    }
                    at += 1;
                }
            }
        }
    }
    out
}

/// A preformatted line, comma-quoted where org would read it as
/// structure.
fn example_line(text: &str) -> String {
    if needs_comma(text) {
        format!(",{text}")
    } else {
        text.to_string()
    }
}

fn block_lines(out: &mut String, name: &str, paragraphs: &[&Paragraph]) {
    let _ = writeln!(out, "#+BEGIN_{name}");
    for (i, p) in paragraphs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&inline(p));
        out.push('\n');
    }
    let _ = writeln!(out, "#+END_{name}");
}

pub fn export(doc: &Document, styles: &StyleRegistry) -> String {
    let mut out = String::new();

    for (block, paragraphs) in groups(doc, styles) {
        if block == Block::Pre {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("#+BEGIN_EXAMPLE\n");
            for p in paragraphs {
                out.push_str(&example_line(&p.text()));
                out.push('\n');
            }
            out.push_str("#+END_EXAMPLE\n");
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
                    out.push_str(&"*".repeat(usize::from(level)));
                    out.push(' ');
                    out.push_str(&inline(p));
                    out.push('\n');
                }
            }
            Block::Bullet | Block::Number => {
                for (n, p) in paragraphs.iter().enumerate() {
                    if block == Block::Bullet {
                        out.push_str("- ");
                    } else {
                        let _ = write!(out, "{}. ", n + 1);
                    }
                    out.push_str(&inline(p));
                    out.push('\n');
                }
            }
            Block::Quote => block_lines(&mut out, "QUOTE", &paragraphs),
            Block::Center => block_lines(&mut out, "CENTER", &paragraphs),
            Block::Verse => {
                out.push_str("#+BEGIN_VERSE\n");
                for p in &paragraphs {
                    out.push_str(&inline(p));
                    out.push('\n');
                }
                out.push_str("#+END_VERSE\n");
            }
            Block::Body | Block::Right | Block::Plain | Block::Pre => {
                if block != Block::Body {
                    debug!("org: writing {block:?} paragraphs as plain");
                }
                for (i, p) in paragraphs.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    out.push_str(&inline(p));
                    out.push('\n');
                }
            }
        }
    }
    out
}
