//! LaTeX export for the `article` class.
//!
//! Consecutive paragraphs of one block kind share an environment, with
//! paragraphs separated by blank lines. Preformatted text goes into
//! `verbatim` as is; everywhere else the specials are escaped.

use std::fmt::Write as _;

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, RunAttrs};
use quire_editor::style::StyleRegistry;

use super::{Block, groups};

/// Escape LaTeX specials in running text.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '&' | '%' | '$' | '#' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\^{}"),
            '~' => out.push_str("\\~{}"),
            _ => out.push(c),
        }
    }
    out
}

fn runs(p: &Paragraph) -> String {
    let mut out = String::new();
    for run in p.runs() {
        let commands: Vec<&str> = [
            (RunAttrs::BOLD, "textbf"),
            (RunAttrs::ITALIC, "emph"),
            (RunAttrs::UNDERLINE, "underline"),
        ]
        .into_iter()
        .filter(|(a, _)| run.attrs.contains(*a))
        .map(|(_, c)| c)
        .collect();
        for command in &commands {
            let _ = write!(out, "\\{command}{{");
        }
        out.push_str(&escape(&run.text));
        out.push_str(&"}".repeat(commands.len()));
    }
    out
}

fn environment(block: Block) -> Option<&'static str> {
    match block {
        Block::Bullet => Some("itemize"),
        Block::Number => Some("enumerate"),
        // Unmarked items live in an itemize with empty labels.
        Block::Plain => Some("itemize"),
        Block::Quote => Some("quotation"),
        Block::Verse => Some("verse"),
        Block::Pre => Some("verbatim"),
        Block::Center => Some("center"),
        Block::Right => Some("flushright"),
        Block::Heading(_) | Block::Body => None,
    }
}

fn heading(level: u8) -> &'static str {
    match level {
        1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        4 => "paragraph",
        _ => "subparagraph",
    }
}

pub fn export(doc: &Document, styles: &StyleRegistry) -> String {
    let mut out = String::new();
    out.push_str("\\documentclass{article}\n\\usepackage[utf8]{inputenc}\n\n\\begin{document}\n");

    for (block, paragraphs) in groups(doc, styles) {
        out.push('\n');
        if block == Block::Pre {
            out.push_str("\\begin{verbatim}\n");
            for p in paragraphs {
                out.push_str(&p.text());
                out.push('\n');
            }
            out.push_str("\\end{verbatim}\n");
            continue;
        }

        let paragraphs: Vec<&Paragraph> = paragraphs.iter().filter(|p| !p.is_empty()).collect();
        if paragraphs.is_empty() {
            debug!("latex: dropping empty paragraphs");
            continue;
        }
        let env = environment(block);
        if let Some(env) = env {
            let _ = writeln!(out, "\\begin{{{env}}}");
        }
        for (i, p) in paragraphs.iter().enumerate() {
            let text = runs(p);
            match block {
                Block::Heading(level) => {
                    let _ = writeln!(out, "\\{}{{{text}}}", heading(level));
                }
                Block::Bullet | Block::Number => {
                    let _ = writeln!(out, "\\item {text}");
                }
                Block::Plain => {
                    let _ = writeln!(out, "\\item[] {text}");
                }
                Block::Verse => {
                    let _ = writeln!(out, "{text}\\\\");
                }
                _ => {
                    if i > 0 {
                        out.push('\n');
                    }
                    let _ = writeln!(out, "{text}");
                }
            }
        }
        if let Some(env) = env {
            let _ = writeln!(out, "\\end{{{env}}}");
        }
    }

    out.push_str("\n\\end{document}\n");
    out
}
