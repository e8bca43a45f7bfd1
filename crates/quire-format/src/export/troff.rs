//! troff export using the `-ms` macros.
//!
//! Each paragraph is one request plus one text line. `-ms` has no
//! underline, verse or right-aligned paragraphs: underlined text is
//! written plain and those styles become ordinary paragraphs.

use std::fmt::Write as _;

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, RunAttrs};
use quire_editor::style::StyleRegistry;

use super::{Block, groups};

fn font(attrs: RunAttrs) -> Option<&'static str> {
    let bold = attrs.contains(RunAttrs::BOLD);
    let italic = attrs.contains(RunAttrs::ITALIC);
    match (bold, italic) {
        (true, true) => Some("\\f(BI"),
        (true, false) => Some("\\fB"),
        (false, true) => Some("\\fI"),
        (false, false) => None,
    }
}

/// One text line, escaped so troff reads it back verbatim.
fn line(p: &Paragraph) -> String {
    let mut out = String::new();
    for run in p.runs() {
        if run.attrs.contains(RunAttrs::UNDERLINE) {
            debug!("troff: dropping underline");
        }
        match font(run.attrs) {
            Some(f) => {
                let _ = write!(out, "{f}{}\\fR", run.text.replace('\\', "\\e"));
            }
            None => out.push_str(&run.text.replace('\\', "\\e")),
        }
    }
    if out.starts_with('.') || out.starts_with('\'') {
        out.insert_str(0, "\\&");
    }
    out
}

pub fn export(doc: &Document, styles: &StyleRegistry) -> String {
    let mut out = String::from(".\\\" quire document\n");

    for (block, paragraphs) in groups(doc, styles) {
        if block == Block::Pre {
            out.push_str(".nf\n");
            for p in paragraphs {
                out.push_str(&line(p));
                out.push('\n');
            }
            out.push_str(".fi\n");
            continue;
        }

        for (n, p) in paragraphs.iter().filter(|p| !p.is_empty()).enumerate() {
            match block {
                Block::Heading(level) => {
                    let _ = writeln!(out, ".SH {level}");
                }
                Block::Bullet => out.push_str(".IP \\(bu 2\n"),
                Block::Number => {
                    let _ = writeln!(out, ".IP {}. 3", n + 1);
                }
                Block::Plain => out.push_str(".IP \"\" 2\n"),
                Block::Quote => out.push_str(".QP\n"),
                Block::Center => out.push_str(".ce 1\n"),
                Block::Verse | Block::Right => {
                    debug!("troff: writing {block:?} paragraph as plain");
                    out.push_str(".PP\n");
                }
                Block::Body | Block::Pre => out.push_str(".PP\n"),
            }
            out.push_str(&line(p));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_editor::style::StyleId;

    fn troff(paragraphs: Vec<Paragraph>) -> String {
        export(&Document::from_paragraphs(paragraphs), &StyleRegistry::builtin())
    }

    #[test]
    fn requests_per_block() {
        assert_eq!(
            troff(vec![
                Paragraph::with_text(StyleId::H2, "Head"),
                Paragraph::with_text(StyleId::P, "body"),
                Paragraph::new(StyleId::P),
                Paragraph::with_text(StyleId::LN, "one"),
                Paragraph::with_text(StyleId::LN, "two"),
                Paragraph::with_text(StyleId::LB, "dot"),
                Paragraph::with_text(StyleId::Q, "quote"),
                Paragraph::with_text(StyleId::CENTER, "mid"),
                Paragraph::with_text(StyleId::PRE, ".raw \\x"),
                Paragraph::with_text(StyleId::PRE, ""),
            ]),
            ".\\\" quire document\n.SH 2\nHead\n.PP\nbody\n.IP 1. 3\none\n.IP 2. 3\ntwo\n\
             .IP \\(bu 2\ndot\n.QP\nquote\n.ce 1\nmid\n.nf\n\\&.raw \\ex\n\n.fi\n"
        );
    }

    #[test]
    fn fonts_and_escapes() {
        let mut p = Paragraph::with_text(StyleId::P, "'quoted ");
        p.push("b", RunAttrs::BOLD);
        p.push("bi", RunAttrs::BOLD | RunAttrs::ITALIC);
        p.push("u", RunAttrs::UNDERLINE);
        p.push("i", RunAttrs::ITALIC);
        assert_eq!(line(&p), "\\&'quoted \\fBb\\fR\\f(BIbi\\fRu\\fIi\\fR");
        assert_eq!(line(&Paragraph::with_text(StyleId::P, ".x\\y")), "\\&.x\\ey");
    }
}
