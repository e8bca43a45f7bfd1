//! XHTML export.
//!
//! Writes a well-formed document the importer reads back: consecutive list
//! items share one `ul`/`ol`, consecutive quote paragraphs one
//! `blockquote`, consecutive preformatted lines one `pre`. Styles with no
//! element of their own become `<p class="NAME">`.

use std::fmt::Write as _;

use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, RunAttrs};
use quire_editor::style::{StyleId, StyleRegistry};

use super::{Block, groups, xml_escape};

const TAGS: [(RunAttrs, &str); 3] = [
    (RunAttrs::BOLD, "b"),
    (RunAttrs::ITALIC, "i"),
    (RunAttrs::UNDERLINE, "u"),
];

fn runs(out: &mut String, p: &Paragraph) {
    for run in p.runs() {
        let tags: Vec<&str> = TAGS
            .iter()
            .filter(|(attr, _)| run.attrs.contains(*attr))
            .map(|(_, tag)| *tag)
            .collect();
        for tag in &tags {
            let _ = write!(out, "<{tag}>");
        }
        out.push_str(&xml_escape(&run.text, false));
        for tag in tags.iter().rev() {
            let _ = write!(out, "</{tag}>");
        }
    }
}

/// `<p>`, with a class naming the style unless it is plain body text.
fn paragraph(out: &mut String, p: &Paragraph, styles: &StyleRegistry) {
    if p.style == StyleId::P {
        out.push_str("<p>");
    } else {
        let name = &styles.style(p.style).name;
        let _ = write!(out, "<p class=\"{}\">", xml_escape(name, true));
    }
    runs(out, p);
    out.push_str("</p>\n");
}

fn title(doc: &Document, styles: &StyleRegistry) -> String {
    doc.paragraphs()
        .iter()
        .find(|p| styles.style(p.style).heading_level().is_some())
        .map_or_else(|| "Untitled".to_string(), Paragraph::text)
}

pub fn export(doc: &Document, styles: &StyleRegistry) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\">\n<head>\n");
    out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\"/>\n");
    let _ = writeln!(out, "<title>{}</title>", xml_escape(&title(doc, styles), false));
    out.push_str("</head>\n<body>\n");

    for (block, paragraphs) in groups(doc, styles) {
        match block {
            Block::Heading(level) => {
                for p in paragraphs {
                    let _ = write!(out, "<h{level}>");
                    runs(&mut out, p);
                    let _ = writeln!(out, "</h{level}>");
                }
            }
            Block::Bullet | Block::Number => {
                let list = if block == Block::Bullet { "ul" } else { "ol" };
                let _ = writeln!(out, "<{list}>");
                for p in paragraphs {
                    out.push_str("<li>");
                    runs(&mut out, p);
                    out.push_str("</li>\n");
                }
                let _ = writeln!(out, "</{list}>");
            }
            Block::Quote => {
                out.push_str("<blockquote>\n");
                for p in paragraphs {
                    out.push_str("<p>");
                    runs(&mut out, p);
                    out.push_str("</p>\n");
                }
                out.push_str("</blockquote>\n");
            }
            Block::Pre => {
                out.push_str("<pre>");
                for (i, p) in paragraphs.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    runs(&mut out, p);
                }
                out.push_str("</pre>\n");
            }
            Block::Body | Block::Center | Block::Right | Block::Verse | Block::Plain => {
                for p in paragraphs {
                    paragraph(&mut out, p, styles);
                }
            }
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}
