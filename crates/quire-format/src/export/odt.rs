//! OpenDocument flat XML (`.fodt`) export.
//!
//! Every registered style gets a paragraph style of the same name; add-on
//! styles inherit from the built-in they behave like. Run attributes map
//! onto seven fixed text styles, one per combination. Spaces the reader
//! would collapse are written as `text:s`.

use std::fmt::Write as _;

use log::debug;
use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, RunAttrs};
use quire_editor::style::{StyleId, StyleRegistry};

use super::{Block, groups, xml_char, xml_escape};
use crate::import::odt::{FO_NS, OFFICE_NS, STYLE_NS, TEXT_NS};

/// Text style name for a set of run attributes.
fn text_style(attrs: RunAttrs) -> String {
    [(RunAttrs::BOLD, 'B'), (RunAttrs::ITALIC, 'I'), (RunAttrs::UNDERLINE, 'U')]
        .iter()
        .filter(|(a, _)| attrs.contains(*a))
        .map(|(_, c)| *c)
        .collect()
}

fn text_styles(out: &mut String) {
    for bits in 1..=7u8 {
        let attrs = RunAttrs::from_bits_truncate(bits);
        let _ = write!(
            out,
            "<style:style style:name=\"{}\" style:family=\"text\"><style:text-properties",
            text_style(attrs)
        );
        if attrs.contains(RunAttrs::BOLD) {
            out.push_str(" fo:font-weight=\"bold\"");
        }
        if attrs.contains(RunAttrs::ITALIC) {
            out.push_str(" fo:font-style=\"italic\"");
        }
        if attrs.contains(RunAttrs::UNDERLINE) {
            out.push_str(" style:text-underline-style=\"solid\" style:text-underline-width=\"auto\"");
        }
        out.push_str("/></style:style>\n");
    }
}

/// Name of the built-in style an add-on of this kind inherits from.
fn builtin_name(block: Block) -> String {
    match block {
        Block::Heading(level) => format!("H{level}"),
        Block::Body => "P".into(),
        Block::Center => "CENTER".into(),
        Block::Right => "RIGHT".into(),
        Block::Quote => "Q".into(),
        Block::Verse => "V".into(),
        Block::Pre => "PRE".into(),
        Block::Bullet => "LB".into(),
        Block::Number => "LN".into(),
        Block::Plain => "L".into(),
    }
}

fn paragraph_styles(out: &mut String, styles: &StyleRegistry) {
    for (id, style) in styles.iter() {
        let block = Block::classify(id, styles);
        let _ = write!(
            out,
            "<style:style style:name=\"{}\" style:family=\"paragraph\"",
            xml_escape(&style.name, true)
        );
        if id.index() >= StyleRegistry::BUILTIN_COUNT {
            let _ = write!(out, " style:parent-style-name=\"{}\"", builtin_name(block));
        }
        out.push('>');
        match block {
            Block::Quote | Block::Verse => {
                let _ = write!(
                    out,
                    "<style:paragraph-properties fo:margin-left=\"{}em\" fo:margin-right=\"{}em\"/>",
                    style.left_margin, style.right_margin
                );
            }
            Block::Center => out.push_str("<style:paragraph-properties fo:text-align=\"center\"/>"),
            Block::Right => out.push_str("<style:paragraph-properties fo:text-align=\"end\"/>"),
            Block::Heading(_) => out.push_str("<style:text-properties fo:font-weight=\"bold\"/>"),
            Block::Pre => out.push_str("<style:text-properties fo:font-family=\"monospace\"/>"),
            Block::Body | Block::Bullet | Block::Number | Block::Plain => {}
        }
        out.push_str("</style:style>\n");
    }
}

fn list_styles(out: &mut String) {
    out.push_str(
        "<text:list-style style:name=\"LB\">\
         <text:list-level-style-bullet text:level=\"1\" text:bullet-char=\"\u{2022}\"/>\
         </text:list-style>\n",
    );
    out.push_str(
        "<text:list-style style:name=\"LN\">\
         <text:list-level-style-number text:level=\"1\" style:num-format=\"1\" style:num-suffix=\".\"/>\
         </text:list-style>\n",
    );
}

/// Whether each char must be written as `text:s` rather than literally.
/// A space survives collapsing only as the first of a run of spaces with
/// text on both sides.
fn encoded_spaces(chars: &[char]) -> Vec<bool> {
    let mut encoded = vec![false; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != ' ' {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        let interior = start > 0 && i < chars.len();
        let first_encoded = if interior { start + 1 } else { start };
        for flag in &mut encoded[first_encoded..i] {
            *flag = true;
        }
    }
    encoded
}

fn content(out: &mut String, p: &Paragraph) {
    let chars: Vec<char> = p.text().chars().collect();
    let encoded = encoded_spaces(&chars);
    let mut at = 0;
    for run in p.runs() {
        let len = run.char_len();
        let span = !run.attrs.is_empty();
        if span {
            let _ = write!(out, "<text:span text:style-name=\"{}\">", text_style(run.attrs));
        }
        let mut i = at;
        while i < at + len {
            if encoded[i] {
                let start = i;
                while i < at + len && encoded[i] {
                    i += 1;
                }
                let _ = write!(out, "<text:s text:c=\"{}\"/>", i - start);
                continue;
            }
            match chars[i] {
                '\t' => out.push_str("<text:tab/>"),
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                c if !xml_char(c) => debug!("opendocument: dropping {c:?}"),
                c => out.push(c),
            }
            i += 1;
        }
        if span {
            out.push_str("</text:span>");
        }
        at += len;
    }
}

fn paragraph(out: &mut String, p: &Paragraph, styles: &StyleRegistry) {
    let name = xml_escape(&styles.style(p.style).name, true);
    match Block::classify(p.style, styles) {
        Block::Heading(level) => {
            let _ = write!(out, "<text:h text:style-name=\"{name}\" text:outline-level=\"{level}\">");
            content(out, p);
            out.push_str("</text:h>\n");
        }
        _ => {
            let _ = write!(out, "<text:p text:style-name=\"{name}\">");
            content(out, p);
            out.push_str("</text:p>\n");
        }
    }
}

pub fn export(doc: &Document, styles: &StyleRegistry) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<office:document xmlns:office=\"{OFFICE_NS}\" xmlns:style=\"{STYLE_NS}\" \
         xmlns:text=\"{TEXT_NS}\" xmlns:fo=\"{FO_NS}\" office:version=\"1.2\" \
         office:mimetype=\"application/vnd.oasis.opendocument.text\">"
    );
    out.push_str("<office:styles>\n");
    paragraph_styles(&mut out, styles);
    text_styles(&mut out);
    list_styles(&mut out);
    out.push_str("</office:styles>\n<office:body>\n<office:text>\n");

    for (block, paragraphs) in groups(doc, styles) {
        match block {
            Block::Bullet | Block::Number => {
                let list = if block == Block::Bullet { StyleId::LB } else { StyleId::LN };
                let _ = writeln!(out, "<text:list text:style-name=\"{}\">", styles.style(list).name);
                for p in paragraphs {
                    out.push_str("<text:list-item>");
                    paragraph(&mut out, p, styles);
                    out.push_str("</text:list-item>\n");
                }
                out.push_str("</text:list>\n");
            }
            _ => {
                for p in paragraphs {
                    paragraph(&mut out, p, styles);
                }
            }
        }
    }

    out.push_str("</office:text>\n</office:body>\n</office:document>\n");
    out
}
