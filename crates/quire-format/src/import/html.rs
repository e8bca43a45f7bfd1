//! XHTML import.
//!
//! The input must be well-formed XML. Elements map through a fixed table:
//! headings, paragraphs and divs, block quotes, preformatted blocks and
//! list items start paragraphs; `b`/`strong`, `i`/`em` and `u` set run
//! attributes; `br` breaks the paragraph. A `class` naming a built-in style
//! overrides the element's default. Everything inside `head`, `script` and
//! `style` is skipped, and unknown elements are transparent.

use quire_editor::document::Document;
use quire_editor::paragraph::RunAttrs;
use quire_editor::style::{StyleId, StyleRegistry};
use xml::attribute::OwnedAttribute;
use xml::reader::{ParserConfig, XmlEvent};

use crate::builder::DocumentBuilder;
use crate::{ConvertError, Format};

/// Named entities beyond XML's five that XHTML commonly uses.
pub(crate) const ENTITIES: &[(&str, &str)] = &[
    ("nbsp", "\u{a0}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("trade", "\u{2122}"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("hellip", "\u{2026}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("laquo", "\u{ab}"),
    ("raquo", "\u{bb}"),
    ("bull", "\u{2022}"),
    ("middot", "\u{b7}"),
];

/// What an open element did, undone when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Block,
    Pre,
    Quote,
    List(StyleId),
    Item,
    Attr(RunAttrs),
    Skip,
    Other,
}

struct Importer {
    builder: DocumentBuilder,
    frames: Vec<Frame>,
    builtin: StyleRegistry,
}

impl Importer {
    fn new() -> Self {
        Self {
            builder: DocumentBuilder::new(),
            frames: Vec::new(),
            builtin: StyleRegistry::builtin(),
        }
    }

    fn skipping(&self) -> bool {
        self.frames.contains(&Frame::Skip)
    }

    fn in_pre(&self) -> bool {
        self.frames.contains(&Frame::Pre)
    }

    fn attrs(&self) -> RunAttrs {
        self.frames.iter().fold(RunAttrs::empty(), |acc, f| match f {
            Frame::Attr(a) => acc | *a,
            _ => acc,
        })
    }

    fn list_style(&self) -> StyleId {
        self.frames
            .iter()
            .rev()
            .find_map(|f| match f {
                Frame::List(style) => Some(*style),
                _ => None,
            })
            .unwrap_or(StyleId::LB)
    }

    /// Style for text met with no paragraph open.
    fn context_style(&self) -> StyleId {
        for f in self.frames.iter().rev() {
            match f {
                Frame::Pre => return StyleId::PRE,
                Frame::Item => return self.list_style(),
                Frame::Quote => return StyleId::Q,
                _ => {}
            }
        }
        StyleId::P
    }

    fn class_style(&self, attributes: &[OwnedAttribute]) -> Option<StyleId> {
        attributes
            .iter()
            .find(|a| a.name.local_name == "class")
            .and_then(|a| a.value.split_whitespace().find_map(|c| self.builtin.find(c)))
    }

    fn start(&mut self, tag: &str, attributes: &[OwnedAttribute]) {
        let frame = match tag {
            "head" | "script" | "style" | "title" => Frame::Skip,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag.as_bytes()[1] - b'0';
                self.open_block(StyleId::heading(level));
                Frame::Block
            }
            "p" | "div" => {
                let style = self.class_style(attributes).unwrap_or_else(|| self.context_style());
                self.open_block(style);
                Frame::Block
            }
            "li" => {
                let style = self.class_style(attributes).unwrap_or_else(|| self.list_style());
                self.open_block(style);
                Frame::Item
            }
            "pre" => {
                self.open_block(StyleId::PRE);
                Frame::Pre
            }
            "blockquote" => {
                self.builder.end_if_empty();
                Frame::Quote
            }
            "ul" | "ol" => {
                self.builder.end_if_empty();
                Frame::List(if tag == "ol" { StyleId::LN } else { StyleId::LB })
            }
            "b" | "strong" => Frame::Attr(RunAttrs::BOLD),
            "i" | "em" => Frame::Attr(RunAttrs::ITALIC),
            "u" => Frame::Attr(RunAttrs::UNDERLINE),
            "br" => {
                let style = self.builder.style().unwrap_or_else(|| self.context_style());
                self.builder.start(style);
                Frame::Other
            }
            _ => Frame::Other,
        };
        self.frames.push(frame);
    }

    fn open_block(&mut self, style: StyleId) {
        self.builder.end_if_empty();
        self.builder.start(style);
    }

    fn end(&mut self) {
        match self.frames.pop() {
            Some(Frame::Block | Frame::Pre | Frame::Item) => self.builder.end(),
            Some(Frame::Quote | Frame::List(_)) => self.builder.end_if_empty(),
            _ => {}
        }
    }

    fn characters(&mut self, text: &str) {
        if self.skipping() {
            return;
        }
        if !self.builder.is_open() {
            if text.trim().is_empty() {
                return;
            }
            self.builder.start(self.context_style());
        }
        let attrs = self.attrs();
        if self.in_pre() {
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    self.builder.start(StyleId::PRE);
                }
                self.builder.push(line, attrs);
            }
        } else {
            self.builder.push_collapsed(text, attrs);
        }
    }
}

/// Build the reader configuration shared with the OpenDocument importer.
pub(crate) fn parser_config() -> ParserConfig {
    let config = ParserConfig::new()
        .trim_whitespace(false)
        .whitespace_to_characters(true)
        .cdata_to_characters(true)
        .ignore_comments(true)
        .coalesce_characters(true);
    ENTITIES
        .iter()
        .fold(config, |config, (name, value)| config.add_entity(*name, *value))
}

pub fn import(bytes: &[u8]) -> Result<Document, ConvertError> {
    let mut importer = Importer::new();
    for event in parser_config().create_reader(bytes) {
        let event = event.map_err(|e| ConvertError::Parse {
            format: Format::Html,
            reason: e.to_string(),
        })?;
        match event {
            XmlEvent::StartElement {
                name, attributes, ..
            } => importer.start(&name.local_name.to_ascii_lowercase(), &attributes),
            XmlEvent::EndElement { .. } => importer.end(),
            XmlEvent::Characters(text) => importer.characters(&text),
            _ => {}
        }
    }
    Ok(importer.builder.build())
}
