//! OpenDocument flat XML (`.fodt`) import.
//!
//! Style definitions come before the body in a flat document, so they are
//! collected as the reader meets them: text styles resolve to run
//! attributes, paragraph styles to a built-in style (by name, by the
//! conventional office suite names, by parent, or by alignment), and list
//! styles to bullet or number. Whitespace collapses as ODF specifies;
//! `text:s` and `text:tab` are kept literally.

use std::collections::HashMap;

use quire_editor::document::Document;
use quire_editor::paragraph::RunAttrs;
use quire_editor::style::{StyleId, StyleRegistry};
use xml::attribute::OwnedAttribute;
use xml::name::OwnedName;
use xml::reader::XmlEvent;

use crate::builder::DocumentBuilder;
use crate::{ConvertError, Format};

pub(crate) const OFFICE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";
pub(crate) const STYLE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:style:1.0";
pub(crate) const TEXT_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";
pub(crate) const FO_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0";

/// Namespace URI for a conventional prefix, for documents that omit
/// declarations.
fn namespace_for(prefix: Option<&str>) -> Option<&'static str> {
    match prefix? {
        "office" => Some(OFFICE_NS),
        "style" => Some(STYLE_NS),
        "text" => Some(TEXT_NS),
        "fo" => Some(FO_NS),
        _ => None,
    }
}

fn is(name: &OwnedName, ns: &str, local: &str) -> bool {
    name.local_name == local
        && (name.namespace.as_deref() == Some(ns) || namespace_for(name.prefix.as_deref()) == Some(ns))
}

fn attr<'a>(attributes: &'a [OwnedAttribute], ns: &str, local: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| is(&a.name, ns, local))
        .map(|a| a.value.as_str())
}

/// A `style:style` being read.
#[derive(Debug, Default)]
struct StyleDef {
    name: String,
    family: String,
    parent: Option<String>,
    attrs: RunAttrs,
    align: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Paragraph,
    List(StyleId),
    Span(RunAttrs),
    Skip,
    Other,
}

struct Importer {
    builder: DocumentBuilder,
    frames: Vec<Frame>,
    builtin: StyleRegistry,
    text_styles: HashMap<String, (Option<String>, RunAttrs)>,
    paragraph_styles: HashMap<String, StyleId>,
    list_styles: HashMap<String, StyleId>,
    style_def: Option<StyleDef>,
    list_style_def: Option<String>,
}

impl Importer {
    fn new() -> Self {
        Self {
            builder: DocumentBuilder::new(),
            frames: Vec::new(),
            builtin: StyleRegistry::builtin(),
            text_styles: HashMap::new(),
            paragraph_styles: HashMap::new(),
            list_styles: HashMap::new(),
            style_def: None,
            list_style_def: None,
        }
    }

    fn attrs(&self) -> RunAttrs {
        self.frames.iter().fold(RunAttrs::empty(), |acc, f| match f {
            Frame::Span(a) => acc | *a,
            _ => acc,
        })
    }

    fn list(&self) -> Option<StyleId> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::List(style) => Some(*style),
            _ => None,
        })
    }

    /// Run attributes of a text style, following parents.
    fn text_attrs(&self, name: &str) -> RunAttrs {
        let mut attrs = RunAttrs::empty();
        let mut next = Some(name);
        for _ in 0..16 {
            let Some((parent, own)) = next.and_then(|n| self.text_styles.get(n)) else {
                break;
            };
            attrs |= *own;
            next = parent.as_deref();
        }
        attrs
    }

    /// A built-in style for a paragraph style name with no definition.
    fn well_known(&self, name: &str) -> Option<StyleId> {
        if let Some(id) = self.builtin.find(name) {
            return Some(id);
        }
        let name = name.replace("_20_", " ");
        if let Some(level) = name.strip_prefix("Heading ") {
            return level.parse::<u8>().ok().map(StyleId::heading);
        }
        match name.as_str() {
            "Quotations" => Some(StyleId::Q),
            "Preformatted Text" => Some(StyleId::PRE),
            "Standard" | "Text body" | "Default Paragraph Style" => Some(StyleId::P),
            _ => None,
        }
    }

    fn paragraph_style(&self, name: Option<&str>) -> StyleId {
        name.and_then(|n| {
            self.paragraph_styles
                .get(n)
                .copied()
                .or_else(|| self.well_known(n))
        })
        .unwrap_or(StyleId::P)
    }

    fn finish_style_def(&mut self) {
        let Some(def) = self.style_def.take() else {
            return;
        };
        match def.family.as_str() {
            "text" => {
                self.text_styles.insert(def.name, (def.parent, def.attrs));
            }
            "paragraph" => {
                let resolved = self
                    .well_known(&def.name)
                    .or_else(|| def.parent.as_deref().map(|p| self.paragraph_style(Some(p))))
                    .filter(|id| *id != StyleId::P);
                let style = resolved.unwrap_or(match def.align.as_deref() {
                    Some("center") => StyleId::CENTER,
                    Some("end" | "right") => StyleId::RIGHT,
                    _ => StyleId::P,
                });
                self.paragraph_styles.insert(def.name, style);
            }
            _ => {}
        }
    }

    fn start(&mut self, name: &OwnedName, attributes: &[OwnedAttribute]) {
        if self.frames.contains(&Frame::Skip) {
            self.frames.push(Frame::Skip);
            return;
        }

        // Style definitions.
        if is(name, STYLE_NS, "style") {
            self.style_def = Some(StyleDef {
                name: attr(attributes, STYLE_NS, "name").unwrap_or_default().to_string(),
                family: attr(attributes, STYLE_NS, "family").unwrap_or_default().to_string(),
                parent: attr(attributes, STYLE_NS, "parent-style-name").map(str::to_string),
                ..StyleDef::default()
            });
        } else if is(name, STYLE_NS, "text-properties") {
            if let Some(def) = &mut self.style_def {
                if attr(attributes, FO_NS, "font-weight").is_some_and(|w| w == "bold" || w.parse::<u16>().is_ok_and(|n| n >= 600)) {
                    def.attrs |= RunAttrs::BOLD;
                }
                if attr(attributes, FO_NS, "font-style").is_some_and(|s| s == "italic" || s == "oblique") {
                    def.attrs |= RunAttrs::ITALIC;
                }
                if attr(attributes, STYLE_NS, "text-underline-style").is_some_and(|s| s != "none") {
                    def.attrs |= RunAttrs::UNDERLINE;
                }
            }
        } else if is(name, STYLE_NS, "paragraph-properties") {
            if let Some(def) = &mut self.style_def {
                def.align = attr(attributes, FO_NS, "text-align").map(str::to_string);
            }
        } else if is(name, TEXT_NS, "list-style") {
            let list = attr(attributes, STYLE_NS, "name").unwrap_or_default().to_string();
            self.list_styles.insert(list.clone(), StyleId::LB);
            self.list_style_def = Some(list);
        } else if is(name, TEXT_NS, "list-level-style-number") {
            if let Some(list) = &self.list_style_def {
                if attr(attributes, TEXT_NS, "level").is_none_or(|l| l == "1") {
                    self.list_styles.insert(list.clone(), StyleId::LN);
                }
            }
        }

        // Body content.
        let frame = if is(name, TEXT_NS, "h") {
            let level = attr(attributes, TEXT_NS, "outline-level")
                .and_then(|l| l.parse::<u8>().ok())
                .unwrap_or(1);
            self.builder.start(StyleId::heading(level));
            Frame::Paragraph
        } else if is(name, TEXT_NS, "p") {
            let style = self.list().unwrap_or_else(|| {
                self.paragraph_style(attr(attributes, TEXT_NS, "style-name"))
            });
            self.builder.start(style);
            Frame::Paragraph
        } else if is(name, TEXT_NS, "list") {
            let style = attr(attributes, TEXT_NS, "style-name")
                .and_then(|n| self.list_styles.get(n).copied())
                .or_else(|| self.list())
                .unwrap_or(StyleId::LB);
            Frame::List(style)
        } else if is(name, TEXT_NS, "span") {
            Frame::Span(
                attr(attributes, TEXT_NS, "style-name").map_or(RunAttrs::empty(), |n| self.text_attrs(n)),
            )
        } else if is(name, TEXT_NS, "s") {
            let count = attr(attributes, TEXT_NS, "c")
                .and_then(|c| c.parse::<usize>().ok())
                .unwrap_or(1);
            self.builder.push(&" ".repeat(count), self.attrs());
            Frame::Other
        } else if is(name, TEXT_NS, "tab") {
            self.builder.push("\t", self.attrs());
            Frame::Other
        } else if is(name, TEXT_NS, "line-break") {
            if let Some(style) = self.builder.style() {
                self.builder.start(style);
            }
            Frame::Other
        } else if is(name, OFFICE_NS, "annotation") || is(name, TEXT_NS, "note") {
            Frame::Skip
        } else {
            Frame::Other
        };
        self.frames.push(frame);
    }

    fn end(&mut self, name: &OwnedName) {
        if is(name, STYLE_NS, "style") {
            self.finish_style_def();
        } else if is(name, TEXT_NS, "list-style") {
            self.list_style_def = None;
        }
        if self.frames.pop() == Some(Frame::Paragraph) {
            self.builder.end();
        }
    }

    fn characters(&mut self, text: &str) {
        if self.builder.is_open() && !self.frames.contains(&Frame::Skip) {
            let attrs = self.attrs();
            self.builder.push_collapsed(text, attrs);
        }
    }
}

pub fn import(bytes: &[u8]) -> Result<Document, ConvertError> {
    let mut importer = Importer::new();
    for event in super::html::parser_config().create_reader(bytes) {
        let event = event.map_err(|e| ConvertError::Parse {
            format: Format::OpenDocument,
            reason: e.to_string(),
        })?;
        match event {
            XmlEvent::StartElement {
                name, attributes, ..
            } => importer.start(&name, &attributes),
            XmlEvent::EndElement { name } => importer.end(&name),
            XmlEvent::Characters(text) => importer.characters(&text),
            _ => {}
        }
    }
    Ok(importer.builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEAD: &str = r#"<office:document xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0">"#;

    fn parse(styles: &str, body: &str) -> Document {
        let xml = format!(
            "{HEAD}<office:styles>{styles}</office:styles>\
             <office:body><office:text>{body}</office:text></office:body></office:document>"
        );
        import(xml.as_bytes()).unwrap()
    }

    fn summary(doc: &Document) -> Vec<(StyleId, String)> {
        doc.paragraphs().iter().map(|p| (p.style, p.text())).collect()
    }

    #[test]
    fn headings_paragraphs_and_spans() {
        let doc = parse(
            r#"<style:style style:name="T1" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>"#,
            r#"<text:h text:outline-level="2">Title</text:h><text:p>Some <text:span text:style-name="T1">bold</text:span> text.</text:p>"#,
        );
        assert_eq!(
            summary(&doc),
            [(StyleId::heading(2), "Title".into()), (StyleId::P, "Some bold text.".into())]
        );
        assert_eq!(doc.paragraphs()[1].runs()[1].attrs, RunAttrs::BOLD);
    }

    #[test]
    fn paragraph_styles_resolve_through_parents_and_alignment() {
        let doc = parse(
            r#"<style:style style:name="P1" style:family="paragraph" style:parent-style-name="Heading_20_3"/>
               <style:style style:name="P2" style:family="paragraph"><style:paragraph-properties fo:text-align="center"/></style:style>"#,
            r#"<text:p text:style-name="P1">h</text:p><text:p text:style-name="P2">c</text:p><text:p text:style-name="Quotations">q</text:p>"#,
        );
        assert_eq!(
            summary(&doc),
            [
                (StyleId::heading(3), "h".into()),
                (StyleId::CENTER, "c".into()),
                (StyleId::Q, "q".into()),
            ]
        );
    }

    #[test]
    fn lists_follow_list_styles() {
        let doc = parse(
            r#"<text:list-style style:name="N"><text:list-level-style-number text:level="1"/></text:list-style>"#,
            r#"<text:list text:style-name="N"><text:list-item><text:p>one</text:p></text:list-item></text:list>
               <text:list><text:list-item><text:p>dot</text:p></text:list-item></text:list>"#,
        );
        assert_eq!(
            summary(&doc),
            [(StyleId::LN, "one".into()), (StyleId::LB, "dot".into())]
        );
    }

    #[test]
    fn spaces_tabs_and_breaks() {
        let doc = parse(
            "",
            r#"<text:p><text:s/>a <text:s text:c="2"/>b<text:tab/>c<text:line-break/>d<text:s/></text:p>"#,
        );
        assert_eq!(
            summary(&doc),
            [(StyleId::P, " a   b\tc".into()), (StyleId::P, "d ".into())]
        );
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            import(b"<office:document>"),
            Err(ConvertError::Parse { format: Format::OpenDocument, .. })
        ));
    }
}
