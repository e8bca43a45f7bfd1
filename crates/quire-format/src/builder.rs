//! Paragraph accumulator shared by the importers.
//!
//! Text arrives in pieces with attributes; the builder merges them into
//! runs of the open paragraph. Markup-driven formats (HTML, OpenDocument)
//! push text through [`DocumentBuilder::push_collapsed`], which folds
//! whitespace the way those formats render it: runs of whitespace become
//! one space, nothing at the start of a paragraph, and trailing collapsed
//! spaces trimmed when the paragraph closes. Spaces pushed with
//! [`DocumentBuilder::push`] are kept as they are.

use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, Run, RunAttrs};
use quire_editor::style::StyleId;

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    paragraphs: Vec<Paragraph>,
    current: Option<Paragraph>,
    /// Collapsed spaces at the end of `current`, trimmed on close.
    soft_trailing: usize,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the open paragraph, if any, and open an empty one.
    pub fn start(&mut self, style: StyleId) {
        self.end();
        self.current = Some(Paragraph::new(style));
    }

    /// Close the open paragraph, keeping it even if it is empty.
    pub fn end(&mut self) {
        if let Some(mut p) = self.current.take() {
            if self.soft_trailing > 0 {
                let len = p.len();
                p.delete(len - self.soft_trailing, len);
            }
            self.paragraphs.push(p);
        }
        self.soft_trailing = 0;
    }

    /// Close the open paragraph, dropping it if it holds nothing.
    pub fn end_if_empty(&mut self) {
        if self.current.as_ref().is_some_and(|p| p.len() == self.soft_trailing) {
            self.current = None;
            self.soft_trailing = 0;
        } else {
            self.end();
        }
    }

    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Style of the open paragraph.
    pub fn style(&self) -> Option<StyleId> {
        self.current.as_ref().map(|p| p.style)
    }

    /// The open paragraph, opened as a body paragraph if there is none.
    fn paragraph(&mut self) -> &mut Paragraph {
        self.current.get_or_insert_with(|| Paragraph::new(StyleId::P))
    }

    /// Append text as-is.
    pub fn push(&mut self, text: &str, attrs: RunAttrs) {
        if text.is_empty() {
            return;
        }
        self.paragraph().push(text, attrs);
        self.soft_trailing = 0;
    }

    /// Append whole runs as-is.
    pub fn push_runs(&mut self, runs: impl IntoIterator<Item = Run>) {
        for run in runs {
            self.push(&run.text, run.attrs);
        }
    }

    /// Append text with whitespace collapsed.
    pub fn push_collapsed(&mut self, text: &str, attrs: RunAttrs) {
        let mut ends_in_space = self
            .current
            .as_ref()
            .is_none_or(|p| p.is_empty() || p.text().ends_with(' '));
        let mut chunk = String::new();
        let mut soft = self.soft_trailing;
        for c in text.chars() {
            if c.is_whitespace() && c != '\u{a0}' {
                if !ends_in_space {
                    chunk.push(' ');
                    ends_in_space = true;
                    soft += 1;
                }
            } else {
                chunk.push(c);
                ends_in_space = false;
                soft = 0;
            }
        }
        if !chunk.is_empty() {
            self.paragraph().push(&chunk, attrs);
            self.soft_trailing = soft;
        }
    }

    /// Close everything and produce the document.
    pub fn build(mut self) -> Document {
        self.end();
        let mut doc = Document::from_paragraphs(self.paragraphs);
        doc.normalize();
        doc
    }
}
