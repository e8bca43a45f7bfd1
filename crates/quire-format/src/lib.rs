//! # quire-format — Import and export converters for quire documents
//!
//! One closed [`Format`] enum with a variant per supported file format.
//! Each variant dispatches to a pair of modules under [`import`] and
//! [`export`]:
//!
//! | Format         | Extensions                 | Import failure        |
//! |----------------|----------------------------|-----------------------|
//! | Text           | `txt`                      | never                 |
//! | Html           | `html`, `htm`, `xhtml`     | not well-formed XML   |
//! | Latex          | `tex`, `latex`             | never                 |
//! | Troff          | `ms`, `tr`, `troff`, `roff`| never                 |
//! | OpenDocument   | `fodt`, `xml`              | not well-formed XML   |
//! | Org            | `org`                      | never                 |
//! | Markdown       | `md`, `markdown`           | never                 |
//!
//! Exporters write the subset of styling each format can carry and drop the
//! rest (logged at debug). Importing what an exporter wrote gives back the
//! same document for that subset.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use quire_editor::document::Document;
use quire_editor::style::StyleRegistry;
use thiserror::Error;

mod builder;
pub mod export;
pub mod import;
mod inline;

/// Errors from importing, exporting, or the file helpers.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input is malformed for a strict (XML-based) format.
    #[error("{format} parse error: {reason}")]
    Parse { format: Format, reason: String },

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// A built-in scanner pattern failed to compile.
    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A supported document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Html,
    Latex,
    Troff,
    OpenDocument,
    Org,
    Markdown,
}

impl Format {
    /// Every format, in display order.
    pub const ALL: [Self; 7] = [
        Self::Text,
        Self::Html,
        Self::Latex,
        Self::Troff,
        Self::OpenDocument,
        Self::Org,
        Self::Markdown,
    ];

    /// Short lowercase name, as accepted by [`from_name`](Self::from_name).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Latex => "latex",
            Self::Troff => "troff",
            Self::OpenDocument => "opendocument",
            Self::Org => "org",
            Self::Markdown => "markdown",
        }
    }

    /// The extension files of this format are written with.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Html => "html",
            Self::Latex => "tex",
            Self::Troff => "ms",
            Self::OpenDocument => "fodt",
            Self::Org => "org",
            Self::Markdown => "md",
        }
    }

    /// The format a file extension (without the dot) names.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" => Self::Text,
            "html" | "htm" | "xhtml" => Self::Html,
            "tex" | "latex" => Self::Latex,
            "ms" | "tr" | "troff" | "roff" => Self::Troff,
            "fodt" | "xml" => Self::OpenDocument,
            "org" => Self::Org,
            "md" | "markdown" => Self::Markdown,
            _ => return None,
        })
    }

    /// Look a format up by name or extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// [`ConvertError::UnknownFormat`] if nothing matches.
    pub fn from_name(name: &str) -> Result<Self, ConvertError> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .or_else(|| match lower.as_str() {
                "odt" | "odf" => Some(Self::OpenDocument),
                "plain" => Some(Self::Text),
                _ => Self::from_extension(&lower),
            })
            .ok_or_else(|| ConvertError::UnknownFormat(name.to_string()))
    }

    /// The format for a path, by its extension.
    ///
    /// # Errors
    ///
    /// [`ConvertError::UnknownFormat`] if the extension is missing or
    /// unrecognized.
    pub fn for_path(path: &Path) -> Result<Self, ConvertError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ConvertError::UnknownFormat(path.display().to_string()))
    }

    /// Parse `bytes` as a document in this format.
    ///
    /// # Errors
    ///
    /// [`ConvertError::Parse`] for malformed HTML or OpenDocument input.
    /// The other formats never fail.
    pub fn import(self, bytes: &[u8]) -> Result<Document, ConvertError> {
        let doc = match self {
            Self::Text => import::text::import(bytes),
            Self::Html => import::html::import(bytes)?,
            Self::Latex => import::latex::import(bytes)?,
            Self::Troff => import::troff::import(bytes),
            Self::OpenDocument => import::odt::import(bytes)?,
            Self::Org => import::org::import(bytes)?,
            Self::Markdown => import::markdown::import(bytes)?,
        };
        log::debug!("imported {} paragraphs from {self}", doc.len());
        Ok(doc)
    }

    /// Serialize `doc` in this format.
    #[must_use]
    pub fn export(self, doc: &Document, styles: &StyleRegistry) -> Vec<u8> {
        let out = match self {
            Self::Text => export::text::export(doc),
            Self::Html => export::html::export(doc, styles),
            Self::Latex => export::latex::export(doc, styles),
            Self::Troff => export::troff::export(doc, styles),
            Self::OpenDocument => export::odt::export(doc, styles),
            Self::Org => export::org::export(doc, styles),
            Self::Markdown => export::markdown::export(doc, styles),
        };
        log::debug!("exported {} paragraphs as {self} ({} bytes)", doc.len(), out.len());
        out.into_bytes()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Read and import a file. `format` defaults to the one the extension
/// names.
///
/// # Errors
///
/// I/O failures, an unknown extension, or a parse error.
pub fn read_file(path: &Path, format: Option<Format>) -> Result<Document, ConvertError> {
    let format = match format {
        Some(f) => f,
        None => Format::for_path(path)?,
    };
    let bytes = fs::read(path)?;
    format.import(&bytes)
}

/// Export and write a file. `format` defaults to the one the extension
/// names.
///
/// # Errors
///
/// I/O failures or an unknown extension.
pub fn write_file(
    doc: &Document,
    styles: &StyleRegistry,
    path: &Path,
    format: Option<Format>,
) -> Result<(), ConvertError> {
    let format = match format {
        Some(f) => f,
        None => Format::for_path(path)?,
    };
    fs::write(path, format.export(doc, styles))?;
    Ok(())
}
