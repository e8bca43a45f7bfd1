//! Importers: bytes in, [`Document`](quire_editor::document::Document) out.
//!
//! The XML formats go through an `xml-rs` event reader and fail on
//! malformed input. The rest are line-oriented block scanners feeding one
//! inline pass per paragraph; anything they do not recognize comes through
//! as literal text.

pub mod html;
pub mod latex;
pub mod markdown;
pub mod odt;
pub mod org;
pub mod text;
pub mod troff;

/// Decode bytes as UTF-8, replacing invalid sequences, with line endings
/// folded to `\n` and a leading byte-order mark dropped.
pub(crate) fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    text.replace("\r\n", "\n").replace('\r', "\n")
}
